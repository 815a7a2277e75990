use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use tracing::info;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use lms::config::Config;
use lms::db::init_db;
use lms::docs::ApiDoc;
use lms::model::AcademicCalendar;
use lms::routes::{self, RateLimits};
use lms::store::MySqlStore;
use lms::workflow::{LeaveWorkflow, WorkflowPorts};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(MySqlStore::new(pool.clone(), config.profile_cache_ttl));
    let workflow = Data::new(LeaveWorkflow::new(
        WorkflowPorts::shared(store),
        AcademicCalendar::new(config.academic_year_start_month),
    ));
    let limits = RateLimits::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let pool = Data::new(pool);
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(pool.clone())
            .app_data(config_data.clone())
            .app_data(workflow.clone())
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config_data, &limits))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}

use crate::{
    api::{balance, error::bad_request, leave_request, navigation, notification},
    auth::{handlers, middleware::auth_middleware},
    config::{Config, ConfigError},
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-route rate limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct RateLimits {
    login: Limiter,
    refresh: Limiter,
    protected: Limiter,
}

impl RateLimits {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self {
            login: build_limiter("RATE_LOGIN_PER_MIN", config.rate_login_per_min)?,
            refresh: build_limiter("RATE_REFRESH_PER_MIN", config.rate_refresh_per_min)?,
            protected: build_limiter("RATE_PROTECTED_PER_MIN", config.rate_protected_per_min)?,
        })
    }
}

fn build_limiter(name: &'static str, requests_per_min: u32) -> Result<Limiter, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name,
        value: requests_per_min.to_string(),
    };
    if requests_per_min == 0 {
        return Err(invalid());
    }
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(invalid)?;
    Ok(Arc::new(Governor::new(&cfg)))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limits: &RateLimits) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limits.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limits.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limits.protected.clone()) // rate limiting
            .configure(api_routes),
    );
}

/// Workflow endpoints, relative to the API prefix. Callers add authentication.
pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(bad_request))
        .app_data(web::QueryConfig::default().error_handler(bad_request))
        .app_data(web::PathConfig::default().error_handler(bad_request));

    cfg.service(
        web::scope("/leave")
            // /leave
            .service(
                web::resource("")
                    .route(web::get().to(leave_request::leave_list))
                    .route(web::post().to(leave_request::create_leave)),
            )
            // /leave/{id}
            .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
            .service(
                web::resource("/{id}/approve").route(web::put().to(leave_request::approve_leave)),
            )
            .service(
                web::resource("/{id}/reject").route(web::put().to(leave_request::reject_leave)),
            )
            .service(
                web::resource("/{id}/forward").route(web::put().to(leave_request::forward_leave)),
            ),
    )
    .service(web::resource("/balance").route(web::get().to(balance::my_balances)))
    .service(
        web::scope("/notifications")
            .service(
                web::resource("").route(web::get().to(notification::list_notifications)),
            )
            .service(web::resource("/read").route(web::put().to(notification::mark_all_read)))
            .service(web::resource("/{id}/read").route(web::put().to(notification::mark_read))),
    )
    .service(web::resource("/navigation").route(web::get().to(navigation::navigation)));
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns a new token pair

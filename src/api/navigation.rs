use crate::auth::AuthUser;
use actix_web::{HttpResponse, Responder};

/// Sidebar entries for the caller's role.
#[utoipa::path(
    get,
    path = "/api/navigation",
    responses(
        (status = 200, description = "Navigation entries", body = [NavItem]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Navigation"
)]
pub async fn navigation(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(auth.actor.role.navigation())
}

use crate::auth::AuthUser;
use crate::workflow::{LeaveWorkflow, WorkflowError};
use actix_web::{HttpResponse, web};
use serde_json::json;

/// The caller's notifications, newest first.
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Notifications", body = [Notification]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notification"
)]
pub async fn list_notifications(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
) -> Result<HttpResponse, WorkflowError> {
    let notifications = workflow.notifications(&auth.actor).await?;
    Ok(HttpResponse::Ok().json(notifications))
}

#[utoipa::path(
    put,
    path = "/api/notifications/{notification_id}/read",
    params(
        ("notification_id" = u64, Path, description = "ID of the notification to mark as read")
    ),
    responses(
        (status = 200, description = "Marked as read", body = Object, example = json!({
            "message": "Notification marked as read"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such notification for the caller", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> Result<HttpResponse, WorkflowError> {
    workflow
        .mark_notification_read(&auth.actor, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Notification marked as read"
    })))
}

#[utoipa::path(
    put,
    path = "/api/notifications/read",
    responses(
        (status = 200, description = "All marked as read", body = Object, example = json!({
            "updated": 3
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notification"
)]
pub async fn mark_all_read(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
) -> Result<HttpResponse, WorkflowError> {
    let updated = workflow.mark_all_read(&auth.actor).await?;
    Ok(HttpResponse::Ok().json(json!({ "updated": updated })))
}

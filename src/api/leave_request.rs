use crate::auth::AuthUser;
use crate::model::{LeaveRequest, LeaveStatus};
use crate::store::Page;
use crate::workflow::{LeaveApplication, LeaveWorkflow, ListScope, WorkflowError};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "requester_id": 1000,
            "leave_type": "casual",
            "from_date": "2026-01-15",
            "to_date": "2026-01-16",
            "number_of_days": 2.0,
            "reason": "Family function",
            "status": "pending",
            "is_half_day": false,
            "assigned_faculty": null,
            "approved_by": null,
            "department_id": 1,
            "version": 0,
            "created_at": "2026-01-10T09:00:00Z",
            "updated_at": "2026-01-10T09:00:00Z"
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1
}))]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: u64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Which list to read; defaults to the caller's own requests
    pub scope: Option<ListScope>,
    #[schema(example = 1)]
    /// Department to browse (Principal only; others always see their own)
    pub department_id: Option<u64>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 10)]
    /// Items per page, at most 100
    pub per_page: Option<u32>,
}

/// Apply for leave. The request starts in `pending` and the approver is notified.
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = LeaveApplication,
        description = "Leave application",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request created", body = LeaveRequest),
        (status = 400, description = "Invalid dates, duration or reason", body = ErrorBody),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Role cannot apply for leave", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    payload: web::Json<LeaveApplication>,
) -> Result<HttpResponse, WorkflowError> {
    let request = workflow.submit(&auth.actor, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(request))
}

async fn transition(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
    target: LeaveStatus,
) -> Result<HttpResponse, WorkflowError> {
    let request = workflow
        .transition(&auth.actor, path.into_inner(), target)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Approve a leave request and charge the requester's balance.
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot decide this request", body = ErrorBody),
        (status = 404, description = "Leave request not found", body = ErrorBody),
        (status = 409, description = "Already decided, or changed concurrently", body = ErrorBody),
        (status = 422, description = "Insufficient leave balance", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> Result<HttpResponse, WorkflowError> {
    transition(auth, workflow, path, LeaveStatus::Approved).await
}

/// Reject a leave request.
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot decide this request", body = ErrorBody),
        (status = 404, description = "Leave request not found", body = ErrorBody),
        (status = 409, description = "Already decided, or changed concurrently", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> Result<HttpResponse, WorkflowError> {
    transition(auth, workflow, path, LeaveStatus::Rejected).await
}

/// Escalate a pending request to the Principal (HOD only).
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/forward",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to forward")
    ),
    responses(
        (status = 200, description = "Leave forwarded", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller cannot forward this request", body = ErrorBody),
        (status = 404, description = "Leave request not found", body = ErrorBody),
        (status = 409, description = "Not forwardable, or changed concurrently", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn forward_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> Result<HttpResponse, WorkflowError> {
    transition(auth, workflow, path, LeaveStatus::Forwarded).await
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Leave request not found", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    path: web::Path<u64>,
) -> Result<HttpResponse, WorkflowError> {
    let request = workflow.get(&auth.actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}

/// for getting leave applications endpoint, newest first
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Scope not available to the caller", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, WorkflowError> {
    let page = Page::new(query.page, query.per_page);
    let listed = workflow
        .list(
            &auth.actor,
            query.scope.unwrap_or_default(),
            query.department_id,
            page,
        )
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: listed.data,
        page: listed.page.page,
        per_page: listed.page.per_page,
        total: listed.total,
    }))
}

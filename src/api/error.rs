use std::fmt;

use actix_web::{HttpRequest, HttpResponse, ResponseError, error::InternalError, http::StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::workflow::WorkflowError;

/// JSON body of every failed workflow call.
#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "error": "invalid_transition",
    "message": "cannot move a approved request to rejected"
}))]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl ResponseError for WorkflowError {
    fn status_code(&self) -> StatusCode {
        match self {
            WorkflowError::InvalidDateRange { .. }
            | WorkflowError::InvalidDuration
            | WorkflowError::MissingReason => StatusCode::BAD_REQUEST,
            WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
            WorkflowError::NotFound(_) | WorkflowError::NotificationNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            WorkflowError::Conflict(_) | WorkflowError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            WorkflowError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            WorkflowError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            WorkflowError::Store(e) => {
                error!(error = %e, "Store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.code(),
            message,
        })
    }
}

/// Extractor error handler: malformed bodies, queries and paths get the same
/// JSON shape as workflow errors.
pub fn bad_request<E>(err: E, req: &HttpRequest) -> actix_web::Error
where
    E: fmt::Debug + fmt::Display + 'static,
{
    debug!(path = %req.path(), error = %err, "Rejected malformed request");
    let body = ErrorBody {
        error: "bad_request",
        message: err.to_string(),
    };
    InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

use crate::auth::AuthUser;
use crate::model::{AcademicYear, BalanceView};
use crate::workflow::{LeaveWorkflow, WorkflowError};
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Academic year label; the current year when omitted
    #[param(example = "2025-26", value_type = Option<String>)]
    pub academic_year: Option<AcademicYear>,
}

/// The caller's balances, one row per leave type.
#[utoipa::path(
    get,
    path = "/api/balance",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Leave balances", body = [BalanceView]),
        (status = 400, description = "Malformed academic year"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Store failure", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Balance"
)]
pub async fn my_balances(
    auth: AuthUser,
    workflow: web::Data<LeaveWorkflow>,
    query: web::Query<BalanceQuery>,
) -> Result<HttpResponse, WorkflowError> {
    let academic_year = query
        .academic_year
        .unwrap_or_else(|| workflow.current_year());

    let balances = workflow
        .balances(auth.actor.user_id, academic_year)
        .await?;
    let views: Vec<BalanceView> = balances.iter().map(BalanceView::from).collect();

    Ok(HttpResponse::Ok().json(views))
}

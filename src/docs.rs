use crate::api::error::ErrorBody;
use crate::api::leave_request::{LeaveFilter, LeaveListResponse};
use crate::model::{
    BalanceView, LeaveRequest, LeaveStatus, LeaveType, NavItem, Notification, NotificationKind,
};
use crate::models::{LoginReqDto, TokenPair};
use crate::workflow::{LeaveApplication, ListScope};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Management API",
        version = "1.0.0",
        description = r#"
## Leave Management System

Leave requests for an academic institution with four roles:
**Faculty**, **Head of Department**, **Junior Assistant** and **Principal**.

### 🔹 Workflow
- Requests start `pending`
- The HOD approves, rejects or forwards them to the Principal
- On-duty (OD) requests and requests raised by an HOD go straight to the Principal
- Approval charges the requester's balance for the academic year

### 🔐 Security
All `/api` endpoints require a **JWT Bearer** access token from `/auth/login`.

### ⚠️ Errors
Failures return `{"error": <code>, "message": <text>}`.
A `409 conflict` means the request changed since it was read: re-fetch and retry.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::forward_leave,

        crate::api::balance::my_balances,

        crate::api::notification::list_notifications,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read,

        crate::api::navigation::navigation
    ),
    components(
        schemas(
            LoginReqDto,
            TokenPair,
            LeaveApplication,
            LeaveRequest,
            LeaveType,
            LeaveStatus,
            ListScope,
            LeaveFilter,
            LeaveListResponse,
            BalanceView,
            Notification,
            NotificationKind,
            NavItem,
            ErrorBody
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Login and token rotation"),
        (name = "Leave", description = "Leave request workflow"),
        (name = "Balance", description = "Leave balances"),
        (name = "Notification", description = "In-app notifications"),
        (name = "Navigation", description = "Role-based navigation"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

use serde::Serialize;
use utoipa::ToSchema;

use super::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct NavItem {
    #[schema(example = "Dashboard", value_type = String)]
    pub label: &'static str,
    #[schema(example = "/faculty", value_type = String)]
    pub path: &'static str,
}

const fn item(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const FACULTY: &[NavItem] = &[
    item("Dashboard", "/faculty"),
    item("Apply Leave", "/faculty/apply"),
    item("Leave History", "/faculty/history"),
];

const HOD: &[NavItem] = &[
    item("Dashboard", "/hod"),
    item("Pending Requests", "/hod/requests"),
    item("Apply Leave", "/hod/apply"),
];

const PRINCIPAL: &[NavItem] = &[
    item("Dashboard", "/principal"),
    item("Forwarded Requests", "/principal/requests"),
];

const JUNIOR_ASSISTANT: &[NavItem] = &[
    item("Dashboard", "/assistant"),
    item("Leave Records", "/assistant/records"),
    item("Apply Leave", "/assistant/apply"),
];

impl Role {
    /// Sidebar entries for the role's dashboard.
    pub fn navigation(self) -> &'static [NavItem] {
        match self {
            Role::Faculty => FACULTY,
            Role::Hod => HOD,
            Role::Principal => PRINCIPAL,
            Role::JuniorAssistant => JUNIOR_ASSISTANT,
        }
    }
}

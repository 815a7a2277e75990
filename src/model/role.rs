use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Institutional role. Stored as `role_id` on the `users` row, so every user
/// holds exactly one.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Faculty = 1,
    Hod = 2,
    JuniorAssistant = 3,
    Principal = 4,
}

impl Role {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Role::Faculty),
            2 => Some(Role::Hod),
            3 => Some(Role::JuniorAssistant),
            4 => Some(Role::Principal),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    /// Roles that apply for leave themselves.
    pub fn can_submit(self) -> bool {
        !matches!(self, Role::Principal)
    }
}

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Directory entry for a user: display name, role and department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: u64,
    pub full_name: String,
    pub role: Role,
    /// `None` for the Principal
    pub department_id: Option<u64>,
}

/// The authenticated caller of a workflow operation. Passed explicitly into
/// every engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: u64,
    pub role: Role,
    pub department_id: Option<u64>,
}

impl Actor {
    pub fn new(user_id: u64, role: Role, department_id: Option<u64>) -> Self {
        Self {
            user_id,
            role,
            department_id,
        }
    }

    pub fn belongs_to(&self, department_id: Option<u64>) -> bool {
        matches!((self.department_id, department_id), (Some(own), Some(other)) if own == other)
    }
}

impl From<&Profile> for Actor {
    fn from(profile: &Profile) -> Self {
        Actor::new(profile.user_id, profile.role, profile.department_id)
    }
}

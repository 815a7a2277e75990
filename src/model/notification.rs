use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub recipient_id: u64,
    pub message: String,
    pub kind: NotificationKind,
}

impl NewNotification {
    pub fn new(recipient_id: u64, kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            recipient_id,
            message: message.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub recipient_id: u64,
    #[schema(example = "Your Casual Leave request has been approved")]
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub read: bool,
    #[schema(example = "2026-02-09T10:30:00Z", format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

pub mod balance;
pub mod error;
pub mod leave_request;
pub mod navigation;
pub mod notification;

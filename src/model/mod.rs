pub mod academic_year;
pub mod days;
pub mod department;
pub mod leave_balance;
pub mod leave_request;
pub mod navigation;
pub mod notification;
pub mod role;
pub mod user;

pub use academic_year::{AcademicCalendar, AcademicYear};
pub use days::LeaveDays;
pub use department::Department;
pub use leave_balance::{BalanceError, BalanceView, LeaveBalance};
pub use leave_request::{LeaveRequest, LeaveStatus, LeaveType, NewLeaveRequest};
pub use navigation::NavItem;
pub use notification::{NewNotification, Notification, NotificationKind};
pub use role::Role;
pub use user::{Actor, Profile};

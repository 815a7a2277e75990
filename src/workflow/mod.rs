//! The leave-request state machine and the rules behind it.

pub mod engine;
pub mod error;
pub mod policy;

pub use engine::{LeaveApplication, LeaveWorkflow, WorkflowPorts};
pub use error::WorkflowError;
pub use policy::ListScope;

//! Domain services for WardOps.
//!
//! Services contain business logic that operates on domain models.

pub mod assignment;
pub mod notification;
pub mod settings_resolution;

pub use assignment::{
    decide_assignment, eligible_assignees, AssignmentDecision, AssignmentStrategy,
};
pub use notification::{DispatchResult, LogNotifier, RequestNotification, RequestNotifier};
pub use settings_resolution::resolve_module_settings;

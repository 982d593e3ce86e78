//! Application services.

pub mod notifier;

//! Request notification dispatch port.
//!
//! Dispatch is fire-and-forget: the port reports an outcome but callers never
//! fail the originating operation on it, and failure-path logging goes
//! through `tracing` without blocking.

use serde::{Deserialize, Serialize};

use crate::models::location::LocationRef;
use crate::models::request::RequestKind;

/// Push payload for a newly created request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestNotification {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub site: String,
    pub title: String,
    pub body: String,
}

impl RequestNotification {
    pub fn bearer_created(site: &str, from: &LocationRef, to: &LocationRef) -> Self {
        Self {
            kind: RequestKind::Bearer,
            site: site.to_string(),
            title: "Transport request".to_string(),
            body: format!("From {} to {}", from.label, to.label),
        }
    }

    pub fn cleaner_created(site: &str, from: &LocationRef) -> Self {
        Self {
            kind: RequestKind::Cleaner,
            site: site.to_string(),
            title: "Cleaning request".to_string(),
            body: format!("For {}", from.label),
        }
    }
}

/// Outcome of a dispatch attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    Sent,
    /// The module has no topic configured for this site.
    NoTopic,
    Failed(String),
}

/// Port for publishing request notifications to a configured topic.
#[async_trait::async_trait]
pub trait RequestNotifier: Send + Sync {
    async fn publish(&self, topic: &str, notification: RequestNotification) -> DispatchResult;
}

/// Logging notifier for development and tests.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl RequestNotifier for LogNotifier {
    async fn publish(&self, topic: &str, notification: RequestNotification) -> DispatchResult {
        tracing::info!(
            topic = %topic,
            kind = %notification.kind,
            site = %notification.site,
            body = %notification.body,
            "would publish request notification"
        );
        DispatchResult::Sent
    }
}

//! Outbound request notification delivery.
//!
//! The webhook notifier posts payloads to the configured push gateway; with
//! no gateway configured, payloads are logged. Dispatch is always
//! fire-and-forget: outcomes are logged and never surface to clients.

use std::sync::Arc;
use std::time::Duration;

use domain::services::notification::{
    DispatchResult, LogNotifier, RequestNotification, RequestNotifier,
};

use crate::config::NotificationConfig;

/// Notifier posting payloads to a webhook endpoint.
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

#[async_trait::async_trait]
impl RequestNotifier for WebhookNotifier {
    async fn publish(&self, topic: &str, notification: RequestNotification) -> DispatchResult {
        let payload = serde_json::json!({
            "topic": topic,
            "message": notification,
        });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => DispatchResult::Sent,
            Ok(response) => DispatchResult::Failed(format!("gateway returned {}", response.status())),
            Err(err) => DispatchResult::Failed(err.to_string()),
        }
    }
}

/// Builds the notifier selected by configuration.
pub fn build_notifier(config: &NotificationConfig) -> Arc<dyn RequestNotifier> {
    let url = config.webhook_url.trim();
    if url.is_empty() {
        return Arc::new(LogNotifier);
    }
    match reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
    {
        Ok(client) => Arc::new(WebhookNotifier {
            client,
            url: url.to_string(),
        }),
        Err(err) => {
            tracing::warn!(%err, "failed to build webhook client, falling back to log notifier");
            Arc::new(LogNotifier)
        }
    }
}

/// Publishes without blocking the caller. Delivery failures are logged, never
/// propagated: a lost push must not fail the request that triggered it.
pub fn dispatch_fire_and_forget(
    notifier: Arc<dyn RequestNotifier>,
    topic: String,
    notification: RequestNotification,
) {
    tokio::spawn(async move {
        match notifier.publish(&topic, notification).await {
            DispatchResult::Sent | DispatchResult::NoTopic => {}
            DispatchResult::Failed(reason) => {
                tracing::warn!(%topic, %reason, "request notification failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_url_builds_log_notifier() {
        let config = NotificationConfig {
            webhook_url: "   ".to_string(),
            timeout_secs: 5,
        };
        // just exercising the selection; the log notifier has no state
        let _notifier = build_notifier(&config);
    }

    #[tokio::test]
    async fn test_webhook_failure_is_reported_not_thrown() {
        let notifier = WebhookNotifier {
            client: reqwest::Client::new(),
            // nothing listens here
            url: "http://127.0.0.1:1/notify".to_string(),
        };
        let result = notifier
            .publish(
                "arn:topic:bearer",
                RequestNotification {
                    kind: domain::models::request::RequestKind::Bearer,
                    site: "ward-a".to_string(),
                    title: "Transport request".to_string(),
                    body: "From A to B".to_string(),
                },
            )
            .await;
        assert!(matches!(result, DispatchResult::Failed(_)));
    }
}

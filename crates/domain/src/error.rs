//! Domain error taxonomy.

use thiserror::Error;

/// Failures surfaced by the request/search domain.
///
/// All failures propagate to the caller as structured values; user-facing
/// formatting belongs to the presentation layer.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A referenced site, module or request does not exist. Not retried.
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed or missing parameters, rejected before any query executes.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Persistence or external-service failure during execution. Not retried
    /// at this layer: resubmission could duplicate side effects.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// One of several concurrently issued queries failed; the whole operation
    /// fails rather than returning a partial feed.
    #[error("aggregation failed for {context}: {source}")]
    Aggregation {
        context: String,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DomainError::Validation(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        DomainError::Upstream(message.into())
    }

    pub fn aggregation(context: impl Into<String>, source: DomainError) -> Self {
        DomainError::Aggregation {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(_))
    }
}

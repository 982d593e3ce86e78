//! Persistence and directory ports.
//!
//! The core issues typed pipeline descriptors and plain documents; transport
//! and storage engine details stay behind these traits. Implementations are
//! injected, never reached through process-global state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::request::{
    Assignee, BearerRequest, CleanerRequest, VisitorRequest, WorkedKind,
};
use crate::models::settings::ModuleSettings;
use crate::models::site::Site;
use crate::search::pipeline::{DateRange, PipelineStage};

/// Search surface of the request store. Each call addresses one site database
/// and executes a built pipeline against that kind's collection.
#[async_trait]
pub trait RequestSearchStore: Send + Sync {
    async fn search_visitor(
        &self,
        db: &str,
        pipeline: &[PipelineStage],
    ) -> Result<Vec<VisitorRequest>, DomainError>;

    async fn search_bearer(
        &self,
        db: &str,
        pipeline: &[PipelineStage],
    ) -> Result<Vec<BearerRequest>, DomainError>;

    async fn search_cleaner(
        &self,
        db: &str,
        pipeline: &[PipelineStage],
    ) -> Result<Vec<CleanerRequest>, DomainError>;
}

/// Full persistence contract for request documents. Requests are never
/// deleted; analytics depend on the full history.
#[async_trait]
pub trait RequestStore: RequestSearchStore {
    async fn insert_visitor(&self, db: &str, request: VisitorRequest)
        -> Result<(), DomainError>;
    async fn insert_bearer(&self, db: &str, request: BearerRequest) -> Result<(), DomainError>;
    async fn insert_cleaner(&self, db: &str, request: CleanerRequest)
        -> Result<(), DomainError>;

    /// Newest-first listing bounded by an optional request-date range.
    async fn list_visitor(
        &self,
        db: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<VisitorRequest>, DomainError>;
    async fn list_bearer(
        &self,
        db: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<BearerRequest>, DomainError>;
    async fn list_cleaner(
        &self,
        db: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<CleanerRequest>, DomainError>;

    /// Records acceptance of a worked request. `NotFound` when absent.
    async fn assign_request(
        &self,
        db: &str,
        kind: WorkedKind,
        id: Uuid,
        assignee: Assignee,
        on: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Records completion of a worked request. `NotFound` when absent.
    async fn complete_request(
        &self,
        db: &str,
        kind: WorkedKind,
        id: Uuid,
        on: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// The most recently assigned staff member, for round-robin rotation.
    async fn latest_assignee(
        &self,
        db: &str,
        kind: WorkedKind,
    ) -> Result<Option<Uuid>, DomainError>;

    /// Worked requests requested before the cutoff and still open, oldest
    /// first. Open means the completion sentinel is still in place.
    async fn open_bearer_before(
        &self,
        db: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BearerRequest>, DomainError>;
    async fn open_cleaner_before(
        &self,
        db: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CleanerRequest>, DomainError>;
}

/// Module settings persistence, addressed by database and module name.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn module_settings(
        &self,
        db: &str,
        module: &str,
    ) -> Result<Option<ModuleSettings>, DomainError>;

    async fn put_module_settings(
        &self,
        db: &str,
        settings: ModuleSettings,
    ) -> Result<(), DomainError>;
}

/// Registry of provisioned sites.
#[async_trait]
pub trait SiteDirectory: Send + Sync {
    /// Database holding org-wide data: accounts, the site list, org settings.
    fn registry_db(&self) -> &str;

    async fn sites(&self) -> Result<Vec<Site>, DomainError>;

    async fn site_by_id(&self, id: Uuid) -> Result<Option<Site>, DomainError>;
}

//! In-process document store.
//!
//! Collections live under named logical databases, mirroring the deployed
//! store's `(database, collection)` addressing; a database that was never
//! written to reads as empty, the way document stores create namespaces
//! lazily. The engine executes the same typed pipeline descriptors the
//! production driver receives, which makes it the reference implementation
//! for search semantics and the store used by tests and development.
//!
//! Every operation acquires its own scoped lock and releases it on all exit
//! paths; no state is shared between concurrent operations beyond the store
//! itself.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::error::DomainError;
use domain::models::account::{Account, DevicePresence, Presence};
use domain::models::location::{Bed, BedRoster, Floor};
use domain::models::request::{
    Assignee, BearerRequest, CleanerRequest, VisitorRequest, WorkedKind,
};
use domain::models::role::Role;
use domain::models::settings::ModuleSettings;
use domain::models::site::Site;
use domain::search::pipeline::{DateRange, PipelineStage};
use domain::store::{RequestSearchStore, RequestStore, SettingsStore, SiteDirectory};

use crate::eval::run_pipeline;
use crate::metrics::QueryTimer;

/// One logical database: the per-site (or registry) collection set.
#[derive(Debug, Default)]
struct Database {
    visitor_requests: Vec<VisitorRequest>,
    bearer_requests: Vec<BearerRequest>,
    cleaner_requests: Vec<CleanerRequest>,
    module_settings: HashMap<String, ModuleSettings>,
    floors: Vec<Floor>,
    bed_rosters: HashMap<Uuid, BedRoster>,
    roles: Vec<Role>,
    accounts: Vec<Account>,
    sites: Vec<Site>,
}

/// The document store behind all domain ports.
#[derive(Clone)]
pub struct MemoryStore {
    registry_db: String,
    databases: Arc<RwLock<HashMap<String, Database>>>,
}

impl MemoryStore {
    /// Creates a store whose org-wide data lives in `registry_db`.
    pub fn new(registry_db: impl Into<String>) -> Self {
        Self {
            registry_db: registry_db.into(),
            databases: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    async fn read_db<T>(&self, db: &str, f: impl FnOnce(&Database) -> T) -> T {
        let databases = self.databases.read().await;
        match databases.get(db) {
            Some(database) => f(database),
            None => f(&Database::default()),
        }
    }

    async fn write_db<T>(&self, db: &str, f: impl FnOnce(&mut Database) -> T) -> T {
        let mut databases = self.databases.write().await;
        f(databases.entry(db.to_string()).or_default())
    }

    // =========================================================================
    // Accounts (registry database)
    // =========================================================================

    /// Accounts, optionally narrowed by exact email and/or role name.
    pub async fn accounts(&self, email: Option<&str>, role: Option<&str>) -> Vec<Account> {
        let timer = QueryTimer::new("accounts");
        let registry = self.registry_db.clone();
        let result = self
            .read_db(&registry, |database| {
                database
                    .accounts
                    .iter()
                    .filter(|a| email.map_or(true, |e| a.email == e))
                    .filter(|a| role.map_or(true, |r| a.role.name == r))
                    .cloned()
                    .collect()
            })
            .await;
        timer.record();
        result
    }

    pub async fn account(&self, id: Uuid) -> Option<Account> {
        let registry = self.registry_db.clone();
        self.read_db(&registry, |database| {
            database.accounts.iter().find(|a| a.id == id).cloned()
        })
        .await
    }

    /// Inserts or replaces an account by id.
    pub async fn upsert_account(&self, account: Account) {
        let registry = self.registry_db.clone();
        self.write_db(&registry, |database| {
            match database.accounts.iter().position(|a| a.id == account.id) {
                Some(index) => database.accounts[index] = account,
                None => database.accounts.push(account),
            }
        })
        .await;
    }

    pub async fn delete_account(&self, id: Uuid) -> Result<(), DomainError> {
        let registry = self.registry_db.clone();
        self.write_db(&registry, |database| {
            let before = database.accounts.len();
            database.accounts.retain(|a| a.id != id);
            if database.accounts.len() == before {
                Err(DomainError::not_found("account"))
            } else {
                Ok(())
            }
        })
        .await
    }

    pub async fn record_heartbeat(
        &self,
        id: Uuid,
        status: Presence,
        device_status: DevicePresence,
        seen_at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let registry = self.registry_db.clone();
        self.write_db(&registry, |database| {
            let account = database
                .accounts
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| DomainError::not_found("account"))?;
            account.status = status;
            account.device_status = device_status;
            account.last_seen = seen_at;
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Roles
    // =========================================================================

    /// Roles of one database, optionally narrowed by name.
    pub async fn roles(&self, db: &str, name: Option<&str>) -> Vec<Role> {
        self.read_db(db, |database| {
            database
                .roles
                .iter()
                .filter(|r| name.map_or(true, |n| r.name == n))
                .cloned()
                .collect()
        })
        .await
    }

    /// Inserts or replaces a role by id.
    pub async fn put_role(&self, db: &str, role: Role) {
        self.write_db(db, |database| {
            match database.roles.iter().position(|r| r.id == role.id) {
                Some(index) => database.roles[index] = role,
                None => database.roles.push(role),
            }
        })
        .await;
    }

    pub async fn set_service_level(
        &self,
        db: &str,
        group: &str,
        service_level: &str,
    ) -> Result<(), DomainError> {
        self.write_db(db, |database| {
            let role = database
                .roles
                .iter_mut()
                .find(|r| r.name == group)
                .ok_or_else(|| DomainError::not_found("role"))?;
            role.settings.service_level = Some(service_level.to_string());
            Ok(())
        })
        .await
    }

    // =========================================================================
    // Floors and beds
    // =========================================================================

    /// All floors of one database, sorted by label.
    pub async fn floors(&self, db: &str) -> Vec<Floor> {
        let timer = QueryTimer::new("floors");
        let mut floors = self
            .read_db(db, |database| database.floors.clone())
            .await;
        floors.sort_by(|a, b| a.label.cmp(&b.label));
        timer.record();
        floors
    }

    pub async fn floor(&self, db: &str, id: Uuid) -> Option<Floor> {
        self.read_db(db, |database| {
            database.floors.iter().find(|f| f.id == id).cloned()
        })
        .await
    }

    /// Inserts or replaces a floor by id, returning its id.
    pub async fn put_floor(&self, db: &str, floor: Floor) -> Uuid {
        let id = floor.id;
        self.write_db(db, |database| {
            match database.floors.iter().position(|f| f.id == floor.id) {
                Some(index) => database.floors[index] = floor,
                None => database.floors.push(floor),
            }
        })
        .await;
        id
    }

    pub async fn delete_floor(&self, db: &str, id: Uuid) -> Result<(), DomainError> {
        self.write_db(db, |database| {
            let before = database.floors.len();
            database.floors.retain(|f| f.id != id);
            if database.floors.len() == before {
                Err(DomainError::not_found("floor"))
            } else {
                Ok(())
            }
        })
        .await
    }

    pub async fn beds_for_section(&self, db: &str, section_id: Uuid) -> Vec<Bed> {
        self.read_db(db, |database| {
            database
                .bed_rosters
                .get(&section_id)
                .map(|roster| roster.beds.clone())
                .unwrap_or_default()
        })
        .await
    }

    pub async fn put_bed_roster(&self, db: &str, roster: BedRoster) {
        self.write_db(db, |database| {
            database.bed_rosters.insert(roster.section_id, roster);
        })
        .await;
    }

    // =========================================================================
    // Sites (registry database)
    // =========================================================================

    pub async fn add_site(&self, site: Site) {
        let registry = self.registry_db.clone();
        self.write_db(&registry, |database| {
            match database.sites.iter().position(|s| s.id == site.id) {
                Some(index) => database.sites[index] = site,
                None => database.sites.push(site),
            }
        })
        .await;
    }
}

#[async_trait]
impl SiteDirectory for MemoryStore {
    fn registry_db(&self) -> &str {
        &self.registry_db
    }

    async fn sites(&self) -> Result<Vec<Site>, DomainError> {
        let registry = self.registry_db.clone();
        Ok(self
            .read_db(&registry, |database| database.sites.clone())
            .await)
    }

    async fn site_by_id(&self, id: Uuid) -> Result<Option<Site>, DomainError> {
        let registry = self.registry_db.clone();
        Ok(self
            .read_db(&registry, |database| {
                database.sites.iter().find(|s| s.id == id).cloned()
            })
            .await)
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn module_settings(
        &self,
        db: &str,
        module: &str,
    ) -> Result<Option<ModuleSettings>, DomainError> {
        let timer = QueryTimer::new("module_settings");
        let result = self
            .read_db(db, |database| database.module_settings.get(module).cloned())
            .await;
        timer.record();
        Ok(result)
    }

    async fn put_module_settings(
        &self,
        db: &str,
        settings: ModuleSettings,
    ) -> Result<(), DomainError> {
        self.write_db(db, |database| {
            database
                .module_settings
                .insert(settings.module.clone(), settings);
        })
        .await;
        Ok(())
    }
}

#[async_trait]
impl RequestSearchStore for MemoryStore {
    async fn search_visitor(
        &self,
        db: &str,
        pipeline: &[PipelineStage],
    ) -> Result<Vec<VisitorRequest>, DomainError> {
        let timer = QueryTimer::new("search_visitor");
        let result = self
            .read_db(db, |database| {
                run_pipeline(&database.visitor_requests, pipeline)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .await;
        timer.record();
        Ok(result)
    }

    async fn search_bearer(
        &self,
        db: &str,
        pipeline: &[PipelineStage],
    ) -> Result<Vec<BearerRequest>, DomainError> {
        let timer = QueryTimer::new("search_bearer");
        let result = self
            .read_db(db, |database| {
                run_pipeline(&database.bearer_requests, pipeline)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .await;
        timer.record();
        Ok(result)
    }

    async fn search_cleaner(
        &self,
        db: &str,
        pipeline: &[PipelineStage],
    ) -> Result<Vec<CleanerRequest>, DomainError> {
        let timer = QueryTimer::new("search_cleaner");
        let result = self
            .read_db(db, |database| {
                run_pipeline(&database.cleaner_requests, pipeline)
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .await;
        timer.record();
        Ok(result)
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_visitor(&self, db: &str, request: VisitorRequest) -> Result<(), DomainError> {
        self.write_db(db, |database| database.visitor_requests.push(request))
            .await;
        Ok(())
    }

    async fn insert_bearer(&self, db: &str, request: BearerRequest) -> Result<(), DomainError> {
        self.write_db(db, |database| database.bearer_requests.push(request))
            .await;
        Ok(())
    }

    async fn insert_cleaner(&self, db: &str, request: CleanerRequest) -> Result<(), DomainError> {
        self.write_db(db, |database| database.cleaner_requests.push(request))
            .await;
        Ok(())
    }

    async fn list_visitor(
        &self,
        db: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<VisitorRequest>, DomainError> {
        let timer = QueryTimer::new("list_visitor");
        let mut requests = self
            .read_db(db, |database| {
                database
                    .visitor_requests
                    .iter()
                    .filter(|r| range.map_or(true, |range| range.contains(r.requested_on)))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        requests.sort_by(|a, b| b.requested_on.cmp(&a.requested_on));
        timer.record();
        Ok(requests)
    }

    async fn list_bearer(
        &self,
        db: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<BearerRequest>, DomainError> {
        let timer = QueryTimer::new("list_bearer");
        let mut requests = self
            .read_db(db, |database| {
                database
                    .bearer_requests
                    .iter()
                    .filter(|r| range.map_or(true, |range| range.contains(r.requested_on)))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        requests.sort_by(|a, b| b.requested_on.cmp(&a.requested_on));
        timer.record();
        Ok(requests)
    }

    async fn list_cleaner(
        &self,
        db: &str,
        range: Option<&DateRange>,
    ) -> Result<Vec<CleanerRequest>, DomainError> {
        let timer = QueryTimer::new("list_cleaner");
        let mut requests = self
            .read_db(db, |database| {
                database
                    .cleaner_requests
                    .iter()
                    .filter(|r| range.map_or(true, |range| range.contains(r.requested_on)))
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        requests.sort_by(|a, b| b.requested_on.cmp(&a.requested_on));
        timer.record();
        Ok(requests)
    }

    async fn assign_request(
        &self,
        db: &str,
        kind: WorkedKind,
        id: Uuid,
        assignee: Assignee,
        on: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let timer = QueryTimer::new("assign_request");
        let result = self
            .write_db(db, |database| match kind {
                WorkedKind::Bearer => database
                    .bearer_requests
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| DomainError::not_found("bearer request"))?
                    .assign(assignee, on),
                WorkedKind::Cleaner => database
                    .cleaner_requests
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| DomainError::not_found("cleaner request"))?
                    .assign(assignee, on),
            })
            .await;
        timer.record();
        result
    }

    async fn complete_request(
        &self,
        db: &str,
        kind: WorkedKind,
        id: Uuid,
        on: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let timer = QueryTimer::new("complete_request");
        let result = self
            .write_db(db, |database| match kind {
                WorkedKind::Bearer => database
                    .bearer_requests
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| DomainError::not_found("bearer request"))?
                    .complete(on),
                WorkedKind::Cleaner => database
                    .cleaner_requests
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| DomainError::not_found("cleaner request"))?
                    .complete(on),
            })
            .await;
        timer.record();
        result
    }

    async fn latest_assignee(
        &self,
        db: &str,
        kind: WorkedKind,
    ) -> Result<Option<Uuid>, DomainError> {
        let result = self
            .read_db(db, |database| match kind {
                WorkedKind::Bearer => database
                    .bearer_requests
                    .iter()
                    .filter(|r| r.assigned_on.is_some())
                    .max_by_key(|r| r.assigned_on)
                    .and_then(|r| r.assigned.as_ref().map(|a| a.id)),
                WorkedKind::Cleaner => database
                    .cleaner_requests
                    .iter()
                    .filter(|r| r.assigned_on.is_some())
                    .max_by_key(|r| r.assigned_on)
                    .and_then(|r| r.assigned.as_ref().map(|a| a.id)),
            })
            .await;
        Ok(result)
    }

    async fn open_bearer_before(
        &self,
        db: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<BearerRequest>, DomainError> {
        let timer = QueryTimer::new("open_bearer_before");
        let mut requests = self
            .read_db(db, |database| {
                database
                    .bearer_requests
                    .iter()
                    .filter(|r| r.requested_on <= cutoff && r.completed_on.is_none())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        requests.sort_by(|a, b| a.requested_on.cmp(&b.requested_on));
        timer.record();
        Ok(requests)
    }

    async fn open_cleaner_before(
        &self,
        db: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<CleanerRequest>, DomainError> {
        let timer = QueryTimer::new("open_cleaner_before");
        let mut requests = self
            .read_db(db, |database| {
                database
                    .cleaner_requests
                    .iter()
                    .filter(|r| r.requested_on <= cutoff && r.completed_on.is_none())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .await;
        requests.sort_by(|a, b| a.requested_on.cmp(&b.requested_on));
        timer.record();
        Ok(requests)
    }
}

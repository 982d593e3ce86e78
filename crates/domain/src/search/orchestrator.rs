//! Cross-collection search orchestration and multi-site fan-out.
//!
//! One engine serves both modes: a single-site search is the multi-site
//! machinery with one fixed site. Per-kind queries run concurrently and join;
//! a failing sub-query fails the whole operation — a partial event feed would
//! mislead downstream analytics.

use std::sync::Arc;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::models::event::RequestEvent;
use crate::models::location::LocationScope;
use crate::models::request::RequestKind;
use crate::models::site::Site;
use crate::store::RequestSearchStore;

use super::filter::OptionFilter;
use super::pipeline::{build_pipeline, DateRange};

/// Which request kinds a search covers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindSelection {
    #[serde(default)]
    pub visitor: bool,
    #[serde(default)]
    pub bearer: bool,
    #[serde(default)]
    pub cleaner: bool,
}

impl KindSelection {
    pub fn all() -> Self {
        Self {
            visitor: true,
            bearer: true,
            cleaner: true,
        }
    }

    pub fn any(&self) -> bool {
        self.visitor || self.bearer || self.cleaner
    }
}

/// Per-kind filter option sets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KindFilters {
    #[serde(default)]
    pub visitor: Vec<OptionFilter>,
    #[serde(default)]
    pub bearer: Vec<OptionFilter>,
    #[serde(default)]
    pub cleaner: Vec<OptionFilter>,
}

/// One search request, against one site or fanned out across many.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub scope: Option<LocationScope>,
    pub range: Option<DateRange>,
    pub kinds: KindSelection,
    pub filters: KindFilters,
}

/// One site's event feed within a multi-site search. Feeds are ordered within
/// a site; sites keep the caller-supplied order and are never merged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSearchResults {
    pub site: Site,
    pub events: Vec<RequestEvent>,
}

/// Executes request searches against the store.
#[derive(Clone)]
pub struct SearchEngine {
    store: Arc<dyn RequestSearchStore>,
}

impl SearchEngine {
    pub fn new(store: Arc<dyn RequestSearchStore>) -> Self {
        Self { store }
    }

    /// Runs the selected per-kind searches concurrently against one site and
    /// merges the normalized results into one feed, most recent first.
    pub async fn search(
        &self,
        site: &Site,
        query: &SearchQuery,
    ) -> Result<Vec<RequestEvent>, DomainError> {
        self.search_in_db(&site.db, query, query.scope).await
    }

    /// Runs the orchestrated search once per site, fully concurrently, one
    /// result list per site in input order. Location scope is suppressed:
    /// bed/section/floor identifiers are site-local and meaningless across
    /// site boundaries.
    pub async fn search_across_sites(
        &self,
        sites: &[Site],
        query: &SearchQuery,
    ) -> Result<Vec<SiteSearchResults>, DomainError> {
        if sites.is_empty() {
            return Err(DomainError::validation(
                "multi-site search requires at least one site",
            ));
        }

        let searches = sites.iter().map(|site| async move {
            let events = self.search_in_db(&site.db, query, None).await?;
            Ok(SiteSearchResults {
                site: site.clone(),
                events,
            })
        });
        try_join_all(searches).await
    }

    async fn search_in_db(
        &self,
        db: &str,
        query: &SearchQuery,
        scope: Option<LocationScope>,
    ) -> Result<Vec<RequestEvent>, DomainError> {
        let (visitors, bearers, cleaners) = tokio::try_join!(
            self.visitor_events(db, query, scope),
            self.bearer_events(db, query, scope),
            self.cleaner_events(db, query, scope),
        )?;

        let mut events = visitors;
        events.extend(bearers);
        events.extend(cleaners);
        // most recent first; ids break timestamp ties so feeds are reproducible
        events.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    async fn visitor_events(
        &self,
        db: &str,
        query: &SearchQuery,
        scope: Option<LocationScope>,
    ) -> Result<Vec<RequestEvent>, DomainError> {
        if !query.kinds.visitor {
            return Ok(Vec::new());
        }
        let pipeline = build_pipeline(
            RequestKind::Visitor,
            &query.filters.visitor,
            scope,
            query.range.as_ref(),
        );
        let requests = self
            .store
            .search_visitor(db, &pipeline)
            .await
            .map_err(|e| DomainError::aggregation(format!("visitor search in {db}"), e))?;
        Ok(requests.iter().map(RequestEvent::from_visitor).collect())
    }

    async fn bearer_events(
        &self,
        db: &str,
        query: &SearchQuery,
        scope: Option<LocationScope>,
    ) -> Result<Vec<RequestEvent>, DomainError> {
        if !query.kinds.bearer {
            return Ok(Vec::new());
        }
        let pipeline = build_pipeline(
            RequestKind::Bearer,
            &query.filters.bearer,
            scope,
            query.range.as_ref(),
        );
        let requests = self
            .store
            .search_bearer(db, &pipeline)
            .await
            .map_err(|e| DomainError::aggregation(format!("bearer search in {db}"), e))?;
        Ok(requests.iter().map(RequestEvent::from_bearer).collect())
    }

    async fn cleaner_events(
        &self,
        db: &str,
        query: &SearchQuery,
        scope: Option<LocationScope>,
    ) -> Result<Vec<RequestEvent>, DomainError> {
        if !query.kinds.cleaner {
            return Ok(Vec::new());
        }
        let pipeline = build_pipeline(
            RequestKind::Cleaner,
            &query.filters.cleaner,
            scope,
            query.range.as_ref(),
        );
        let requests = self
            .store
            .search_cleaner(db, &pipeline)
            .await
            .map_err(|e| DomainError::aggregation(format!("cleaner search in {db}"), e))?;
        Ok(requests.iter().map(RequestEvent::from_cleaner).collect())
    }
}

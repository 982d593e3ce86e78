//! Cross-collection search endpoints.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use domain::models::event::RequestEvent;
use domain::models::location::LocationScope;
use domain::search::{
    KindFilters, KindSelection, OptionFilter, SearchQuery, SiteSearchResults,
};
use domain::search::pipeline::DateRange;
use domain::store::SiteDirectory;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SiteContext;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestBody {
    #[serde(default)]
    pub floor_id: Option<Uuid>,
    #[serde(default)]
    pub section_id: Option<Uuid>,
    #[serde(default)]
    pub bed_id: Option<Uuid>,
    pub from_date: DateTime<Utc>,
    pub to_date: DateTime<Utc>,
    #[serde(default)]
    pub search_visitor: bool,
    #[serde(default)]
    pub search_bearer: bool,
    #[serde(default)]
    pub search_cleaner: bool,
    #[serde(default)]
    pub visitor_options: Vec<OptionFilter>,
    #[serde(default)]
    pub bearer_options: Vec<OptionFilter>,
    #[serde(default)]
    pub cleaner_options: Vec<OptionFilter>,
}

impl SearchRequestBody {
    fn into_query(self) -> Result<SearchQuery, ApiError> {
        Ok(SearchQuery {
            scope: LocationScope::from_ids(self.bed_id, self.section_id, self.floor_id),
            range: Some(DateRange::new(self.from_date, self.to_date)?),
            kinds: KindSelection {
                visitor: self.search_visitor,
                bearer: self.search_bearer,
                cleaner: self.search_cleaner,
            },
            filters: KindFilters {
                visitor: self.visitor_options,
                bearer: self.bearer_options,
                cleaner: self.cleaner_options,
            },
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiSiteSearchBody {
    pub site_ids: Vec<Uuid>,
    #[serde(flatten)]
    pub search: SearchRequestBody,
}

/// POST /api/v1/requests/search — one site, one merged feed.
pub async fn search(
    State(state): State<AppState>,
    site: SiteContext,
    Json(body): Json<SearchRequestBody>,
) -> Result<Json<Vec<RequestEvent>>, ApiError> {
    let query = body.into_query()?;
    let events = state.search.search(&site.site, &query).await?;
    Ok(Json(events))
}

/// POST /api/v1/requests/search/sites — fan out across named sites.
///
/// Every named site must exist; the site list must not be empty. Results come
/// back per site, in the order given, never merged across sites.
pub async fn search_across_sites(
    State(state): State<AppState>,
    Json(body): Json<MultiSiteSearchBody>,
) -> Result<Json<Vec<SiteSearchResults>>, ApiError> {
    if body.site_ids.is_empty() {
        return Err(ApiError::Validation("siteIds must not be empty".to_string()));
    }

    let mut sites = Vec::with_capacity(body.site_ids.len());
    for id in &body.site_ids {
        let site = state
            .store
            .site_by_id(*id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("site {id}")))?;
        sites.push(site);
    }

    let query = body.search.into_query()?;
    let results = state.search.search_across_sites(&sites, &query).await?;
    Ok(Json(results))
}

//! Site (tenant) selection extractor.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use domain::models::site::Site;
use domain::store::SiteDirectory;

use crate::app::AppState;
use crate::error::ApiError;

/// Header naming the site database a request addresses.
pub const SITE_HEADER: &str = "x-site";

/// The site a request operates on.
///
/// An absent header falls back to the registry database itself — the
/// single-tenant deployment mode, where one organization runs without
/// provisioned sub-sites. A named site must exist in the registry.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site: Site,
}

impl SiteContext {
    pub fn db(&self) -> &str {
        &self.site.db
    }
}

#[async_trait]
impl FromRequestParts<AppState> for SiteContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(SITE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let site = match header {
            None => Site {
                id: Uuid::nil(),
                db: state.store.registry_db().to_string(),
                label: "default".to_string(),
            },
            Some(db) => state
                .store
                .sites()
                .await?
                .into_iter()
                .find(|site| site.db == db)
                .ok_or_else(|| ApiError::NotFound(format!("site {db}")))?,
        };

        Ok(SiteContext { site })
    }
}

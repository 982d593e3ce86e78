//! Role ("group") endpoint handlers.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use domain::models::role::{Role, ServiceLevelUpdate};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SiteContext;

#[derive(Debug, Deserialize)]
pub struct ListRolesQuery {
    pub name: Option<String>,
}

/// GET /api/v1/roles
pub async fn list_roles(
    State(state): State<AppState>,
    site: SiteContext,
    Query(query): Query<ListRolesQuery>,
) -> Result<Json<Vec<Role>>, ApiError> {
    let name = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    Ok(Json(state.store.roles(site.db(), name).await))
}

/// PUT /api/v1/roles — insert or replace a role by id.
pub async fn put_role(
    State(state): State<AppState>,
    site: SiteContext,
    Json(role): Json<Role>,
) -> Result<(), ApiError> {
    state.store.put_role(site.db(), role).await;
    Ok(())
}

/// PUT /api/v1/roles/service-level — update the turnaround target of a role.
pub async fn set_service_level(
    State(state): State<AppState>,
    site: SiteContext,
    Json(update): Json<ServiceLevelUpdate>,
) -> Result<(), ApiError> {
    state
        .store
        .set_service_level(site.db(), &update.for_group, &update.service_level)
        .await?;
    Ok(())
}

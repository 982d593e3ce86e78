//! Floor plan endpoint handlers: floors, sections, bed rosters.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::models::location::{Bed, BedRoster, Floor, Section};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SiteContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertFloorRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub label: String,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub label: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedResponse {
    pub inserted_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutBedsRequest {
    #[serde(default)]
    pub beds: Vec<BedInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedInput {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub label: String,
}

/// GET /api/v1/floors — all floors of the site, sorted by label.
pub async fn list_floors(
    State(state): State<AppState>,
    site: SiteContext,
) -> Result<Json<Vec<Floor>>, ApiError> {
    Ok(Json(state.store.floors(site.db()).await))
}

/// GET /api/v1/floors/:id
pub async fn get_floor(
    State(state): State<AppState>,
    site: SiteContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Floor>, ApiError> {
    state
        .store
        .floor(site.db(), id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("floor {id}")))
}

/// PUT /api/v1/floors — create (no id) or replace a floor.
pub async fn put_floor(
    State(state): State<AppState>,
    site: SiteContext,
    Json(request): Json<UpsertFloorRequest>,
) -> Result<Json<InsertedResponse>, ApiError> {
    let floor_id = request.id.unwrap_or_else(Uuid::new_v4);
    let floor = Floor {
        id: floor_id,
        label: request.label,
        sections: request
            .sections
            .into_iter()
            .map(|section| Section {
                id: section.id.unwrap_or_else(Uuid::new_v4),
                label: section.label,
                floor_id,
            })
            .collect(),
    };
    let inserted_id = state.store.put_floor(site.db(), floor).await;
    Ok(Json(InsertedResponse { inserted_id }))
}

/// DELETE /api/v1/floors/:id
///
/// Requests referencing the floor keep their denormalized snapshots.
pub async fn delete_floor(
    State(state): State<AppState>,
    site: SiteContext,
    Path(id): Path<Uuid>,
) -> Result<(), ApiError> {
    state.store.delete_floor(site.db(), id).await?;
    Ok(())
}

/// GET /api/v1/sections/:id/beds
pub async fn section_beds(
    State(state): State<AppState>,
    site: SiteContext,
    Path(section_id): Path<Uuid>,
) -> Result<Json<Vec<Bed>>, ApiError> {
    Ok(Json(state.store.beds_for_section(site.db(), section_id).await))
}

/// PUT /api/v1/sections/:id/beds — replace a section's bed roster.
pub async fn put_section_beds(
    State(state): State<AppState>,
    site: SiteContext,
    Path(section_id): Path<Uuid>,
    Json(request): Json<PutBedsRequest>,
) -> Result<(), ApiError> {
    let roster = BedRoster {
        section_id,
        beds: request
            .beds
            .into_iter()
            .map(|bed| Bed {
                id: bed.id.unwrap_or_else(Uuid::new_v4),
                label: bed.label,
            })
            .collect(),
    };
    state.store.put_bed_roster(site.db(), roster).await;
    Ok(())
}

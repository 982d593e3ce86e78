//! Module settings endpoint handlers.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use domain::models::settings::{
    typed_view, ModuleSettings, PropertyDefinition, ResolvedModuleSettings, VisitorSettings,
};
use domain::services::resolve_module_settings;
use domain::store::{SettingsStore, SiteDirectory};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::SiteContext;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutSettingsRequest {
    #[serde(default)]
    pub settings: HashMap<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskSettingsResponse {
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskKeyResponse {
    /// Returned exactly once; only its hash is stored.
    pub key: String,
}

/// GET /api/v1/settings/:module — both levels, tagged, unmerged.
pub async fn get_settings(
    State(state): State<AppState>,
    site: SiteContext,
    Path(module): Path<String>,
) -> Result<Json<ResolvedModuleSettings>, ApiError> {
    let resolved = resolve_module_settings(
        state.store.as_ref(),
        state.store.registry_db(),
        site.db(),
        &module,
    )
    .await?;
    Ok(Json(resolved))
}

/// PUT /api/v1/settings/:module — replace the site-level document.
pub async fn put_settings(
    State(state): State<AppState>,
    site: SiteContext,
    Path(module): Path<String>,
    Json(request): Json<PutSettingsRequest>,
) -> Result<(), ApiError> {
    state
        .store
        .put_module_settings(
            site.db(),
            ModuleSettings {
                module,
                settings: request.settings,
            },
        )
        .await?;
    Ok(())
}

/// GET /api/v1/visitor/settings — the check-in question schema for kiosks.
///
/// Returns the concatenated org+site property list only; the kiosk key hash
/// never leaves the server.
pub async fn visitor_kiosk_settings(
    State(state): State<AppState>,
    site: SiteContext,
) -> Result<Json<KioskSettingsResponse>, ApiError> {
    let resolved = resolve_module_settings(
        state.store.as_ref(),
        state.store.registry_db(),
        site.db(),
        "visitor",
    )
    .await?;
    Ok(Json(KioskSettingsResponse {
        properties: resolved.request_properties(),
    }))
}

/// POST /api/v1/visitor/settings/kiosk-key — rotate the site's kiosk key.
///
/// The plaintext key is returned exactly once; the stored site-level visitor
/// settings keep only its hash.
pub async fn rotate_kiosk_key(
    State(state): State<AppState>,
    site: SiteContext,
) -> Result<Json<KioskKeyResponse>, ApiError> {
    let key = shared::crypto::generate_kiosk_key();
    let hash = shared::crypto::sha256_hex(&key);

    let mut settings = state
        .store
        .module_settings(site.db(), "visitor")
        .await?
        .map(|doc| doc.settings)
        .unwrap_or_default();
    settings.insert("apikey".to_string(), Value::String(hash));

    state
        .store
        .put_module_settings(
            site.db(),
            ModuleSettings {
                module: "visitor".to_string(),
                settings,
            },
        )
        .await?;

    info!(site = %site.site.label, "kiosk key rotated");
    Ok(Json(KioskKeyResponse { key }))
}

/// The site's effective kiosk key hash, if one is configured.
pub async fn kiosk_key_hash(
    state: &AppState,
    site: &SiteContext,
) -> Result<Option<String>, ApiError> {
    let resolved = resolve_module_settings(
        state.store.as_ref(),
        state.store.registry_db(),
        site.db(),
        "visitor",
    )
    .await?;
    let visitor: VisitorSettings = typed_view(&resolved.merged());
    Ok(visitor
        .api_key_hash
        .and_then(|hash| shared::validation::trimmed(&hash).map(str::to_string)))
}

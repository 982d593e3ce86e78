//! Settings resolution across organization and site levels.

use crate::error::DomainError;
use crate::models::settings::{LeveledSettings, ResolvedModuleSettings, SettingsLevel};
use crate::store::SettingsStore;

/// Fetches both settings levels for a module concurrently and returns them
/// tagged, without flattening — callers merge differently (plain override vs.
/// property concatenation).
///
/// A level whose module document is absent resolves to an empty settings map
/// so partially provisioned sites keep working; store failures propagate.
pub async fn resolve_module_settings(
    store: &dyn SettingsStore,
    registry_db: &str,
    site_db: &str,
    module: &str,
) -> Result<ResolvedModuleSettings, DomainError> {
    let (org, site) = tokio::try_join!(
        store.module_settings(registry_db, module),
        store.module_settings(site_db, module),
    )?;

    Ok(ResolvedModuleSettings {
        module: module.to_string(),
        org: LeveledSettings {
            level: SettingsLevel::Org,
            settings: org.map(|doc| doc.settings).unwrap_or_default(),
        },
        site: LeveledSettings {
            level: SettingsLevel::Site,
            settings: site.map(|doc| doc.settings).unwrap_or_default(),
        },
    })
}

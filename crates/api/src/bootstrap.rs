//! Registry bootstrap.
//!
//! Seeds the registry database with the default role set and org-wide module
//! settings, and provisions any sites named in configuration. Existing
//! documents are left untouched, so booting is idempotent.

use tracing::info;
use uuid::Uuid;

use domain::error::DomainError;
use domain::models::defaults::{default_module_settings, default_roles};
use domain::models::site::Site;
use domain::store::{SettingsStore, SiteDirectory};
use persistence::MemoryStore;

use crate::config::Config;

pub async fn seed(store: &MemoryStore, config: &Config) -> Result<(), DomainError> {
    let registry = store.registry_db().to_string();

    seed_database(store, &registry).await?;

    let existing = store.sites().await?;
    for seed_site in &config.store.sites {
        if existing.iter().any(|site| site.db == seed_site.db) {
            continue;
        }
        info!(db = %seed_site.db, label = %seed_site.label, "provisioning site");
        store
            .add_site(Site {
                id: Uuid::new_v4(),
                db: seed_site.db.clone(),
                label: seed_site.label.clone(),
            })
            .await;
        seed_database(store, &seed_site.db).await?;
    }

    Ok(())
}

async fn seed_database(store: &MemoryStore, db: &str) -> Result<(), DomainError> {
    for settings in default_module_settings() {
        if store.module_settings(db, &settings.module).await?.is_none() {
            store.put_module_settings(db, settings).await?;
        }
    }

    if store.roles(db, None).await.is_empty() {
        for role in default_roles() {
            store.put_role(db, role).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let config = Config::load_for_test(&[]).unwrap();
        let store = MemoryStore::new(config.store.registry_db.clone());

        seed(&store, &config).await.unwrap();
        let registry = store.registry_db().to_string();
        let roles_after_first = store.roles(&registry, None).await.len();
        assert_eq!(roles_after_first, 7);

        seed(&store, &config).await.unwrap();
        assert_eq!(store.roles(&registry, None).await.len(), roles_after_first);

        let bearer = store.module_settings(&registry, "bearer").await.unwrap();
        assert!(bearer.is_some());
    }

    #[tokio::test]
    async fn test_seed_provisions_configured_sites() {
        let mut config = Config::load_for_test(&[]).unwrap();
        config.store.sites = vec![crate::config::SeedSite {
            db: "ward-north".to_string(),
            label: "North wing".to_string(),
        }];
        let store = MemoryStore::new(config.store.registry_db.clone());

        seed(&store, &config).await.unwrap();

        let sites = store.sites().await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].db, "ward-north");
        assert!(store
            .module_settings("ward-north", "visitor")
            .await
            .unwrap()
            .is_some());
        assert_eq!(store.roles("ward-north", None).await.len(), 7);
    }
}

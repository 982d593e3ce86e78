//! Site (tenant) models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One organization's isolated data partition.
///
/// The registry database holds the site list plus org-wide defaults; each
/// site's own requests, locations and settings live in `db`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: Uuid,
    pub db: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_serde() {
        let site = Site {
            id: Uuid::new_v4(),
            db: "hospital-north".into(),
            label: "Hôpital Nord".into(),
        };
        let json = serde_json::to_string(&site).unwrap();
        let back: Site = serde_json::from_str(&json).unwrap();
        assert_eq!(back, site);
    }
}

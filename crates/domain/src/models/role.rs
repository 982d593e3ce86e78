//! Staff role ("group") models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A staff role with its per-module settings.
///
/// Protected roles ship with the system and cannot be deleted; hidden roles
/// (organization administrators) do not appear in site dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub settings: RoleSettings,
}

/// Settings attached to a role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSettings {
    /// Permission bit mask controlling dashboard features.
    #[serde(default)]
    pub options: i64,
    /// Target turnaround for worked requests, `HH:MM:SS`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<String>,
}

/// Payload updating the service level of a named role.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLevelUpdate {
    pub for_group: String,
    pub service_level: String,
}

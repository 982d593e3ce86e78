//! Staff account models.
//!
//! Credentials live with the external identity provider; accounts only carry
//! the provider subject (`external_id`) plus profile and presence data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Staff presence reported by heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
    Busy,
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Presence::Online => write!(f, "online"),
            Presence::Offline => write!(f, "offline"),
            Presence::Busy => write!(f, "busy"),
        }
    }
}

/// State of the staff member's mobile device, as last reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePresence {
    #[default]
    Unknown,
    Foreground,
    Background,
}

/// Reference to the account's role ("group").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub name: String,
    pub label: String,
}

/// A staff account stored in the registry database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    /// Identity-provider subject for this account.
    pub external_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: RoleRef,
    pub email: String,
    pub phone: String,
    pub status: Presence,
    #[serde(default)]
    pub device_status: DevicePresence,
    pub last_seen: DateTime<Utc>,
}

impl Account {
    pub fn display_label(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Create/update payload for an account. `id` absent means create, in which
/// case a temporary password is forwarded to the identity provider.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertAccountRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(min = 1))]
    pub first_name: String,
    #[validate(length(min = 1))]
    pub last_name: String,
    pub role: RoleRef,
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub phone: String,
    #[serde(default)]
    pub temporary_password: Option<String>,
}

/// Presence heartbeat from a staff device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub account_id: Uuid,
    pub status: Presence,
    #[serde(default)]
    pub device_status: DevicePresence,
    pub seen_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::{FirstName, LastName};
    use fake::Fake;

    fn account() -> Account {
        Account {
            id: Uuid::new_v4(),
            external_id: "idp|12345".into(),
            first_name: FirstName().fake(),
            last_name: LastName().fake(),
            role: RoleRef {
                name: "bearer".into(),
                label: "Bearer".into(),
            },
            email: SafeEmail().fake(),
            phone: "(514)555-0199".into(),
            status: Presence::Online,
            device_status: DevicePresence::Unknown,
            last_seen: Utc::now(),
        }
    }

    #[test]
    fn test_display_label() {
        let mut acct = account();
        acct.first_name = "Alex".into();
        acct.last_name = "Tremblay".into();
        assert_eq!(acct.display_label(), "Alex Tremblay");
    }

    #[test]
    fn test_account_serde_round_trip() {
        let acct = account();
        let json = serde_json::to_string(&acct).unwrap();
        let back: Account = serde_json::from_str(&json).unwrap();
        assert_eq!(back, acct);
    }

    #[test]
    fn test_upsert_request_validation() {
        let valid: UpsertAccountRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Alex",
            "lastName": "Tremblay",
            "role": {"name": "bearer", "label": "Bearer"},
            "email": "alex@example.org",
            "phone": "(514)555-0199"
        }))
        .unwrap();
        assert!(valid.validate().is_ok());
        assert!(valid.id.is_none());

        let bad_phone: UpsertAccountRequest = serde_json::from_value(serde_json::json!({
            "firstName": "Alex",
            "lastName": "Tremblay",
            "role": {"name": "bearer", "label": "Bearer"},
            "email": "alex@example.org",
            "phone": "555-0199"
        }))
        .unwrap();
        assert!(bad_phone.validate().is_err());
    }

    #[test]
    fn test_heartbeat_defaults_device_status() {
        let hb: HeartbeatRequest = serde_json::from_value(serde_json::json!({
            "accountId": Uuid::new_v4(),
            "status": "online",
            "seenAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(hb.device_status, DevicePresence::Unknown);
        assert_eq!(hb.status, Presence::Online);
    }
}

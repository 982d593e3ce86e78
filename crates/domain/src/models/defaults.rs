//! Seed documents for newly provisioned databases.
//!
//! The registry database receives the org-wide versions of these on first
//! boot; a freshly provisioned site starts from the same set.

use std::collections::HashMap;

use serde_json::{json, Value};
use uuid::Uuid;

use super::role::{Role, RoleSettings};
use super::settings::ModuleSettings;

/// The protected role set every deployment ships with.
pub fn default_roles() -> Vec<Role> {
    let role = |name: &str, label: &str, options: i64, hidden: bool| Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
        label: label.to_string(),
        protected: true,
        hidden,
        settings: RoleSettings {
            options,
            service_level: None,
        },
    };

    vec![
        role("user", "User", 39_184, false),
        role("bearer", "Bearer", 770, false),
        role("cleaner", "Cleaner", 12_290, false),
        role("admin", "Site administrator", 16_768_477, false),
        role("management", "Manager", 200_988, false),
        role("coordinator", "Coordinator", 69_908, false),
        role("sysadmin", "Organization administrator", 16_777_216, true),
    ]
}

/// Default settings documents for the four modules.
pub fn default_module_settings() -> Vec<ModuleSettings> {
    vec![
        ModuleSettings {
            module: "bearer".to_string(),
            settings: worked_module_defaults("00:45:00"),
        },
        ModuleSettings {
            module: "cleaner".to_string(),
            settings: worked_module_defaults("00:30:00"),
        },
        ModuleSettings {
            module: "visitor".to_string(),
            settings: settings_map(json!({
                "request": {"properties": []},
                "apikey": ""
            })),
        },
        ModuleSettings {
            module: "config".to_string(),
            settings: settings_map(json!({
                "licence": "",
                "notif": {"bearer": "", "cleaner": ""}
            })),
        },
    ]
}

fn worked_module_defaults(service_level: &str) -> HashMap<String, Value> {
    settings_map(json!({
        "request": {"properties": []},
        "algos": [
            {
                "id": "round-robin",
                "name": "Round-Robin",
                "label": "Round-Robin",
                "description": "Requests are assigned directly to the next available staff member matching the request conditions."
            },
            {
                "id": "notify-accept",
                "name": "Notify-Accept",
                "label": "Notify-Accept",
                "description": "All staff members matching the request conditions are notified; the first to accept takes the request."
            }
        ],
        "selectedAlgo": "Notify-Accept",
        "useShifts": true,
        "shifts": [
            {"id": "night", "from": "00:00", "to": "08:00"},
            {"id": "day", "from": "08:00", "to": "16:00"},
            {"id": "evening", "from": "16:00", "to": "00:00"}
        ],
        "useSectors": true,
        "serviceLevel": service_level
    }))
}

fn settings_map(value: Value) -> HashMap<String, Value> {
    match value {
        Value::Object(map) => map.into_iter().collect(),
        _ => HashMap::new(),
    }
}

//! Module settings stored per organization and per site.
//!
//! Settings documents are keyed by module name (`bearer`, `cleaner`,
//! `visitor`, `config`) and exist at two levels: organization-wide in the
//! registry database and site-specific in each tenant database. The resolver
//! returns both levels tagged; merge semantics live here because different
//! callers merge differently.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::request::{OptionKind, RequestKind};

/// Module settings document, keyed by module name within one database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSettings {
    pub module: String,
    #[serde(default)]
    pub settings: HashMap<String, Value>,
}

/// Which level a settings document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingsLevel {
    Org,
    Site,
}

impl std::fmt::Display for SettingsLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsLevel::Org => write!(f, "org"),
            SettingsLevel::Site => write!(f, "site"),
        }
    }
}

/// One level of settings for a module, tagged with its origin. A level whose
/// document is absent carries an empty map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeveledSettings {
    pub level: SettingsLevel,
    pub settings: HashMap<String, Value>,
}

/// Both levels for one module, as returned by the settings resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedModuleSettings {
    pub module: String,
    pub org: LeveledSettings,
    pub site: LeveledSettings,
}

impl ResolvedModuleSettings {
    /// Flattened view: site keys override org keys, except the request
    /// property schema which concatenates (see [`merge_module_settings`]).
    pub fn merged(&self) -> HashMap<String, Value> {
        merge_module_settings(&self.org.settings, &self.site.settings)
    }

    /// Org-then-site concatenation of the request property schema. An
    /// org-wide question and a site-specific question both appear.
    pub fn request_properties(&self) -> Vec<PropertyDefinition> {
        let mut properties = parse_properties(&self.org.settings);
        properties.extend(parse_properties(&self.site.settings));
        properties
    }
}

/// Merges one module's settings maps: site-level keys override same-named
/// org-level keys, except `request.properties` where the two levels'
/// definition lists are concatenated (org first, then site).
pub fn merge_module_settings(
    org: &HashMap<String, Value>,
    site: &HashMap<String, Value>,
) -> HashMap<String, Value> {
    let mut merged = org.clone();
    for (key, value) in site {
        if key == "request" {
            merged.insert(key.clone(), merge_request_section(org.get(key), value));
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn merge_request_section(org_request: Option<&Value>, site_request: &Value) -> Value {
    let org_props = org_request
        .and_then(|v| v.get("properties"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let site_props = site_request
        .get("properties")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let mut merged = site_request.clone();
    if let Value::Object(map) = &mut merged {
        let mut properties = org_props;
        properties.extend(site_props);
        map.insert("properties".to_string(), Value::Array(properties));
    }
    merged
}

fn parse_properties(settings: &HashMap<String, Value>) -> Vec<PropertyDefinition> {
    settings
        .get("request")
        .and_then(|v| v.get("properties"))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    serde_json::from_value(entry.clone())
                        .map_err(|err| {
                            tracing::warn!(%err, "skipping malformed request property definition");
                        })
                        .ok()
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Definition of one configured request question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default)]
    pub multi: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ListItem>,
}

/// Selectable entry of a static-list question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub label: String,
}

/// Deserializes a typed view over a (merged) settings map. Missing keys take
/// their defaults; a malformed map logs and falls back to defaults.
pub fn typed_view<T: DeserializeOwned + Default>(settings: &HashMap<String, Value>) -> T {
    let object = Value::Object(settings.clone().into_iter().collect());
    match serde_json::from_value(object) {
        Ok(view) => view,
        Err(err) => {
            tracing::warn!(%err, "malformed module settings, using defaults");
            T::default()
        }
    }
}

/// Assignment configuration of a worked module (bearer/cleaner).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentSettings {
    #[serde(default)]
    pub algos: Vec<AlgoDescriptor>,
    #[serde(default)]
    pub selected_algo: Option<String>,
    #[serde(default)]
    pub use_shifts: bool,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub use_sectors: bool,
    #[serde(default)]
    pub service_level: Option<String>,
}

/// One selectable assignment algorithm, as shown in the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgoDescriptor {
    pub id: String,
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// A staffed shift window, `HH:MM` bounds; windows may wrap midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub from: String,
    pub to: String,
}

/// Notification topics from the `config` module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default)]
    pub notif: NotificationTopics,
}

/// Per-kind notification topics; empty strings count as unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationTopics {
    #[serde(default)]
    pub bearer: Option<String>,
    #[serde(default)]
    pub cleaner: Option<String>,
}

impl NotificationSettings {
    pub fn topic_for(&self, kind: RequestKind) -> Option<&str> {
        let topic = match kind {
            RequestKind::Bearer => self.notif.bearer.as_deref(),
            RequestKind::Cleaner => self.notif.cleaner.as_deref(),
            RequestKind::Visitor => None,
        };
        topic.and_then(shared::validation::trimmed)
    }
}

/// Visitor module view: kiosk API key hash alongside the request schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorSettings {
    #[serde(default, rename = "apikey")]
    pub api_key_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_site_overrides_org_keys() {
        let org = map(json!({"selectedAlgo": "Round-Robin", "useShifts": true}));
        let site = map(json!({"selectedAlgo": "Notify-Accept"}));
        let merged = merge_module_settings(&org, &site);
        assert_eq!(merged["selectedAlgo"], json!("Notify-Accept"));
        assert_eq!(merged["useShifts"], json!(true));
    }

    #[test]
    fn test_request_properties_concatenate_org_first() {
        let org = map(json!({
            "request": {"properties": [
                {"id": "q1", "label": "Isolation", "type": "boolean"}
            ]}
        }));
        let site = map(json!({
            "request": {"properties": [
                {"id": "q2", "label": "Oxygen", "type": "boolean"}
            ]}
        }));
        let merged = merge_module_settings(&org, &site);
        let props = merged["request"]["properties"].as_array().unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0]["id"], "q1");
        assert_eq!(props[1]["id"], "q2");
    }

    #[test]
    fn test_org_request_survives_when_site_has_none() {
        let org = map(json!({"request": {"properties": [
            {"id": "q1", "label": "Isolation", "type": "boolean"}
        ]}}));
        let site = map(json!({}));
        let merged = merge_module_settings(&org, &site);
        assert_eq!(
            merged["request"]["properties"].as_array().unwrap().len(),
            1
        );
    }

    #[test]
    fn test_resolved_request_properties() {
        let resolved = ResolvedModuleSettings {
            module: "visitor".into(),
            org: LeveledSettings {
                level: SettingsLevel::Org,
                settings: map(json!({"request": {"properties": [
                    {"id": "q1", "label": "Visitor name", "type": "string", "entity": "name"}
                ]}})),
            },
            site: LeveledSettings {
                level: SettingsLevel::Site,
                settings: map(json!({"request": {"properties": [
                    {"id": "q2", "label": "Relationship", "type": "static-list", "multi": true}
                ]}})),
            },
        };
        let props = resolved.request_properties();
        assert_eq!(props.len(), 2);
        assert_eq!(props[0].id, "q1");
        assert_eq!(props[0].entity.as_deref(), Some("name"));
        assert_eq!(props[1].kind, OptionKind::StaticList);
        assert!(props[1].multi);
    }

    #[test]
    fn test_malformed_property_is_skipped() {
        let settings = map(json!({"request": {"properties": [
            {"id": "q1", "label": "Ok", "type": "string"},
            {"label": "missing id and type"}
        ]}}));
        let resolved = ResolvedModuleSettings {
            module: "bearer".into(),
            org: LeveledSettings {
                level: SettingsLevel::Org,
                settings,
            },
            site: LeveledSettings {
                level: SettingsLevel::Site,
                settings: HashMap::new(),
            },
        };
        assert_eq!(resolved.request_properties().len(), 1);
    }

    #[test]
    fn test_typed_assignment_view() {
        let settings = map(json!({
            "algos": [{"id": "a1", "name": "Round-Robin", "label": "Round-Robin"}],
            "selectedAlgo": "Round-Robin",
            "useShifts": true,
            "shifts": [{"id": "s1", "from": "08:00", "to": "16:00"}],
            "serviceLevel": "00:45:00"
        }));
        let view: AssignmentSettings = typed_view(&settings);
        assert_eq!(view.selected_algo.as_deref(), Some("Round-Robin"));
        assert!(view.use_shifts);
        assert_eq!(view.shifts.len(), 1);
        assert_eq!(view.service_level.as_deref(), Some("00:45:00"));
    }

    #[test]
    fn test_notification_topic_resolution() {
        let settings: NotificationSettings = typed_view(&map(json!({
            "notif": {"bearer": "arn:topic:bearer", "cleaner": "  "}
        })));
        assert_eq!(
            settings.topic_for(RequestKind::Bearer),
            Some("arn:topic:bearer")
        );
        // blank topics count as unconfigured
        assert_eq!(settings.topic_for(RequestKind::Cleaner), None);
        assert_eq!(settings.topic_for(RequestKind::Visitor), None);
    }
}

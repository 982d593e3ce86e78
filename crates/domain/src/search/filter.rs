//! Typed search filter criteria ("options") supplied by callers.

use serde::{Deserialize, Serialize};

use shared::validation::{trimmed, FORMATTED_PHONE_LEN};

use crate::models::request::SelectionValue;

use super::pipeline::ValueMatch;

/// Entity marker selecting fuzzy text search for string options.
pub const NAME_ENTITY: &str = "name";

/// One filter criterion against a configured request option.
///
/// Closed over the option types a request schema can define; every variant
/// carries the identifier of the option it filters on. How a criterion turns
/// into pipeline stages depends on the variant:
///
/// - string options on the `name` entity become fuzzy full-text clauses
/// - multi static-lists require the stored set to contain every selected value
/// - telephone filters only apply once the value is a full formatted number
/// - criteria with an empty trimmed value are skipped entirely
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum OptionFilter {
    String {
        option_id: String,
        #[serde(default)]
        entity: Option<String>,
        value: String,
    },
    Numeric {
        option_id: String,
        value: String,
    },
    StaticList {
        option_id: String,
        #[serde(default)]
        multi: bool,
        value: SelectionValue,
    },
    Telephone {
        option_id: String,
        value: String,
    },
    Boolean {
        option_id: String,
        value: String,
    },
    Email {
        option_id: String,
        value: String,
    },
}

impl OptionFilter {
    pub fn option_id(&self) -> &str {
        match self {
            OptionFilter::String { option_id, .. }
            | OptionFilter::Numeric { option_id, .. }
            | OptionFilter::StaticList { option_id, .. }
            | OptionFilter::Telephone { option_id, .. }
            | OptionFilter::Boolean { option_id, .. }
            | OptionFilter::Email { option_id, .. } => option_id,
        }
    }

    /// The fuzzy text query this criterion contributes, if any.
    pub fn as_fuzzy_text(&self) -> Option<&str> {
        match self {
            OptionFilter::String {
                entity: Some(entity),
                value,
                ..
            } if entity == NAME_ENTITY => trimmed(value),
            _ => None,
        }
    }

    /// The exact-match this criterion contributes, applying the per-type
    /// guards. `None` means the criterion emits no stage.
    pub fn as_exact_match(&self) -> Option<ValueMatch> {
        match self {
            OptionFilter::String { entity, value, .. } => {
                if entity.as_deref() == Some(NAME_ENTITY) {
                    None
                } else {
                    trimmed(value).map(|v| ValueMatch::Equals(v.to_string()))
                }
            }
            OptionFilter::Numeric { value, .. }
            | OptionFilter::Boolean { value, .. }
            | OptionFilter::Email { value, .. } => {
                trimmed(value).map(|v| ValueMatch::Equals(v.to_string()))
            }
            OptionFilter::Telephone { value, .. } => {
                let value = value.trim();
                (value.len() == FORMATTED_PHONE_LEN)
                    .then(|| ValueMatch::Equals(value.to_string()))
            }
            OptionFilter::StaticList { multi, value, .. } => match value {
                SelectionValue::Many(values) if !values.is_empty() => {
                    Some(ValueMatch::ContainsAll(values.clone()))
                }
                SelectionValue::Many(_) => None,
                SelectionValue::One(v) => {
                    let v = trimmed(v)?;
                    if *multi {
                        Some(ValueMatch::ContainsAll(vec![v.to_string()]))
                    } else {
                        Some(ValueMatch::Equals(v.to_string()))
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_wire_format() {
        let filter: OptionFilter = serde_json::from_value(json!({
            "type": "string",
            "optionId": "visitor-name",
            "entity": "name",
            "value": "Tremblay"
        }))
        .unwrap();
        assert_eq!(filter.option_id(), "visitor-name");
        assert_eq!(filter.as_fuzzy_text(), Some("Tremblay"));
        assert_eq!(filter.as_exact_match(), None);
    }

    #[test]
    fn test_plain_string_is_exact() {
        let filter: OptionFilter = serde_json::from_value(json!({
            "type": "string",
            "optionId": "room-note",
            "value": "isolation"
        }))
        .unwrap();
        assert_eq!(filter.as_fuzzy_text(), None);
        assert_eq!(
            filter.as_exact_match(),
            Some(ValueMatch::Equals("isolation".into()))
        );
    }

    #[test]
    fn test_empty_value_skipped() {
        let filter: OptionFilter = serde_json::from_value(json!({
            "type": "numeric",
            "optionId": "age",
            "value": "   "
        }))
        .unwrap();
        assert_eq!(filter.as_fuzzy_text(), None);
        assert_eq!(filter.as_exact_match(), None);
    }

    #[test]
    fn test_telephone_length_guard() {
        let partial: OptionFilter = serde_json::from_value(json!({
            "type": "telephone",
            "optionId": "callback",
            "value": "(514)555-019"
        }))
        .unwrap();
        assert_eq!(partial.as_exact_match(), None);

        let complete: OptionFilter = serde_json::from_value(json!({
            "type": "telephone",
            "optionId": "callback",
            "value": "(514)555-0199"
        }))
        .unwrap();
        assert_eq!(
            complete.as_exact_match(),
            Some(ValueMatch::Equals("(514)555-0199".into()))
        );
    }

    #[test]
    fn test_static_list_multi_requires_all() {
        let filter: OptionFilter = serde_json::from_value(json!({
            "type": "static-list",
            "optionId": "equipment",
            "multi": true,
            "value": ["iv-pole", "oxygen"]
        }))
        .unwrap();
        assert_eq!(
            filter.as_exact_match(),
            Some(ValueMatch::ContainsAll(vec![
                "iv-pole".into(),
                "oxygen".into()
            ]))
        );
    }

    #[test]
    fn test_static_list_single_is_exact() {
        let filter: OptionFilter = serde_json::from_value(json!({
            "type": "static-list",
            "optionId": "priority",
            "value": "urgent"
        }))
        .unwrap();
        assert_eq!(
            filter.as_exact_match(),
            Some(ValueMatch::Equals("urgent".into()))
        );
    }

    #[test]
    fn test_blank_fuzzy_text_skipped() {
        let filter: OptionFilter = serde_json::from_value(json!({
            "type": "string",
            "optionId": "visitor-name",
            "entity": "name",
            "value": "  "
        }))
        .unwrap();
        assert_eq!(filter.as_fuzzy_text(), None);
        assert_eq!(filter.as_exact_match(), None);
    }
}

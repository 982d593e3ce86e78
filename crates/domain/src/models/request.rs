//! Service request models: bearer transport, cleaning, and visitor check-in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

use super::location::LocationRef;

/// The three request workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Bearer,
    Cleaner,
    Visitor,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Bearer => "bearer",
            RequestKind::Cleaner => "cleaner",
            RequestKind::Visitor => "visitor",
        }
    }
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The two worked request kinds, which carry an assignment lifecycle.
/// Visits are informational and never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkedKind {
    Bearer,
    Cleaner,
}

impl From<WorkedKind> for RequestKind {
    fn from(kind: WorkedKind) -> Self {
        match kind {
            WorkedKind::Bearer => RequestKind::Bearer,
            WorkedKind::Cleaner => RequestKind::Cleaner,
        }
    }
}

/// Data type of a configured request option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    String,
    Numeric,
    StaticList,
    Telephone,
    Boolean,
    Email,
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionKind::String => write!(f, "string"),
            OptionKind::Numeric => write!(f, "numeric"),
            OptionKind::StaticList => write!(f, "static-list"),
            OptionKind::Telephone => write!(f, "telephone"),
            OptionKind::Boolean => write!(f, "boolean"),
            OptionKind::Email => write!(f, "email"),
        }
    }
}

/// Canonical match key(s) stored with an answered option.
///
/// Multi-valued static lists store the full selected set; everything else
/// stores a single key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    One(String),
    Many(Vec<String>),
}

impl SelectionValue {
    pub fn contains(&self, value: &str) -> bool {
        match self {
            SelectionValue::One(v) => v == value,
            SelectionValue::Many(vs) => vs.iter().any(|v| v == value),
        }
    }

    /// True when every given value is present in the stored set.
    pub fn contains_all(&self, values: &[String]) -> bool {
        values.iter().all(|v| self.contains(v))
    }
}

/// A typed, schema-defined answer attached to a request.
///
/// Option identity correlates to the per-site request schema in module
/// settings; the store itself does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOption {
    pub option_id: String,
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_id: Option<SelectionValue>,
    #[serde(rename = "type")]
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default)]
    pub multi: bool,
}

/// Staff member a request was assigned to (denormalized snapshot).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    pub id: Uuid,
    pub label: String,
}

/// Serde adapter for the epoch-zero "not yet occurred" sentinel.
///
/// Stored documents carry `1970-01-01T00:00:00Z` where no assignment or
/// completion has happened; internally that is `None`. Round trips preserve
/// the stored byte form, and the sentinel sorts before any real date.
pub mod sentinel_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.unwrap_or(DateTime::<Utc>::UNIX_EPOCH).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = DateTime::<Utc>::deserialize(deserializer)?;
        if raw == DateTime::<Utc>::UNIX_EPOCH {
            Ok(None)
        } else {
            Ok(Some(raw))
        }
    }
}

/// A patient transport request between two locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerRequest {
    pub id: Uuid,
    pub from: LocationRef,
    pub to: LocationRef,
    #[serde(default)]
    pub options: Vec<RequestOption>,
    #[serde(default)]
    pub assigned: Option<Assignee>,
    pub requested_on: DateTime<Utc>,
    #[serde(with = "sentinel_date")]
    pub assigned_on: Option<DateTime<Utc>>,
    #[serde(with = "sentinel_date")]
    pub completed_on: Option<DateTime<Utc>>,
}

impl BearerRequest {
    pub fn new(
        from: LocationRef,
        to: LocationRef,
        options: Vec<RequestOption>,
        requested_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            to,
            options,
            assigned: None,
            requested_on,
            assigned_on: None,
            completed_on: None,
        }
    }

    /// Accept the request for a staff member. Happens at most once, and never
    /// after completion.
    pub fn assign(&mut self, assignee: Assignee, on: DateTime<Utc>) -> Result<(), DomainError> {
        transition_assign(
            &mut self.assigned,
            &mut self.assigned_on,
            self.completed_on,
            assignee,
            on,
        )
    }

    /// Mark the transport done. Happens at most once.
    pub fn complete(&mut self, on: DateTime<Utc>) -> Result<(), DomainError> {
        transition_complete(&mut self.completed_on, on)
    }

    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }
}

/// A cleaning request for a single location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanerRequest {
    pub id: Uuid,
    pub from: LocationRef,
    #[serde(default)]
    pub options: Vec<RequestOption>,
    #[serde(default)]
    pub assigned: Option<Assignee>,
    pub requested_on: DateTime<Utc>,
    #[serde(with = "sentinel_date")]
    pub assigned_on: Option<DateTime<Utc>>,
    #[serde(with = "sentinel_date")]
    pub completed_on: Option<DateTime<Utc>>,
}

impl CleanerRequest {
    pub fn new(
        from: LocationRef,
        options: Vec<RequestOption>,
        requested_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            from,
            options,
            assigned: None,
            requested_on,
            assigned_on: None,
            completed_on: None,
        }
    }

    pub fn assign(&mut self, assignee: Assignee, on: DateTime<Utc>) -> Result<(), DomainError> {
        transition_assign(
            &mut self.assigned,
            &mut self.assigned_on,
            self.completed_on,
            assignee,
            on,
        )
    }

    pub fn complete(&mut self, on: DateTime<Utc>) -> Result<(), DomainError> {
        transition_complete(&mut self.completed_on, on)
    }

    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }
}

/// A visitor check-in for a bed. Informational: never assigned or completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRequest {
    pub id: Uuid,
    pub request_for: LocationRef,
    #[serde(default)]
    pub options: Vec<RequestOption>,
    pub requested_on: DateTime<Utc>,
}

impl VisitorRequest {
    pub fn new(
        request_for: LocationRef,
        options: Vec<RequestOption>,
        requested_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            request_for,
            options,
            requested_on,
        }
    }
}

fn transition_assign(
    assigned: &mut Option<Assignee>,
    assigned_on: &mut Option<DateTime<Utc>>,
    completed_on: Option<DateTime<Utc>>,
    assignee: Assignee,
    on: DateTime<Utc>,
) -> Result<(), DomainError> {
    if completed_on.is_some() {
        return Err(DomainError::validation("request is already completed"));
    }
    if assigned.is_some() {
        return Err(DomainError::validation("request is already assigned"));
    }
    *assigned = Some(assignee);
    *assigned_on = Some(on);
    Ok(())
}

fn transition_complete(
    completed_on: &mut Option<DateTime<Utc>>,
    on: DateTime<Utc>,
) -> Result<(), DomainError> {
    if completed_on.is_some() {
        return Err(DomainError::validation("request is already completed"));
    }
    *completed_on = Some(on);
    Ok(())
}

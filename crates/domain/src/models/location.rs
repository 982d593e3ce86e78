//! Physical location models: floors, sections, beds, and the denormalized
//! references embedded in requests.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of physical location a request can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    Bed,
    Section,
    Floor,
}

impl std::fmt::Display for LocationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationKind::Bed => write!(f, "bed"),
            LocationKind::Section => write!(f, "section"),
            LocationKind::Floor => write!(f, "floor"),
        }
    }
}

/// Section back-reference carried by bed location references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRef {
    pub id: Uuid,
    pub floor_id: Uuid,
}

/// Denormalized location snapshot taken at request-creation time.
///
/// Beds carry their parent section (and through it the floor); sections carry
/// their floor. The snapshot is never updated when the floor plan changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationRef {
    pub id: Uuid,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor_id: Option<Uuid>,
}

impl LocationRef {
    pub fn bed(id: Uuid, label: impl Into<String>, section: SectionRef) -> Self {
        Self {
            id,
            label: label.into(),
            kind: LocationKind::Bed,
            section: Some(section),
            floor_id: None,
        }
    }

    pub fn section(id: Uuid, label: impl Into<String>, floor_id: Uuid) -> Self {
        Self {
            id,
            label: label.into(),
            kind: LocationKind::Section,
            section: None,
            floor_id: Some(floor_id),
        }
    }

    pub fn floor(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            kind: LocationKind::Floor,
            section: None,
            floor_id: None,
        }
    }

    /// Whether this reference falls inside the given scope.
    ///
    /// A bed is inside its own id, its section's scope and its floor's scope;
    /// a section is inside its own id and its floor's scope; a floor only
    /// inside its own id.
    pub fn in_scope(&self, scope: &LocationScope) -> bool {
        match scope {
            LocationScope::Bed(id) => self.kind == LocationKind::Bed && self.id == *id,
            LocationScope::Section(id) => match self.kind {
                LocationKind::Bed => self.section.as_ref().is_some_and(|s| s.id == *id),
                LocationKind::Section => self.id == *id,
                LocationKind::Floor => false,
            },
            LocationScope::Floor(id) => match self.kind {
                LocationKind::Bed => self.section.as_ref().is_some_and(|s| s.floor_id == *id),
                LocationKind::Section => self.floor_id == Some(*id),
                LocationKind::Floor => self.id == *id,
            },
        }
    }
}

/// Location constraint narrowing a search to a physical area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationScope {
    Bed(Uuid),
    Section(Uuid),
    Floor(Uuid),
}

impl LocationScope {
    /// Builds the most specific scope from optional identifiers: a bed beats
    /// a section beats a floor.
    pub fn from_ids(bed: Option<Uuid>, section: Option<Uuid>, floor: Option<Uuid>) -> Option<Self> {
        bed.map(LocationScope::Bed)
            .or(section.map(LocationScope::Section))
            .or(floor.map(LocationScope::Floor))
    }
}

/// A floor with its sections, as stored in the `floors` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub id: Uuid,
    pub label: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// A section belonging to a floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: Uuid,
    pub label: String,
    pub floor_id: Uuid,
}

/// A single bed within a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    pub id: Uuid,
    pub label: String,
}

/// Bed roster for one section, as stored in the `beds` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedRoster {
    pub section_id: Uuid,
    #[serde(default)]
    pub beds: Vec<Bed>,
}

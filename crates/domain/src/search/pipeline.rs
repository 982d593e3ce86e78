//! Search pipeline construction.
//!
//! A pipeline is an ordered sequence of typed stage descriptors the document
//! store executes against one request collection. Full-text engines require
//! their stage first, so a text stage — when present — always opens the
//! pipeline; the date-range bound is always the final stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::models::location::{LocationRef, LocationScope};
use crate::models::request::{
    BearerRequest, CleanerRequest, RequestKind, RequestOption, VisitorRequest,
};

use super::filter::OptionFilter;

/// Lifecycle timestamp a range stage bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    RequestedOn,
    CompletedOn,
}

/// Inclusive timestamp window bounding a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self, DomainError> {
        if from > to {
            return Err(DomainError::validation("date range is inverted"));
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, when: DateTime<Utc>) -> bool {
        self.from <= when && when <= self.to
    }
}

/// One fuzzy text condition over stored option values.
#[derive(Debug, Clone, PartialEq)]
pub struct TextClause {
    pub query: String,
}

/// How an exact-match stage compares against the stored selection.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueMatch {
    /// The stored value equals (or, for sets, contains) the given key.
    Equals(String),
    /// The stored value set contains every given key, not merely intersects.
    ContainsAll(Vec<String>),
}

/// Location field of a request document tested by a scope stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTarget {
    From,
    To,
    RequestFor,
}

/// One stage of a search pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    /// Full-text stage over option values; all clauses must match. Always
    /// the first stage when present.
    TextSearch { clauses: Vec<TextClause> },
    /// Exact match against a stored option's identifier and resolved value.
    MatchOption {
        option_id: String,
        value: ValueMatch,
    },
    /// Location-scope stage: the document matches when any target location
    /// falls inside the scope.
    MatchScope {
        targets: Vec<ScopeTarget>,
        scope: LocationScope,
    },
    /// Inclusive bound on the kind's lifecycle date; always the final stage.
    DateRange { field: DateField, range: DateRange },
}

/// Location fields the scope stage tests per kind: a transport touches the
/// scope through either endpoint, a cleaning through its single location, a
/// visit through the visited bed.
fn scope_targets(kind: RequestKind) -> Vec<ScopeTarget> {
    match kind {
        RequestKind::Bearer => vec![ScopeTarget::From, ScopeTarget::To],
        RequestKind::Cleaner => vec![ScopeTarget::From],
        RequestKind::Visitor => vec![ScopeTarget::RequestFor],
    }
}

/// Lifecycle date the final range stage bounds: visits by request time,
/// worked requests by completion time.
fn range_field(kind: RequestKind) -> DateField {
    match kind {
        RequestKind::Visitor => DateField::RequestedOn,
        RequestKind::Bearer | RequestKind::Cleaner => DateField::CompletedOn,
    }
}

/// Builds the ordered stage sequence for one request collection.
///
/// With neither scope nor range the pipeline returns every document matching
/// the option criteria; callers are expected to supply a range in practice.
pub fn build_pipeline(
    kind: RequestKind,
    filters: &[OptionFilter],
    scope: Option<LocationScope>,
    range: Option<&DateRange>,
) -> Vec<PipelineStage> {
    let mut stages = Vec::new();

    let clauses: Vec<TextClause> = filters
        .iter()
        .filter_map(|f| f.as_fuzzy_text())
        .map(|query| TextClause {
            query: query.to_string(),
        })
        .collect();
    if !clauses.is_empty() {
        stages.push(PipelineStage::TextSearch { clauses });
    }

    for filter in filters {
        if let Some(value) = filter.as_exact_match() {
            stages.push(PipelineStage::MatchOption {
                option_id: filter.option_id().to_string(),
                value,
            });
        }
    }

    if let Some(scope) = scope {
        stages.push(PipelineStage::MatchScope {
            targets: scope_targets(kind),
            scope,
        });
    }

    if let Some(range) = range {
        stages.push(PipelineStage::DateRange {
            field: range_field(kind),
            range: range.clone(),
        });
    }

    stages
}

/// Store-side view of a request document, used to evaluate pipeline stages.
pub trait RequestDocument {
    fn doc_id(&self) -> Uuid;
    fn doc_options(&self) -> &[RequestOption];
    fn location(&self, target: ScopeTarget) -> Option<&LocationRef>;
    /// `None` stands for the persisted epoch-zero sentinel and therefore
    /// never satisfies a concrete range.
    fn lifecycle_date(&self, field: DateField) -> Option<DateTime<Utc>>;
}

impl RequestDocument for BearerRequest {
    fn doc_id(&self) -> Uuid {
        self.id
    }

    fn doc_options(&self) -> &[RequestOption] {
        &self.options
    }

    fn location(&self, target: ScopeTarget) -> Option<&LocationRef> {
        match target {
            ScopeTarget::From => Some(&self.from),
            ScopeTarget::To => Some(&self.to),
            ScopeTarget::RequestFor => None,
        }
    }

    fn lifecycle_date(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::RequestedOn => Some(self.requested_on),
            DateField::CompletedOn => self.completed_on,
        }
    }
}

impl RequestDocument for CleanerRequest {
    fn doc_id(&self) -> Uuid {
        self.id
    }

    fn doc_options(&self) -> &[RequestOption] {
        &self.options
    }

    fn location(&self, target: ScopeTarget) -> Option<&LocationRef> {
        match target {
            ScopeTarget::From => Some(&self.from),
            ScopeTarget::To | ScopeTarget::RequestFor => None,
        }
    }

    fn lifecycle_date(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::RequestedOn => Some(self.requested_on),
            DateField::CompletedOn => self.completed_on,
        }
    }
}

impl RequestDocument for VisitorRequest {
    fn doc_id(&self) -> Uuid {
        self.id
    }

    fn doc_options(&self) -> &[RequestOption] {
        &self.options
    }

    fn location(&self, target: ScopeTarget) -> Option<&LocationRef> {
        match target {
            ScopeTarget::RequestFor => Some(&self.request_for),
            ScopeTarget::From | ScopeTarget::To => None,
        }
    }

    fn lifecycle_date(&self, field: DateField) -> Option<DateTime<Utc>> {
        match field {
            DateField::RequestedOn => Some(self.requested_on),
            // visits have no completion lifecycle
            DateField::CompletedOn => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn filter(value: serde_json::Value) -> OptionFilter {
        serde_json::from_value(value).unwrap()
    }

    fn name_filter(query: &str) -> OptionFilter {
        filter(json!({
            "type": "string",
            "optionId": "visitor-name",
            "entity": "name",
            "value": query
        }))
    }

    fn range() -> DateRange {
        DateRange::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = DateRange::new(
            Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_no_fuzzy_filters_no_text_stage() {
        let filters = [filter(json!({
            "type": "numeric",
            "optionId": "age",
            "value": "42"
        }))];
        let stages = build_pipeline(RequestKind::Visitor, &filters, None, Some(&range()));
        assert!(!stages
            .iter()
            .any(|s| matches!(s, PipelineStage::TextSearch { .. })));
    }

    #[test]
    fn test_two_fuzzy_filters_one_compound_stage() {
        let filters = [name_filter("Alex"), name_filter("Tremblay")];
        let stages = build_pipeline(RequestKind::Visitor, &filters, None, Some(&range()));

        let text_stages: Vec<_> = stages
            .iter()
            .filter(|s| matches!(s, PipelineStage::TextSearch { .. }))
            .collect();
        assert_eq!(text_stages.len(), 1);
        match text_stages[0] {
            PipelineStage::TextSearch { clauses } => assert_eq!(clauses.len(), 2),
            _ => unreachable!(),
        }
        // positional contract: text first
        assert!(matches!(stages[0], PipelineStage::TextSearch { .. }));
    }

    #[test]
    fn test_date_range_is_final_stage() {
        let filters = [
            name_filter("Alex"),
            filter(json!({
                "type": "boolean",
                "optionId": "wheelchair",
                "value": "yes"
            })),
        ];
        let scope = LocationScope::Floor(Uuid::new_v4());
        let stages = build_pipeline(RequestKind::Bearer, &filters, Some(scope), Some(&range()));

        assert_eq!(stages.len(), 4);
        assert!(matches!(stages[0], PipelineStage::TextSearch { .. }));
        assert!(matches!(stages[1], PipelineStage::MatchOption { .. }));
        assert!(matches!(stages[2], PipelineStage::MatchScope { .. }));
        assert!(matches!(
            stages[3],
            PipelineStage::DateRange {
                field: DateField::CompletedOn,
                ..
            }
        ));
    }

    #[test]
    fn test_visitor_bounds_requested_on() {
        let stages = build_pipeline(RequestKind::Visitor, &[], None, Some(&range()));
        assert!(matches!(
            stages.as_slice(),
            [PipelineStage::DateRange {
                field: DateField::RequestedOn,
                ..
            }]
        ));
    }

    #[test]
    fn test_scope_targets_per_kind() {
        let scope = LocationScope::Section(Uuid::new_v4());
        for (kind, expected) in [
            (
                RequestKind::Bearer,
                vec![ScopeTarget::From, ScopeTarget::To],
            ),
            (RequestKind::Cleaner, vec![ScopeTarget::From]),
            (RequestKind::Visitor, vec![ScopeTarget::RequestFor]),
        ] {
            let stages = build_pipeline(kind, &[], Some(scope), None);
            match &stages[0] {
                PipelineStage::MatchScope { targets, .. } => assert_eq!(*targets, expected),
                other => panic!("unexpected stage {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_query_returns_empty_pipeline() {
        let stages = build_pipeline(RequestKind::Cleaner, &[], None, None);
        assert!(stages.is_empty());
    }

    #[test]
    fn test_skipped_filters_emit_no_stage() {
        let filters = [
            filter(json!({
                "type": "telephone",
                "optionId": "callback",
                "value": "(514)555-019"
            })),
            filter(json!({
                "type": "string",
                "optionId": "note",
                "value": ""
            })),
        ];
        let stages = build_pipeline(RequestKind::Cleaner, &filters, None, None);
        assert!(stages.is_empty());
    }
}

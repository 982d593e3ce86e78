//! Pipeline evaluation against stored documents.
//!
//! Stages are conjunctive: a document survives the pipeline when every stage
//! matches. Text stages use case-insensitive substring matching over option
//! display values, standing in for the deployed engine's fuzzy text index.

use domain::models::request::RequestOption;
use domain::search::pipeline::{PipelineStage, RequestDocument, ValueMatch};

/// Runs a built pipeline over a collection, preserving document order.
pub(crate) fn run_pipeline<'a, D: RequestDocument>(
    docs: &'a [D],
    pipeline: &[PipelineStage],
) -> Vec<&'a D> {
    docs.iter()
        .filter(|doc| pipeline.iter().all(|stage| matches_stage(*doc, stage)))
        .collect()
}

fn matches_stage<D: RequestDocument>(doc: &D, stage: &PipelineStage) -> bool {
    match stage {
        PipelineStage::TextSearch { clauses } => clauses
            .iter()
            .all(|clause| text_matches(doc.doc_options(), &clause.query)),
        PipelineStage::MatchOption { option_id, value } => doc
            .doc_options()
            .iter()
            .any(|option| option.option_id == *option_id && value_matches(option, value)),
        PipelineStage::MatchScope { targets, scope } => targets
            .iter()
            .filter_map(|target| doc.location(*target))
            .any(|location| location.in_scope(scope)),
        // an absent lifecycle date is the persisted sentinel and never
        // satisfies a concrete range
        PipelineStage::DateRange { field, range } => doc
            .lifecycle_date(*field)
            .is_some_and(|date| range.contains(date)),
    }
}

fn text_matches(options: &[RequestOption], query: &str) -> bool {
    let query = query.to_lowercase();
    options
        .iter()
        .any(|option| option.value.to_lowercase().contains(&query))
}

fn value_matches(option: &RequestOption, value: &ValueMatch) -> bool {
    let Some(stored) = &option.value_id else {
        return false;
    };
    match value {
        ValueMatch::Equals(v) => stored.contains(v),
        ValueMatch::ContainsAll(vs) => stored.contains_all(vs),
    }
}

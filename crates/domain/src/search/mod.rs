//! The search core: typed filters, pipeline construction, cross-collection
//! orchestration and multi-site fan-out.

pub mod filter;
pub mod orchestrator;
pub mod pipeline;

pub use filter::OptionFilter;
pub use orchestrator::{KindFilters, KindSelection, SearchEngine, SearchQuery, SiteSearchResults};
pub use pipeline::{
    build_pipeline, DateField, DateRange, PipelineStage, RequestDocument, ScopeTarget, TextClause,
    ValueMatch,
};

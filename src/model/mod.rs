//! Core data model: `Document`, `StructuredQuery`, `FilterExpr`, and the
//! per-conversation `PipelineState` threaded through the engine.

pub mod document;
pub mod query;
pub mod state;

pub use document::{Document, MetaValue, Source};
pub use query::{CollectionConfig, Comparison, FilterExpr, GradeVerdict, Op, StructuredQuery, NO_FILTER};
pub use state::{CancelFlag, PipelineState, DEFAULT_BUDGET};

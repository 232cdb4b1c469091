//! Grading stages: relevance (per-document), answer (addresses-question),
//! and grounding (is-supported-by-evidence).

pub mod answer;
pub mod grounding;
pub mod relevance;

pub use answer::AnswerGrader;
pub use grounding::GroundingGrader;
pub use relevance::RelevanceGrader;

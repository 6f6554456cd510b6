//! Data models for epigraph-ai
//!
//! - Feature Set produced by the extraction engine
//! - Classification labels produced by the rule tables
//! - Validated query accepted by the HTTP layer
//! - Pipeline state machine and the stage events it emits

pub mod classification;
pub mod feature_set;
pub mod pipeline_state;
pub mod query;
pub mod stage_event;

pub use classification::{ClassificationResult, GenreLabel, PeriodLabel};
pub use feature_set::{ContentType, DomainCategory, DomainHit, FeatureSet, SourceLanguage};
pub use pipeline_state::{PipelineState, StateTransition};
pub use query::{InputKind, ValidatedQuery};
pub use stage_event::StageEvent;

//! Bulk spreadsheet import pipeline
//!
//! Raw rows flow through header mapping, optional asset grouping, and
//! validation before a bulk-create call; see [`pipeline::ImportPipeline`]
//! for the orchestration.

pub mod export;
pub mod grouper;
pub mod mapper;
pub mod parser;
pub mod pipeline;
pub mod validator;

pub use grouper::{AssetGroup, Conflict, GroupingResult, GroupingSummary, Peripheral};
pub use mapper::{CanonicalRow, HeaderMapping, MappingValidation};
pub use parser::{ParseError, ParsedFile, RawRow};
pub use pipeline::{
    ImportPipeline, ImportPreview, ImportReport, ImportStage, ImportStrategy, PipelineError,
    PipelineOutcome, ReviewDecision, ReviewPrompt,
};
pub use validator::{RowErrors, ValidationError, ValidationSummary};

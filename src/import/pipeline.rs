//! Import orchestrator - sequences the pipeline stages with optional
//! human-in-the-loop reviews
//!
//! A clean file glides through without interrupting the user: the header
//! and grouping reviews are entered only when their trigger conditions
//! hold. Cancelling any review resets the whole pipeline to `Upload` and
//! discards all intermediate state. Grouping and validation structures are
//! rebuilt from scratch on every run, never updated incrementally.

use chrono::{DateTime, Utc};
use thiserror::Error;
use ulid::Ulid;

use crate::api::types::{AssetPayload, BulkCreateResponse, NewOptionsReport};
use crate::api::{ApiError, InventoryApi};
use crate::import::grouper::{
    group_assets, needs_grouping, transform_for_backend, AssetGroup, Conflict, GroupingSummary,
};
use crate::import::mapper::{
    map_headers, needs_review, transform_data, validate_mapping, HeaderMapping, MappingValidation,
};
use crate::import::parser::ParsedFile;
use crate::import::validator::{summarize, validate_data, ValidationError, ValidationSummary};

/// Pipeline stages, in order. The two review stages are conditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStage {
    Upload,
    HeaderReview,
    GroupingReview,
    PreviewValidate,
    Confirm,
    Execute,
    Done,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImportStage::Upload => "upload",
            ImportStage::HeaderReview => "header review",
            ImportStage::GroupingReview => "grouping review",
            ImportStage::PreviewValidate => "preview",
            ImportStage::Confirm => "confirm",
            ImportStage::Execute => "execute",
            ImportStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// User-selectable submission strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStrategy {
    /// Submit only rows that passed validation
    ValidOnly,
    /// Submit everything; the server skips invalid records
    AttemptAll,
    /// Submit everything; only offered when no row is invalid
    All,
}

impl ImportStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            ImportStrategy::ValidOnly => "Import valid rows only",
            ImportStrategy::AttemptAll => "Attempt all rows (server skips invalid)",
            ImportStrategy::All => "Import all rows",
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            ImportStrategy::ValidOnly => "valid_only",
            ImportStrategy::AttemptAll => "attempt_all",
            ImportStrategy::All => "all",
        }
    }
}

/// Answer from a review stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    Accept,
    Cancel,
}

/// Everything the confirm step shows before the user commits.
#[derive(Debug, Clone)]
pub struct ImportPreview {
    pub summary: ValidationSummary,
    pub new_options: Option<NewOptionsReport>,
    pub grouped: bool,
    pub asset_count: usize,
}

impl ImportPreview {
    /// Strategies offered for this dataset. `All` appears only when every
    /// record is valid.
    pub fn available_strategies(&self) -> Vec<ImportStrategy> {
        let mut strategies = vec![ImportStrategy::ValidOnly, ImportStrategy::AttemptAll];
        if self.summary.is_clean() {
            strategies.push(ImportStrategy::All);
        }
        strategies
    }
}

/// Human-in-the-loop seam. The CLI implements this with dialoguer prompts;
/// tests use scripted answers.
pub trait ReviewPrompt {
    /// Review (and optionally correct) the header mapping. Returning
    /// `Accept` while required fields are still missing re-enters the
    /// review; structural problems block until corrected or cancelled.
    fn review_headers(
        &mut self,
        mapping: &mut HeaderMapping,
        validation: &MappingValidation,
    ) -> ReviewDecision;

    /// Review the grouping outcome before it replaces the raw rows.
    fn review_grouping(
        &mut self,
        summary: &GroupingSummary,
        conflicts: &[Conflict],
    ) -> ReviewDecision;

    /// Final confirmation; `None` cancels the import.
    fn confirm_import(&mut self, preview: &ImportPreview) -> Option<ImportStrategy>;
}

/// Result report of an executed import.
#[derive(Debug, Clone)]
pub struct ImportReport {
    pub run_id: Ulid,
    pub submitted: usize,
    pub imported: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
    pub warnings: Vec<String>,
    /// The backend rejected the batch as already present; reported as a
    /// soft success with zero imports
    pub soft_duplicate: bool,
    pub finished_at: DateTime<Utc>,
}

impl ImportReport {
    fn from_response(run_id: Ulid, submitted: usize, response: BulkCreateResponse) -> Self {
        ImportReport {
            run_id,
            submitted,
            imported: response.imported,
            duplicates: response.duplicates,
            skipped: response.skipped,
            failed: response.failed,
            warnings: response.warnings,
            soft_duplicate: false,
            finished_at: Utc::now(),
        }
    }

    fn soft_duplicate(run_id: Ulid, submitted: usize, message: String) -> Self {
        ImportReport {
            run_id,
            submitted,
            imported: 0,
            duplicates: submitted,
            skipped: 0,
            failed: 0,
            warnings: vec![message],
            soft_duplicate: true,
            finished_at: Utc::now(),
        }
    }
}

/// How a pipeline run ended.
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    /// A review was cancelled; all intermediate state was discarded
    Cancelled(ImportStage),
    /// `dry_run` stopped the pipeline before execution
    DryRun {
        summary: ValidationSummary,
        asset_count: usize,
        grouped: bool,
    },
    Completed(ImportReport),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Nothing to import: the file has no data rows")]
    EmptyFile,

    #[error("An import is already in progress")]
    AlreadyRunning,

    #[error("'Import all' requires a fully valid dataset ({invalid} invalid row(s))")]
    StrategyUnavailable { invalid: usize },

    #[error("No valid rows to import")]
    NoValidRows,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// One import run. All state is rebuilt per uploaded file and discarded on
/// cancel; nothing persists between attempts.
pub struct ImportPipeline {
    run_id: Ulid,
    stage: ImportStage,
    threshold: f64,
    file: Option<ParsedFile>,
    mapping: Option<HeaderMapping>,
    grouped: bool,
    groups: Vec<AssetGroup>,
    conflicts: Vec<Conflict>,
    record_errors: Vec<Vec<ValidationError>>,
    summary: Option<ValidationSummary>,
    in_flight: bool,
}

impl ImportPipeline {
    pub fn new(grouping_threshold: f64) -> Self {
        ImportPipeline {
            run_id: Ulid::new(),
            stage: ImportStage::Upload,
            threshold: grouping_threshold,
            file: None,
            mapping: None,
            grouped: false,
            groups: Vec::new(),
            conflicts: Vec::new(),
            record_errors: Vec::new(),
            summary: None,
            in_flight: false,
        }
    }

    pub fn run_id(&self) -> Ulid {
        self.run_id
    }

    pub fn stage(&self) -> ImportStage {
        self.stage
    }

    /// Parsed file of the current run, for failed-record export.
    pub fn parsed_file(&self) -> Option<&ParsedFile> {
        self.file.as_ref()
    }

    pub fn validation(&self) -> Option<&ValidationSummary> {
        self.summary.as_ref()
    }

    pub fn header_mapping(&self) -> Option<&HeaderMapping> {
        self.mapping.as_ref()
    }

    /// Discard all intermediate state and return to `Upload`.
    pub fn reset(&mut self) {
        self.run_id = Ulid::new();
        self.stage = ImportStage::Upload;
        self.file = None;
        self.mapping = None;
        self.grouped = false;
        self.groups.clear();
        self.conflicts.clear();
        self.record_errors.clear();
        self.summary = None;
        self.in_flight = false;
    }

    fn cancel(&mut self, at: ImportStage) -> PipelineOutcome {
        self.reset();
        PipelineOutcome::Cancelled(at)
    }

    /// Run the whole pipeline over one parsed file.
    pub fn run(
        &mut self,
        file: ParsedFile,
        prompt: &mut dyn ReviewPrompt,
        api: &dyn InventoryApi,
        dry_run: bool,
    ) -> Result<PipelineOutcome, PipelineError> {
        if self.in_flight {
            return Err(PipelineError::AlreadyRunning);
        }
        if file.is_empty() {
            return Err(PipelineError::EmptyFile);
        }
        self.reset();

        // Stage 1: header reconciliation, with review when anything is off
        let mut mapping = map_headers(&file.headers);
        loop {
            let validation = validate_mapping(&mapping);
            if !needs_review(&mapping, &validation) {
                break;
            }
            self.stage = ImportStage::HeaderReview;
            match prompt.review_headers(&mut mapping, &validation) {
                ReviewDecision::Cancel => return Ok(self.cancel(ImportStage::HeaderReview)),
                ReviewDecision::Accept => {
                    // Unmapped/duplicate headers may be acknowledged, but
                    // missing required fields keep blocking
                    if validate_mapping(&mapping).is_valid {
                        break;
                    }
                }
            }
        }
        let rows = transform_data(&file, &mapping);
        self.file = Some(file);
        self.mapping = Some(mapping);

        // Stage 2: grouping, only when the heuristic fires
        self.grouped = needs_grouping(&rows, self.threshold);
        if self.grouped {
            let result = group_assets(&rows);
            self.stage = ImportStage::GroupingReview;
            if prompt.review_grouping(&result.summary(), &result.conflicts)
                == ReviewDecision::Cancel
            {
                return Ok(self.cancel(ImportStage::GroupingReview));
            }
            self.groups = result.groups;
            self.conflicts = result.conflicts;
        } else {
            self.groups = rows.iter().map(AssetGroup::from_row).collect();
        }

        // Stage 3: validation plus the informational pre-check
        self.stage = ImportStage::PreviewValidate;
        self.record_errors = validate_data(&mut self.groups, self.grouped);
        let summary = summarize(&self.groups, &self.record_errors);
        self.summary = Some(summary.clone());

        let payloads = transform_for_backend(&self.groups);
        // The pre-check is informational only; a failure must not block
        // the import
        let new_options = api.precheck_new_options(&payloads).ok();

        // Stage 4: confirmation and strategy choice
        self.stage = ImportStage::Confirm;
        let preview = ImportPreview {
            summary: summary.clone(),
            new_options,
            grouped: self.grouped,
            asset_count: self.groups.len(),
        };
        let Some(strategy) = prompt.confirm_import(&preview) else {
            return Ok(self.cancel(ImportStage::Confirm));
        };
        if strategy == ImportStrategy::All && !summary.is_clean() {
            return Err(PipelineError::StrategyUnavailable {
                invalid: summary.invalid_rows,
            });
        }

        if dry_run {
            self.stage = ImportStage::Done;
            return Ok(PipelineOutcome::DryRun {
                summary,
                asset_count: self.groups.len(),
                grouped: self.grouped,
            });
        }

        // Stage 5: execute, guarded against double submission
        self.stage = ImportStage::Execute;
        self.in_flight = true;
        let selected: Vec<AssetPayload> = match strategy {
            ImportStrategy::ValidOnly => payloads
                .into_iter()
                .zip(&self.record_errors)
                .filter(|(_, errors)| errors.is_empty())
                .map(|(payload, _)| payload)
                .collect(),
            ImportStrategy::AttemptAll | ImportStrategy::All => payloads,
        };
        if selected.is_empty() {
            self.in_flight = false;
            return Err(PipelineError::NoValidRows);
        }

        let submitted = selected.len();
        let report = match api.bulk_create(&selected, strategy.mode()) {
            Ok(response) => ImportReport::from_response(self.run_id, submitted, response),
            Err(err) if err.is_duplicate_rejection() => {
                ImportReport::soft_duplicate(self.run_id, submitted, err.to_string())
            }
            Err(err) => {
                self.in_flight = false;
                return Err(err.into());
            }
        };
        self.in_flight = false;
        self.stage = ImportStage::Done;

        Ok(PipelineOutcome::Completed(report))
    }
}

//! Pipeline stages and the run outcome record.

use crate::validation::ValidationReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Stage of an ETL run. Stages advance in declaration order; `Failed` can
/// follow any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EtlStage {
    Idle,
    LoadingTabular,
    LoadingSpatial,
    BuildingView,
    LoadingMetadata,
    Validating,
    Done,
    Failed,
}

impl EtlStage {
    /// The stage that follows a successful `self`, if any.
    pub fn next(self) -> Option<EtlStage> {
        match self {
            EtlStage::Idle => Some(EtlStage::LoadingTabular),
            EtlStage::LoadingTabular => Some(EtlStage::LoadingSpatial),
            EtlStage::LoadingSpatial => Some(EtlStage::BuildingView),
            EtlStage::BuildingView => Some(EtlStage::LoadingMetadata),
            EtlStage::LoadingMetadata => Some(EtlStage::Validating),
            EtlStage::Validating => Some(EtlStage::Done),
            EtlStage::Done | EtlStage::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, EtlStage::Done | EtlStage::Failed)
    }

    /// Whether moving from `self` to `to` is a legal transition.
    pub fn can_transition_to(self, to: EtlStage) -> bool {
        if to == EtlStage::Failed {
            return !self.is_terminal();
        }
        self.next() == Some(to)
    }
}

impl fmt::Display for EtlStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EtlStage::Idle => "Idle",
            EtlStage::LoadingTabular => "LoadingTabular",
            EtlStage::LoadingSpatial => "LoadingSpatial",
            EtlStage::BuildingView => "BuildingView",
            EtlStage::LoadingMetadata => "LoadingMetadata",
            EtlStage::Validating => "Validating",
            EtlStage::Done => "Done",
            EtlStage::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// A stage entered at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct StageTransition {
    pub stage: EtlStage,
    pub at: DateTime<Utc>,
}

/// Result of one pipeline run.
///
/// Counts are `None` for stages that never completed. A failed run keeps
/// the counts gathered before the failure.
#[derive(Debug, Clone, Serialize)]
pub struct EtlOutcome {
    pub run_id: String,
    pub success: bool,
    pub stage: EtlStage,
    pub failed_stage: Option<EtlStage>,
    pub error: Option<String>,
    pub health_rows_loaded: Option<usize>,
    pub spatial_rows_loaded: Option<usize>,
    pub metadata_entries_loaded: Option<usize>,
    pub validation: Option<ValidationReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub transitions: Vec<StageTransition>,
}

impl EtlOutcome {
    pub(crate) fn new(run_id: String) -> Self {
        let now = Utc::now();
        Self {
            run_id,
            success: false,
            stage: EtlStage::Idle,
            failed_stage: None,
            error: None,
            health_rows_loaded: None,
            spatial_rows_loaded: None,
            metadata_entries_loaded: None,
            validation: None,
            started_at: now,
            finished_at: None,
            transitions: vec![StageTransition {
                stage: EtlStage::Idle,
                at: now,
            }],
        }
    }

    /// Record entering `to`. Illegal transitions are ignored and logged.
    pub(crate) fn advance(&mut self, to: EtlStage) {
        if !self.stage.can_transition_to(to) {
            log::warn!("ETL {}: ignoring transition {} -> {}", self.run_id, self.stage, to);
            return;
        }
        log::debug!("ETL {}: {} -> {}", self.run_id, self.stage, to);
        self.stage = to;
        let at = Utc::now();
        self.transitions.push(StageTransition { stage: to, at });
        if to.is_terminal() {
            self.finished_at = Some(at);
            self.success = to == EtlStage::Done;
        }
    }

    /// Mark the run failed in the current stage.
    pub(crate) fn fail(&mut self, error: String) {
        self.failed_stage = Some(self.stage);
        self.error = Some(error);
        self.advance(EtlStage::Failed);
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

use crate::{InstructorId, Session, SessionId, SessionKind, SubjectId};

/// Unit counters. A coupled lab counts as one unit.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct PlacementStats {
    pub total: u32,
    pub created: u32,
    pub skipped: u32,
    pub failed: u32,
    /// Created units that belong to a paired tutorial.
    pub paired: u32,
    /// Created units with fewer instructors than required.
    pub unstaffed: u32,
    /// Created units left without a room.
    pub unroomed: u32,
}

impl PlacementStats {
    pub fn absorb(&mut self, other: &PlacementStats) {
        self.total += other.total;
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
        self.paired += other.paired;
        self.unstaffed += other.unstaffed;
        self.unroomed += other.unroomed;
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum NoSlotCause {
    GridExhausted { iterations: u64 },
    IterationBudget { limit: u64 },
    RunBudget,
}

impl fmt::Display for NoSlotCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoSlotCause::GridExhausted { iterations } => {
                write!(f, "grid exhausted after {iterations} iterations")
            }
            NoSlotCause::IterationBudget { limit } => {
                write!(f, "search budget of {limit} iterations spent")
            }
            NoSlotCause::RunBudget => f.write_str("run budget spent"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum WarningReason {
    NoSlot { cause: NoSlotCause },
    Understaffed { required: u32, assigned: u32 },
    NoRoom,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
pub struct PlacementWarning {
    pub subject: SubjectId,
    pub kind: SessionKind,
    pub section: String,
    #[serde(default)]
    pub group: Option<u32>,
    pub reason: WarningReason,
}

impl fmt::Display for PlacementWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / section {}", self.subject, self.kind, self.section)?;
        if let Some(g) = self.group {
            write!(f, " / group {g}")?;
        }
        match &self.reason {
            WarningReason::NoSlot { cause } => write!(f, ": no admissible slot ({cause})"),
            WarningReason::Understaffed { required, assigned } => {
                write!(f, ": {assigned} of {required} instructors assigned")
            }
            WarningReason::NoRoom => f.write_str(": no free room"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Complete,
    Partial,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerationReport {
    pub status: RunStatus,
    pub totals: PlacementStats,
    pub subjects: BTreeMap<SubjectId, PlacementStats>,
    pub warnings: Vec<PlacementWarning>,
    pub created: Vec<SessionId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct GenerateResult {
    pub report: GenerationReport,
    pub roster: Vec<Session>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstructorLoad {
    pub instructor: InstructorId,
    pub credited_hours: f64,
    pub rounded: i64,
    pub ceiling: f64,
    pub over_ceiling: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct WorkloadReport {
    pub reference: f64,
    pub tolerance: f64,
    pub instructors: Vec<InstructorLoad>,
}

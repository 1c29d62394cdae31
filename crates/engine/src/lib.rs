//! Greedy first-fit timetable generation.
//!
//! Subjects are processed one after another, and inside a subject lectures,
//! then tutorials, then labs. Each requirement is placed at the first
//! admissible cell of the grid, staffed and roomed, and committed before
//! the next one is searched, so later searches see every earlier commit.
//! A requirement that cannot be placed is recorded and the run goes on.

mod lab;
mod lecture;
pub mod search;
mod tutorial;
pub mod units;

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use sched_core::candidates::{select_candidates, SelectionRequest};
use sched_core::rooms::{assign_room, free_rooms};
use sched_core::workload::{reference_workload, WorkloadLedger};
use sched_core::{
    validate_request, validate_roster, CommitError, Generator, Roster, TimeGrid, ValidationError,
};
use types::{
    Catalog, CohortKey, GenerateRequest, GenerateResult, GenerationReport, PlacementStats,
    PlacementWarning, RunOptions, RunStatus, Session, SessionId, Subject, SubjectId, Timeslot,
    WarningReason,
};

use search::{PlacementError, RunBudget};
use units::Unit;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] ValidationError),
    #[error("schedule invariant broken: {0}")]
    Invariant(#[from] CommitError),
}

#[derive(Clone, Debug, Default)]
pub struct Engine {
    options: RunOptions,
}

impl Engine {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Places every missing requirement of the selected subjects (all of
    /// them when `only` is empty) into `roster`.
    pub fn run(
        &self,
        roster: &mut Roster,
        catalog: &Catalog,
        only: &[SubjectId],
    ) -> Result<GenerationReport, EngineError> {
        validate_request(catalog, &self.options, only)?;
        let grid = TimeGrid::new(&catalog.grid)?;

        let mut run = Run {
            options: &self.options,
            catalog,
            grid,
            ledger: WorkloadLedger::seed(catalog, roster.sessions()),
            reference: reference_workload(
                &catalog.subjects,
                catalog.instructors.len(),
                catalog.fixed_credits(),
            ),
            roster,
            selected: only.iter().collect(),
            budget: RunBudget::new(self.options.run_budget),
            partnered: HashSet::new(),
            stats: BTreeMap::new(),
            warnings: Vec::new(),
            created: Vec::new(),
        };

        for subject in &catalog.subjects {
            if !run.in_scope(&subject.id) {
                continue;
            }
            let span = info_span!("subject", subject = %subject.id);
            let _guard = span.enter();
            run.stats_mut(&subject.id);
            run.lectures(subject)?;
            run.tutorials(subject)?;
            run.labs(subject)?;
        }

        Ok(run.finish())
    }
}

/// Runs a whole request to completion on the current thread.
pub fn generate(req: GenerateRequest) -> Result<GenerateResult, EngineError> {
    validate_roster(&req.roster)?;
    let mut roster = Roster::new(req.roster);
    let report = Engine::new(req.options).run(&mut roster, &req.catalog, &req.only)?;
    Ok(GenerateResult {
        report,
        roster: roster.into_sessions(),
    })
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EngineGenerator;

impl EngineGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Generator for EngineGenerator {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResult> {
        info!(
            subjects = req.catalog.subjects.len(),
            existing = req.roster.len(),
            "generation requested"
        );
        let res = tokio::task::spawn_blocking(move || generate(req)).await??;
        Ok(res)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UnitStatus {
    Missing,
    /// Already in the roster before it was reached.
    Present,
    /// Created during this run as the partner side of a paired tutorial.
    Partnered,
}

pub(crate) struct Run<'a> {
    options: &'a RunOptions,
    catalog: &'a Catalog,
    grid: TimeGrid,
    roster: &'a mut Roster,
    /// Empty means every subject.
    selected: HashSet<&'a SubjectId>,
    ledger: WorkloadLedger,
    reference: f64,
    budget: RunBudget,
    partnered: HashSet<(SubjectId, CohortKey)>,
    stats: BTreeMap<SubjectId, PlacementStats>,
    warnings: Vec<PlacementWarning>,
    created: Vec<SessionId>,
}

impl<'a> Run<'a> {
    fn in_scope(&self, subject: &SubjectId) -> bool {
        self.selected.is_empty() || self.selected.contains(subject)
    }

    fn stats_mut(&mut self, subject: &SubjectId) -> &mut PlacementStats {
        self.stats.entry(subject.clone()).or_default()
    }

    fn status(&self, unit: &Unit<'_>) -> UnitStatus {
        let key = unit.key();
        if self
            .partnered
            .contains(&(unit.subject.id.clone(), key.clone()))
        {
            UnitStatus::Partnered
        } else if self.roster.contains_unit(&unit.subject.id, unit.kind, &key) {
            UnitStatus::Present
        } else {
            UnitStatus::Missing
        }
    }

    /// Counts the unit and tells whether it still has to be placed.
    fn begin(&mut self, unit: &Unit<'_>) -> bool {
        match self.status(unit) {
            UnitStatus::Partnered => false,
            UnitStatus::Present => {
                debug!(kind = %unit.kind, section = %unit.section, group = ?unit.group, "already scheduled");
                let stats = self.stats_mut(&unit.subject.id);
                stats.total += 1;
                stats.skipped += 1;
                false
            }
            UnitStatus::Missing => {
                self.stats_mut(&unit.subject.id).total += 1;
                true
            }
        }
    }

    fn warn(&mut self, unit: &Unit<'_>, reason: WarningReason) {
        let warning = PlacementWarning {
            subject: unit.subject.id.clone(),
            kind: unit.kind,
            section: unit.section.clone(),
            group: unit.group,
            reason,
        };
        warn!("{warning}");
        self.warnings.push(warning);
    }

    fn fail(&mut self, unit: &Unit<'_>, err: PlacementError) {
        self.stats_mut(&unit.subject.id).failed += 1;
        self.warn(unit, WarningReason::NoSlot { cause: err.into() });
    }

    /// Staffs and rooms the sessions of one unit, then commits them. The
    /// sessions share instructors and room; the first one leads.
    fn commit_unit(&mut self, unit: &Unit<'_>, mut sessions: Vec<Session>) -> Result<(), EngineError> {
        let Some(lead) = sessions.first() else {
            return Ok(());
        };
        let cells: Vec<Timeslot> = sessions.iter().map(|s| s.at.clone()).collect();

        let required = unit.required_instructors();
        let mut understaffed = None;
        if self.options.assign_instructors && required > 0 {
            let req = SelectionRequest {
                session: lead,
                continuation: cells.get(1),
                count: required,
                workloads: self.ledger.as_map(),
                reference: self.reference,
                tolerance: self.options.tolerance,
                respect_preferences: self.options.respect_preferences,
            };
            let chosen = select_candidates(&self.catalog.instructors, &req, &*self.roster);
            if chosen.len() < required {
                understaffed = Some(chosen.len());
            }
            for s in &mut sessions {
                s.instructors = chosen.clone();
            }
        }

        let mut unroomed = false;
        if self.options.assign_rooms {
            let cell_refs: Vec<&Timeslot> = cells.iter().collect();
            let free = free_rooms(&self.catalog.rooms, unit.kind, &cell_refs, &*self.roster);
            match assign_room(&sessions[0], &free, &self.catalog.room_pools) {
                Some(room) => {
                    for s in &mut sessions {
                        s.room = Some(room.clone());
                    }
                }
                None => unroomed = true,
            }
        }

        for s in sessions {
            self.ledger.record(&s);
            let at = s.at.clone();
            let id = if self.options.avoid_conflicts {
                self.roster.commit(s)?
            } else {
                self.roster.commit_unchecked(s)?
            };
            debug!(%id, %at, kind = %unit.kind, section = %unit.section, group = ?unit.group, "session placed");
            self.created.push(id);
        }

        let stats = self.stats_mut(&unit.subject.id);
        stats.created += 1;
        if understaffed.is_some() {
            stats.unstaffed += 1;
        }
        if unroomed {
            stats.unroomed += 1;
        }
        if let Some(assigned) = understaffed {
            self.warn(
                unit,
                WarningReason::Understaffed {
                    required: required as u32,
                    assigned: assigned as u32,
                },
            );
        }
        if unroomed {
            self.warn(unit, WarningReason::NoRoom);
        }
        Ok(())
    }

    fn finish(self) -> GenerationReport {
        let mut totals = PlacementStats::default();
        for s in self.stats.values() {
            totals.absorb(s);
        }
        info!(
            total = totals.total,
            created = totals.created,
            skipped = totals.skipped,
            failed = totals.failed,
            paired = totals.paired,
            iterations = self.budget.spent(),
            "generation finished"
        );
        GenerationReport {
            status: if totals.failed == 0 {
                RunStatus::Complete
            } else {
                RunStatus::Partial
            },
            totals,
            subjects: self.stats,
            warnings: self.warnings,
            created: self.created,
        }
    }
}

/// Whether a subject already has a session of `kind` at `cell`.
pub(crate) fn subject_at(roster: &Roster, subject: &Subject, kind: types::SessionKind, cell: &Timeslot) -> bool {
    roster
        .occupants(cell)
        .any(|s| s.kind() == kind && s.subject == subject.id)
}

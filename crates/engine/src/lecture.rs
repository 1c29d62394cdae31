use sched_core::conflict::has_conflict;
use types::{SessionKind, Subject, Timeslot};

use crate::search::first_fit;
use crate::units::Unit;
use crate::{subject_at, EngineError, Run};

impl Run<'_> {
    /// One lecture per section. Two sections of the same subject never run
    /// their lectures in parallel.
    pub(crate) fn lectures(&mut self, subject: &Subject) -> Result<(), EngineError> {
        for section in 0..subject.sections.max(0) as usize {
            let unit = Unit::lecture(subject, section);
            if !self.begin(&unit) {
                continue;
            }
            let roster = &*self.roster;
            let avoid = self.options.avoid_conflicts;
            let found = first_fit(
                self.grid.cells(),
                self.options.max_iterations,
                &mut self.budget,
                |cell: &Timeslot| {
                    !subject_at(roster, subject, SessionKind::Lecture, cell)
                        && (!avoid || !has_conflict(&unit.probe(cell), roster.occupants(cell)))
                },
            );
            match found {
                Ok(cell) => {
                    let probe = unit.probe(&cell);
                    self.commit_unit(&unit, vec![probe])?;
                }
                Err(e) => self.fail(&unit, e),
            }
        }
        Ok(())
    }

    /// Places one requirement on its own, with no same-subject restriction.
    pub(crate) fn place_single(&mut self, unit: &Unit<'_>) -> Result<(), EngineError> {
        let roster = &*self.roster;
        let avoid = self.options.avoid_conflicts;
        let found = first_fit(
            self.grid.cells(),
            self.options.max_iterations,
            &mut self.budget,
            |cell: &Timeslot| !avoid || !has_conflict(&unit.probe(cell), roster.occupants(cell)),
        );
        match found {
            Ok(cell) => {
                let probe = unit.probe(&cell);
                self.commit_unit(unit, vec![probe])
            }
            Err(e) => {
                self.fail(unit, e);
                Ok(())
            }
        }
    }
}

use sched_core::conflict::all_clear;
use types::{SessionKind, Subject, Timeslot};

use crate::search::first_fit;
use crate::units::Unit;
use crate::{subject_at, EngineError, Run};

impl Run<'_> {
    /// Every lab group takes a coupled pair of cells. A subject never runs
    /// two lab groups in the same cell.
    pub(crate) fn labs(&mut self, subject: &Subject) -> Result<(), EngineError> {
        let groups = subject.lab_groups.max(0) as u32;
        for section in 0..subject.sections.max(0) as usize {
            for group in 1..=groups {
                let unit = Unit::lab(subject, section, group);
                if !self.begin(&unit) {
                    continue;
                }
                let roster = &*self.roster;
                let avoid = self.options.avoid_conflicts;
                let found = first_fit(
                    self.grid.coupled_pairs(),
                    self.options.max_iterations,
                    &mut self.budget,
                    |(first, second): &(Timeslot, Timeslot)| {
                        if subject_at(roster, subject, SessionKind::Lab, first)
                            || subject_at(roster, subject, SessionKind::Lab, second)
                        {
                            return false;
                        }
                        !avoid
                            || all_clear(
                                &[unit.probe(first), unit.continuation(second)],
                                roster.occupants(first).chain(roster.occupants(second)),
                            )
                    },
                );
                match found {
                    Ok((first, second)) => {
                        let halves = vec![unit.probe(&first), unit.continuation(&second)];
                        self.commit_unit(&unit, halves)?;
                    }
                    Err(e) => self.fail(&unit, e),
                }
            }
        }
        Ok(())
    }
}

//! Tutorial groups, paired two by two across subjects where possible.
//!
//! A pair (binôme) takes odd group `g` and group `g + 1` of a subject and the
//! same two groups of a partner subject of the same curriculum, and puts
//! them on two consecutive slots of one day with the subjects swapped:
//!
//! ```text
//!            slot 1        slot 2
//! group g    subject 1     subject 2
//! group g+1  subject 2     subject 1
//! ```
//!
//! When no partner fits, or for a trailing odd group, each group is placed
//! on its own.

use sched_core::conflict::all_clear;
use tracing::debug;
use types::{Session, Subject, Timeslot};

use crate::search::{first_fit, PlacementError};
use crate::units::Unit;
use crate::{EngineError, Run, UnitStatus};

impl Run<'_> {
    pub(crate) fn tutorials(&mut self, subject: &Subject) -> Result<(), EngineError> {
        let groups = subject.tutorial_groups.max(0) as u32;
        for section in 0..subject.sections.max(0) as usize {
            let mut group = 1;
            while group <= groups {
                let first = Unit::tutorial(subject, section, group);
                if !self.begin(&first) {
                    group += 1;
                    continue;
                }
                if group % 2 == 1 && group < groups {
                    let second = Unit::tutorial(subject, section, group + 1);
                    if self.status(&second) == UnitStatus::Missing
                        && self.pair(section, &first, &second)?
                    {
                        group += 2;
                        continue;
                    }
                }
                self.place_single(&first)?;
                group += 1;
            }
        }
        Ok(())
    }

    /// Tries every partner subject in catalog order. Returns whether the four
    /// sessions were committed.
    fn pair(&mut self, section: usize, a: &Unit<'_>, b: &Unit<'_>) -> Result<bool, EngineError> {
        let subject = a.subject;
        let (Some(ga), Some(gb)) = (a.group, b.group) else {
            return Ok(false);
        };
        let catalog = self.catalog;
        let partners: Vec<&Subject> = catalog
            .subjects
            .iter()
            .filter(|p| {
                p.id != subject.id
                    && self.in_scope(&p.id)
                    && p.curriculum == subject.curriculum
                    && p.sections.max(0) as usize > section
                    && p.tutorial_groups.max(0) as u32 >= gb
            })
            .collect();

        for partner in partners {
            let pa = Unit::tutorial(partner, section, ga);
            let pb = Unit::tutorial(partner, section, gb);
            if self.status(&pa) != UnitStatus::Missing || self.status(&pb) != UnitStatus::Missing {
                continue;
            }

            let roster = &*self.roster;
            let avoid = self.options.avoid_conflicts;
            let found = first_fit(
                self.grid.consecutive_pairs(),
                self.options.max_iterations,
                &mut self.budget,
                |(s1, s2): &(Timeslot, Timeslot)| {
                    if !avoid {
                        return true;
                    }
                    let probes: [Session; 4] =
                        [a.probe(s1), pb.probe(s1), pa.probe(s2), b.probe(s2)];
                    all_clear(&probes, roster.occupants(s1).chain(roster.occupants(s2)))
                },
            );

            match found {
                Ok((s1, s2)) => {
                    debug!(
                        partner = %partner.id,
                        section = %a.section,
                        groups = ?(ga, gb),
                        first = %s1,
                        second = %s2,
                        "paired tutorials"
                    );
                    self.begin(b);
                    self.begin(&pa);
                    self.begin(&pb);
                    self.partnered.insert((partner.id.clone(), pa.key()));
                    self.partnered.insert((partner.id.clone(), pb.key()));
                    for (unit, at) in [(a, &s1), (&pb, &s1), (&pa, &s2), (b, &s2)] {
                        let probe = unit.probe(at);
                        self.commit_unit(unit, vec![probe])?;
                        self.stats_mut(&unit.subject.id).paired += 1;
                    }
                    return Ok(true);
                }
                Err(PlacementError::RunBudget) => return Ok(false),
                Err(e) => {
                    debug!(partner = %partner.id, error = %e, "no pair with partner");
                }
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use crate::Engine;
    use sched_core::conflict::audit;
    use sched_core::Roster;
    use types::*;

    fn subject(id: &str, groups: i32) -> Subject {
        Subject {
            id: id.into(),
            curriculum: "CS1".into(),
            sections: 1,
            tutorial_groups: groups,
            lab_groups: 0,
            lab_instructors: 0,
            hours: KindHours { lecture: 0.0, tutorial: 1.5, lab: 0.0 },
        }
    }

    fn catalog(subjects: Vec<Subject>, slots: &[&str]) -> Catalog {
        Catalog {
            subjects,
            rooms: vec![],
            instructors: vec![],
            grid: TimeGridDef {
                days: vec![DayOfWeek::Mon, DayOfWeek::Tue],
                slots: slots.iter().map(|&s| s.into()).collect(),
                coupled: Default::default(),
                blocked: vec![],
            },
            room_pools: Default::default(),
        }
    }

    fn quiet() -> RunOptions {
        RunOptions { assign_instructors: false, assign_rooms: false, ..Default::default() }
    }

    fn sections_of<'a>(roster: &'a Roster, subject: &str) -> Vec<&'a Session> {
        roster
            .sessions()
            .iter()
            .filter(|s| s.subject.0 == subject && s.kind() == SessionKind::Tutorial)
            .collect()
    }

    #[test]
    fn two_subjects_pair_with_swapped_slots() {
        let c = catalog(vec![subject("Algebra", 2), subject("Optics", 2)], &["S1", "S2", "S3"]);
        let mut roster = Roster::new(vec![]);
        let report = Engine::new(quiet()).run(&mut roster, &c, &[]).unwrap();

        let tut_alg = sections_of(&roster, "Algebra");
        let tut_opt = sections_of(&roster, "Optics");
        assert_eq!(tut_alg.len(), 2);
        assert_eq!(tut_opt.len(), 2);
        let alg_stats = report.subjects[&SubjectId::from("Algebra")];
        let opt_stats = report.subjects[&SubjectId::from("Optics")];
        assert_eq!(alg_stats.paired, 2);
        assert_eq!(opt_stats.paired, 2);
        // One lecture plus two tutorials.
        assert_eq!(opt_stats.total, 3);
        assert_eq!(opt_stats.created, 3);
        assert_eq!(opt_stats.skipped, 0);

        let cell = |subject: &[&Session], group: u32| {
            subject
                .iter()
                .find(|s| s.group == Some(group))
                .map(|s| s.at.clone())
                .unwrap()
        };
        assert_eq!(cell(&tut_alg, 1), cell(&tut_opt, 2));
        assert_eq!(cell(&tut_alg, 2), cell(&tut_opt, 1));
        assert_eq!(cell(&tut_alg, 1).day, cell(&tut_alg, 2).day);
        assert_ne!(cell(&tut_alg, 1), cell(&tut_alg, 2));
        assert!(audit(roster.sessions()).is_empty());
    }

    #[test]
    fn trailing_odd_group_is_placed_alone() {
        let c = catalog(vec![subject("Algebra", 3), subject("Optics", 3)], &["S1", "S2", "S3"]);
        let mut roster = Roster::new(vec![]);
        let report = Engine::new(quiet()).run(&mut roster, &c, &[]).unwrap();
        let alg = report.subjects[&SubjectId::from("Algebra")];
        let opt = report.subjects[&SubjectId::from("Optics")];
        assert_eq!((alg.total, alg.created, alg.paired), (4, 4, 2));
        assert_eq!((opt.total, opt.created, opt.paired, opt.skipped), (4, 4, 2, 0));
        assert_eq!(report.totals.failed, 0);
        assert!(audit(roster.sessions()).is_empty());
    }

    #[test]
    fn lone_subject_falls_back_to_single_groups() {
        let c = catalog(vec![subject("Algebra", 2)], &["S1"]);
        let mut roster = Roster::new(vec![]);
        let report = Engine::new(quiet()).run(&mut roster, &c, &[]).unwrap();
        assert_eq!(report.totals.created, 3);
        assert_eq!(report.totals.paired, 0);
        assert!(audit(roster.sessions()).is_empty());
    }

    #[test]
    fn partner_already_scheduled_is_not_paired_again() {
        let c = catalog(vec![subject("Algebra", 2), subject("Optics", 2)], &["S1", "S2"]);
        let mut roster = Roster::new(vec![]);
        Engine::new(quiet())
            .run(&mut roster, &c, &[SubjectId::from("Optics")])
            .unwrap();
        // Optics alone: no partner outside the selection.
        assert_eq!(roster.len(), 3);
        let report = Engine::new(quiet()).run(&mut roster, &c, &[]).unwrap();
        assert_eq!(report.totals.paired, 0);
        let opt = report.subjects[&SubjectId::from("Optics")];
        assert_eq!((opt.total, opt.skipped), (3, 3));
        assert_eq!(report.subjects[&SubjectId::from("Algebra")].created, 3);
        assert!(audit(roster.sessions()).is_empty());
    }
}

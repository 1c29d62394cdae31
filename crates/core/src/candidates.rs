//! Ranks the instructors who are free for a session.
//!
//! Survivors of the conflict filter are ordered by preference rank, then by
//! current workload, then by name. Instructors already at or above
//! `reference * tolerance` only fill places nobody under the ceiling can.

use std::cmp::Ordering;
use std::collections::HashMap;

use types::{Instructor, InstructorId, Session, Timeslot};

use crate::conflict::instructor_busy;
use crate::roster::Roster;

pub struct SelectionRequest<'a> {
    pub session: &'a Session,
    /// Second cell occupied by the session, for coupled labs.
    pub continuation: Option<&'a Timeslot>,
    pub count: usize,
    pub workloads: &'a HashMap<InstructorId, f64>,
    pub reference: f64,
    pub tolerance: f64,
    pub respect_preferences: bool,
}

struct Ranked<'a> {
    id: &'a InstructorId,
    rank: u8,
    load: f64,
}

fn by_rank(a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
    a.rank
        .cmp(&b.rank)
        .then(a.load.total_cmp(&b.load))
        .then_with(|| a.id.cmp(b.id))
}

pub fn select_candidates(
    instructors: &[Instructor],
    req: &SelectionRequest<'_>,
    roster: &Roster,
) -> Vec<InstructorId> {
    if req.count == 0 {
        return Vec::new();
    }
    let session = req.session;
    let cells: Vec<&Timeslot> = std::iter::once(&session.at).chain(req.continuation).collect();
    let ceiling = req.reference * req.tolerance;

    let mut under = Vec::new();
    let mut over = Vec::new();
    for t in instructors {
        if cells
            .iter()
            .any(|at| instructor_busy(&t.id, at, roster.occupants(at)))
        {
            continue;
        }
        let rank = if req.respect_preferences {
            t.preference_rank(&session.subject, session.kind())
                .unwrap_or(u8::MAX)
        } else {
            u8::MAX
        };
        let load = req.workloads.get(&t.id).copied().unwrap_or(0.0);
        let ranked = Ranked {
            id: &t.id,
            rank,
            load,
        };
        if req.reference > 0.0 && load >= ceiling {
            over.push(ranked);
        } else {
            under.push(ranked);
        }
    }
    under.sort_by(by_rank);
    over.sort_by(by_rank);

    under
        .into_iter()
        .chain(over)
        .take(req.count)
        .map(|r| r.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{instructor, mon, session};
    use types::{KindHours, Preference, SessionDetail};

    fn prefers(id: &str, rank: u8) -> Instructor {
        let mut t = instructor(id);
        t.preferences.push(Preference {
            subject: "Algebra".into(),
            rank,
            hours: KindHours { lecture: 0.0, tutorial: 20.0, lab: 0.0 },
        });
        t
    }

    fn request<'a>(
        s: &'a Session,
        count: usize,
        workloads: &'a HashMap<InstructorId, f64>,
    ) -> SelectionRequest<'a> {
        SelectionRequest {
            session: s,
            continuation: None,
            count,
            workloads,
            reference: 200.0,
            tolerance: 1.5,
            respect_preferences: true,
        }
    }

    fn loads(pairs: &[(&str, f64)]) -> HashMap<InstructorId, f64> {
        pairs.iter().map(|&(n, h)| (n.into(), h)).collect()
    }

    fn names(v: Vec<InstructorId>) -> Vec<String> {
        v.into_iter().map(|i| i.0).collect()
    }

    #[test]
    fn overloaded_instructor_is_excluded_while_others_are_free() {
        let s = session("Algebra", SessionDetail::Tutorial, Some(1), mon("S1"));
        let staff = [prefers("A", 1), instructor("B")];
        let w = loads(&[("A", 300.0), ("B", 120.0)]);
        let roster = Roster::new(vec![]);
        assert_eq!(names(select_candidates(&staff, &request(&s, 1, &w), &roster)), ["B"]);
    }

    #[test]
    fn overloaded_instructor_is_used_when_nobody_else_is_eligible() {
        let s = session("Algebra", SessionDetail::Tutorial, Some(1), mon("S1"));
        let mut busy = session("Physics", SessionDetail::Lecture, None, mon("S1"));
        busy.section = "Z".into();
        busy.instructors = vec!["B".into()];
        let roster = Roster::new(vec![busy]);
        let staff = [prefers("A", 1), instructor("B")];
        let w = loads(&[("A", 300.0), ("B", 120.0)]);
        assert_eq!(names(select_candidates(&staff, &request(&s, 1, &w), &roster)), ["A"]);
        assert_eq!(names(select_candidates(&staff, &request(&s, 3, &w), &roster)), ["A"]);
    }

    #[test]
    fn preference_beats_workload_then_name_breaks_ties() {
        let s = session("Algebra", SessionDetail::Tutorial, Some(1), mon("S1"));
        let staff = [
            instructor("Zoe"),
            instructor("Adam"),
            prefers("Marc", 2),
            prefers("Lea", 1),
        ];
        let w = loads(&[("Zoe", 10.0), ("Adam", 10.0), ("Marc", 90.0), ("Lea", 150.0)]);
        let roster = Roster::new(vec![]);
        assert_eq!(
            names(select_candidates(&staff, &request(&s, 4, &w), &roster)),
            ["Lea", "Marc", "Adam", "Zoe"]
        );

        let mut neutral = request(&s, 4, &w);
        neutral.respect_preferences = false;
        assert_eq!(
            names(select_candidates(&staff, &neutral, &roster)),
            ["Adam", "Zoe", "Marc", "Lea"]
        );
    }

    #[test]
    fn preference_for_another_kind_does_not_count() {
        let s = session("Algebra", SessionDetail::Lecture, None, mon("S1"));
        let staff = [prefers("Lea", 1), instructor("Adam")];
        let w = loads(&[("Lea", 50.0), ("Adam", 10.0)]);
        let roster = Roster::new(vec![]);
        assert_eq!(names(select_candidates(&staff, &request(&s, 1, &w), &roster)), ["Adam"]);
    }

    #[test]
    fn continuation_cell_must_be_free_too() {
        let s = session("Algebra", SessionDetail::Tutorial, Some(1), mon("S1"));
        let mut later = session("Physics", SessionDetail::Tutorial, Some(9), mon("S2"));
        later.instructors = vec!["Adam".into()];
        let roster = Roster::new(vec![later]);
        let staff = [instructor("Adam"), instructor("Bea")];
        let w = HashMap::new();
        let second = mon("S2");
        let mut req = request(&s, 2, &w);
        req.continuation = Some(&second);
        assert_eq!(names(select_candidates(&staff, &req, &roster)), ["Bea"]);
    }

    #[test]
    fn zero_reference_disables_the_ceiling() {
        let s = session("Algebra", SessionDetail::Tutorial, Some(1), mon("S1"));
        let staff = [instructor("Adam"), instructor("Bea")];
        let w = loads(&[("Adam", 5.0)]);
        let roster = Roster::new(vec![]);
        let mut req = request(&s, 2, &w);
        req.reference = 0.0;
        assert_eq!(names(select_candidates(&staff, &req, &roster)), ["Bea", "Adam"]);
        req.count = 0;
        assert!(select_candidates(&staff, &req, &roster).is_empty());
    }
}

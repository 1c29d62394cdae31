use std::collections::{HashMap, HashSet};
use thiserror::Error;

use types::{
    CohortKey, LabHalf, Session, SessionDetail, SessionId, SessionKind, SubjectId, Timeslot,
};

use crate::conflict::{find_conflict, Conflict};

#[derive(Debug, Error, PartialEq)]
pub enum CommitError {
    #[error("session {subject} {key} at {at} conflicts with {with} ({reason:?})", with = .conflict.with, reason = .conflict.reason)]
    Conflict {
        subject: SubjectId,
        key: CohortKey,
        at: Timeslot,
        conflict: Conflict,
    },
    #[error("session {subject} {key} already exists")]
    Duplicate { subject: SubjectId, key: CohortKey },
}

type UnitKey = (SubjectId, CohortKey, SessionDetail);

/// Largest session id a roster keeps, the largest integer a JSON client
/// reads back exactly.
pub const MAX_SESSION_ID: u64 = (1 << 53) - 1;

/// The sessions of the active term. Seeded sessions are indexed as given,
/// except that their ids are made unique. Later insertions go through
/// `commit` or `commit_unchecked`.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    sessions: Vec<Session>,
    by_slot: HashMap<Timeslot, Vec<usize>>,
    units: HashSet<UnitKey>,
    ids: HashSet<SessionId>,
    next_id: u64,
}

impl Roster {
    /// Seeds the roster. A session without an id, with an id above
    /// `MAX_SESSION_ID` or with an id already taken gets a fresh one.
    pub fn new(sessions: Vec<Session>) -> Self {
        let top = sessions
            .iter()
            .map(|s| s.id.0)
            .filter(|&id| id <= MAX_SESSION_ID)
            .max()
            .unwrap_or(0);
        let mut roster = Self {
            next_id: top + 1,
            ..Default::default()
        };
        for s in sessions {
            roster.index(s);
        }
        roster
    }

    fn index(&mut self, mut session: Session) -> SessionId {
        let keep = session.id.is_assigned()
            && session.id.0 <= MAX_SESSION_ID
            && !self.ids.contains(&session.id);
        if !keep {
            session.id = SessionId(self.next_id);
        }
        self.next_id = self.next_id.max(session.id.0 + 1);
        let id = session.id;
        self.ids.insert(id);
        self.units.insert(unit_key(&session));
        self.by_slot
            .entry(session.at.clone())
            .or_default()
            .push(self.sessions.len());
        self.sessions.push(session);
        id
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn next_id(&self) -> SessionId {
        SessionId(self.next_id)
    }

    /// Sessions placed at one cell, in commit order.
    pub fn occupants<'a>(&'a self, at: &Timeslot) -> impl Iterator<Item = &'a Session> + Clone + 'a {
        self.by_slot
            .get(at)
            .map(|idx| idx.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&i| &self.sessions[i])
    }

    /// Whether the requirement a session of this subject, kind and cohort
    /// stands for is already covered. A lab is covered by either half.
    pub fn contains_unit(&self, subject: &SubjectId, kind: SessionKind, key: &CohortKey) -> bool {
        let details: &[SessionDetail] = match kind {
            SessionKind::Lecture => &[SessionDetail::Lecture],
            SessionKind::Tutorial => &[SessionDetail::Tutorial],
            SessionKind::Lab => &[
                SessionDetail::Lab { half: LabHalf::First },
                SessionDetail::Lab { half: LabHalf::Second },
            ],
        };
        details
            .iter()
            .any(|&detail| self.units.contains(&(subject.clone(), key.clone(), detail)))
    }

    /// Adds a session after re-validating it against the roster.
    pub fn commit(&mut self, session: Session) -> Result<SessionId, CommitError> {
        self.check_duplicate(&session)?;
        if let Some(conflict) = find_conflict(&session, self.occupants(&session.at)) {
            return Err(CommitError::Conflict {
                subject: session.subject.clone(),
                key: session.cohort_key(),
                at: session.at.clone(),
                conflict,
            });
        }
        Ok(self.index(session))
    }

    /// Adds a session without the conflict check; duplicates are still refused.
    pub fn commit_unchecked(&mut self, session: Session) -> Result<SessionId, CommitError> {
        self.check_duplicate(&session)?;
        Ok(self.index(session))
    }

    fn check_duplicate(&self, session: &Session) -> Result<(), CommitError> {
        if self.units.contains(&unit_key(session)) {
            return Err(CommitError::Duplicate {
                subject: session.subject.clone(),
                key: session.cohort_key(),
            });
        }
        Ok(())
    }

    pub fn into_sessions(self) -> Vec<Session> {
        self.sessions
    }
}

fn unit_key(s: &Session) -> UnitKey {
    (s.subject.clone(), s.cohort_key(), s.detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictReason;
    use crate::fixtures::{mon, session};

    #[test]
    fn commit_assigns_increasing_ids_after_existing_ones() {
        let mut seeded = session("Algebra", SessionDetail::Lecture, None, mon("S1"));
        seeded.id = SessionId(41);
        let mut roster = Roster::new(vec![seeded]);
        assert_eq!(roster.next_id(), SessionId(42));

        let id = roster
            .commit(session("Algebra", SessionDetail::Tutorial, Some(1), mon("S2")))
            .unwrap();
        assert_eq!(id, SessionId(42));
        assert_eq!(roster.occupants(&mon("S2")).count(), 1);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn commit_refuses_conflicts() {
        let mut roster = Roster::new(vec![]);
        roster
            .commit(session("Algebra", SessionDetail::Tutorial, Some(1), mon("S1")))
            .unwrap();
        let err = roster
            .commit(session("Physics", SessionDetail::Tutorial, Some(1), mon("S1")))
            .unwrap_err();
        assert!(matches!(
            err,
            CommitError::Conflict { conflict: Conflict { reason: ConflictReason::Cohort, .. }, .. }
        ));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn duplicates_are_refused_even_unchecked() {
        let mut roster = Roster::new(vec![]);
        let s = session("Algebra", SessionDetail::Lecture, None, mon("S1"));
        roster.commit_unchecked(s.clone()).unwrap();
        let mut moved = s;
        moved.at = mon("S3");
        assert!(matches!(
            roster.commit_unchecked(moved),
            Err(CommitError::Duplicate { .. })
        ));
    }

    #[test]
    fn lab_halves_are_one_unit_two_sessions() {
        let mut roster = Roster::new(vec![]);
        let first = session("Physics", SessionDetail::Lab { half: LabHalf::First }, Some(1), mon("S1"));
        let second = session("Physics", SessionDetail::Lab { half: LabHalf::Second }, Some(1), mon("S2"));
        let key = first.cohort_key();
        assert!(!roster.contains_unit(&"Physics".into(), SessionKind::Lab, &key));
        roster.commit(first).unwrap();
        roster.commit(second).unwrap();
        assert!(roster.contains_unit(&"Physics".into(), SessionKind::Lab, &key));
        assert!(!roster.contains_unit(&"Chemistry".into(), SessionKind::Lab, &key));
    }

    #[test]
    fn a_lone_second_half_covers_the_lab() {
        let second = session("Physics", SessionDetail::Lab { half: LabHalf::Second }, Some(1), mon("S2"));
        let key = second.cohort_key();
        let roster = Roster::new(vec![second]);
        assert!(roster.contains_unit(&"Physics".into(), SessionKind::Lab, &key));
    }

    #[test]
    fn seeded_ids_are_made_unique() {
        let with_id = |id, slot: &str| {
            let mut s = session("Algebra", SessionDetail::Tutorial, Some(1), mon(slot));
            s.id = SessionId(id);
            s
        };
        let roster = Roster::new(vec![
            session("Algebra", SessionDetail::Lecture, None, mon("S1")),
            with_id(5, "S2"),
            with_id(5, "S3"),
            with_id(3, "S4"),
        ]);
        let ids: Vec<u64> = roster.sessions().iter().map(|s| s.id.0).collect();
        assert_eq!(ids, [6, 5, 7, 3]);
        assert_eq!(roster.next_id(), SessionId(8));
    }

    #[test]
    fn out_of_range_seeded_id_is_replaced() {
        let mut s = session("Algebra", SessionDetail::Lecture, None, mon("S1"));
        s.id = SessionId(u64::MAX);
        let mut roster = Roster::new(vec![s]);
        assert_eq!(roster.sessions()[0].id, SessionId(1));
        let id = roster
            .commit(session("Algebra", SessionDetail::Tutorial, Some(1), mon("S2")))
            .unwrap();
        assert_eq!(id, SessionId(2));
    }
}

//! Hard-constraint checks: room, instructor and cohort double-booking.
//!
//! All functions are pure. The candidate does not have to be part of the
//! roster; an entry carrying the candidate's own (assigned) id is ignored.

use serde::Serialize;
use std::collections::HashMap;

use types::{InstructorId, Session, SessionId, Timeslot};

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictReason {
    Room,
    Instructor,
    Cohort,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct Conflict {
    pub with: SessionId,
    pub reason: ConflictReason,
}

fn clash(candidate: &Session, other: &Session) -> Option<ConflictReason> {
    if candidate.id.is_assigned() && candidate.id == other.id {
        return None;
    }
    overlap(candidate, other)
}

/// Why two distinct sessions cannot share their cell, ids aside.
fn overlap(candidate: &Session, other: &Session) -> Option<ConflictReason> {
    if candidate.at != other.at {
        return None;
    }
    if candidate.room.is_some() && candidate.room == other.room {
        return Some(ConflictReason::Room);
    }
    if candidate.instructors.iter().any(|i| other.teaches(i)) {
        return Some(ConflictReason::Instructor);
    }
    if candidate.cohort_key().overlaps(&other.cohort_key()) {
        return Some(ConflictReason::Cohort);
    }
    None
}

pub fn find_conflict<'a>(
    candidate: &Session,
    roster: impl IntoIterator<Item = &'a Session>,
) -> Option<Conflict> {
    roster.into_iter().find_map(|other| {
        clash(candidate, other).map(|reason| Conflict {
            with: other.id,
            reason,
        })
    })
}

pub fn has_conflict<'a>(candidate: &Session, roster: impl IntoIterator<Item = &'a Session>) -> bool {
    find_conflict(candidate, roster).is_some()
}

/// True when every candidate is free against the roster and against the
/// candidates listed before it.
pub fn all_clear<'a, R>(candidates: &[Session], roster: R) -> bool
where
    R: IntoIterator<Item = &'a Session> + Clone,
{
    candidates.iter().enumerate().all(|(i, c)| {
        !has_conflict(c, roster.clone()) && !has_conflict(c, &candidates[..i])
    })
}

pub fn instructor_busy<'a>(
    instructor: &InstructorId,
    at: &Timeslot,
    roster: impl IntoIterator<Item = &'a Session>,
) -> bool {
    roster
        .into_iter()
        .any(|s| &s.at == at && s.teaches(instructor))
}

/// Every double-booked pair of a roster, reported once from the later entry.
pub fn audit(roster: &[Session]) -> Vec<(SessionId, Conflict)> {
    let mut by_slot: HashMap<&Timeslot, Vec<&Session>> = HashMap::new();
    for s in roster {
        by_slot.entry(&s.at).or_default().push(s);
    }
    let mut found = Vec::new();
    for s in roster {
        let Some(peers) = by_slot.get(&s.at) else {
            continue;
        };
        let pos = peers
            .iter()
            .position(|p| std::ptr::eq(*p, s))
            .unwrap_or(peers.len());
        for other in &peers[..pos] {
            if let Some(reason) = overlap(s, other) {
                found.push((s.id, Conflict { with: other.id, reason }));
            }
        }
    }
    found
}

use std::collections::BTreeMap;

use types::{CurriculumId, Room, RoomId, RoomPool, Session, SessionKind, Timeslot};

use crate::roster::Roster;

/// Rooms suitable for `kind` that nobody uses at any of `cells`, by name.
pub fn free_rooms(rooms: &[Room], kind: SessionKind, cells: &[&Timeslot], roster: &Roster) -> Vec<RoomId> {
    let mut free: Vec<RoomId> = rooms
        .iter()
        .filter(|r| r.admits(kind))
        .filter(|r| {
            cells.iter().all(|at| {
                roster
                    .occupants(at)
                    .all(|s| s.room.as_ref() != Some(&r.id))
            })
        })
        .map(|r| r.id.clone())
        .collect();
    free.sort();
    free
}

/// The curriculum's preferred room when it is free, else the first free room.
pub fn assign_room(
    session: &Session,
    free_rooms: &[RoomId],
    pools: &BTreeMap<CurriculumId, RoomPool>,
) -> Option<RoomId> {
    let preferred = pools
        .get(&session.curriculum)
        .and_then(|pool| pool.preferred(session.kind()))
        .filter(|room| free_rooms.contains(room));
    preferred.or_else(|| free_rooms.iter().min()).cloned()
}

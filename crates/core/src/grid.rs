//! Ordered (day, slot) coordinates a session can occupy.
//!
//! Every day shares the same slot list. Cells are visited day-major,
//! slot-minor; blocked cells are never produced. The coupled mapping links a
//! lab's first slot to the slot holding its continuation.

use std::collections::{BTreeMap, HashSet};

use types::{DayOfWeek, SlotId, TimeGridDef, Timeslot};

use crate::ValidationError;

#[derive(Clone, Debug)]
pub struct TimeGrid {
    days: Vec<DayOfWeek>,
    slots: Vec<SlotId>,
    coupled: BTreeMap<SlotId, SlotId>,
    blocked: HashSet<Timeslot>,
}

impl TimeGrid {
    pub fn new(def: &TimeGridDef) -> Result<Self, ValidationError> {
        let mut errors = Vec::new();

        if def.days.is_empty() {
            errors.push("grid has no days".to_string());
        }
        let mut seen_days = HashSet::new();
        for d in &def.days {
            if !seen_days.insert(*d) {
                errors.push(format!("grid repeats day {d}"));
            }
        }

        if def.slots.is_empty() {
            errors.push("grid has no slots".to_string());
        }
        let mut seen_slots = HashSet::new();
        for s in &def.slots {
            if s.0.trim().is_empty() {
                errors.push("grid has a blank slot id".to_string());
            } else if !seen_slots.insert(s) {
                errors.push(format!("grid repeats slot {s}"));
            }
        }

        for (first, second) in &def.coupled {
            if !seen_slots.contains(first) || !seen_slots.contains(second) {
                errors.push(format!("coupled slot {first} -> {second} names an unknown slot"));
            } else if first == second {
                errors.push(format!("coupled slot {first} maps onto itself"));
            }
        }

        for cell in &def.blocked {
            if !seen_days.contains(&cell.day) || !seen_slots.contains(&cell.slot) {
                errors.push(format!("blocked cell {cell} is outside the grid"));
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::Invalid(errors));
        }

        Ok(Self {
            days: def.days.clone(),
            slots: def.slots.clone(),
            coupled: def.coupled.clone(),
            blocked: def.blocked.iter().cloned().collect(),
        })
    }

    pub fn days(&self) -> &[DayOfWeek] {
        &self.days
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn is_open(&self, cell: &Timeslot) -> bool {
        self.days.contains(&cell.day) && self.slots.contains(&cell.slot) && !self.blocked.contains(cell)
    }

    /// Number of open cells.
    pub fn len(&self) -> usize {
        self.days.len() * self.slots.len() - self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn coupled_after(&self, slot: &SlotId) -> Option<&SlotId> {
        self.coupled.get(slot)
    }

    pub fn cells(&self) -> impl Iterator<Item = Timeslot> + '_ {
        self.days
            .iter()
            .flat_map(move |&day| {
                self.slots.iter().map(move |slot| Timeslot {
                    day,
                    slot: slot.clone(),
                })
            })
            .filter(move |cell| !self.blocked.contains(cell))
    }

    /// Open cells `(s_i, s_i+1)` sharing a day, in grid order.
    pub fn consecutive_pairs(&self) -> impl Iterator<Item = (Timeslot, Timeslot)> + '_ {
        self.days.iter().flat_map(move |&day| {
            self.slots.windows(2).filter_map(move |w| {
                let first = Timeslot { day, slot: w[0].clone() };
                let second = Timeslot { day, slot: w[1].clone() };
                (!self.blocked.contains(&first) && !self.blocked.contains(&second))
                    .then_some((first, second))
            })
        })
    }

    /// Open `(first, coupled[first])` cells sharing a day, ordered by `first`.
    pub fn coupled_pairs(&self) -> impl Iterator<Item = (Timeslot, Timeslot)> + '_ {
        self.days.iter().flat_map(move |&day| {
            self.slots.iter().filter_map(move |slot| {
                let next = self.coupled.get(slot)?;
                let first = Timeslot { day, slot: slot.clone() };
                let second = Timeslot { day, slot: next.clone() };
                (!self.blocked.contains(&first) && !self.blocked.contains(&second))
                    .then_some((first, second))
            })
        })
    }
}

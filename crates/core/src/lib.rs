pub mod candidates;
pub mod conflict;
pub mod grid;
pub mod roster;
pub mod rooms;
pub mod workload;

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

pub use grid::TimeGrid;
pub use roster::{CommitError, Roster, MAX_SESSION_ID};
pub use types::{
    Catalog, GenerateRequest, GenerateResult, Instructor, Room, RunOptions, Session, Subject,
    SubjectId, TimeGridDef, Timeslot,
};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid input: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl ValidationError {
    pub fn errors(&self) -> &[String] {
        match self {
            ValidationError::Invalid(errs) => errs,
        }
    }
}

fn chk_unique<'a>(name: &str, ids: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            errors.push(format!("{name} has a blank id"));
        } else if !seen.insert(id) {
            errors.push(format!("duplicate {name} id: {id}"));
        }
    }
}

fn chk_hours(what: &str, value: f64, errors: &mut Vec<String>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(format!("{what} has invalid hours {value}"));
    }
}

/// Checks catalog data before a run. Every problem found is reported at once.
pub fn validate(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut errors: Vec<String> = Vec::new();

    if let Err(e) = TimeGrid::new(&catalog.grid) {
        errors.extend(e.errors().iter().cloned());
    }

    chk_unique("subject", catalog.subjects.iter().map(|s| s.id.0.as_str()), &mut errors);
    chk_unique("room", catalog.rooms.iter().map(|r| r.id.0.as_str()), &mut errors);
    chk_unique(
        "instructor",
        catalog.instructors.iter().map(|i| i.id.0.as_str()),
        &mut errors,
    );

    for s in &catalog.subjects {
        for (field, n) in [
            ("sections", s.sections),
            ("tutorialGroups", s.tutorial_groups),
            ("labGroups", s.lab_groups),
            ("labInstructors", s.lab_instructors),
        ] {
            if n < 0 {
                errors.push(format!("subject {} has negative {field} {n}", s.id));
            }
        }
        if s.curriculum.0.trim().is_empty() {
            errors.push(format!("subject {} has no curriculum", s.id));
        }
        for kind in types::SessionKind::ORDER {
            chk_hours(&format!("subject {} {kind}", s.id), s.hours.get(kind), &mut errors);
        }
    }

    for t in &catalog.instructors {
        if t.preferences.len() > 3 {
            errors.push(format!(
                "instructor {} has {} preferences, at most 3 allowed",
                t.id,
                t.preferences.len()
            ));
        }
        let mut ranks = HashSet::new();
        for p in &t.preferences {
            if !(1..=3).contains(&p.rank) {
                errors.push(format!("instructor {} has preference rank {}", t.id, p.rank));
            } else if !ranks.insert(p.rank) {
                errors.push(format!("instructor {} repeats preference rank {}", t.id, p.rank));
            }
            for kind in types::SessionKind::ORDER {
                chk_hours(
                    &format!("instructor {} preference {} {kind}", t.id, p.subject),
                    p.hours.get(kind),
                    &mut errors,
                );
            }
        }
        chk_hours(
            &format!("instructor {} supplementary credit", t.id),
            t.supplementary_hours,
            &mut errors,
        );
    }

    let rooms: HashSet<_> = catalog.rooms.iter().map(|r| &r.id).collect();
    for (curriculum, pool) in &catalog.room_pools {
        for kind in types::SessionKind::ORDER {
            if let Some(room) = pool.preferred(kind) {
                if !rooms.contains(room) {
                    errors.push(format!(
                        "room pool of {curriculum} references missing room {room}"
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(errors))
    }
}

/// Checks run options and subject selection against the catalog.
pub fn validate_request(
    catalog: &Catalog,
    options: &RunOptions,
    only: &[SubjectId],
) -> Result<(), ValidationError> {
    let mut errors = match validate(catalog) {
        Ok(()) => Vec::new(),
        Err(ValidationError::Invalid(errs)) => errs,
    };
    if options.max_iterations == 0 {
        errors.push("maxIterations must be positive".into());
    }
    if !options.tolerance.is_finite() || options.tolerance <= 0.0 {
        errors.push(format!("tolerance must be positive, got {}", options.tolerance));
    }
    for id in only {
        if catalog.subject(id).is_none() {
            errors.push(format!("unknown subject {id}"));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(errors))
    }
}

/// Checks the ids of an existing roster: each assigned id appears once and
/// stays within `MAX_SESSION_ID`.
pub fn validate_roster(sessions: &[Session]) -> Result<(), ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for s in sessions.iter().filter(|s| s.id.is_assigned()) {
        if s.id.0 > MAX_SESSION_ID {
            errors.push(format!("session id {} exceeds {MAX_SESSION_ID}", s.id.0));
        } else if !seen.insert(s.id) {
            errors.push(format!("duplicate session id: {}", s.id.0));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Invalid(errors))
    }
}

#[async_trait]
pub trait Generator: Send + Sync + 'static {
    async fn generate(&self, req: GenerateRequest) -> anyhow::Result<GenerateResult>;
}

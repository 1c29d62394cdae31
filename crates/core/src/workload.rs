//! Credited teaching hours per instructor and the fair reference figure
//! used to balance assignment.
//!
//! Hours are kept unrounded; rounding only happens for display.

use std::collections::HashMap;

use types::{
    Catalog, InstructorId, InstructorLoad, Session, SessionKind, Subject, WorkloadReport,
};

/// Hours a single session credits to one of its instructors.
pub fn session_credit(session: &Session) -> f64 {
    if session.instructors.is_empty() {
        return 0.0;
    }
    match session.kind() {
        SessionKind::Lab => session.hours,
        SessionKind::Lecture | SessionKind::Tutorial => {
            session.hours / session.instructors.len() as f64
        }
    }
}

pub fn credited_hours<'a>(
    instructor: &InstructorId,
    roster: impl IntoIterator<Item = &'a Session>,
    supplementary: f64,
) -> f64 {
    roster
        .into_iter()
        .filter(|s| s.teaches(instructor))
        .map(session_credit)
        .sum::<f64>()
        + supplementary
}

pub fn round_hours(hours: f64) -> i64 {
    hours.round() as i64
}

fn count(n: i32) -> f64 {
    n.max(0) as f64
}

/// Hours a subject asks for over the whole term.
pub fn subject_volume(s: &Subject) -> f64 {
    let sections = count(s.sections);
    s.hours.lecture * sections
        + s.hours.tutorial * sections * count(s.tutorial_groups)
        + s.hours.lab * sections * count(s.lab_groups) * count(s.lab_instructors)
}

pub fn reference_workload(subjects: &[Subject], instructor_count: usize, fixed_credits: f64) -> f64 {
    if instructor_count == 0 {
        return 0.0;
    }
    let volume: f64 = subjects.iter().map(subject_volume).sum();
    (volume + fixed_credits) / instructor_count as f64
}

/// Running hours per instructor, kept in step with the roster during a run.
#[derive(Clone, Debug, Default)]
pub struct WorkloadLedger {
    hours: HashMap<InstructorId, f64>,
}

impl WorkloadLedger {
    pub fn seed(catalog: &Catalog, roster: &[Session]) -> Self {
        let mut hours: HashMap<InstructorId, f64> = catalog
            .instructors
            .iter()
            .map(|i| (i.id.clone(), i.supplementary_hours))
            .collect();
        for s in roster {
            let credit = session_credit(s);
            for i in &s.instructors {
                *hours.entry(i.clone()).or_default() += credit;
            }
        }
        Self { hours }
    }

    pub fn record(&mut self, session: &Session) {
        let credit = session_credit(session);
        for i in &session.instructors {
            *self.hours.entry(i.clone()).or_default() += credit;
        }
    }

    pub fn get(&self, instructor: &InstructorId) -> f64 {
        self.hours.get(instructor).copied().unwrap_or(0.0)
    }

    pub fn as_map(&self) -> &HashMap<InstructorId, f64> {
        &self.hours
    }
}

pub fn workload_report(catalog: &Catalog, roster: &[Session], tolerance: f64) -> WorkloadReport {
    let reference = reference_workload(
        &catalog.subjects,
        catalog.instructors.len(),
        catalog.fixed_credits(),
    );
    let ceiling = reference * tolerance;
    let mut instructors: Vec<InstructorLoad> = catalog
        .instructors
        .iter()
        .map(|i| {
            let credited = credited_hours(&i.id, roster, i.supplementary_hours);
            InstructorLoad {
                instructor: i.id.clone(),
                credited_hours: credited,
                rounded: round_hours(credited),
                ceiling,
                over_ceiling: reference > 0.0 && credited >= ceiling,
            }
        })
        .collect();
    instructors.sort_by(|a, b| a.instructor.cmp(&b.instructor));
    WorkloadReport {
        reference,
        tolerance,
        instructors,
    }
}

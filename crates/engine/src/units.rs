use types::{
    CohortKey, LabHalf, Session, SessionDetail, SessionId, SessionKind, Subject, Timeslot,
};

/// `0 -> A`, `25 -> Z`, `26 -> AA`.
pub fn section_label(mut index: usize) -> String {
    let mut label = Vec::new();
    loop {
        label.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.iter().rev().collect()
}

/// One teaching requirement of a subject: a lecture section, a tutorial
/// group or a lab group.
#[derive(Clone, Debug)]
pub struct Unit<'s> {
    pub subject: &'s Subject,
    pub kind: SessionKind,
    pub section: String,
    pub group: Option<u32>,
}

impl<'s> Unit<'s> {
    pub fn lecture(subject: &'s Subject, section: usize) -> Self {
        Self {
            subject,
            kind: SessionKind::Lecture,
            section: section_label(section),
            group: None,
        }
    }

    pub fn tutorial(subject: &'s Subject, section: usize, group: u32) -> Self {
        Self {
            subject,
            kind: SessionKind::Tutorial,
            section: section_label(section),
            group: Some(group),
        }
    }

    pub fn lab(subject: &'s Subject, section: usize, group: u32) -> Self {
        Self {
            subject,
            kind: SessionKind::Lab,
            section: section_label(section),
            group: Some(group),
        }
    }

    pub fn key(&self) -> CohortKey {
        CohortKey {
            curriculum: self.subject.curriculum.clone(),
            section: self.section.clone(),
            kind: self.kind,
            group: self.group,
        }
    }

    pub fn required_instructors(&self) -> usize {
        match self.kind {
            SessionKind::Lecture | SessionKind::Tutorial => 1,
            SessionKind::Lab => self.subject.lab_instructors.max(0) as usize,
        }
    }

    /// Unresolved session for this unit at `at`, without room or instructors.
    pub fn probe(&self, at: &Timeslot) -> Session {
        let detail = match self.kind {
            SessionKind::Lecture => SessionDetail::Lecture,
            SessionKind::Tutorial => SessionDetail::Tutorial,
            SessionKind::Lab => SessionDetail::Lab {
                half: LabHalf::First,
            },
        };
        self.session(detail, at, self.subject.hours.get(self.kind))
    }

    /// Continuation half of a coupled lab; it credits no hours.
    pub fn continuation(&self, at: &Timeslot) -> Session {
        self.session(
            SessionDetail::Lab {
                half: LabHalf::Second,
            },
            at,
            0.0,
        )
    }

    fn session(&self, detail: SessionDetail, at: &Timeslot, hours: f64) -> Session {
        Session {
            id: SessionId::UNASSIGNED,
            subject: self.subject.id.clone(),
            curriculum: self.subject.curriculum.clone(),
            section: self.section.clone(),
            group: self.group,
            detail,
            at: at.clone(),
            room: None,
            instructors: Vec::new(),
            hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{DayOfWeek, KindHours};

    #[test]
    fn section_labels_are_spreadsheet_letters() {
        let labels: Vec<String> = [0, 1, 25, 26, 27, 51, 52, 701, 702]
            .into_iter()
            .map(section_label)
            .collect();
        assert_eq!(labels, ["A", "B", "Z", "AA", "AB", "AZ", "BA", "ZZ", "AAA"]);
    }

    #[test]
    fn probes_carry_kind_hours_and_continuations_none() {
        let subject = Subject {
            id: "Physics".into(),
            curriculum: "CS1".into(),
            sections: 2,
            tutorial_groups: 0,
            lab_groups: 2,
            lab_instructors: 2,
            hours: KindHours { lecture: 1.5, tutorial: 1.0, lab: 3.0 },
        };
        let unit = Unit::lab(&subject, 1, 2);
        let at = Timeslot::new(DayOfWeek::Wed, "S3");
        let first = unit.probe(&at);
        let second = unit.continuation(&at);
        assert_eq!(first.section, "B");
        assert_eq!(first.hours, 3.0);
        assert_eq!(second.hours, 0.0);
        assert!(second.detail.is_continuation());
        assert_eq!(first.cohort_key(), unit.key());
        assert_eq!(second.cohort_key(), unit.key());
        assert_eq!(unit.required_instructors(), 2);
        assert_eq!(Unit::lecture(&subject, 0).required_instructors(), 1);
    }
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::ToSchema;

mod report;

pub use report::{
    GenerateResult, GenerationReport, InstructorLoad, NoSlotCause, PlacementStats,
    PlacementWarning, RunStatus, WarningReason, WorkloadReport,
};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Hash,
            PartialOrd,
            Ord,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(InstructorId);
id_newtype!(RoomId);
id_newtype!(SubjectId);
id_newtype!(CurriculumId);
id_newtype!(SlotId);

#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
    PartialOrd, Ord,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Id carried by a session that has not been committed to a roster yet.
    pub const UNASSIGNED: SessionId = SessionId(0);

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
    PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "mon",
            DayOfWeek::Tue => "tue",
            DayOfWeek::Wed => "wed",
            DayOfWeek::Thu => "thu",
            DayOfWeek::Fri => "fri",
            DayOfWeek::Sat => "sat",
            DayOfWeek::Sun => "sun",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One (day, slot) coordinate of the time grid.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
pub struct Timeslot {
    pub day: DayOfWeek,
    pub slot: SlotId,
}

impl Timeslot {
    pub fn new(day: DayOfWeek, slot: impl Into<String>) -> Self {
        Self {
            day,
            slot: SlotId(slot.into()),
        }
    }
}

impl fmt::Display for Timeslot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.day, self.slot)
    }
}

#[derive(
    Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash,
    PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Lecture,
    Tutorial,
    Lab,
}

impl SessionKind {
    pub const ORDER: [SessionKind; 3] = [SessionKind::Lecture, SessionKind::Tutorial, SessionKind::Lab];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKind::Lecture => "lecture",
            SessionKind::Tutorial => "tutorial",
            SessionKind::Lab => "lab",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum LabHalf {
    First,
    Second,
}

/// Kind of a session together with the fields only that kind carries.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionDetail {
    Lecture,
    Tutorial,
    Lab { half: LabHalf },
}

impl SessionDetail {
    pub fn kind(self) -> SessionKind {
        match self {
            SessionDetail::Lecture => SessionKind::Lecture,
            SessionDetail::Tutorial => SessionKind::Tutorial,
            SessionDetail::Lab { .. } => SessionKind::Lab,
        }
    }

    pub fn is_continuation(self) -> bool {
        matches!(
            self,
            SessionDetail::Lab {
                half: LabHalf::Second
            }
        )
    }
}

/// Identifies the cohort of students a session serves.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
pub struct CohortKey {
    pub curriculum: CurriculumId,
    pub section: String,
    pub kind: SessionKind,
    #[serde(default)]
    pub group: Option<u32>,
}

impl CohortKey {
    /// Equal keys always overlap; a lecture also gathers every group of its section.
    pub fn overlaps(&self, other: &CohortKey) -> bool {
        if self == other {
            return true;
        }
        self.curriculum == other.curriculum
            && self.section == other.section
            && (self.kind == SessionKind::Lecture || other.kind == SessionKind::Lecture)
    }
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.curriculum, self.section, self.kind)?;
        if let Some(g) = self.group {
            write!(f, "/{g}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub id: SessionId,
    pub subject: SubjectId,
    pub curriculum: CurriculumId,
    pub section: String,
    #[serde(default)]
    pub group: Option<u32>,
    pub detail: SessionDetail,
    pub at: Timeslot,
    #[serde(default)]
    pub room: Option<RoomId>,
    #[serde(default)]
    pub instructors: Vec<InstructorId>,
    pub hours: f64,
}

impl Session {
    pub fn kind(&self) -> SessionKind {
        self.detail.kind()
    }

    pub fn cohort_key(&self) -> CohortKey {
        CohortKey {
            curriculum: self.curriculum.clone(),
            section: self.section.clone(),
            kind: self.kind(),
            group: self.group,
        }
    }

    pub fn teaches(&self, instructor: &InstructorId) -> bool {
        self.instructors.iter().any(|i| i == instructor)
    }
}

/// Credited hours per session kind.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
pub struct KindHours {
    #[serde(default)]
    pub lecture: f64,
    #[serde(default)]
    pub tutorial: f64,
    #[serde(default)]
    pub lab: f64,
}

impl KindHours {
    pub fn get(&self, kind: SessionKind) -> f64 {
        match kind {
            SessionKind::Lecture => self.lecture,
            SessionKind::Tutorial => self.tutorial,
            SessionKind::Lab => self.lab,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub curriculum: CurriculumId,
    pub sections: i32,
    #[serde(default)]
    pub tutorial_groups: i32,
    #[serde(default)]
    pub lab_groups: i32,
    #[serde(default)]
    pub lab_instructors: i32,
    #[serde(default)]
    pub hours: KindHours,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RoomKind {
    Standard,
    LectureHall,
    Lab,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Room {
    pub id: RoomId,
    pub kind: RoomKind,
}

impl Room {
    pub fn is_lab(&self) -> bool {
        self.kind == RoomKind::Lab || self.id.0.to_lowercase().contains("lab")
    }

    pub fn admits(&self, kind: SessionKind) -> bool {
        match kind {
            SessionKind::Lecture => {
                !self.is_lab() && matches!(self.kind, RoomKind::Standard | RoomKind::LectureHall)
            }
            SessionKind::Tutorial => !self.is_lab() && self.kind == RoomKind::Standard,
            SessionKind::Lab => self.is_lab(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct Preference {
    pub subject: SubjectId,
    pub rank: u8,
    #[serde(default)]
    pub hours: KindHours,
}

impl Preference {
    pub fn matches(&self, subject: &SubjectId, kind: SessionKind) -> bool {
        &self.subject == subject && self.hours.get(kind) > 0.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: InstructorId,
    #[serde(default)]
    pub preferences: Vec<Preference>,
    #[serde(default)]
    pub supplementary_hours: f64,
}

impl Instructor {
    /// Best (lowest) rank among preferences matching the subject and kind.
    pub fn preference_rank(&self, subject: &SubjectId, kind: SessionKind) -> Option<u8> {
        self.preferences
            .iter()
            .filter(|p| p.matches(subject, kind))
            .map(|p| p.rank)
            .min()
    }
}

/// Preferred room per session kind for one curriculum.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct RoomPool {
    #[serde(default)]
    pub lecture: Option<RoomId>,
    #[serde(default)]
    pub tutorial: Option<RoomId>,
    #[serde(default)]
    pub lab: Option<RoomId>,
}

impl RoomPool {
    pub fn preferred(&self, kind: SessionKind) -> Option<&RoomId> {
        match kind {
            SessionKind::Lecture => self.lecture.as_ref(),
            SessionKind::Tutorial => self.tutorial.as_ref(),
            SessionKind::Lab => self.lab.as_ref(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
pub struct TimeGridDef {
    pub days: Vec<DayOfWeek>,
    pub slots: Vec<SlotId>,
    #[serde(default)]
    pub coupled: BTreeMap<SlotId, SlotId>,
    #[serde(default)]
    pub blocked: Vec<Timeslot>,
}

fn default_true() -> bool {
    true
}

fn default_max_iterations() -> u64 {
    10_000
}

fn default_tolerance() -> f64 {
    1.5
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunOptions {
    #[serde(default = "default_true")]
    pub assign_instructors: bool,
    #[serde(default = "default_true")]
    pub assign_rooms: bool,
    #[serde(default = "default_true")]
    pub respect_preferences: bool,
    #[serde(default = "default_true")]
    pub avoid_conflicts: bool,
    /// Iterations allowed to a single slot search.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    /// Iterations allowed to the whole run, unbounded when absent.
    #[serde(default)]
    pub run_budget: Option<u64>,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            assign_instructors: true,
            assign_rooms: true,
            respect_preferences: true,
            avoid_conflicts: true,
            max_iterations: default_max_iterations(),
            run_budget: None,
            tolerance: default_tolerance(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    pub grid: TimeGridDef,
    #[serde(default)]
    pub room_pools: BTreeMap<CurriculumId, RoomPool>,
}

impl Catalog {
    pub fn subject(&self, id: &SubjectId) -> Option<&Subject> {
        self.subjects.iter().find(|s| &s.id == id)
    }

    pub fn fixed_credits(&self) -> f64 {
        self.instructors.iter().map(|i| i.supplementary_hours).sum()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub catalog: Catalog,
    #[serde(default)]
    pub options: RunOptions,
    #[serde(default)]
    pub roster: Vec<Session>,
    /// Subjects to process; every subject when empty.
    #[serde(default)]
    pub only: Vec<SubjectId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: SessionKind, section: &str, group: Option<u32>) -> CohortKey {
        CohortKey {
            curriculum: "CS1".into(),
            section: section.into(),
            kind,
            group,
        }
    }

    #[test]
    fn lecture_key_overlaps_groups_of_its_section() {
        let lecture = key(SessionKind::Lecture, "A", None);
        assert!(lecture.overlaps(&key(SessionKind::Tutorial, "A", Some(2))));
        assert!(key(SessionKind::Lab, "A", Some(1)).overlaps(&lecture));
        assert!(!lecture.overlaps(&key(SessionKind::Tutorial, "B", Some(2))));
        assert!(!key(SessionKind::Tutorial, "A", Some(1))
            .overlaps(&key(SessionKind::Tutorial, "A", Some(2))));
        assert!(!key(SessionKind::Tutorial, "A", Some(1))
            .overlaps(&key(SessionKind::Lab, "A", Some(1))));
    }

    #[test]
    fn room_compatibility_follows_kind_and_name() {
        let hall = Room { id: "Amphi 1".into(), kind: RoomKind::LectureHall };
        let std_room = Room { id: "B12".into(), kind: RoomKind::Standard };
        let named_lab = Room { id: "Lab-Chem".into(), kind: RoomKind::Standard };
        let lab = Room { id: "P3".into(), kind: RoomKind::Lab };

        assert!(hall.admits(SessionKind::Lecture));
        assert!(!hall.admits(SessionKind::Tutorial));
        assert!(std_room.admits(SessionKind::Lecture));
        assert!(std_room.admits(SessionKind::Tutorial));
        assert!(!std_room.admits(SessionKind::Lab));
        assert!(named_lab.admits(SessionKind::Lab));
        assert!(!named_lab.admits(SessionKind::Tutorial));
        assert!(lab.admits(SessionKind::Lab));
    }

    #[test]
    fn session_wire_format_is_camel_case_with_tagged_detail() {
        let s = Session {
            id: SessionId(7),
            subject: "Algebra".into(),
            curriculum: "CS1".into(),
            section: "A".into(),
            group: Some(1),
            detail: SessionDetail::Lab { half: LabHalf::Second },
            at: Timeslot::new(DayOfWeek::Tue, "S2"),
            room: None,
            instructors: vec!["Dupont".into()],
            hours: 0.0,
        };
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["detail"]["lab"]["half"], "second");
        assert_eq!(v["at"]["day"], "tue");
        let back: Session = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
        assert!(back.detail.is_continuation());
    }

    #[test]
    fn run_options_fill_defaults() {
        let o: RunOptions = serde_json::from_str(r#"{"assignRooms": false}"#).unwrap();
        assert!(!o.assign_rooms);
        assert!(o.assign_instructors && o.avoid_conflicts && o.respect_preferences);
        assert_eq!(o.max_iterations, 10_000);
        assert_eq!(o.tolerance, 1.5);
    }

    #[test]
    fn preference_rank_ignores_kinds_without_hours() {
        let t = Instructor {
            id: "Martin".into(),
            preferences: vec![
                Preference {
                    subject: "Algebra".into(),
                    rank: 2,
                    hours: KindHours { lecture: 0.0, tutorial: 30.0, lab: 0.0 },
                },
                Preference {
                    subject: "Algebra".into(),
                    rank: 3,
                    hours: KindHours { lecture: 10.0, tutorial: 0.0, lab: 0.0 },
                },
            ],
            supplementary_hours: 0.0,
        };
        let alg = SubjectId::from("Algebra");
        assert_eq!(t.preference_rank(&alg, SessionKind::Tutorial), Some(2));
        assert_eq!(t.preference_rank(&alg, SessionKind::Lecture), Some(3));
        assert_eq!(t.preference_rank(&alg, SessionKind::Lab), None);
    }
}

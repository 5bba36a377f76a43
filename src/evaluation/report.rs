//! Constraint report: every violation set of one schedule.
//!
//! The report is recomputed from scratch each time a
//! [`Schedule`](crate::models::Schedule) is built. Each violation kind keeps
//! its own typed payload so reporting collaborators can resolve the
//! sessions, cohorts and slots involved.
//!
//! # Violation Kinds
//!
//! | Kind | Class | Payload |
//! |------|-------|---------|
//! | Semester collision | hard | [`Collision`] (cohort scope) |
//! | Teacher collision | hard | [`Collision`] (teacher scope) |
//! | Multi-teacher collision | hard | [`Collision`] (co-teacher scope) |
//! | Language session | hard | [`CohortDay`] |
//! | Break hour | hard | [`CohortDay`] |
//! | Friday break | hard | [`CohortDay`] |
//! | Department meeting | hard | [`CohortDay`] |
//! | All slots used | hard | [`CohortDay`] |
//! | Cannot collide | soft | [`CannotCollidePair`] |
//! | Single-session day | soft | [`CohortDay`] |
//! | Teacher availability | soft | [`AvailabilityViolation`] |
//! | Repeated course day | soft | [`RepeatedCourseDay`] |
//! | Empty slot | soft | [`EmptySlot`] |
//! | Free day | bonus | [`CohortDay`] |

use serde::Serialize;

use super::{collisions, daily};
use crate::models::{Catalog, Cohort, Day, DaySlots, Hour, Placement, SessionId, DAYS};

/// Tag of a violation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    SemesterCollision,
    TeacherCollision,
    MultiTeacherCollision,
    LanguageSession,
    BreakHour,
    FridayBreak,
    DepartmentMeeting,
    AllSlotsUsed,
    CannotCollide,
    SingleSessionDay,
    TeacherAvailability,
    RepeatedCourseDay,
    EmptySlot,
    FreeDay,
}

impl ViolationKind {
    /// Every kind, hard ones first.
    pub const ALL: [ViolationKind; 14] = [
        Self::SemesterCollision,
        Self::TeacherCollision,
        Self::MultiTeacherCollision,
        Self::LanguageSession,
        Self::BreakHour,
        Self::FridayBreak,
        Self::DepartmentMeeting,
        Self::AllSlotsUsed,
        Self::CannotCollide,
        Self::SingleSessionDay,
        Self::TeacherAvailability,
        Self::RepeatedCourseDay,
        Self::EmptySlot,
        Self::FreeDay,
    ];

    /// Whether a single occurrence makes the schedule infeasible.
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            Self::SemesterCollision
                | Self::TeacherCollision
                | Self::MultiTeacherCollision
                | Self::LanguageSession
                | Self::BreakHour
                | Self::FridayBreak
                | Self::DepartmentMeeting
                | Self::AllSlotsUsed
        )
    }

    /// Short human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SemesterCollision => "semester collision",
            Self::TeacherCollision => "teacher collision",
            Self::MultiTeacherCollision => "multi-teacher collision",
            Self::LanguageSession => "language session",
            Self::BreakHour => "break hour",
            Self::FridayBreak => "friday break",
            Self::DepartmentMeeting => "department meeting",
            Self::AllSlotsUsed => "all slots used",
            Self::CannotCollide => "cannot collide",
            Self::SingleSessionDay => "single-session day",
            Self::TeacherAvailability => "teacher availability",
            Self::RepeatedCourseDay => "repeated course day",
            Self::EmptySlot => "empty slot",
            Self::FreeDay => "free day",
        }
    }
}

/// Calendar a collision was detected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CollisionScope {
    /// A cohort's timetable.
    Cohort(Cohort),
    /// A teacher's personal timetable (catalog index).
    Teacher(usize),
}

/// Two or more sessions sharing one slot.
///
/// One record per colliding slot: a three-way overlap on one slot yields a
/// single record with three sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collision {
    pub scope: CollisionScope,
    pub day: Day,
    pub slot: Hour,
    pub sessions: Vec<SessionId>,
}

/// A teacher teaching in a slot they declared unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityViolation {
    /// Teacher (catalog index).
    pub teacher: usize,
    pub day: Day,
    pub slot: Hour,
    /// Sessions of the teacher occupying the slot.
    pub sessions: Vec<SessionId>,
}

/// Overlapping sessions of two courses that must never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CannotCollidePair {
    pub first: SessionId,
    pub second: SessionId,
}

/// A day of a cohort's week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CohortDay {
    pub cohort: Cohort,
    pub day: Day,
}

/// Several sessions of one course on the same day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedCourseDay {
    pub cohort: Cohort,
    pub day: Day,
    /// Course (catalog index).
    pub course: usize,
    pub sessions: Vec<SessionId>,
}

/// A free slot inside a cohort's occupied span that is not the break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptySlot {
    pub cohort: Cohort,
    pub day: Day,
    pub slot: Hour,
}

/// All violation sets and derived views of one schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintReport {
    pub semester_collisions: Vec<Collision>,
    pub teacher_collisions: Vec<Collision>,
    pub multi_teacher_collisions: Vec<Collision>,
    pub availability_violations: Vec<AvailabilityViolation>,
    pub cannot_collide: Vec<CannotCollidePair>,
    pub break_hours: Vec<CohortDay>,
    pub friday_breaks: Vec<CohortDay>,
    pub department_meetings: Vec<CohortDay>,
    pub language_sessions: Vec<CohortDay>,
    pub free_days: Vec<CohortDay>,
    pub single_session_days: Vec<CohortDay>,
    pub repeated_course_days: Vec<RepeatedCourseDay>,
    pub empty_slots: Vec<EmptySlot>,
    pub all_slots_used: Vec<CohortDay>,
    /// Occupied span per cohort and day, language hours included.
    pub slot_span: Vec<[u32; DAYS]>,
    /// Legal slots left free per cohort and day.
    pub available_slots: Vec<DaySlots>,
}

impl ConstraintReport {
    /// Evaluates every rule against a full placement vector.
    pub fn evaluate(catalog: &Catalog, placements: &[Placement]) -> Self {
        let mut report = Self {
            semester_collisions: collisions::semester_collisions(catalog, placements),
            teacher_collisions: collisions::teacher_collisions(catalog, placements),
            multi_teacher_collisions: collisions::multi_teacher_collisions(catalog, placements),
            availability_violations: collisions::availability_violations(catalog, placements),
            cannot_collide: collisions::cannot_collide_violations(catalog, placements),
            ..Self::default()
        };
        daily::evaluate_days(catalog, placements, &mut report);
        report
    }

    /// Number of recorded violations of a kind.
    pub fn count(&self, kind: ViolationKind) -> usize {
        match kind {
            ViolationKind::SemesterCollision => self.semester_collisions.len(),
            ViolationKind::TeacherCollision => self.teacher_collisions.len(),
            ViolationKind::MultiTeacherCollision => self.multi_teacher_collisions.len(),
            ViolationKind::LanguageSession => self.language_sessions.len(),
            ViolationKind::BreakHour => self.break_hours.len(),
            ViolationKind::FridayBreak => self.friday_breaks.len(),
            ViolationKind::DepartmentMeeting => self.department_meetings.len(),
            ViolationKind::AllSlotsUsed => self.all_slots_used.len(),
            ViolationKind::CannotCollide => self.cannot_collide.len(),
            ViolationKind::SingleSessionDay => self.single_session_days.len(),
            ViolationKind::TeacherAvailability => self.availability_violations.len(),
            ViolationKind::RepeatedCourseDay => self.repeated_course_days.len(),
            ViolationKind::EmptySlot => self.empty_slots.len(),
            ViolationKind::FreeDay => self.free_days.len(),
        }
    }

    /// Counts of every kind, in [`ViolationKind::ALL`] order.
    pub fn counts(&self) -> Vec<(ViolationKind, usize)> {
        ViolationKind::ALL
            .iter()
            .map(|&kind| (kind, self.count(kind)))
            .collect()
    }

    /// Sum of all hard-violation counts.
    pub fn hard_total(&self) -> usize {
        ViolationKind::ALL
            .iter()
            .filter(|kind| kind.is_hard())
            .map(|&kind| self.count(kind))
            .sum()
    }

    /// Sum of all soft-violation counts (free days excluded).
    pub fn soft_total(&self) -> usize {
        ViolationKind::ALL
            .iter()
            .filter(|kind| !kind.is_hard() && **kind != ViolationKind::FreeDay)
            .map(|&kind| self.count(kind))
            .sum()
    }

    /// Slot span summed over every cohort and day.
    pub fn total_slot_span(&self) -> u32 {
        self.slot_span.iter().flatten().sum()
    }
}

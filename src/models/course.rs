//! Course model and input records.
//!
//! A course belongs to one cohort (department × year) and owns one or more
//! sessions (lecture, lab, ...). [`CourseRecord`] is the shape the external
//! loader hands over; the catalog turns it into a [`Course`] plus one
//! [`Session`](super::Session) per [`SessionRecord`].

use serde::{Deserialize, Serialize};

use super::calendar::{Day, Hour};
use super::teacher::TeacherId;

/// External course identifier as it appears in the input records.
pub type CourseId = u32;

/// Cohort index: `department * YEARS + (year - 1)`.
pub type Cohort = usize;

/// Number of departments.
pub const DEPARTMENTS: usize = 2;
/// Number of study years per department.
pub const YEARS: usize = 4;
/// Number of cohorts (semesters) placed side by side.
pub const COHORTS: usize = DEPARTMENTS * YEARS;

/// Cohort index of a department/year pair.
///
/// `year` is 1-based.
pub fn cohort_index(department: u8, year: u8) -> Cohort {
    usize::from(department) * YEARS + usize::from(year).saturating_sub(1)
}

/// Short cohort label, e.g. `D0-1` for the first year of department 0.
pub fn cohort_name(cohort: Cohort) -> String {
    format!("D{}-{}", cohort / YEARS, cohort % YEARS + 1)
}

/// An immutable course.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course identifier.
    pub id: CourseId,
    /// Display name.
    pub name: String,
    /// Course code.
    pub code: String,
    /// Owning department (0 or 1).
    pub department: u8,
    /// Study year (1..=4).
    pub year: u8,
    /// Courses that must never overlap with this one.
    pub cannot_collide_with: Vec<CourseId>,
}

impl Course {
    /// Cohort this course is taught to.
    #[inline]
    pub fn cohort(&self) -> Cohort {
        cohort_index(self.department, self.year)
    }
}

/// Input record of a course and its sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    /// Unique course identifier.
    pub id: CourseId,
    /// Display name.
    pub name: String,
    /// Course code.
    #[serde(default)]
    pub code: String,
    /// Owning department (0 or 1).
    pub department: u8,
    /// Study year (1..=4).
    pub year: u8,
    /// Courses that must never overlap with this one.
    #[serde(default)]
    pub cannot_collide_with: Vec<CourseId>,
    /// Sessions to place.
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
    /// Whether the course is co-taught by `teachers`.
    #[serde(default)]
    pub has_multi_teachers: bool,
    /// Co-teachers of a multi-teacher course.
    #[serde(default)]
    pub teachers: Vec<TeacherId>,
}

impl CourseRecord {
    /// Creates a course record without sessions.
    pub fn new(id: CourseId, name: impl Into<String>, department: u8, year: u8) -> Self {
        Self {
            id,
            name: name.into(),
            code: String::new(),
            department,
            year,
            cannot_collide_with: Vec::new(),
            sessions: Vec::new(),
            has_multi_teachers: false,
            teachers: Vec::new(),
        }
    }

    /// Sets the course code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Declares a course this one must never overlap with.
    pub fn with_cannot_collide(mut self, course: CourseId) -> Self {
        self.cannot_collide_with.push(course);
        self
    }

    /// Adds a session.
    pub fn with_session(mut self, session: SessionRecord) -> Self {
        self.sessions.push(session);
        self
    }

    /// Marks the course as co-taught by `teachers`.
    pub fn with_co_teachers(mut self, teachers: Vec<TeacherId>) -> Self {
        self.has_multi_teachers = true;
        self.teachers = teachers;
        self
    }

    /// The immutable course part of the record.
    pub fn course(&self) -> Course {
        Course {
            id: self.id,
            name: self.name.clone(),
            code: self.code.clone(),
            department: self.department,
            year: self.year,
            cannot_collide_with: self.cannot_collide_with.clone(),
        }
    }

    /// Total session hours of the course.
    pub fn total_hours(&self) -> u32 {
        self.sessions.iter().map(|s| u32::from(s.length)).sum()
    }
}

/// Input record of one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Assigned teacher.
    pub teacher_id: TeacherId,
    /// Duration in hour slots.
    pub length: u8,
    /// Lab sessions carry a suffix in their display name.
    #[serde(default)]
    pub is_lab: bool,
    /// Display suffix of a lab session.
    #[serde(default)]
    pub suffix: Option<String>,
    /// Whether the placement is pinned.
    #[serde(default)]
    pub is_fixed: bool,
    /// Pinned day (fixed sessions only).
    #[serde(default)]
    pub day: Option<Day>,
    /// Pinned hour (fixed sessions only).
    #[serde(default)]
    pub hour: Option<Hour>,
}

impl SessionRecord {
    /// Creates a regular session record.
    pub fn new(teacher_id: TeacherId, length: u8) -> Self {
        Self {
            teacher_id,
            length,
            is_lab: false,
            suffix: None,
            is_fixed: false,
            day: None,
            hour: None,
        }
    }

    /// Marks the session as a lab with a display suffix.
    pub fn with_lab(mut self, suffix: impl Into<String>) -> Self {
        self.is_lab = true;
        self.suffix = Some(suffix.into());
        self
    }

    /// Pins the session to a day and hour.
    pub fn fixed_at(mut self, day: Day, hour: Hour) -> Self {
        self.is_fixed = true;
        self.day = Some(day);
        self.hour = Some(hour);
        self
    }
}

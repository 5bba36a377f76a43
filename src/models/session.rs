//! Session and placement models.
//!
//! A [`Session`] is the unit the search places. Its descriptor (course,
//! teacher, length, fixed flag) is immutable and lives in the
//! [`Catalog`](super::Catalog); the only mutable part is its [`Placement`],
//! which schedules store in a plain vector indexed by [`SessionId`].

use serde::{Deserialize, Serialize};

use super::calendar::{day_name, Day, Hour, SlotRange};
use super::course::Cohort;

/// Session identifier: the session's position in the catalog.
pub type SessionId = usize;

/// Day and starting hour of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    /// Day index (0 = Monday).
    pub day: Day,
    /// Starting hour slot.
    pub hour: Hour,
}

impl Placement {
    /// Creates a placement.
    pub fn new(day: Day, hour: Hour) -> Self {
        Self { day, hour }
    }

    /// Slots occupied by a session of `length` at this placement.
    #[inline]
    pub fn range(&self, length: u8) -> SlotRange {
        SlotRange::new(self.hour, length)
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}.00", day_name(self.day), self.hour)
    }
}

/// Immutable descriptor of a session.
///
/// `course` and `teacher` are indices into the catalog's arenas, not the
/// external ids of the input records.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    /// Position in the catalog.
    pub id: SessionId,
    /// Owning course (catalog index).
    pub course: usize,
    /// Assigned teacher (catalog index).
    pub teacher: usize,
    /// Cohort of the owning course.
    pub cohort: Cohort,
    /// Duration in hour slots.
    pub length: u8,
    /// Whether this is a lab session.
    pub is_lab: bool,
    /// Display name (course name, plus the lab suffix for labs).
    pub name: String,
    /// Pinned placement of a fixed session.
    pub pinned: Option<Placement>,
}

impl Session {
    /// Whether operators must leave this session where it is.
    #[inline]
    pub fn is_fixed(&self) -> bool {
        self.pinned.is_some()
    }

    /// Display name for a course name and an optional lab suffix.
    pub fn display_name(course_name: &str, lab_suffix: Option<&str>) -> String {
        match lab_suffix {
            Some(suffix) => format!("{course_name} - {suffix}"),
            None => course_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_range() {
        let p = Placement::new(0, 11);
        let r = p.range(2);
        assert_eq!(r.start, 11);
        assert_eq!(r.end, 13);
        assert_eq!(p.to_string(), "Monday 11.00");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Session::display_name("Physics", None), "Physics");
        assert_eq!(Session::display_name("Physics", Some("Lab")), "Physics - Lab");
    }
}

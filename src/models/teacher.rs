//! Teacher model.
//!
//! A teacher is immutable reference data: an identity, a display name, and
//! the hour slots they declared unavailable on each day of the week.

use serde::{Deserialize, Serialize};

use super::calendar::{Day, DaySlots, Hour};

/// External teacher identifier as it appears in the input records.
pub type TeacherId = u32;

/// A teacher who can be assigned to sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: TeacherId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Unavailable hour slots, one list per day.
    #[serde(default)]
    pub unavailable: DaySlots,
}

impl Teacher {
    /// Creates a teacher with no availability restrictions.
    pub fn new(id: TeacherId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            unavailable: DaySlots::default(),
        }
    }

    /// Marks hours of a day as unavailable.
    pub fn with_unavailable(mut self, day: Day, hours: Vec<Hour>) -> Self {
        self.unavailable[day] = hours;
        self
    }

    /// "First Last", trimmed for placeholder teachers with empty names.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the teacher declared `slot` unavailable on `day`.
    #[inline]
    pub fn is_unavailable(&self, day: Day, slot: Hour) -> bool {
        self.unavailable[day].contains(&slot)
    }
}

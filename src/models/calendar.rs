//! Teaching week and slot models.
//!
//! Defines the weekly grid the timetable is placed on: five working days,
//! one-hour slots from 09:00 to 17:00 (the 17 slot ends at 18:00), and the
//! midday break slots 12 and 13 with their day-specific rules.
//!
//! # Slot Model
//! A slot is identified by its starting hour. A session of length `n`
//! starting at `h` occupies the half-open range `[h, h + n)`.
//!
//! # Day Rules
//!
//! | Day | Rule |
//! |-----|------|
//! | Mon, Tue, Thu | 12 and 13 must not both be occupied (lunch break) |
//! | Wed | 13 must stay free (department meeting) |
//! | Fri | 12 and 13 must stay free (Friday prayer) |

use serde::{Deserialize, Serialize};

/// Day index (0 = Monday .. 4 = Friday).
pub type Day = usize;

/// Hour slot, identified by its starting hour (9..=17).
pub type Hour = u8;

/// Free or occupied slots per day of the week.
pub type DaySlots = [Vec<Hour>; DAYS];

/// Number of working days.
pub const DAYS: usize = 5;

pub const MONDAY: Day = 0;
pub const TUESDAY: Day = 1;
pub const WEDNESDAY: Day = 2;
pub const THURSDAY: Day = 3;
pub const FRIDAY: Day = 4;

/// First legal slot of a day.
pub const FIRST_HOUR: Hour = 9;
/// Last legal slot of a day.
pub const LAST_HOUR: Hour = 17;

/// First midday break slot.
pub const BREAK_START: Hour = 12;
/// Second midday break slot (also the Wednesday meeting slot).
pub const BREAK_END: Hour = 13;

/// Days on which 12 and 13 may not both be used.
pub const LUNCH_DAYS: [Day; 3] = [MONDAY, TUESDAY, THURSDAY];

/// Days that should never carry a single session.
pub const MULTI_SESSION_DAYS: [Day; 3] = [MONDAY, THURSDAY, FRIDAY];

/// Days whose break rules already keep the break free, so relocations
/// onto them need no extra break check.
pub const OPEN_BREAK_DAYS: [Day; 2] = [WEDNESDAY, FRIDAY];

const DAY_NAMES: [&str; DAYS] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"];

/// English name of a day index.
pub fn day_name(day: Day) -> &'static str {
    DAY_NAMES.get(day).copied().unwrap_or("?")
}

/// Number of break slots the day rules keep free on `day`.
///
/// Monday, Tuesday and Thursday keep one of 12/13, Wednesday keeps 13,
/// Friday keeps both.
pub fn protected_break_slots(day: Day) -> u32 {
    match day {
        FRIDAY => 2,
        MONDAY | TUESDAY | WEDNESDAY | THURSDAY => 1,
        _ => 0,
    }
}

/// A half-open slot range `[start, end)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SlotRange {
    /// First occupied slot (inclusive).
    pub start: Hour,
    /// First slot after the range (exclusive).
    pub end: Hour,
}

impl SlotRange {
    /// Creates a range of `length` slots starting at `start`.
    pub fn new(start: Hour, length: u8) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    /// Number of slots covered.
    #[inline]
    pub fn len(&self) -> u8 {
        self.end - self.start
    }

    /// Whether the range covers no slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether a slot falls within this range.
    #[inline]
    pub fn contains(&self, slot: Hour) -> bool {
        slot >= self.start && slot < self.end
    }

    /// Whether two ranges share at least one slot.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the range covers both midday break slots.
    pub fn covers_break(&self) -> bool {
        self.contains(BREAK_START) && self.contains(BREAK_END)
    }

    /// Whether the range stays inside the legal hours of a day.
    pub fn is_within_day(&self) -> bool {
        self.start >= FIRST_HOUR && self.end <= LAST_HOUR + 1
    }

    /// Iterates the covered slots.
    pub fn slots(&self) -> impl Iterator<Item = Hour> {
        self.start..self.end
    }
}

/// Weekly foreign-language block shared by every cohort.
///
/// On each of `days`, the slots `start..=end` are reserved for language
/// classes that are not part of the placed sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LanguageBlock {
    /// Days carrying the block.
    pub days: Vec<Day>,
    /// First reserved hour (inclusive).
    pub start: Hour,
    /// Last reserved hour (inclusive).
    pub end: Hour,
}

impl Default for LanguageBlock {
    fn default() -> Self {
        Self {
            days: Vec::new(),
            start: 16,
            end: 17,
        }
    }
}

impl LanguageBlock {
    /// Creates a block on `days` covering `start..=end`.
    pub fn new(days: Vec<Day>, start: Hour, end: Hour) -> Self {
        Self { days, start, end }
    }

    /// Whether `day` carries the block.
    #[inline]
    pub fn is_on(&self, day: Day) -> bool {
        self.days.contains(&day)
    }

    /// Whether `slot` is one of the reserved hours.
    #[inline]
    pub fn contains(&self, slot: Hour) -> bool {
        slot >= self.start && slot <= self.end
    }

    /// Reserved hours of the block.
    pub fn hours(&self) -> impl Iterator<Item = Hour> {
        self.start..=self.end
    }

    /// Number of reserved hours per language day.
    pub fn len(&self) -> u32 {
        if self.end < self.start {
            0
        } else {
            u32::from(self.end - self.start) + 1
        }
    }

    /// Whether the block reserves nothing.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() || self.len() == 0
    }
}

/// Externally configured week layout.
///
/// Combines the department-wide reserved slots (`fixed_slots`, one list per
/// day) with the language block. The legal slots of a day are `9..=17`
/// minus both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WeekCalendar {
    /// Reserved hours per day, unavailable to every cohort.
    pub fixed_slots: DaySlots,
    /// Foreign-language block.
    pub language: LanguageBlock,
}

impl WeekCalendar {
    /// Creates a calendar with no reserved slots and no language block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves hours on a day.
    pub fn with_fixed_slots(mut self, day: Day, hours: Vec<Hour>) -> Self {
        self.fixed_slots[day] = hours;
        self
    }

    /// Sets the language block.
    pub fn with_language(mut self, language: LanguageBlock) -> Self {
        self.language = language;
        self
    }

    /// Whether `day` is a language day.
    #[inline]
    pub fn is_language_day(&self, day: Day) -> bool {
        self.language.is_on(day)
    }

    /// Legal slots of a day, ascending.
    pub fn legal_slots(&self, day: Day) -> Vec<Hour> {
        let language_day = self.is_language_day(day);
        (FIRST_HOUR..=LAST_HOUR)
            .filter(|slot| !self.fixed_slots[day].contains(slot))
            .filter(|slot| !(language_day && self.language.contains(*slot)))
            .collect()
    }

    /// Legal slots of every day.
    pub fn initial_available(&self) -> DaySlots {
        std::array::from_fn(|day| self.legal_slots(day))
    }

    /// Longest run of consecutive legal slots on any day.
    pub fn longest_legal_run(&self) -> usize {
        (0..DAYS)
            .flat_map(|day| consecutive_runs(&self.legal_slots(day)))
            .map(|run| run.len())
            .max()
            .unwrap_or(0)
    }
}

/// Splits ascending slots into runs of consecutive hours.
///
/// `[9, 10, 11, 14, 15]` becomes `[[9, 10, 11], [14, 15]]`.
pub fn consecutive_runs(slots: &[Hour]) -> Vec<Vec<Hour>> {
    let mut runs: Vec<Vec<Hour>> = Vec::new();
    for &slot in slots {
        let extends = runs
            .last()
            .and_then(|run| run.last())
            .is_some_and(|&last| last + 1 == slot);
        match (extends, runs.last_mut()) {
            (true, Some(run)) => run.push(slot),
            _ => runs.push(vec![slot]),
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_range_boundaries() {
        let a = SlotRange::new(11, 2);
        let b = SlotRange::new(13, 3);
        assert_eq!(a.len(), 2);
        assert!(a.contains(12));
        assert!(!a.contains(13));
        assert!(!a.overlaps(&b));
        assert!(SlotRange::new(12, 2).overlaps(&b));
    }

    #[test]
    fn test_slot_range_break_and_day() {
        assert!(SlotRange::new(11, 3).covers_break());
        assert!(!SlotRange::new(12, 1).covers_break());
        assert!(SlotRange::new(16, 2).is_within_day());
        assert!(!SlotRange::new(17, 2).is_within_day());
        assert!(!SlotRange::new(8, 2).is_within_day());
    }

    #[test]
    fn test_legal_slots() {
        let calendar = WeekCalendar::new()
            .with_fixed_slots(MONDAY, vec![9])
            .with_language(LanguageBlock::new(vec![TUESDAY], 16, 17));

        assert_eq!(calendar.legal_slots(MONDAY), vec![10, 11, 12, 13, 14, 15, 16, 17]);
        assert_eq!(calendar.legal_slots(TUESDAY), vec![9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(calendar.legal_slots(FRIDAY).len(), 9);
        assert_eq!(calendar.longest_legal_run(), 9);
    }

    #[test]
    fn test_language_block_len() {
        let block = LanguageBlock::new(vec![1, 2], 16, 17);
        assert_eq!(block.len(), 2);
        assert!(block.is_on(2));
        assert!(!block.is_on(0));
        assert!(LanguageBlock::default().is_empty());
    }

    #[test]
    fn test_consecutive_runs() {
        let runs = consecutive_runs(&[9, 10, 11, 14, 15, 17]);
        assert_eq!(runs, vec![vec![9, 10, 11], vec![14, 15], vec![17]]);
        assert!(consecutive_runs(&[]).is_empty());
    }

    #[test]
    fn test_protected_break_slots() {
        let total: u32 = (0..DAYS).map(protected_break_slots).sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn test_calendar_deserialize() {
        let json = r#"{"fixedSlots": [[9], [], [], [], []], "language": {"days": [1, 2], "start": 16, "end": 17}}"#;
        let calendar: WeekCalendar = serde_json::from_str(json).unwrap();
        assert_eq!(calendar.fixed_slots[MONDAY], vec![9]);
        assert!(calendar.is_language_day(WEDNESDAY));
    }
}

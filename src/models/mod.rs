//! Timetabling domain models.
//!
//! Reference data (teachers, courses, the week calendar) is validated and
//! interned once into a [`Catalog`]. Candidate solutions are [`Schedule`]s:
//! a placement per session plus the evaluation derived from it.
//!
//! # Domain Mappings
//!
//! | u-timetable | Meaning |
//! |-------------|---------|
//! | Cohort | One department/year group, 8 in total |
//! | Session | A fixed-length teaching block of a course |
//! | Placement | Day and starting hour of a session |
//! | Catalog | Validated reference data shared by all schedules |
//! | Schedule | One candidate timetable |

mod calendar;
mod catalog;
mod course;
mod schedule;
mod session;
mod teacher;

pub use calendar::{
    consecutive_runs, day_name, protected_break_slots, Day, DaySlots, Hour, LanguageBlock,
    SlotRange, WeekCalendar, BREAK_END, BREAK_START, DAYS, FIRST_HOUR, FRIDAY, LAST_HOUR,
    LUNCH_DAYS, MONDAY, MULTI_SESSION_DAYS, OPEN_BREAK_DAYS, THURSDAY, TUESDAY, WEDNESDAY,
};
pub use catalog::{Catalog, SharedCourse, DEFAULT_EMPTY_SLOT_TARGET};
pub use course::{
    cohort_index, cohort_name, Cohort, Course, CourseId, CourseRecord, SessionRecord, COHORTS,
    DEPARTMENTS, YEARS,
};
pub use schedule::{Schedule, ScheduledSession};
pub use session::{Placement, Session, SessionId};
pub use teacher::{Teacher, TeacherId};

//! Weekly university timetabling.
//!
//! Places the teaching sessions of eight cohorts (two departments, four
//! years) on a five-day, nine-slot week and improves the placement with an
//! adaptive genetic algorithm.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Catalog`, `Session`, `Placement`, `Schedule`,
//!   `WeekCalendar`, `Teacher`, `CourseRecord`
//! - **`evaluation`**: Constraint evaluation, fitness scoring and KPIs
//! - **`validation`**: Input integrity checks (duplicate IDs, references,
//!   cohorts, session lengths, fixed placements, calendar)
//! - **`ga`**: Initial population, selection, crossover, mutation and the
//!   evolution loop
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use u_timetable::ga::{Evolution, EvolutionConfig};
//! use u_timetable::models::{Catalog, CourseRecord, Teacher, WeekCalendar};
//!
//! # fn input() -> (Vec<Teacher>, Vec<CourseRecord>, WeekCalendar) { unimplemented!() }
//! let (teachers, courses, calendar) = input();
//! let catalog = Arc::new(Catalog::new(teachers, courses, calendar)?);
//! let result = Evolution::new(catalog, EvolutionConfig::default())?.run()?;
//!
//! for row in result.best.entries() {
//!     println!("{} {} {} {}", row.cohort_name, row.day, row.hour, row.name);
//! }
//! # Ok::<(), u_timetable::TimetableError>(())
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"
//! - Eiben & Smith (2015), "Introduction to Evolutionary Computing"

pub mod error;
pub mod evaluation;
pub mod ga;
pub mod models;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{Result, TimetableError};

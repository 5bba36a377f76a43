//! Reference data registry.
//!
//! The catalog is built once from the input records and then shared
//! read-only (behind an `Arc`) by every schedule of a run. It interns
//! teachers, courses and sessions into arenas addressed by index, and
//! precomputes the partitions the evaluator walks on every rebuild:
//! sessions per cohort, per teacher and per course, the cannot-collide
//! index, and the co-taught courses.

use std::collections::HashMap;

use serde::Serialize;

use super::calendar::{DaySlots, WeekCalendar};
use super::course::{Cohort, Course, CourseId, CourseRecord, COHORTS};
use super::session::{Placement, Session, SessionId};
use super::teacher::{Teacher, TeacherId};
use crate::error::Result;
use crate::evaluation::{FitnessBaselines, FitnessScorer, PenaltyWeights};
use crate::validation::validate_input;

/// Default target for the number of empty interior slots.
pub const DEFAULT_EMPTY_SLOT_TARGET: f64 = 5.0;

/// A course taught jointly by several teachers.
///
/// Its sessions count against every co-teacher's personal calendar.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SharedCourse {
    /// Course index.
    pub course: usize,
    /// Co-teacher indices.
    pub teachers: Vec<usize>,
}

/// Validated, interned reference data of one timetabling problem.
#[derive(Debug, Clone)]
pub struct Catalog {
    teachers: Vec<Teacher>,
    courses: Vec<Course>,
    sessions: Vec<Session>,
    calendar: WeekCalendar,
    legal_slots: DaySlots,
    cohort_sessions: Vec<Vec<SessionId>>,
    teacher_sessions: Vec<Vec<SessionId>>,
    course_sessions: Vec<Vec<SessionId>>,
    conflicts: Vec<Vec<usize>>,
    shared_courses: Vec<SharedCourse>,
    scorer: FitnessScorer,
}

impl Catalog {
    /// Validates the input records and builds the catalog.
    ///
    /// Sessions are numbered in course order, then in the order of each
    /// course's session list. Fitness baselines are derived from the data
    /// with the default empty-slot target.
    ///
    /// # Errors
    /// [`TimetableError::InvalidData`](crate::TimetableError::InvalidData)
    /// with every detected problem.
    pub fn new(
        teachers: Vec<Teacher>,
        records: Vec<CourseRecord>,
        calendar: WeekCalendar,
    ) -> Result<Self> {
        validate_input(&teachers, &records, &calendar)?;

        let teacher_index: HashMap<TeacherId, usize> =
            teachers.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        let course_index: HashMap<CourseId, usize> =
            records.iter().enumerate().map(|(i, c)| (c.id, i)).collect();

        let mut courses = Vec::with_capacity(records.len());
        let mut sessions = Vec::new();
        let mut cohort_sessions = vec![Vec::new(); COHORTS];
        let mut teacher_sessions = vec![Vec::new(); teachers.len()];
        let mut course_sessions = vec![Vec::new(); records.len()];
        let mut conflicts = Vec::with_capacity(records.len());
        let mut shared_courses = Vec::new();

        for (course_idx, record) in records.iter().enumerate() {
            let course = record.course();
            let cohort = course.cohort();

            for session in &record.sessions {
                let id = sessions.len();
                let teacher = teacher_index[&session.teacher_id];
                let pinned = match (session.is_fixed, session.day, session.hour) {
                    (true, Some(day), Some(hour)) => Some(Placement::new(day, hour)),
                    _ => None,
                };
                let suffix = if session.is_lab {
                    session.suffix.as_deref()
                } else {
                    None
                };

                sessions.push(Session {
                    id,
                    course: course_idx,
                    teacher,
                    cohort,
                    length: session.length,
                    is_lab: session.is_lab,
                    name: Session::display_name(&course.name, suffix),
                    pinned,
                });
                cohort_sessions[cohort].push(id);
                teacher_sessions[teacher].push(id);
                course_sessions[course_idx].push(id);
            }

            conflicts.push(
                course
                    .cannot_collide_with
                    .iter()
                    .filter_map(|id| course_index.get(id).copied())
                    .filter(|&other| other != course_idx)
                    .collect(),
            );

            if record.has_multi_teachers {
                shared_courses.push(SharedCourse {
                    course: course_idx,
                    teachers: record
                        .teachers
                        .iter()
                        .map(|id| teacher_index[id])
                        .collect(),
                });
            }

            courses.push(course);
        }

        let total_hours: u32 = sessions.iter().map(|s: &Session| u32::from(s.length)).sum();
        let scorer = FitnessScorer::new(
            PenaltyWeights::default(),
            FitnessBaselines::derive(total_hours, &calendar, DEFAULT_EMPTY_SLOT_TARGET),
        );

        Ok(Self {
            teachers,
            courses,
            sessions,
            legal_slots: calendar.initial_available(),
            calendar,
            cohort_sessions,
            teacher_sessions,
            course_sessions,
            conflicts,
            shared_courses,
            scorer,
        })
    }

    /// Replaces the penalty weights.
    pub fn with_weights(mut self, weights: PenaltyWeights) -> Self {
        self.scorer.weights = weights;
        self
    }

    /// Replaces the fitness baselines.
    pub fn with_baselines(mut self, baselines: FitnessBaselines) -> Self {
        self.scorer.baselines = baselines;
        self
    }

    /// Sets the empty-slot target, keeping the derived slot-span baseline.
    pub fn with_empty_slot_target(mut self, target: f64) -> Self {
        self.scorer.baselines.empty_slots = target;
        self
    }

    /// All teachers, in input order.
    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    /// All courses, in input order.
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// All sessions, indexed by [`SessionId`].
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// A session by id.
    #[inline]
    pub fn session(&self, id: SessionId) -> &Session {
        &self.sessions[id]
    }

    /// A course by index.
    #[inline]
    pub fn course(&self, index: usize) -> &Course {
        &self.courses[index]
    }

    /// A teacher by index.
    #[inline]
    pub fn teacher(&self, index: usize) -> &Teacher {
        &self.teachers[index]
    }

    /// The week layout.
    pub fn calendar(&self) -> &WeekCalendar {
        &self.calendar
    }

    /// Legal slots per day, before any session is placed.
    pub fn legal_slots(&self) -> &DaySlots {
        &self.legal_slots
    }

    /// Sessions of a cohort, in catalog order.
    pub fn cohort_sessions(&self, cohort: Cohort) -> &[SessionId] {
        &self.cohort_sessions[cohort]
    }

    /// Sessions assigned to a teacher (shared courses not included).
    pub fn teacher_sessions(&self, teacher: usize) -> &[SessionId] {
        &self.teacher_sessions[teacher]
    }

    /// Sessions of a course.
    pub fn course_sessions(&self, course: usize) -> &[SessionId] {
        &self.course_sessions[course]
    }

    /// Courses the given course must not overlap with.
    pub fn conflicts(&self, course: usize) -> &[usize] {
        &self.conflicts[course]
    }

    /// Co-taught courses.
    pub fn shared_courses(&self) -> &[SharedCourse] {
        &self.shared_courses
    }

    /// The fitness scorer of this problem.
    pub fn scorer(&self) -> &FitnessScorer {
        &self.scorer
    }

    /// Number of sessions every schedule must place.
    #[inline]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Sum of all session lengths.
    pub fn total_session_hours(&self) -> u32 {
        self.sessions.iter().map(|s| u32::from(s.length)).sum()
    }
}

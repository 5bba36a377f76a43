//! Input validation for timetabling problems.
//!
//! Checks structural integrity of teachers, courses, sessions and the week
//! calendar before any schedule is built. Detects:
//! - Duplicate IDs
//! - References to unknown teachers or courses
//! - Courses outside the department/year grid
//! - Sessions that cannot fit into any day
//! - Fixed sessions without a legal pinned placement, or overlapping each other
//! - Cohorts without any session
//! - Malformed calendars and multi-teacher declarations
//!
//! All problems are collected; validation never stops at the first one.

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{
    cohort_name, CourseRecord, SlotRange, Teacher, WeekCalendar, COHORTS, DAYS, DEPARTMENTS,
    FIRST_HOUR, LAST_HOUR, YEARS,
};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind:?}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A session references a teacher that doesn't exist.
    InvalidTeacherReference,
    /// A cannot-collide entry references a course that doesn't exist.
    InvalidCourseReference,
    /// Department or year outside the cohort grid.
    InvalidCohort,
    /// Session length is zero or longer than any legal run of slots.
    InvalidSessionLength,
    /// A fixed session lacks a day/hour, leaves the legal slots, or overlaps
    /// another fixed session of its cohort.
    InvalidFixedPlacement,
    /// A cohort has no session to place.
    EmptyCohort,
    /// Reserved or language slots outside the week grid.
    InvalidCalendar,
    /// A multi-teacher course without co-teachers or sessions.
    InvalidSharedCourse,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the reference data of a timetabling problem.
///
/// Checks:
/// 1. The calendar only reserves slots inside the week grid
/// 2. No duplicate teacher or course IDs
/// 3. Every course belongs to a valid cohort
/// 4. Every session references an existing teacher
/// 5. Every session length fits into some run of legal slots
/// 6. Every fixed session carries a day and hour on legal slots, and no two
///    fixed sessions of a cohort overlap
/// 7. Every cannot-collide entry references an existing course
/// 8. Multi-teacher courses name existing co-teachers and own a session
/// 9. Every cohort has at least one session
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    teachers: &[Teacher],
    courses: &[CourseRecord],
    calendar: &WeekCalendar,
) -> ValidationResult {
    let mut errors = Vec::new();

    validate_calendar(calendar, &mut errors);

    let mut teacher_ids = HashSet::new();
    for t in teachers {
        if !teacher_ids.insert(t.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate teacher ID: {}", t.id),
            ));
        }
    }

    let mut course_ids = HashSet::new();
    for course in courses {
        if !course_ids.insert(course.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate course ID: {}", course.id),
            ));
        }
    }

    let longest_run = calendar.longest_legal_run();
    let mut session_counts = [0usize; COHORTS];
    let mut fixed_ranges = Vec::new();

    for course in courses {
        let cohort_ok = usize::from(course.department) < DEPARTMENTS
            && (1..=YEARS).contains(&usize::from(course.year));
        if cohort_ok {
            session_counts[course.course().cohort()] += course.sessions.len();
        } else {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCohort,
                format!(
                    "Course '{}' has department {} / year {} outside the cohort grid",
                    course.id, course.department, course.year
                ),
            ));
        }

        for (index, session) in course.sessions.iter().enumerate() {
            if !teacher_ids.contains(&session.teacher_id) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTeacherReference,
                    format!(
                        "Session {} of course '{}' references unknown teacher '{}'",
                        index, course.id, session.teacher_id
                    ),
                ));
            }

            if session.length == 0 || usize::from(session.length) > longest_run {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSessionLength,
                    format!(
                        "Session {} of course '{}' has length {} (longest legal run is {})",
                        index, course.id, session.length, longest_run
                    ),
                ));
            }

            if session.is_fixed {
                let placed = match (session.day, session.hour) {
                    (Some(day), Some(hour)) => {
                        let range = SlotRange::new(hour, session.length);
                        (day < DAYS && range.is_within_day()).then_some((day, range))
                    }
                    _ => None,
                };
                match placed {
                    None => errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidFixedPlacement,
                        format!(
                            "Fixed session {} of course '{}' has no legal day/hour ({:?}/{:?})",
                            index, course.id, session.day, session.hour
                        ),
                    )),
                    Some((day, range)) => {
                        let legal = calendar.legal_slots(day);
                        if let Some(slot) = range.slots().find(|slot| !legal.contains(slot)) {
                            errors.push(ValidationError::new(
                                ValidationErrorKind::InvalidFixedPlacement,
                                format!(
                                    "Fixed session {} of course '{}' occupies reserved slot {} \
                                     on day {}",
                                    index, course.id, slot, day
                                ),
                            ));
                        } else if cohort_ok {
                            let cohort = course.course().cohort();
                            fixed_ranges.push((cohort, day, range, course.id, index));
                        }
                    }
                }
            }
        }

        for other in &course.cannot_collide_with {
            if !course_ids.contains(other) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCourseReference,
                    format!(
                        "Course '{}' cannot collide with unknown course '{}'",
                        course.id, other
                    ),
                ));
            }
        }

        if course.has_multi_teachers {
            if course.teachers.is_empty() || course.sessions.is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidSharedCourse,
                    format!(
                        "Multi-teacher course '{}' needs co-teachers and a session",
                        course.id
                    ),
                ));
            }
            for teacher in &course.teachers {
                if !teacher_ids.contains(teacher) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidTeacherReference,
                        format!(
                            "Multi-teacher course '{}' references unknown teacher '{}'",
                            course.id, teacher
                        ),
                    ));
                }
            }
        }
    }

    for (i, &(cohort, day, range, course_id, index)) in fixed_ranges.iter().enumerate() {
        for &(other_cohort, other_day, other_range, other_course, other_index) in
            &fixed_ranges[i + 1..]
        {
            if cohort == other_cohort && day == other_day && range.overlaps(&other_range) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidFixedPlacement,
                    format!(
                        "Fixed sessions {} of course '{}' and {} of course '{}' overlap in cohort {}",
                        index,
                        course_id,
                        other_index,
                        other_course,
                        cohort_name(cohort)
                    ),
                ));
            }
        }
    }

    for (cohort, &count) in session_counts.iter().enumerate() {
        if count == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyCohort,
                format!("Cohort {} has no sessions", cohort_name(cohort)),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_calendar(calendar: &WeekCalendar, errors: &mut Vec<ValidationError>) {
    let in_grid = |slot: u8| (FIRST_HOUR..=LAST_HOUR).contains(&slot);

    for (day, hours) in calendar.fixed_slots.iter().enumerate() {
        for &hour in hours {
            if !in_grid(hour) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidCalendar,
                    format!("Reserved slot {hour} on day {day} is outside {FIRST_HOUR}..={LAST_HOUR}"),
                ));
            }
        }
    }

    let language = &calendar.language;
    if let Some(day) = language.days.iter().find(|&&d| d >= DAYS) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCalendar,
            format!("Language day {day} is outside the week"),
        ));
    }
    if !language.days.is_empty()
        && (language.start > language.end || !in_grid(language.start) || !in_grid(language.end))
    {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidCalendar,
            format!(
                "Language block {}..={} is not a range inside the day",
                language.start, language.end
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageBlock, SessionRecord, MONDAY, TUESDAY, WEDNESDAY};
    use crate::testing;

    #[test]
    fn test_valid_input() {
        let (teachers, courses, calendar) = testing::sample_input();
        assert!(validate_input(&teachers, &courses, &calendar).is_ok());
    }

    #[test]
    fn test_duplicate_teacher_id() {
        let (mut teachers, courses, calendar) = testing::sample_input();
        teachers.push(Teacher::new(0, "Dup", "Licate"));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("teacher")));
    }

    #[test]
    fn test_duplicate_course_id() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        let copy = courses[0].clone();
        courses.push(copy);

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("course")));
    }

    #[test]
    fn test_unknown_teacher() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        courses[0].sessions.push(SessionRecord::new(999, 2));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidTeacherReference));
    }

    #[test]
    fn test_session_too_long() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        courses[0].sessions.push(SessionRecord::new(0, 10));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSessionLength));
    }

    #[test]
    fn test_fixed_session_without_placement() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        let mut session = SessionRecord::new(0, 2);
        session.is_fixed = true;
        courses[0].sessions.push(session);
        courses[1].sessions.push(SessionRecord::new(0, 3).fixed_at(0, 16));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        let fixed_errors = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidFixedPlacement)
            .count();
        assert_eq!(fixed_errors, 2);
    }

    #[test]
    fn test_fixed_session_on_reserved_slot() {
        let (teachers, mut courses, _) = testing::sample_input();
        let calendar = testing::calendar().with_fixed_slots(MONDAY, vec![11]);
        courses[0]
            .sessions
            .push(SessionRecord::new(0, 2).fixed_at(MONDAY, 10));
        courses[2]
            .sessions
            .push(SessionRecord::new(1, 2).fixed_at(TUESDAY, 15));
        courses[6]
            .sessions
            .push(SessionRecord::new(3, 2).fixed_at(MONDAY, 9));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        let reserved: Vec<&ValidationError> = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidFixedPlacement)
            .collect();
        assert_eq!(reserved.len(), 2);
        assert!(reserved[0].message.contains("reserved slot 11"));
        assert!(reserved[1].message.contains("reserved slot 16"));
    }

    #[test]
    fn test_overlapping_fixed_sessions() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        // Course 21 shares cohort 2 with the session fixed on Wednesday 9.00.
        courses[5]
            .sessions
            .push(SessionRecord::new(5, 2).fixed_at(WEDNESDAY, 10));
        courses[6]
            .sessions
            .push(SessionRecord::new(3, 2).fixed_at(WEDNESDAY, 9));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::InvalidFixedPlacement);
        assert!(errors[0].message.contains("overlap in cohort D0-3"));
    }

    #[test]
    fn test_unknown_cannot_collide_course() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        courses[0].cannot_collide_with.push(4242);

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidCourseReference));
    }

    #[test]
    fn test_empty_cohort() {
        let (teachers, courses, calendar) = testing::sample_input();
        let courses: Vec<CourseRecord> = courses
            .into_iter()
            .filter(|c| c.course().cohort() != 7)
            .collect();

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::EmptyCohort && e.message.contains("D1-4")));
    }

    #[test]
    fn test_invalid_cohort() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        courses[0].year = 5;

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidCohort));
    }

    #[test]
    fn test_invalid_calendar() {
        let (teachers, courses, _) = testing::sample_input();
        let calendar = WeekCalendar::new()
            .with_fixed_slots(0, vec![20])
            .with_language(LanguageBlock::new(vec![6], 17, 16));

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        let calendar_errors = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidCalendar)
            .count();
        assert_eq!(calendar_errors, 3);
    }

    #[test]
    fn test_shared_course_without_teachers() {
        let (teachers, mut courses, calendar) = testing::sample_input();
        courses[0].has_multi_teachers = true;
        courses[0].teachers.clear();

        let errors = validate_input(&teachers, &courses, &calendar).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::InvalidSharedCourse));
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::new(ValidationErrorKind::EmptyCohort, "Cohort D0-1 has no sessions");
        assert_eq!(err.to_string(), "EmptyCohort: Cohort D0-1 has no sessions");
    }
}

//! Shared fixtures for unit tests.

use std::sync::Arc;

use crate::models::{
    Catalog, CourseRecord, LanguageBlock, Placement, SessionRecord, Teacher, WeekCalendar,
    COHORTS, MONDAY, TUESDAY, WEDNESDAY,
};

/// Teacher used by the shared course's session itself.
pub(crate) const PLACEHOLDER_TEACHER: u32 = 8;

pub(crate) fn teachers() -> Vec<Teacher> {
    let mut teachers: Vec<Teacher> = (0..8)
        .map(|id| Teacher::new(id, format!("First{id}"), format!("Last{id}")))
        .collect();
    teachers.push(Teacher::new(PLACEHOLDER_TEACHER, "", ""));
    teachers
}

pub(crate) fn calendar() -> WeekCalendar {
    WeekCalendar::new().with_language(LanguageBlock::new(vec![TUESDAY, WEDNESDAY], 16, 17))
}

/// One two-hour session per cohort: course `c`, taught by teacher `c`.
pub(crate) fn minimal_input() -> (Vec<Teacher>, Vec<CourseRecord>, WeekCalendar) {
    let courses = (0..COHORTS)
        .map(|cohort| {
            let (department, year) = ((cohort / 4) as u8, (cohort % 4 + 1) as u8);
            CourseRecord::new(cohort as u32, format!("Course {cohort}"), department, year)
                .with_code(format!("C{cohort}"))
                .with_session(SessionRecord::new(cohort as u32, 2))
        })
        .collect();
    (teachers(), courses, calendar())
}

/// Two courses per cohort plus a cannot-collide pair, a fixed session
/// and a co-taught course.
///
/// - course `10c` has sessions of 3 and 2 hours, course `10c + 1` two of 2 hours
/// - courses 0 and 10 must not collide
/// - the two-hour session of course 20 is fixed on Wednesday 9.00
/// - course 31 (cohort 3) is a one-session seminar co-taught by teachers 0 and 1
pub(crate) fn sample_input() -> (Vec<Teacher>, Vec<CourseRecord>, WeekCalendar) {
    let mut courses = Vec::new();
    for cohort in 0..COHORTS {
        let (department, year) = ((cohort / 4) as u8, (cohort % 4 + 1) as u8);
        let base = (cohort * 10) as u32;
        let first_teacher = (cohort % 8) as u32;
        let second_teacher = ((cohort + 3) % 8) as u32;

        let mut first = CourseRecord::new(base, format!("Course {base}"), department, year)
            .with_code(format!("C{base}"))
            .with_session(SessionRecord::new(first_teacher, 3));
        first = if cohort == 2 {
            first.with_session(SessionRecord::new(first_teacher, 2).fixed_at(WEDNESDAY, 9))
        } else {
            first.with_session(SessionRecord::new(first_teacher, 2).with_lab("Lab"))
        };
        if cohort == 0 {
            first = first.with_cannot_collide(10);
        }

        let mut second =
            CourseRecord::new(base + 1, format!("Course {}", base + 1), department, year)
                .with_code(format!("C{}", base + 1))
                .with_session(SessionRecord::new(second_teacher, 2))
                .with_session(SessionRecord::new(second_teacher, 2));
        if cohort == 3 {
            second = CourseRecord::new(base + 1, "Seminar", department, year)
                .with_code("SEM")
                .with_session(SessionRecord::new(PLACEHOLDER_TEACHER, 2))
                .with_co_teachers(vec![0, 1]);
        }

        courses.push(first);
        courses.push(second);
    }
    (teachers(), courses, calendar())
}

pub(crate) fn catalog(input: (Vec<Teacher>, Vec<CourseRecord>, WeekCalendar)) -> Arc<Catalog> {
    let (teachers, courses, calendar) = input;
    Arc::new(Catalog::new(teachers, courses, calendar).expect("fixture must validate"))
}

pub(crate) fn minimal_catalog() -> Arc<Catalog> {
    catalog(minimal_input())
}

pub(crate) fn sample_catalog() -> Arc<Catalog> {
    catalog(sample_input())
}

/// Every session on Monday 9.00, fixed sessions at their pinned slot.
pub(crate) fn monday_placements(catalog: &Catalog) -> Vec<Placement> {
    catalog
        .sessions()
        .iter()
        .map(|s| s.pinned.unwrap_or(Placement::new(MONDAY, 9)))
        .collect()
}

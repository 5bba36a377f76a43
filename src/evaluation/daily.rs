//! Per-cohort, per-day rule pass.
//!
//! One walk over every (cohort, day) computes the break, Friday, meeting and
//! language rules, free and single-session days, repeated courses, slot span,
//! remaining available slots and empty interior slots. The all-slots-used
//! check runs on the resulting available-slot table.

use std::collections::{BTreeMap, BTreeSet};

use super::report::{CohortDay, ConstraintReport, EmptySlot, RepeatedCourseDay};
use crate::models::{
    Catalog, Cohort, DaySlots, Hour, Placement, SessionId, BREAK_END, BREAK_START, COHORTS,
    DAYS, FRIDAY, LUNCH_DAYS, MULTI_SESSION_DAYS, WEDNESDAY,
};

/// Runs the daily rules for every cohort and appends to `report`.
pub(crate) fn evaluate_days(
    catalog: &Catalog,
    placements: &[Placement],
    report: &mut ConstraintReport,
) {
    for cohort in 0..COHORTS {
        let (span, available) = evaluate_cohort(catalog, placements, cohort, report);

        // Wednesday and Friday are left out of this check.
        for day in LUNCH_DAYS {
            if available[day].is_empty() {
                report.all_slots_used.push(CohortDay { cohort, day });
            }
        }

        report.slot_span.push(span);
        report.available_slots.push(available);
    }
}

fn evaluate_cohort(
    catalog: &Catalog,
    placements: &[Placement],
    cohort: Cohort,
    report: &mut ConstraintReport,
) -> ([u32; DAYS], DaySlots) {
    let calendar = catalog.calendar();
    let language = &calendar.language;
    let mut span = [0u32; DAYS];
    let mut available = catalog.legal_slots().clone();

    for day in 0..DAYS {
        let sessions: Vec<SessionId> = catalog
            .cohort_sessions(cohort)
            .iter()
            .copied()
            .filter(|&id| placements[id].day == day)
            .collect();
        let used: BTreeSet<Hour> = sessions
            .iter()
            .flat_map(|&id| placements[id].range(catalog.session(id).length).slots())
            .collect();
        available[day].retain(|slot| !used.contains(slot));

        let at = CohortDay { cohort, day };
        let language_day = calendar.is_language_day(day);

        if LUNCH_DAYS.contains(&day) && used.contains(&BREAK_START) && used.contains(&BREAK_END) {
            report.break_hours.push(at);
        }
        if used.is_empty() && !language_day {
            report.free_days.push(at);
        }
        if day == FRIDAY && (used.contains(&BREAK_START) || used.contains(&BREAK_END)) {
            report.friday_breaks.push(at);
        }
        if day == WEDNESDAY && used.contains(&BREAK_END) {
            report.department_meetings.push(at);
        }
        if language_day && (used.contains(&language.start) || used.contains(&language.end)) {
            report.language_sessions.push(at);
        }
        let single = sessions.len() == 1 && MULTI_SESSION_DAYS.contains(&day);
        if single || (sessions.is_empty() && language_day) {
            report.single_session_days.push(at);
        }

        let mut by_course: BTreeMap<usize, Vec<SessionId>> = BTreeMap::new();
        for &id in &sessions {
            by_course.entry(catalog.session(id).course).or_default().push(id);
        }
        report.repeated_course_days.extend(
            by_course
                .into_iter()
                .filter(|(_, ids)| ids.len() > 1)
                .map(|(course, sessions)| RepeatedCourseDay {
                    cohort,
                    day,
                    course,
                    sessions,
                }),
        );

        let mut occupied = used;
        if language_day {
            occupied.insert(language.start);
            occupied.insert(language.end);
        }
        let (Some(&first), Some(&last)) = (occupied.first(), occupied.last()) else {
            continue;
        };
        span[day] = u32::from(last - first) + 1;

        report.empty_slots.extend(
            interior_free_slots(first, last, &available[day])
                .into_iter()
                .map(|slot| EmptySlot { cohort, day, slot }),
        );
    }

    (span, available)
}

/// Free slots between `first` and `last`, minus one break slot.
///
/// Slot 13 is treated as the break when it is free, otherwise slot 12.
fn interior_free_slots(first: Hour, last: Hour, available: &[Hour]) -> Vec<Hour> {
    let mut gaps: Vec<Hour> = (first..=last).filter(|slot| available.contains(slot)).collect();
    if let Some(pos) = gaps.iter().position(|&slot| slot == BREAK_END) {
        gaps.remove(pos);
    } else if let Some(pos) = gaps.iter().position(|&slot| slot == BREAK_START) {
        gaps.remove(pos);
    }
    gaps
}

//! Candidate timetable.
//!
//! A [`Schedule`] is one full candidate solution: a placement for every
//! session of the catalog, plus the constraint report and fitness derived
//! from those placements. Schedules are values: changing a placement means
//! building a new schedule from a modified placement vector, which re-runs
//! the evaluator in full.

use std::sync::Arc;

use serde::Serialize;

use super::calendar::{Day, DaySlots, Hour};
use super::catalog::Catalog;
use super::course::{cohort_name, Cohort};
use super::session::{Placement, SessionId};
use crate::evaluation::{ConstraintReport, Fitness, TimetableKpi};

/// A full assignment of sessions to (day, hour) with its evaluation.
#[derive(Debug, Clone)]
pub struct Schedule {
    catalog: Arc<Catalog>,
    placements: Vec<Placement>,
    report: ConstraintReport,
    fitness: Fitness,
}

impl Schedule {
    /// Builds and evaluates a schedule.
    ///
    /// # Panics
    /// If `placements` does not hold exactly one entry per catalog session,
    /// or moves a fixed session off its pinned placement.
    pub fn new(catalog: Arc<Catalog>, placements: Vec<Placement>) -> Self {
        assert_eq!(
            placements.len(),
            catalog.session_count(),
            "a schedule must place every session"
        );
        assert!(
            catalog
                .sessions()
                .iter()
                .all(|s| s.pinned.map_or(true, |p| placements[s.id] == p)),
            "fixed sessions must keep their pinned placement"
        );

        let report = ConstraintReport::evaluate(&catalog, &placements);
        let fitness = catalog.scorer().score(&report);
        Self {
            catalog,
            placements,
            report,
            fitness,
        }
    }

    /// Builds a new schedule over the same catalog.
    pub fn rebuild(&self, placements: Vec<Placement>) -> Self {
        Self::new(Arc::clone(&self.catalog), placements)
    }

    /// Builds a new schedule with some sessions moved.
    ///
    /// # Panics
    /// If a move targets a fixed session.
    pub fn with_moves(&self, moves: &[(SessionId, Placement)]) -> Self {
        let mut placements = self.placements.clone();
        for &(id, placement) in moves {
            placements[id] = placement;
        }
        self.rebuild(placements)
    }

    /// The shared reference data.
    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Placements indexed by [`SessionId`].
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Placement of one session.
    #[inline]
    pub fn placement(&self, id: SessionId) -> Placement {
        self.placements[id]
    }

    /// Every violation set of this schedule.
    pub fn report(&self) -> &ConstraintReport {
        &self.report
    }

    /// Fitness score (higher is better).
    #[inline]
    pub fn fitness(&self) -> f64 {
        self.fitness.value
    }

    /// Whether no hard violation remains.
    #[inline]
    pub fn is_feasible(&self) -> bool {
        self.fitness.feasible
    }

    /// Whether every session of the catalog is placed.
    pub fn has_all_sessions(&self) -> bool {
        self.placements.len() == self.catalog.session_count()
    }

    /// Legal slots a cohort still has free, per day.
    pub fn available_slots(&self, cohort: Cohort) -> &DaySlots {
        &self.report.available_slots[cohort]
    }

    /// A cohort's sessions on one day, ordered by hour.
    pub fn cohort_day(&self, cohort: Cohort, day: Day) -> Vec<SessionId> {
        let mut ids: Vec<SessionId> = self
            .catalog
            .cohort_sessions(cohort)
            .iter()
            .copied()
            .filter(|&id| self.placements[id].day == day)
            .collect();
        ids.sort_by_key(|&id| self.placements[id].hour);
        ids
    }

    /// A teacher's sessions, shared courses they co-teach included,
    /// ordered by day and hour.
    pub fn teacher_sessions(&self, teacher: usize) -> Vec<SessionId> {
        let mut ids = self.catalog.teacher_sessions(teacher).to_vec();
        for shared in self.catalog.shared_courses() {
            if shared.teachers.contains(&teacher) {
                for &id in self.catalog.course_sessions(shared.course) {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        ids.sort_by_key(|&id| (self.placements[id].day, self.placements[id].hour));
        ids
    }

    /// Resolved rows for export, ordered by cohort, day and hour.
    pub fn entries(&self) -> Vec<ScheduledSession> {
        let mut rows: Vec<ScheduledSession> = self
            .catalog
            .sessions()
            .iter()
            .map(|session| {
                let course = self.catalog.course(session.course);
                let placement = self.placements[session.id];
                ScheduledSession {
                    session: session.id,
                    name: session.name.clone(),
                    course_code: course.code.clone(),
                    course_name: course.name.clone(),
                    teacher: self.catalog.teacher(session.teacher).full_name(),
                    cohort: session.cohort,
                    cohort_name: cohort_name(session.cohort),
                    day: placement.day,
                    hour: placement.hour,
                    length: session.length,
                    is_fixed: session.is_fixed(),
                }
            })
            .collect();
        rows.sort_by_key(|row| (row.cohort, row.day, row.hour));
        rows
    }

    /// Quality summary.
    pub fn kpi(&self) -> TimetableKpi {
        TimetableKpi::calculate(self)
    }
}

/// One session of a schedule with its reference data resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub session: SessionId,
    /// Display name (lab suffix included).
    pub name: String,
    pub course_code: String,
    pub course_name: String,
    /// Teacher full name.
    pub teacher: String,
    pub cohort: Cohort,
    pub cohort_name: String,
    pub day: Day,
    pub hour: Hour,
    pub length: u8,
    pub is_fixed: bool,
}

//! Fitness scoring.
//!
//! Reduces a [`ConstraintReport`] to a scalar score and a feasibility flag.
//! Higher is better.
//!
//! # Score
//!
//! ```text
//! score = base
//!       - collision  * (semester + teacher + multi-teacher + language)
//!       - break_rule * (friday + break hour + meeting)
//!       - all_slots_used * all-slots-used days
//!       - soft weights * soft counts
//!       - slot_span  * (total span - (span baseline - free days))
//!       - empty_slot * (empty slots - empty baseline)
//!       + free_day_bonus * free days
//! ```
//!
//! A schedule with any hard violation loses `infeasible_discount` of its
//! score and is infeasible; otherwise it gains `feasible_bonus`.
//!
//! The deviation terms are not clamped: a span or empty-slot count below its
//! baseline raises the score.

use serde::{Deserialize, Serialize};

use super::report::{ConstraintReport, ViolationKind};
use crate::models::{protected_break_slots, WeekCalendar, COHORTS, DAYS};

/// Weights of every score term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PenaltyWeights {
    /// Starting score.
    pub base_score: f64,
    /// Semester, teacher, multi-teacher and language collisions.
    pub collision: f64,
    /// Break-hour, Friday and department-meeting violations.
    pub break_rule: f64,
    /// Lunch days without any free legal slot.
    pub all_slots_used: f64,
    pub cannot_collide: f64,
    pub single_session_day: f64,
    pub availability: f64,
    pub repeated_course: f64,
    /// Per slot of span above the baseline.
    pub slot_span: f64,
    /// Per empty slot above the baseline.
    pub empty_slot: f64,
    /// Reward per free day.
    pub free_day_bonus: f64,
    /// Fraction of the score removed from infeasible schedules.
    pub infeasible_discount: f64,
    /// Fraction of the score added to feasible schedules.
    pub feasible_bonus: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            base_score: 50.0,
            collision: 2.0,
            break_rule: 3.0,
            all_slots_used: 3.0,
            cannot_collide: 0.5,
            single_session_day: 0.4,
            availability: 0.3,
            repeated_course: 0.2,
            slot_span: 0.25,
            empty_slot: 0.15,
            free_day_bonus: 1.0,
            infeasible_discount: 0.1,
            feasible_bonus: 0.2,
        }
    }
}

/// Expected totals the deviation terms are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessBaselines {
    /// Expected week-wide slot span with no free day.
    pub slot_span: f64,
    /// Tolerated number of empty interior slots.
    pub empty_slots: f64,
}

impl FitnessBaselines {
    /// Derives the baselines from the curriculum.
    ///
    /// The slot-span baseline is the span of a gap-free week: every session
    /// hour, plus the break slots the day rules keep free inside each
    /// cohort's days, plus the language block on every language day.
    pub fn derive(total_session_hours: u32, calendar: &WeekCalendar, empty_slots: f64) -> Self {
        let cohorts = COHORTS as u32;
        let breaks: u32 = (0..DAYS).map(protected_break_slots).sum();
        let language_days = calendar
            .language
            .days
            .iter()
            .filter(|&&day| day < DAYS)
            .count() as u32;
        let language = language_days * calendar.language.len();

        Self {
            slot_span: f64::from(total_session_hours + cohorts * breaks + cohorts * language),
            empty_slots,
        }
    }
}

/// Score and feasibility of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fitness {
    pub value: f64,
    pub feasible: bool,
}

/// Pure scoring function over constraint reports.
#[derive(Debug, Clone, PartialEq)]
pub struct FitnessScorer {
    pub weights: PenaltyWeights,
    pub baselines: FitnessBaselines,
}

impl FitnessScorer {
    pub fn new(weights: PenaltyWeights, baselines: FitnessBaselines) -> Self {
        Self { weights, baselines }
    }

    /// Scores a report.
    pub fn score(&self, report: &ConstraintReport) -> Fitness {
        let w = &self.weights;
        let count = |kind: ViolationKind| report.count(kind) as f64;

        let collisions = count(ViolationKind::SemesterCollision)
            + count(ViolationKind::TeacherCollision)
            + count(ViolationKind::MultiTeacherCollision)
            + count(ViolationKind::LanguageSession);
        let breaks = count(ViolationKind::FridayBreak)
            + count(ViolationKind::BreakHour)
            + count(ViolationKind::DepartmentMeeting);
        let free_days = count(ViolationKind::FreeDay);
        let span = f64::from(report.total_slot_span());

        let mut score = w.base_score;
        score -= w.collision * collisions;
        score -= w.break_rule * breaks;
        score -= w.all_slots_used * count(ViolationKind::AllSlotsUsed);

        score -= w.cannot_collide * count(ViolationKind::CannotCollide);
        score -= w.single_session_day * count(ViolationKind::SingleSessionDay);
        score -= w.availability * count(ViolationKind::TeacherAvailability);
        score -= w.repeated_course * count(ViolationKind::RepeatedCourseDay);
        score -= w.slot_span * (span - (self.baselines.slot_span - free_days));
        score -= w.empty_slot * (count(ViolationKind::EmptySlot) - self.baselines.empty_slots);
        score += w.free_day_bonus * free_days;

        let feasible = report.hard_total() == 0;
        if feasible {
            score += w.feasible_bonus * score;
        } else {
            score -= w.infeasible_discount * score;
        }

        Fitness {
            value: score,
            feasible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::report::{CohortDay, Collision, CollisionScope, EmptySlot};
    use crate::models::{LanguageBlock, MONDAY, TUESDAY, WEDNESDAY};

    fn scorer() -> FitnessScorer {
        FitnessScorer::new(
            PenaltyWeights::default(),
            FitnessBaselines {
                slot_span: 10.0,
                empty_slots: 5.0,
            },
        )
    }

    /// A report whose span and empty slots sit exactly on the baselines.
    fn baseline_report() -> ConstraintReport {
        ConstraintReport {
            slot_span: vec![[2, 2, 2, 2, 2]],
            empty_slots: (0..5)
                .map(|day| EmptySlot {
                    cohort: 0,
                    day,
                    slot: 10,
                })
                .collect(),
            ..ConstraintReport::default()
        }
    }

    #[test]
    fn test_clean_report_gets_bonus() {
        let fitness = scorer().score(&baseline_report());
        assert!(fitness.feasible);
        assert!((fitness.value - 60.0).abs() < 1e-10);
    }

    #[test]
    fn test_hard_violation_discount() {
        let mut report = baseline_report();
        report.semester_collisions.push(Collision {
            scope: CollisionScope::Cohort(0),
            day: MONDAY,
            slot: 9,
            sessions: vec![0, 1],
        });
        report.department_meetings.push(CohortDay {
            cohort: 0,
            day: WEDNESDAY,
        });

        let fitness = scorer().score(&report);
        assert!(!fitness.feasible);
        // (50 - 2 - 3) * 0.9
        assert!((fitness.value - 40.5).abs() < 1e-10);
    }

    #[test]
    fn test_free_day_contribution() {
        let report = baseline_report();
        let mut with_free_day = report.clone();
        with_free_day.free_days.push(CohortDay {
            cohort: 0,
            day: MONDAY,
        });

        let scorer = scorer();
        let delta = scorer.score(&with_free_day).value - scorer.score(&report).value;
        let w = &scorer.weights;
        let expected = (w.free_day_bonus - w.slot_span) * (1.0 + w.feasible_bonus);
        assert!((delta - expected).abs() < 1e-10);
    }

    #[test]
    fn test_deviation_terms_not_clamped() {
        let mut report = baseline_report();
        report.empty_slots.clear();
        let fitness = scorer().score(&report);
        // 5 fewer empty slots than tolerated: +0.75 before the bonus
        assert!((fitness.value - 50.75 * 1.2).abs() < 1e-10);
    }

    #[test]
    fn test_derive_original_curriculum() {
        let calendar =
            WeekCalendar::new().with_language(LanguageBlock::new(vec![TUESDAY, WEDNESDAY], 16, 17));
        let baselines = FitnessBaselines::derive(211, &calendar, 5.0);
        assert!((baselines.slot_span - 291.0).abs() < 1e-10);
        assert!((baselines.empty_slots - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_derive_without_language() {
        let baselines = FitnessBaselines::derive(100, &WeekCalendar::new(), 3.0);
        assert!((baselines.slot_span - 148.0).abs() < 1e-10);
    }

    #[test]
    fn test_weights_deserialize_with_defaults() {
        let weights: PenaltyWeights = serde_json::from_str(r#"{"collision": 4.0}"#).unwrap();
        assert!((weights.collision - 4.0).abs() < 1e-10);
        assert!((weights.base_score - 50.0).abs() < 1e-10);
    }
}

//! Timetable quality metrics (KPIs).
//!
//! Summarises a schedule's constraint report for reporting collaborators.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fitness | Scalar score of the schedule |
//! | Hard total | Sum of hard-violation counts |
//! | Soft total | Sum of soft-violation counts (free days excluded) |
//! | Slot span | Occupied span summed over cohorts and days |
//! | Free days | Empty non-language cohort days |
//! | Empty slots | Free interior slots that are not the break |

use std::collections::HashMap;

use serde::Serialize;

use super::report::ViolationKind;
use crate::models::Schedule;

/// Schedule quality indicators.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableKpi {
    /// Fitness score.
    pub fitness: f64,
    /// Whether no hard violation remains.
    pub feasible: bool,
    /// Count per violation kind.
    pub violations: HashMap<ViolationKind, usize>,
    /// Sum of hard-violation counts.
    pub hard_total: usize,
    /// Sum of soft-violation counts.
    pub soft_total: usize,
    /// Week-wide slot span.
    pub total_slot_span: u32,
    /// Number of free cohort days.
    pub free_days: usize,
    /// Number of empty interior slots.
    pub empty_slots: usize,
}

impl TimetableKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(schedule: &Schedule) -> Self {
        let report = schedule.report();
        Self {
            fitness: schedule.fitness(),
            feasible: schedule.is_feasible(),
            violations: report.counts().into_iter().collect(),
            hard_total: report.hard_total(),
            soft_total: report.soft_total(),
            total_slot_span: report.total_slot_span(),
            free_days: report.count(ViolationKind::FreeDay),
            empty_slots: report.count(ViolationKind::EmptySlot),
        }
    }

    /// Whether the schedule is feasible and within the given soft limits.
    pub fn meets_thresholds(&self, max_soft: usize, max_empty_slots: usize) -> bool {
        self.feasible && self.soft_total <= max_soft && self.empty_slots <= max_empty_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Placement, Schedule, THURSDAY};
    use crate::testing;

    #[test]
    fn test_kpi_of_stacked_schedule() {
        let catalog = testing::sample_catalog();
        let schedule = Schedule::new(catalog.clone(), testing::monday_placements(&catalog));

        let kpi = TimetableKpi::calculate(&schedule);
        assert!(!kpi.feasible);
        assert!(kpi.hard_total > 0);
        assert_eq!(kpi.hard_total, schedule.report().hard_total());
        assert_eq!(kpi.violations.len(), ViolationKind::ALL.len());
        assert!(!kpi.meets_thresholds(usize::MAX, usize::MAX));
    }

    #[test]
    fn test_kpi_of_spread_schedule() {
        let catalog = testing::minimal_catalog();
        let placements = vec![Placement::new(THURSDAY, 9); catalog.session_count()];
        let schedule = Schedule::new(catalog, placements);

        let kpi = TimetableKpi::calculate(&schedule);
        assert!(kpi.feasible);
        assert_eq!(kpi.free_days, 16);
        // Thursday singles plus empty language days
        assert_eq!(kpi.soft_total, 24);
        assert!(kpi.meets_thresholds(24, 0));
        assert!(!kpi.meets_thresholds(23, 0));
        assert!((kpi.fitness - schedule.fitness()).abs() < 1e-10);
    }
}

//! Constraint evaluation and fitness scoring.
//!
//! Every [`Schedule`](crate::models::Schedule) runs the evaluator once, at
//! construction: the placements are checked against every rule, the
//! resulting [`ConstraintReport`] is reduced to a [`Fitness`], and both are
//! stored with the schedule.
//!
//! # Hard Rules
//!
//! | Rule | Scope |
//! |------|-------|
//! | No overlapping sessions | cohort, teacher, co-teacher of a shared course |
//! | Language block stays free | cohort, language days |
//! | 12 and 13 not both used | cohort, Mon/Tue/Thu |
//! | 12 and 13 free | cohort, Fri |
//! | 13 free (department meeting) | cohort, Wed |
//! | At least one legal slot left | cohort, Mon/Tue/Thu |
//!
//! # Soft Rules
//!
//! Cannot-collide pairs, single-session days, teacher availability,
//! repeated courses per day, slot span and empty interior slots. Free days
//! are rewarded.

mod collisions;
mod daily;
mod fitness;
mod kpi;
mod report;

pub use fitness::{Fitness, FitnessBaselines, FitnessScorer, PenaltyWeights};
pub use kpi::TimetableKpi;
pub use report::{
    AvailabilityViolation, CannotCollidePair, CohortDay, Collision, CollisionScope,
    ConstraintReport, EmptySlot, RepeatedCourseDay, ViolationKind,
};

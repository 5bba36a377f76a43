//! Mutation operators.
//!
//! Nine moves over a [`Schedule`]. Directed operators pick one violation of
//! their target set and try to repair it; exploration operators pick a random
//! session. Every operator returns a rebuilt schedule or reports why it did
//! not move anything. Fixed sessions are never moved, and block shifts never
//! land on a slot the calendar reserves.
//!
//! # Operators
//!
//! | Operator | Target | Move |
//! |----------|--------|------|
//! | [`MovePeriod`](MutationOperator::MovePeriod) | break, Friday, meeting | Shift the morning block one hour earlier or the afternoon block one hour later |
//! | [`SwapTeacherCollision`](MutationOperator::SwapTeacherCollision) | teacher collision | Swap with a same-length session of another course and teacher |
//! | [`SwapCannotCollide`](MutationOperator::SwapCannotCollide) | cannot-collide pair | Same swap as above |
//! | [`MoveSingleSession`](MutationOperator::MoveSingleSession) | single-session day | Move the lone session into a free run |
//! | [`SwapRepeatedCourse`](MutationOperator::SwapRepeatedCourse) | repeated course | Swap with a same-length session of another course |
//! | [`RandomSwap`](MutationOperator::RandomSwap) | none | Swap two sessions of a cohort |
//! | [`MoveIntoEmptySpace`](MutationOperator::MoveIntoEmptySpace) | none | Move a session into a free run |
//! | [`MoveVertically`](MutationOperator::MoveVertically) | none | Slide a session within its day |
//! | [`SlideIntoGap`](MutationOperator::SlideIntoGap) | empty slot | Close a gap next to the break |
//!
//! # Dispatch
//!
//! | Mode | Operators |
//! |------|-----------|
//! | Safe | the three exploration operators |
//! | Corrective | the six directed operators |
//! | Hybrid | all nine |
//! | Smart | break and teacher repairs while infeasible, the other seven once feasible |
//!
//! In smart mode an operator without a target hands over to a random
//! operator of the feasible group.

use log::trace;
use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::config::MutationMode;
use crate::evaluation::{CohortDay, EmptySlot};
use crate::models::{
    consecutive_runs, Catalog, Day, Hour, Placement, Schedule, SessionId, SlotRange, BREAK_END,
    BREAK_START, COHORTS, DAYS, FIRST_HOUR, LAST_HOUR, OPEN_BREAK_DAYS,
};

/// Random picks an exploration operator makes before giving up.
const EXPLORATION_TRIES: usize = 10;

/// Smart-mode hand-overs after an operator found no target.
const MAX_REDISPATCH: usize = 16;

/// One mutation move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    MovePeriod,
    SwapTeacherCollision,
    SwapCannotCollide,
    MoveSingleSession,
    SwapRepeatedCourse,
    RandomSwap,
    MoveIntoEmptySpace,
    MoveVertically,
    SlideIntoGap,
}

/// Result of applying one operator.
#[derive(Debug, Clone)]
pub enum MutationOutcome {
    /// A move was made.
    Applied(Schedule),
    /// The operator's target violation set is empty.
    NoTarget,
    /// A target or session was picked but no lawful move was found.
    Blocked,
}

impl MutationOperator {
    pub const ALL: [Self; 9] = [
        Self::MovePeriod,
        Self::SwapTeacherCollision,
        Self::SwapCannotCollide,
        Self::MoveSingleSession,
        Self::SwapRepeatedCourse,
        Self::RandomSwap,
        Self::MoveIntoEmptySpace,
        Self::MoveVertically,
        Self::SlideIntoGap,
    ];

    /// Exploration operators.
    pub const SAFE: [Self; 3] = [Self::RandomSwap, Self::MoveIntoEmptySpace, Self::MoveVertically];

    /// Directed operators.
    pub const CORRECTIVE: [Self; 6] = [
        Self::MovePeriod,
        Self::SwapTeacherCollision,
        Self::SwapCannotCollide,
        Self::MoveSingleSession,
        Self::SwapRepeatedCourse,
        Self::SlideIntoGap,
    ];

    /// Smart-mode operators for infeasible schedules.
    pub const INFEASIBLE: [Self; 2] = [Self::MovePeriod, Self::SwapTeacherCollision];

    /// Smart-mode operators for feasible schedules.
    pub const FEASIBLE: [Self; 7] = [
        Self::SwapCannotCollide,
        Self::MoveSingleSession,
        Self::SwapRepeatedCourse,
        Self::RandomSwap,
        Self::MoveIntoEmptySpace,
        Self::MoveVertically,
        Self::SlideIntoGap,
    ];

    /// Operators a mode dispatches to for a schedule of the given feasibility.
    pub fn group(mode: MutationMode, feasible: bool) -> &'static [Self] {
        match mode {
            MutationMode::Safe => &Self::SAFE,
            MutationMode::Corrective => &Self::CORRECTIVE,
            MutationMode::Hybrid => &Self::ALL,
            MutationMode::Smart if feasible => &Self::FEASIBLE,
            MutationMode::Smart => &Self::INFEASIBLE,
        }
    }

    /// Whether the operator repairs a violation set.
    pub fn is_directed(&self) -> bool {
        !Self::SAFE.contains(self)
    }

    /// Applies the operator.
    pub fn apply<R: Rng>(&self, schedule: &Schedule, rng: &mut R) -> MutationOutcome {
        match self {
            Self::MovePeriod => move_period(schedule, rng),
            Self::SwapTeacherCollision => swap_teacher_collision(schedule, rng),
            Self::SwapCannotCollide => swap_cannot_collide(schedule, rng),
            Self::MoveSingleSession => move_single_session(schedule, rng),
            Self::SwapRepeatedCourse => swap_repeated_course(schedule, rng),
            Self::RandomSwap => random_swap(schedule, rng),
            Self::MoveIntoEmptySpace => move_into_empty_space(schedule, rng),
            Self::MoveVertically => move_vertically(schedule, rng),
            Self::SlideIntoGap => slide_into_gap(schedule, rng),
        }
    }
}

/// Mutates a schedule once, returning the input unchanged if no move applied.
pub fn mutate<R: Rng>(schedule: &Schedule, mode: MutationMode, rng: &mut R) -> Schedule {
    let Some(&operator) = MutationOperator::group(mode, schedule.is_feasible()).choose(rng) else {
        return schedule.clone();
    };
    mutate_with(schedule, operator, mode, rng)
}

/// Applies `operator` under `mode`. In smart mode an operator without a
/// target hands over to the feasible group.
pub fn mutate_with<R: Rng>(
    schedule: &Schedule,
    operator: MutationOperator,
    mode: MutationMode,
    rng: &mut R,
) -> Schedule {
    let mut outcome = operator.apply(schedule, rng);

    if mode == MutationMode::Smart {
        let mut previous = operator;
        for _ in 0..MAX_REDISPATCH {
            if !matches!(outcome, MutationOutcome::NoTarget) {
                break;
            }
            let Some(&fallback) = MutationOperator::FEASIBLE.choose(rng) else {
                break;
            };
            trace!("{previous:?} found no target, handing over to {fallback:?}");
            outcome = fallback.apply(schedule, rng);
            previous = fallback;
        }
    }

    match outcome {
        MutationOutcome::Applied(mutated) => mutated,
        MutationOutcome::NoTarget | MutationOutcome::Blocked => schedule.clone(),
    }
}

/// Mutates each schedule of the pool with probability `rate`.
///
/// Decisions and per-schedule seeds are drawn from `rng` up front, so the
/// outcome does not depend on `parallel`.
pub fn mutate_population<R: Rng>(
    pool: Vec<Schedule>,
    rate: f64,
    mode: MutationMode,
    parallel: bool,
    rng: &mut R,
) -> Vec<Schedule> {
    let plan: Vec<(Schedule, Option<u64>)> = pool
        .into_iter()
        .map(|schedule| {
            let seed = rng.random_bool(rate).then(|| rng.random::<u64>());
            (schedule, seed)
        })
        .collect();

    let apply = |(schedule, seed): (Schedule, Option<u64>)| match seed {
        Some(seed) => mutate(&schedule, mode, &mut SmallRng::seed_from_u64(seed)),
        None => schedule,
    };

    if parallel {
        plan.into_par_iter().map(apply).collect()
    } else {
        plan.into_iter().map(apply).collect()
    }
}

// ======================== Legality ========================

fn is_movable(catalog: &Catalog, id: SessionId) -> bool {
    !catalog.session(id).is_fixed()
}

/// Partner for collision repairs: same cohort and length, another course
/// and another teacher, neither fixed.
pub fn is_collision_swap_partner(catalog: &Catalog, a: SessionId, b: SessionId) -> bool {
    let (sa, sb) = (catalog.session(a), catalog.session(b));
    is_course_swap_partner(catalog, a, b) && sa.teacher != sb.teacher
}

/// Partner for repeated-course repairs: same cohort and length, another
/// course, neither fixed.
pub fn is_course_swap_partner(catalog: &Catalog, a: SessionId, b: SessionId) -> bool {
    let (sa, sb) = (catalog.session(a), catalog.session(b));
    a != b
        && sa.course != sb.course
        && sa.cohort == sb.cohort
        && sa.length == sb.length
        && is_movable(catalog, a)
        && is_movable(catalog, b)
}

/// Whether two sessions of one cohort may trade placements.
///
/// Equal lengths always fit. Otherwise the longer session takes the shorter
/// one's start, so every extra slot after the shorter session must be free,
/// must not be 13, and may be 12 only while 13 stays free.
pub fn is_random_swap_legal(schedule: &Schedule, a: SessionId, b: SessionId) -> bool {
    let catalog = schedule.catalog();
    let (sa, sb) = (catalog.session(a), catalog.session(b));
    if a == b || sa.cohort != sb.cohort || !is_movable(catalog, a) || !is_movable(catalog, b) {
        return false;
    }
    if sa.length == sb.length {
        return true;
    }

    let (short, long) = if sa.length < sb.length { (sa, sb) } else { (sb, sa) };
    let placement = schedule.placement(short.id);
    let free = &schedule.available_slots(short.cohort)[placement.day];
    let extra = placement.hour + short.length..placement.hour + long.length;

    extra.clone().all(|slot| free.contains(&slot))
        && !extra.clone().any(|slot| slot == BREAK_END)
        && (!extra.contains(&BREAK_START) || free.contains(&BREAK_END))
}

/// Whether a day still keeps a break slot free.
fn keeps_break_slot(day: Day, free_after: &[Hour]) -> bool {
    OPEN_BREAK_DAYS.contains(&day)
        || free_after.contains(&BREAK_START)
        || free_after.contains(&BREAK_END)
}

/// Start hours fitting a session, one list per run of free slots.
fn fitting_starts(free: &[Hour], length: u8) -> Vec<Vec<Hour>> {
    let length = usize::from(length);
    consecutive_runs(free)
        .into_iter()
        .filter(|run| run.len() >= length)
        .map(|run| run[..=run.len() - length].to_vec())
        .collect()
}

/// Whether every slot the moved sessions land on is legal or was already
/// held by one of them.
fn lands_on_legal_slots(schedule: &Schedule, moves: &[(SessionId, Placement)]) -> bool {
    let catalog = schedule.catalog();
    let legal = catalog.legal_slots();
    let held_before = |day: Day, slot: Hour| {
        moves.iter().any(|&(id, _)| {
            let from = schedule.placement(id);
            from.day == day && from.range(catalog.session(id).length).contains(slot)
        })
    };

    moves.iter().all(|&(id, to)| {
        to.range(catalog.session(id).length)
            .slots()
            .all(|slot| legal[to.day].contains(&slot) || held_before(to.day, slot))
    })
}

fn swap(schedule: &Schedule, a: SessionId, b: SessionId) -> Schedule {
    schedule.with_moves(&[(a, schedule.placement(b)), (b, schedule.placement(a))])
}

/// Swaps the first session of `targets` that has an eligible partner.
fn swap_with_partner<R, F>(
    schedule: &Schedule,
    targets: &[SessionId],
    is_partner: F,
    rng: &mut R,
) -> MutationOutcome
where
    R: Rng,
    F: Fn(&Catalog, SessionId, SessionId) -> bool,
{
    let catalog = schedule.catalog();
    for &id in targets {
        let partners: Vec<SessionId> = catalog
            .cohort_sessions(catalog.session(id).cohort)
            .iter()
            .copied()
            .filter(|&other| is_partner(catalog, id, other))
            .collect();
        if let Some(&other) = partners.choose(rng) {
            return MutationOutcome::Applied(swap(schedule, id, other));
        }
    }
    MutationOutcome::Blocked
}

// ======================== Directed operators ========================

fn move_period<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    let report = schedule.report();
    let targets: Vec<CohortDay> = report
        .break_hours
        .iter()
        .chain(&report.friday_breaks)
        .chain(&report.department_meetings)
        .copied()
        .collect();
    let Some(&CohortDay { cohort, day }) = targets.choose(rng) else {
        return MutationOutcome::NoTarget;
    };

    let catalog = schedule.catalog();
    let free = &schedule.available_slots(cohort)[day];
    let sessions = schedule.cohort_day(cohort, day);
    let starting_within = |from: Hour, to: Hour| -> Vec<SessionId> {
        sessions
            .iter()
            .copied()
            .filter(|&id| (from..=to).contains(&schedule.placement(id).hour))
            .collect()
    };

    let earliest_morning = free.iter().copied().find(|&s| s < BREAK_START);
    let latest_afternoon = free.iter().copied().rev().find(|&s| s > BREAK_END);

    let earlier = rng.random_bool(0.5);
    let group = match (earlier, earliest_morning, latest_afternoon) {
        (true, Some(first), _) => starting_within(first, BREAK_START),
        (false, _, Some(last)) => starting_within(BREAK_START, last),
        _ => return MutationOutcome::Blocked,
    };
    if group.is_empty() || group.iter().any(|&id| !is_movable(catalog, id)) {
        return MutationOutcome::Blocked;
    }

    let moves: Vec<(SessionId, Placement)> = group
        .iter()
        .filter_map(|&id| {
            let hour = schedule.placement(id).hour;
            let length = catalog.session(id).length;
            if earlier {
                (hour > FIRST_HOUR).then(|| (id, Placement::new(day, hour - 1)))
            } else {
                (hour + length <= LAST_HOUR).then(|| (id, Placement::new(day, hour + 1)))
            }
        })
        .collect();
    if moves.is_empty() || !lands_on_legal_slots(schedule, &moves) {
        return MutationOutcome::Blocked;
    }
    MutationOutcome::Applied(schedule.with_moves(&moves))
}

fn swap_teacher_collision<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    match schedule.report().teacher_collisions.choose(rng) {
        Some(collision) => {
            swap_with_partner(schedule, &collision.sessions, is_collision_swap_partner, rng)
        }
        None => MutationOutcome::NoTarget,
    }
}

fn swap_cannot_collide<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    match schedule.report().cannot_collide.choose(rng) {
        Some(pair) => swap_with_partner(
            schedule,
            &[pair.first, pair.second],
            is_collision_swap_partner,
            rng,
        ),
        None => MutationOutcome::NoTarget,
    }
}

fn swap_repeated_course<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    match schedule.report().repeated_course_days.choose(rng) {
        Some(group) => swap_with_partner(schedule, &group.sessions, is_course_swap_partner, rng),
        None => MutationOutcome::NoTarget,
    }
}

fn move_single_session<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    let Some(&CohortDay { cohort, day }) = schedule.report().single_session_days.choose(rng)
    else {
        return MutationOutcome::NoTarget;
    };
    let catalog = schedule.catalog();
    if catalog.calendar().is_language_day(day) {
        return MutationOutcome::Blocked;
    }

    let sessions = schedule.cohort_day(cohort, day);
    let &[id] = sessions.as_slice() else {
        return MutationOutcome::Blocked;
    };
    if !is_movable(catalog, id) {
        return MutationOutcome::Blocked;
    }

    let length = catalog.session(id).length;
    let free = schedule.available_slots(cohort);
    let options: Vec<(Day, Vec<Hour>)> = (0..DAYS)
        .map(|d| (d, fitting_starts(&free[d], length).concat()))
        .filter(|(_, starts)| !starts.is_empty())
        .collect();

    let Some((new_day, starts)) = options.choose(rng) else {
        return MutationOutcome::Blocked;
    };
    match starts.choose(rng) {
        Some(&hour) => {
            MutationOutcome::Applied(schedule.with_moves(&[(id, Placement::new(*new_day, hour))]))
        }
        None => MutationOutcome::Blocked,
    }
}

/// Closes an empty slot next to the break.
///
/// A gap at 11 or 12 pulls the sessions before it later until the last of
/// them ends on the gap; a gap at 14 or 15 pulls the sessions after it
/// earlier until the first of them starts on the gap. Other gaps are left
/// alone.
fn slide_into_gap<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    let Some(&EmptySlot { cohort, day, slot }) = schedule.report().empty_slots.choose(rng) else {
        return MutationOutcome::NoTarget;
    };
    let catalog = schedule.catalog();
    let sessions = schedule.cohort_day(cohort, day);
    let range = |id: SessionId| schedule.placement(id).range(catalog.session(id).length);

    let later = match slot {
        11 | 12 => true,
        14 | 15 => false,
        _ => return MutationOutcome::Blocked,
    };
    let group: Vec<SessionId> = sessions
        .into_iter()
        .filter(|&id| if later { range(id).end <= slot } else { range(id).start > slot })
        .collect();
    if group.is_empty() || group.iter().any(|&id| !is_movable(catalog, id)) {
        return MutationOutcome::Blocked;
    }

    let moves: Vec<(SessionId, Placement)> = if later {
        let last_end = group.iter().map(|&id| range(id).end).max().unwrap_or(slot + 1);
        let shift = slot + 1 - last_end;
        group
            .iter()
            .map(|&id| (id, Placement::new(day, range(id).start + shift)))
            .collect()
    } else {
        let first_start = group.iter().map(|&id| range(id).start).min().unwrap_or(slot);
        let shift = first_start - slot;
        group
            .iter()
            .map(|&id| (id, Placement::new(day, range(id).start - shift)))
            .collect()
    };
    if !lands_on_legal_slots(schedule, &moves) {
        return MutationOutcome::Blocked;
    }
    MutationOutcome::Applied(schedule.with_moves(&moves))
}

// ======================== Exploration operators ========================

fn random_swap<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    let catalog = schedule.catalog();
    for _ in 0..EXPLORATION_TRIES {
        let cohort = rng.random_range(0..COHORTS);
        let sessions = catalog.cohort_sessions(cohort);
        let Some(&id) = sessions.choose(rng) else {
            continue;
        };
        let partners: Vec<SessionId> = sessions
            .iter()
            .copied()
            .filter(|&other| is_random_swap_legal(schedule, id, other))
            .collect();
        if let Some(&other) = partners.choose(rng) {
            return MutationOutcome::Applied(swap(schedule, id, other));
        }
    }
    MutationOutcome::Blocked
}

fn move_into_empty_space<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    let catalog = schedule.catalog();
    for _ in 0..EXPLORATION_TRIES {
        let Some(session) = catalog.sessions().choose(rng) else {
            return MutationOutcome::Blocked;
        };
        if session.is_fixed() {
            continue;
        }

        let free = schedule.available_slots(session.cohort);
        let runs: Vec<(Day, Vec<Hour>)> = (0..DAYS)
            .flat_map(|day| {
                fitting_starts(&free[day], session.length)
                    .into_iter()
                    .map(move |starts| (day, starts))
            })
            .collect();
        let Some((day, starts)) = runs.choose(rng) else {
            continue;
        };
        let Some(&hour) = starts.choose(rng) else {
            continue;
        };

        let target = SlotRange::new(hour, session.length);
        let free_after: Vec<Hour> = free[*day]
            .iter()
            .copied()
            .filter(|&s| !target.contains(s))
            .collect();
        if keeps_break_slot(*day, &free_after) {
            let moved = schedule.with_moves(&[(session.id, Placement::new(*day, hour))]);
            return MutationOutcome::Applied(moved);
        }
    }
    MutationOutcome::Blocked
}

fn move_vertically<R: Rng>(schedule: &Schedule, rng: &mut R) -> MutationOutcome {
    let catalog = schedule.catalog();
    for _ in 0..EXPLORATION_TRIES {
        let Some(session) = catalog.sessions().choose(rng) else {
            return MutationOutcome::Blocked;
        };
        if session.is_fixed() {
            continue;
        }

        let placement = schedule.placement(session.id);
        let current = placement.range(session.length);
        let free = &schedule.available_slots(session.cohort)[placement.day];

        let mut bordering = Vec::new();
        let mut slot = current.start;
        while slot > FIRST_HOUR && free.contains(&(slot - 1)) {
            slot -= 1;
            bordering.push(slot);
        }
        let mut slot = current.end;
        while free.contains(&slot) {
            bordering.push(slot);
            slot += 1;
        }

        let Some(&chosen) = bordering.choose(rng) else {
            continue;
        };
        let start = if chosen < current.start {
            chosen
        } else {
            current.start + (chosen - (current.end - 1))
        };
        let target = SlotRange::new(start, session.length);
        let free_after: Vec<Hour> = free
            .iter()
            .copied()
            .chain(current.slots())
            .filter(|&s| !target.contains(s))
            .collect();
        if keeps_break_slot(placement.day, &free_after) {
            let moved = schedule.with_moves(&[(session.id, Placement::new(placement.day, start))]);
            return MutationOutcome::Applied(moved);
        }
    }
    MutationOutcome::Blocked
}

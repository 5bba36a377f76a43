//! Initial population generation.
//!
//! Each cohort is placed independently. Starting from the catalog's legal
//! slots minus the cohort's fixed sessions, every other session draws a
//! random day with free slots and a random free start hour, and keeps the
//! draw if the whole range is free and does not cover both break slots.
//!
//! # Exhausted Draws
//!
//! | Method | Behavior |
//! |--------|----------|
//! | [`InitMethod::Greedy`] | The cohort attempt is discarded and started over |
//! | [`InitMethod::Hybrid`] | The session takes a random free start hour whose range ends by 18.00; overlaps are allowed and left to the evaluator |
//!
//! Whole-cohort restarts are bounded by
//! [`EvolutionConfig::max_cohort_attempts`].

use std::sync::Arc;

use log::{trace, warn};
use rand::prelude::IndexedRandom;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::config::{EvolutionConfig, InitMethod};
use crate::error::{Result, TimetableError};
use crate::models::{
    cohort_name, Catalog, Cohort, Day, DaySlots, Hour, Placement, Schedule, SessionId, SlotRange,
    COHORTS, DAYS,
};

/// Random draws per session before the fallback applies.
const PLACEMENT_DRAWS: usize = 50;

/// Places one cohort's sessions.
///
/// Returns `(session, placement)` for every session of the cohort, fixed
/// sessions at their pinned slot, or `None` if the attempt failed.
pub fn place_cohort<R: Rng>(
    catalog: &Catalog,
    cohort: Cohort,
    method: InitMethod,
    rng: &mut R,
) -> Option<Vec<(SessionId, Placement)>> {
    let mut available: DaySlots = catalog.legal_slots().clone();
    let sessions = catalog.cohort_sessions(cohort);

    for &id in sessions {
        if let Some(pinned) = catalog.session(id).pinned {
            let range = pinned.range(catalog.session(id).length);
            available[pinned.day].retain(|slot| !range.contains(*slot));
        }
    }

    let mut placed = Vec::with_capacity(sessions.len());
    for &id in sessions {
        let session = catalog.session(id);
        if let Some(pinned) = session.pinned {
            placed.push((id, pinned));
            continue;
        }

        let placement = match draw_free_range(&available, session.length, rng) {
            Some(placement) => placement,
            None if method == InitMethod::Hybrid => {
                trace!(
                    "{}: no free range for session {} after {} draws, placing loosely",
                    cohort_name(cohort),
                    id,
                    PLACEMENT_DRAWS
                );
                draw_loose_start(&available, session.length, rng)?
            }
            None => return None,
        };

        let range = placement.range(session.length);
        available[placement.day].retain(|slot| !range.contains(*slot));
        placed.push((id, placement));
    }
    Some(placed)
}

/// Draws a placement whose range is entirely free and keeps a break slot.
fn draw_free_range<R: Rng>(available: &DaySlots, length: u8, rng: &mut R) -> Option<Placement> {
    let days = open_days(available);
    if days.is_empty() {
        return None;
    }

    for _ in 0..PLACEMENT_DRAWS {
        let day = *days.choose(rng)?;
        let hour = *available[day].choose(rng)?;
        let range = SlotRange::new(hour, length);
        if range.covers_break() {
            continue;
        }
        if range.slots().all(|slot| available[day].contains(&slot)) {
            return Some(Placement::new(day, hour));
        }
    }
    None
}

/// Draws a free start hour whose range still ends inside the day.
fn draw_loose_start<R: Rng>(available: &DaySlots, length: u8, rng: &mut R) -> Option<Placement> {
    let starts: Vec<(Day, Vec<Hour>)> = (0..DAYS)
        .map(|day| {
            let hours = available[day]
                .iter()
                .copied()
                .filter(|&hour| SlotRange::new(hour, length).is_within_day())
                .collect::<Vec<_>>();
            (day, hours)
        })
        .filter(|(_, hours)| !hours.is_empty())
        .collect();

    let (day, hours) = starts.choose(rng)?;
    let hour = *hours.choose(rng)?;
    Some(Placement::new(*day, hour))
}

fn open_days(available: &DaySlots) -> Vec<Day> {
    (0..DAYS).filter(|&day| !available[day].is_empty()).collect()
}

/// Generates one schedule.
///
/// # Errors
/// [`TimetableError::CohortUnplaceable`] if a cohort fails
/// `max_cohort_attempts` times in a row.
pub fn generate_schedule<R: Rng>(
    catalog: &Arc<Catalog>,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<Schedule> {
    let mut placements = vec![Placement::default(); catalog.session_count()];

    for cohort in 0..COHORTS {
        let mut attempt = 0;
        let placed = loop {
            attempt += 1;
            if let Some(placed) = place_cohort(catalog, cohort, config.init_method, rng) {
                break placed;
            }
            if attempt >= config.max_cohort_attempts {
                return Err(TimetableError::CohortUnplaceable {
                    cohort,
                    attempts: attempt,
                });
            }
            warn!(
                "{}: placement attempt {} failed, starting the cohort over",
                cohort_name(cohort),
                attempt
            );
        };

        for (id, placement) in placed {
            placements[id] = placement;
        }
    }

    Ok(Schedule::new(Arc::clone(catalog), placements))
}

/// Generates `config.population_size` independent schedules.
///
/// Each schedule draws from its own generator seeded from `rng`, so the
/// result is the same whether or not `config.parallel` is set.
pub fn generate_population<R: Rng>(
    catalog: &Arc<Catalog>,
    config: &EvolutionConfig,
    rng: &mut R,
) -> Result<Vec<Schedule>> {
    let seeds: Vec<u64> = (0..config.population_size).map(|_| rng.random()).collect();
    let build = |seed: u64| {
        let mut rng = SmallRng::seed_from_u64(seed);
        generate_schedule(catalog, config, &mut rng)
    };

    if config.parallel {
        seeds.into_par_iter().map(build).collect()
    } else {
        seeds.into_iter().map(build).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CourseRecord, SessionRecord, WeekCalendar, FRIDAY, MONDAY, THURSDAY, TUESDAY, WEDNESDAY,
    };
    use crate::testing;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    /// Only Monday 9-11 is legal; cohort 0 needs two two-hour sessions.
    fn cramped_catalog() -> Arc<Catalog> {
        let (teachers, mut courses, _) = testing::minimal_input();
        courses.push(
            CourseRecord::new(100, "Extra", 0, 1).with_session(SessionRecord::new(1, 2)),
        );
        let mut calendar = WeekCalendar::new().with_fixed_slots(MONDAY, (12..=17).collect());
        for day in [TUESDAY, WEDNESDAY, THURSDAY, FRIDAY] {
            calendar = calendar.with_fixed_slots(day, (9..=17).collect());
        }
        testing::catalog((teachers, courses, calendar))
    }

    #[test]
    fn test_place_cohort_respects_fixed() {
        let catalog = testing::sample_catalog();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..20 {
            let placed = place_cohort(&catalog, 2, InitMethod::Greedy, &mut rng).unwrap();
            assert_eq!(placed.len(), catalog.cohort_sessions(2).len());

            let ranges: Vec<(Day, SlotRange)> = placed
                .iter()
                .map(|&(id, p)| (p.day, p.range(catalog.session(id).length)))
                .collect();
            for (i, (day, range)) in ranges.iter().enumerate() {
                assert!(range.is_within_day());
                for (other_day, other) in &ranges[i + 1..] {
                    assert!(day != other_day || !range.overlaps(other));
                }
            }

            let fixed = placed
                .iter()
                .find(|&&(id, _)| catalog.session(id).is_fixed())
                .unwrap();
            assert_eq!(fixed.1, Placement::new(WEDNESDAY, 9));
        }
    }

    #[test]
    fn test_greedy_never_covers_break() {
        let catalog = testing::sample_catalog();
        let mut rng = SmallRng::seed_from_u64(42);

        for cohort in 0..COHORTS {
            let placed = place_cohort(&catalog, cohort, InitMethod::Greedy, &mut rng).unwrap();
            for (id, p) in placed {
                let session = catalog.session(id);
                assert!(session.is_fixed() || !p.range(session.length).covers_break());
                assert!(catalog.legal_slots()[p.day].contains(&p.hour));
            }
        }
    }

    #[test]
    fn test_generate_schedule() {
        let catalog = testing::sample_catalog();
        let config = EvolutionConfig::default().with_init_method(InitMethod::Greedy);
        let mut rng = SmallRng::seed_from_u64(42);

        let schedule = generate_schedule(&catalog, &config, &mut rng).unwrap();
        assert!(schedule.has_all_sessions());
        assert!(schedule.report().semester_collisions.is_empty());
        for session in catalog.sessions() {
            if let Some(pinned) = session.pinned {
                assert_eq!(schedule.placement(session.id), pinned);
            }
        }
    }

    #[test]
    fn test_greedy_gives_up_on_cramped_cohort() {
        let catalog = cramped_catalog();
        let config = EvolutionConfig::default()
            .with_init_method(InitMethod::Greedy)
            .with_max_cohort_attempts(3);
        let mut rng = SmallRng::seed_from_u64(42);

        let err = generate_schedule(&catalog, &config, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            TimetableError::CohortUnplaceable {
                cohort: 0,
                attempts: 3
            }
        ));
    }

    #[test]
    fn test_hybrid_places_cramped_cohort() {
        let _ = env_logger::builder().is_test(true).try_init();
        let catalog = cramped_catalog();
        let config = EvolutionConfig::default().with_init_method(InitMethod::Hybrid);
        let mut rng = SmallRng::seed_from_u64(42);

        let schedule = generate_schedule(&catalog, &config, &mut rng).unwrap();
        assert!(schedule.has_all_sessions());
        for &id in catalog.cohort_sessions(0) {
            let p = schedule.placement(id);
            assert_eq!(p.day, MONDAY);
            assert!(p.range(2).is_within_day());
        }
    }

    #[test]
    fn test_population_independent_of_parallelism() {
        let catalog = testing::sample_catalog();
        let config = EvolutionConfig::default().with_population_size(6);

        let mut rng = SmallRng::seed_from_u64(42);
        let parallel = generate_population(&catalog, &config, &mut rng).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let sequential =
            generate_population(&catalog, &config.clone().with_parallel(false), &mut rng).unwrap();

        assert_eq!(parallel.len(), 6);
        for (a, b) in parallel.iter().zip(&sequential) {
            assert_eq!(a.placements(), b.placements());
        }
    }
}

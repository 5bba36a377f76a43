//! Selection and crossover.
//!
//! # Selection
//!
//! Fitness-proportionate sampling with replacement. The weights come from
//! [`SelectionWeighting`]; if every weight is zero (all schedules tie) the
//! draws fall back to uniform sampling. The second half of the elites is
//! appended to the drawn pool before it is shuffled.
//!
//! # Crossover
//!
//! Adjacent schedules of the pool form pairs. With probability
//! `crossover_rate` a pair exchanges the placements of one whole cohort and
//! both children are rebuilt. An odd schedule out passes through.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::prelude::{IndexedRandom, SliceRandom};
use rand::Rng;
use rayon::prelude::*;

use super::config::SelectionWeighting;
use crate::models::{Cohort, Schedule, COHORTS};

/// Selection weight of every schedule.
pub fn selection_weights(population: &[Schedule], weighting: SelectionWeighting) -> Vec<f64> {
    match weighting {
        SelectionWeighting::ShiftByWorst => {
            let worst = population
                .iter()
                .map(Schedule::fitness)
                .fold(f64::INFINITY, f64::min);
            population.iter().map(|s| s.fitness() - worst).collect()
        }
        SelectionWeighting::Floor(floor) => {
            population.iter().map(|s| s.fitness().max(floor)).collect()
        }
    }
}

/// Draws `draws` schedules proportionally to their weight, adds `elites`
/// and shuffles the pool.
pub fn select<R: Rng>(
    population: &[Schedule],
    draws: usize,
    elites: &[Schedule],
    weighting: SelectionWeighting,
    rng: &mut R,
) -> Vec<Schedule> {
    let mut pool = Vec::with_capacity(draws + elites.len());

    if !population.is_empty() {
        let weights = selection_weights(population, weighting);
        match WeightedIndex::new(&weights) {
            Ok(dist) => {
                for _ in 0..draws {
                    pool.push(population[dist.sample(rng)].clone());
                }
            }
            Err(_) => {
                for _ in 0..draws {
                    if let Some(schedule) = population.choose(rng) {
                        pool.push(schedule.clone());
                    }
                }
            }
        }
    }

    pool.extend_from_slice(elites);
    pool.shuffle(rng);
    pool
}

/// Exchanges one cohort's placements between two schedules.
pub fn exchange_cohort(a: &Schedule, b: &Schedule, cohort: Cohort) -> (Schedule, Schedule) {
    let mut first = a.placements().to_vec();
    let mut second = b.placements().to_vec();
    for &id in a.catalog().cohort_sessions(cohort) {
        std::mem::swap(&mut first[id], &mut second[id]);
    }
    (a.rebuild(first), b.rebuild(second))
}

/// Recombines adjacent pairs of the pool.
pub fn crossover<R: Rng>(
    pool: Vec<Schedule>,
    rate: f64,
    parallel: bool,
    rng: &mut R,
) -> Vec<Schedule> {
    let pair_count = pool.len() / 2;
    let plan: Vec<Option<Cohort>> = (0..pair_count)
        .map(|_| {
            rng.random_bool(rate)
                .then(|| rng.random_range(0..COHORTS))
        })
        .collect();

    let mut schedules = pool.into_iter();
    let mut pairs = Vec::with_capacity(pair_count);
    for cohort in plan {
        if let (Some(a), Some(b)) = (schedules.next(), schedules.next()) {
            pairs.push((a, b, cohort));
        }
    }
    let leftover: Vec<Schedule> = schedules.collect();

    let recombine = |(a, b, cohort): (Schedule, Schedule, Option<Cohort>)| match cohort {
        Some(cohort) => exchange_cohort(&a, &b, cohort),
        None => (a, b),
    };
    let children: Vec<(Schedule, Schedule)> = if parallel {
        pairs.into_par_iter().map(recombine).collect()
    } else {
        pairs.into_iter().map(recombine).collect()
    };

    let mut offspring = Vec::with_capacity(children.len() * 2 + leftover.len());
    for (a, b) in children {
        offspring.push(a);
        offspring.push(b);
    }
    offspring.extend(leftover);
    offspring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::config::EvolutionConfig;
    use crate::ga::generator::generate_population;
    use crate::models::{Placement, THURSDAY};
    use crate::testing;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn population(size: usize) -> Vec<Schedule> {
        let catalog = testing::sample_catalog();
        let config = EvolutionConfig::default()
            .with_population_size(size)
            .with_parallel(false);
        let mut rng = SmallRng::seed_from_u64(42);
        generate_population(&catalog, &config, &mut rng).unwrap()
    }

    #[test]
    fn test_shift_by_worst_weights() {
        let population = population(5);
        let weights = selection_weights(&population, SelectionWeighting::ShiftByWorst);
        let worst = population
            .iter()
            .map(Schedule::fitness)
            .fold(f64::INFINITY, f64::min);

        assert_eq!(weights.len(), 5);
        assert!(weights.iter().all(|&w| w >= 0.0));
        assert!(weights.iter().any(|&w| w == 0.0));
        for (w, s) in weights.iter().zip(&population) {
            assert!((w - (s.fitness() - worst)).abs() < 1e-10);
        }
    }

    #[test]
    fn test_floor_weights() {
        let population = population(4);
        let weights = selection_weights(&population, SelectionWeighting::Floor(1e6));
        assert!(weights.iter().all(|&w| (w - 1e6).abs() < 1e-10));
    }

    #[test]
    fn test_select_pool_size() {
        let population = population(8);
        let elites = population[..2].to_vec();
        let mut rng = SmallRng::seed_from_u64(42);

        let pool = select(&population, 6, &elites, SelectionWeighting::ShiftByWorst, &mut rng);
        assert_eq!(pool.len(), 8);
    }

    #[test]
    fn test_select_uniform_when_weights_tie() {
        let catalog = testing::minimal_catalog();
        let schedule = Schedule::new(
            catalog.clone(),
            vec![Placement::new(THURSDAY, 9); catalog.session_count()],
        );
        let population = vec![schedule.clone(), schedule.clone(), schedule];
        let mut rng = SmallRng::seed_from_u64(42);

        let pool = select(&population, 5, &[], SelectionWeighting::ShiftByWorst, &mut rng);
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_exchange_cohort() {
        let population = population(2);
        let (a, b) = (&population[0], &population[1]);
        let (child_a, child_b) = exchange_cohort(a, b, 3);
        let catalog = a.catalog();

        for session in catalog.sessions() {
            let id = session.id;
            if session.cohort == 3 {
                assert_eq!(child_a.placement(id), b.placement(id));
                assert_eq!(child_b.placement(id), a.placement(id));
            } else {
                assert_eq!(child_a.placement(id), a.placement(id));
                assert_eq!(child_b.placement(id), b.placement(id));
            }
        }
    }

    #[test]
    fn test_self_crossover_keeps_fitness() {
        let population = population(1);
        let parent = &population[0];
        for cohort in 0..COHORTS {
            let (a, b) = exchange_cohort(parent, parent, cohort);
            assert_eq!(a.fitness(), parent.fitness());
            assert_eq!(b.report(), parent.report());
        }
    }

    #[test]
    fn test_crossover_keeps_pool_size_and_fixed() {
        let population = population(7);
        let mut rng = SmallRng::seed_from_u64(42);

        let offspring = crossover(population, 1.0, false, &mut rng);
        assert_eq!(offspring.len(), 7);
        for child in &offspring {
            assert!(child.has_all_sessions());
            for session in child.catalog().sessions() {
                if let Some(pinned) = session.pinned {
                    assert_eq!(child.placement(session.id), pinned);
                }
            }
        }
    }

    #[test]
    fn test_zero_rate_passes_through() {
        let population = population(4);
        let expected: Vec<Vec<Placement>> =
            population.iter().map(|s| s.placements().to_vec()).collect();
        let mut rng = SmallRng::seed_from_u64(42);

        let offspring = crossover(population, 0.0, true, &mut rng);
        for (child, placements) in offspring.iter().zip(&expected) {
            assert_eq!(child.placements(), placements.as_slice());
        }
    }
}

//! Evolution loop.
//!
//! # Generation
//!
//! 1. Draw `population - elite` schedules proportionally to fitness and add
//!    the second half of the elites
//! 2. Cross adjacent pairs over
//! 3. Mutate each schedule with the current mutation rate
//! 4. Add the first half of the elites verbatim and rank the population
//!
//! The best schedule ever seen is cloned whenever a generation beats it.
//!
//! # Mutation Rate
//!
//! The rate starts on the first tier. Each stagnation threshold and each
//! generation threshold raises it once, the first time it is reached: the
//! first threshold to the second tier, the second to the third.
//!
//! # Termination
//!
//! The loop stops once the stagnation counter exceeds `stagnation_limit` or
//! the generation counter exceeds `generation_limit`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::config::EvolutionConfig;
use super::generator::generate_population;
use super::mutation::mutate_population;
use super::operators::{crossover, select};
use crate::error::Result;
use crate::models::{Catalog, Schedule};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Termination {
    /// Too many generations without a new best.
    Stagnation,
    /// The generation budget ran out.
    GenerationLimit,
}

/// Per-generation statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStats {
    pub generation: usize,
    /// Mean fitness of the ranked population.
    pub average: f64,
    /// Best fitness among the mutated schedules, carried elites excluded.
    pub best_of_generation: f64,
    pub best_so_far: f64,
    /// Whether the best schedule so far is feasible.
    pub feasible: bool,
    pub stagnation: usize,
    pub mutation_rate: f64,
}

/// Outcome of a run.
#[derive(Debug, Clone)]
pub struct EvolutionResult {
    /// Best schedule found.
    pub best: Schedule,
    /// Number of generations run.
    pub generations: usize,
    pub termination: Termination,
    /// Time spent building the initial population.
    pub init_time: Duration,
    /// Time spent in the loop.
    pub evolve_time: Duration,
    pub history: Vec<GenerationStats>,
}

impl EvolutionResult {
    /// Average loop time per generation.
    pub fn time_per_generation(&self) -> Duration {
        match u32::try_from(self.generations) {
            Ok(n) if n > 0 => self.evolve_time / n,
            _ => Duration::ZERO,
        }
    }
}

/// One-shot mutation-rate tiers.
#[derive(Debug, Clone)]
struct RateTiers {
    rates: [f64; 3],
    stagnation_thresholds: [usize; 2],
    generation_thresholds: [usize; 2],
    stagnation_reached: [bool; 2],
    generation_reached: [bool; 2],
    current: f64,
}

impl RateTiers {
    fn new(config: &EvolutionConfig) -> Self {
        Self {
            rates: config.mutation_rates,
            stagnation_thresholds: config.stagnation_thresholds,
            generation_thresholds: config.generation_thresholds,
            stagnation_reached: [false; 2],
            generation_reached: [false; 2],
            current: config.mutation_rates[0],
        }
    }

    /// Raises the rate for every threshold reached for the first time.
    fn update(&mut self, stagnation: usize, generation: usize) -> f64 {
        for tier in 0..2 {
            if !self.stagnation_reached[tier] && stagnation >= self.stagnation_thresholds[tier] {
                self.stagnation_reached[tier] = true;
                self.current = self.rates[tier + 1];
            }
        }
        for tier in 0..2 {
            if !self.generation_reached[tier] && generation >= self.generation_thresholds[tier] {
                self.generation_reached[tier] = true;
                self.current = self.rates[tier + 1];
            }
        }
        self.current
    }
}

/// Genetic search over a catalog.
///
/// # Usage
///
/// ```no_run
/// use std::sync::Arc;
/// use u_timetable::ga::{Evolution, EvolutionConfig};
/// use u_timetable::models::{Catalog, WeekCalendar};
///
/// # fn load() -> u_timetable::Result<Catalog> { Catalog::new(vec![], vec![], WeekCalendar::new()) }
/// let catalog = Arc::new(load()?);
/// let evolution = Evolution::new(catalog, EvolutionConfig::default().with_seed(42))?;
/// let result = evolution.run()?;
/// println!("best fitness {:.2}", result.best.fitness());
/// # Ok::<(), u_timetable::TimetableError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Evolution {
    catalog: Arc<Catalog>,
    config: EvolutionConfig,
}

impl Evolution {
    /// Creates a search after validating the configuration.
    pub fn new(catalog: Arc<Catalog>, config: EvolutionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Runs the search, seeding from `config.seed` or the operating system.
    pub fn run(&self) -> Result<EvolutionResult> {
        let mut rng = match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Runs the search with the given random source.
    pub fn run_with_rng<R: Rng>(&self, rng: &mut R) -> Result<EvolutionResult> {
        info!(
            "Generating {} schedules over {} sessions",
            self.config.population_size,
            self.catalog.session_count()
        );
        let start = Instant::now();
        let population = generate_population(&self.catalog, &self.config, rng)?;
        let init_time = start.elapsed();

        let mut result = self.evolve(population, rng);
        result.init_time = init_time;
        Ok(result)
    }

    /// Evolves a given initial population.
    ///
    /// # Panics
    /// If `population` is empty.
    pub fn evolve<R: Rng>(&self, population: Vec<Schedule>, rng: &mut R) -> EvolutionResult {
        let config = &self.config;
        let carried = config.carried_elites();
        let start = Instant::now();

        let mut ranked = population;
        rank(&mut ranked);
        info!(
            "Initial population: best {:.3}, average {:.3}",
            ranked[0].fitness(),
            average(&ranked)
        );

        let mut elites = split_elites(&ranked, carried, config.elite_size);
        let mut best = ranked[0].clone();
        let mut best_score = f64::NEG_INFINITY;
        let mut tiers = RateTiers::new(config);
        let mut rate = tiers.current;
        let mut history = Vec::new();
        let mut stagnation = 0;
        let mut generation = 0;

        while stagnation <= config.stagnation_limit && generation <= config.generation_limit {
            let pool = select(
                &ranked,
                config.selection_draws(),
                &elites.1,
                config.selection,
                rng,
            );
            let pool = crossover(pool, config.crossover_rate, config.parallel, rng);
            let mut next = mutate_population(pool, rate, config.mutation_mode, config.parallel, rng);

            let best_of_generation = next
                .iter()
                .map(Schedule::fitness)
                .fold(f64::NEG_INFINITY, f64::max);

            next.extend(elites.0);
            rank(&mut next);
            ranked = next;
            elites = split_elites(&ranked, carried, config.elite_size);

            if ranked[0].fitness() > best_score {
                best_score = ranked[0].fitness();
                best = ranked[0].clone();
                stagnation = 0;
            }

            rate = tiers.update(stagnation, generation);

            let stats = GenerationStats {
                generation,
                average: average(&ranked),
                best_of_generation,
                best_so_far: best_score,
                feasible: best.is_feasible(),
                stagnation,
                mutation_rate: rate,
            };
            debug!(
                "Generation {}: average {:.3}, best {:.3}, best so far {:.3} ({}), stagnation {}, mutation rate {:.2}",
                stats.generation,
                stats.average,
                stats.best_of_generation,
                stats.best_so_far,
                if stats.feasible { "feasible" } else { "infeasible" },
                stats.stagnation,
                stats.mutation_rate
            );
            history.push(stats);

            stagnation += 1;
            generation += 1;
        }

        let termination = if stagnation > config.stagnation_limit {
            Termination::Stagnation
        } else {
            Termination::GenerationLimit
        };
        let evolve_time = start.elapsed();
        info!(
            "Stopped after {} generations ({:?}): best {:.3}, {}",
            generation,
            termination,
            best.fitness(),
            if best.is_feasible() { "feasible" } else { "infeasible" }
        );

        EvolutionResult {
            best,
            generations: generation,
            termination,
            init_time: Duration::ZERO,
            evolve_time,
            history,
        }
    }
}

/// Sorts by fitness, best first.
fn rank(population: &mut [Schedule]) {
    population.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
}

/// Carried elites and pool elites of a ranked population.
fn split_elites(
    ranked: &[Schedule],
    carried: usize,
    elite_size: usize,
) -> (Vec<Schedule>, Vec<Schedule>) {
    let carried = carried.min(ranked.len());
    let elite_size = elite_size.min(ranked.len());
    (ranked[..carried].to_vec(), ranked[carried..elite_size].to_vec())
}

fn average(population: &[Schedule]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    population.iter().map(Schedule::fitness).sum::<f64>() / population.len() as f64
}

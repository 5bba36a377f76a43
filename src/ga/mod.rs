//! Genetic search for weekly timetables.
//!
//! A chromosome is a [`Schedule`](crate::models::Schedule): one placement
//! per session. Every operator builds new schedules from modified placement
//! vectors, so each offspring is evaluated in full.
//!
//! # Submodules
//!
//! - [`config`]: Evolution constants and dispatch modes
//! - [`generator`]: Random cohort-by-cohort initial placement
//! - [`operators`]: Fitness-proportionate selection and cohort-exchange crossover
//! - [`mutation`]: Nine directed and exploratory moves
//! - [`runner`]: The generation loop
//!
//! # Parallelism
//!
//! Population generation, crossover and mutation run on rayon's pool when
//! [`EvolutionConfig::parallel`] is set. Every random decision is drawn from
//! the run's generator first and each parallel task gets its own seeded
//! [`SmallRng`](rand::rngs::SmallRng), so a seeded run yields the same result
//! with or without parallelism.

pub mod config;
pub mod generator;
pub mod mutation;
pub mod operators;
pub mod runner;

pub use config::{EvolutionConfig, InitMethod, MutationMode, SelectionWeighting};
pub use generator::{generate_population, generate_schedule, place_cohort};
pub use mutation::{mutate, mutate_population, mutate_with, MutationOperator, MutationOutcome};
pub use operators::{crossover, exchange_cohort, select, selection_weights};
pub use runner::{Evolution, EvolutionResult, GenerationStats, Termination};

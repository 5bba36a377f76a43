//! Evolution configuration.
//!
//! [`EvolutionConfig`] holds every constant that controls the search loop.
//! It deserialises from camelCase JSON; missing keys take their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TimetableError};

/// Which mutation operators may be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationMode {
    /// Exploration only: random swap, move into empty space, move vertically.
    Safe,
    /// Directed repairs only.
    Corrective,
    /// All nine operators.
    Hybrid,
    /// Repairs of hard violations while infeasible, everything else once
    /// feasible.
    Smart,
}

impl MutationMode {
    /// Maps the numeric mutation type codes `0..=3`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Safe),
            1 => Some(Self::Corrective),
            2 => Some(Self::Hybrid),
            3 => Some(Self::Smart),
            _ => None,
        }
    }
}

/// How sessions that found no free range are placed during initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitMethod {
    /// Discard the cohort attempt and start it over.
    Greedy,
    /// Place the session at a random free start hour, overlaps allowed.
    Hybrid,
}

/// Turns fitness values into selection weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionWeighting {
    /// `fitness - worst fitness of the population`.
    ShiftByWorst,
    /// `max(fitness, floor)`.
    Floor(f64),
}

/// Configuration of the evolution loop.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::{EvolutionConfig, MutationMode};
///
/// let config = EvolutionConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.elite_size, 12);
/// assert_eq!(config.mutation_mode, MutationMode::Smart);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::{EvolutionConfig, MutationMode};
///
/// let config = EvolutionConfig::default()
///     .with_population_size(64)
///     .with_stagnation_limit(25)
///     .with_mutation_mode(MutationMode::Hybrid)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvolutionConfig {
    /// Number of schedules per generation.
    pub population_size: usize,

    /// Number of top schedules treated as elites.
    ///
    /// The first half is carried over verbatim; the second half is added to
    /// the selection pool.
    pub elite_size: usize,

    /// Operator dispatch mode.
    pub mutation_mode: MutationMode,

    /// Mutation probabilities of the three tiers (0.0–1.0).
    ///
    /// The loop starts on the first tier and moves up when a stagnation or
    /// generation threshold is first reached.
    pub mutation_rates: [f64; 3],

    /// Stagnation counts that raise the rate to tier 2 and tier 3.
    pub stagnation_thresholds: [usize; 2],

    /// Generation counts that raise the rate to tier 2 and tier 3.
    pub generation_thresholds: [usize; 2],

    /// Probability that an adjacent pair exchanges a cohort (0.0–1.0).
    pub crossover_rate: f64,

    /// The loop stops once the generation counter exceeds this value.
    pub generation_limit: usize,

    /// The loop stops once this many generations pass without a new best.
    pub stagnation_limit: usize,

    /// Initial placement fallback.
    pub init_method: InitMethod,

    /// Fitness-to-weight mapping for selection.
    pub selection: SelectionWeighting,

    /// Whole-cohort restarts allowed before initialisation gives up.
    pub max_cohort_attempts: usize,

    /// Whether to build and mutate schedules in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            elite_size: 12,
            mutation_mode: MutationMode::Smart,
            mutation_rates: [0.1, 0.2, 0.3],
            stagnation_thresholds: [15, 35],
            generation_thresholds: [50, 100],
            crossover_rate: 0.5,
            generation_limit: 1000,
            stagnation_limit: 75,
            init_method: InitMethod::Hybrid,
            selection: SelectionWeighting::ShiftByWorst,
            max_cohort_attempts: 1000,
            parallel: true,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the elite size.
    pub fn with_elite_size(mut self, n: usize) -> Self {
        self.elite_size = n;
        self
    }

    /// Sets the mutation dispatch mode.
    pub fn with_mutation_mode(mut self, mode: MutationMode) -> Self {
        self.mutation_mode = mode;
        self
    }

    /// Sets the three mutation-rate tiers.
    pub fn with_mutation_rates(mut self, rates: [f64; 3]) -> Self {
        self.mutation_rates = rates.map(|rate| rate.clamp(0.0, 1.0));
        self
    }

    /// Sets the stagnation thresholds of the rate tiers.
    pub fn with_stagnation_thresholds(mut self, thresholds: [usize; 2]) -> Self {
        self.stagnation_thresholds = thresholds;
        self
    }

    /// Sets the generation thresholds of the rate tiers.
    pub fn with_generation_thresholds(mut self, thresholds: [usize; 2]) -> Self {
        self.generation_thresholds = thresholds;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the generation limit.
    pub fn with_generation_limit(mut self, limit: usize) -> Self {
        self.generation_limit = limit;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the initial placement method.
    pub fn with_init_method(mut self, method: InitMethod) -> Self {
        self.init_method = method;
        self
    }

    /// Sets the selection weighting.
    pub fn with_selection(mut self, selection: SelectionWeighting) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the number of whole-cohort restarts.
    pub fn with_max_cohort_attempts(mut self, n: usize) -> Self {
        self.max_cohort_attempts = n;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of elites carried over verbatim.
    #[inline]
    pub fn carried_elites(&self) -> usize {
        self.elite_size / 2
    }

    /// Number of fitness-proportionate draws per generation.
    #[inline]
    pub fn selection_draws(&self) -> usize {
        self.population_size - self.elite_size
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`TimetableError::InvalidConfig`] describing the first invalid value.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> {
            Err(TimetableError::InvalidConfig(message.into()))
        };

        if self.population_size < 2 {
            return invalid("population_size must be at least 2");
        }
        if self.elite_size >= self.population_size {
            return invalid("elite_size must be smaller than population_size");
        }
        if self.max_cohort_attempts == 0 {
            return invalid("max_cohort_attempts must be at least 1");
        }
        let rates_ok = self
            .mutation_rates
            .iter()
            .chain(std::iter::once(&self.crossover_rate))
            .all(|rate| (0.0..=1.0).contains(rate));
        if !rates_ok {
            return invalid("rates must lie in 0.0..=1.0");
        }
        if let SelectionWeighting::Floor(floor) = self.selection {
            if floor <= 0.0 {
                return invalid("selection floor must be positive");
            }
        }
        Ok(())
    }
}

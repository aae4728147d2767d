//! Generational GA driver.
//!
//! # Loop
//!
//! ```text
//! INITIALIZING -> EVALUATING <-> BREEDING -> TERMINATED
//! ```
//!
//! Each generation is evaluated, the running best is updated (only on a
//! strictly greater fitness), and termination is checked in order:
//! stagnation, target fitness, generation cap, time limit, cancellation.
//! Breeding keeps the top `elitism` individuals unchanged and fills the
//! rest with tournament → crossover → mutation → repair, capped at
//! `3 × population` iterations. The next generation is a new vector that
//! replaces the old one wholesale.
//!
//! Fitness follows the maximization convention (higher = better).

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::operators::{probability, tournament_select};
use crate::error::{Result, SolverError};

/// A problem the GA can optimize.
pub trait GaProblem: Sync {
    /// Candidate solution.
    type Individual: Clone + Send + Sync;

    /// Number of genes per individual; drives population sizing.
    fn problem_size(&self) -> usize;

    /// Creates a random individual, or `None` when the problem admits none.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Option<Self::Individual>;

    /// Fitness of an individual (higher = better). Must be pure.
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Produces two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> (Self::Individual, Self::Individual);

    /// Mutates in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);

    /// Heuristic cleanup applied to every child. No-op by default.
    fn repair<R: Rng>(&self, _individual: &mut Self::Individual, _rng: &mut R) {}
}

/// How the population size is derived from the problem size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationSizing {
    /// `min(ceiling, max(floor, per_task × problem_size))`.
    Scaled {
        floor: usize,
        ceiling: usize,
        per_task: usize,
    },
    /// A fixed size.
    Fixed(usize),
}

impl Default for PopulationSizing {
    fn default() -> Self {
        PopulationSizing::Scaled {
            floor: 50,
            ceiling: 100,
            per_task: 2,
        }
    }
}

impl PopulationSizing {
    /// Population size for a problem of `problem_size` genes (at least 1).
    pub fn size_for(&self, problem_size: usize) -> usize {
        let size = match *self {
            PopulationSizing::Scaled {
                floor,
                ceiling,
                per_task,
            } => floor.max(per_task.saturating_mul(problem_size)).min(ceiling),
            PopulationSizing::Fixed(n) => n,
        };
        size.max(1)
    }
}

/// GA run parameters.
///
/// # Example
///
/// ```
/// use lab_schedule::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_max_generations(300)
///     .with_elitism(2)
///     .with_seed(7);
/// assert_eq!(config.max_generations, 300);
/// assert_eq!(config.crossover_rate, 0.8);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Population sizing policy.
    pub population: PopulationSizing,
    /// Hard cap on evaluated generations.
    pub max_generations: usize,
    /// Probability that a parent pair is crossed over.
    pub crossover_rate: f64,
    /// Contestants per tournament.
    pub tournament_size: usize,
    /// Individuals copied unchanged into the next generation.
    pub elitism: usize,
    /// Stop after more than this many generations without improvement.
    pub stagnation_limit: usize,
    /// Stop once the best fitness reaches this value.
    pub target_fitness: f64,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Evaluate generations on the rayon pool.
    pub parallel: bool,
    /// Wall-clock budget in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population: PopulationSizing::default(),
            max_generations: 200,
            crossover_rate: 0.8,
            tournament_size: 3,
            elitism: 5,
            stagnation_limit: 50,
            target_fitness: 0.99,
            seed: None,
            parallel: false,
            time_limit_ms: None,
        }
    }
}

impl GaConfig {
    /// Sets the population sizing policy.
    pub fn with_population(mut self, population: PopulationSizing) -> Self {
        self.population = population;
        self
    }

    /// Uses a fixed population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population = PopulationSizing::Fixed(size);
        self
    }

    /// Sets the generation cap.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the elite count.
    pub fn with_elitism(mut self, elitism: usize) -> Self {
        self.elitism = elitism;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_stagnation_limit(mut self, limit: usize) -> Self {
        self.stagnation_limit = limit;
        self
    }

    /// Sets the target fitness.
    pub fn with_target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = target;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_ms = Some(limit.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// No improvement for more than `stagnation_limit` generations.
    Stagnation,
    /// Best fitness reached `target_fitness`.
    Converged,
    /// `max_generations` generations were evaluated.
    MaxGenerations,
    /// The wall-clock budget ran out.
    TimeLimit,
    /// The stop flag was raised.
    Cancelled,
    /// Breeding could not fill the next generation.
    ///
    /// Every breeding iteration adds at least one child and the cap is
    /// `3 × population`, so a non-empty population never stalls. Only a
    /// generation with no selectable parent ends here.
    BreedingStalled,
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual seen in any generation.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Evaluated generations.
    pub generations: usize,
    /// Running-best fitness after each generation (non-decreasing).
    pub history: Vec<f64>,
    /// Stop reason.
    pub termination: Termination,
    /// Population size used.
    pub population_size: usize,
    /// Wall-clock duration.
    pub elapsed: Duration,
}

/// Running best and stagnation counter.
#[derive(Debug, Clone)]
struct Progress<I> {
    best: Option<I>,
    best_fitness: f64,
    stagnation: usize,
    last_improvement: usize,
}

impl<I: Clone> Progress<I> {
    fn new() -> Self {
        Self {
            best: None,
            best_fitness: f64::NEG_INFINITY,
            stagnation: 0,
            last_improvement: 0,
        }
    }

    /// Records a generation; returns whether the running best improved.
    fn observe(&mut self, generation: usize, population: &[I], fitness: &[f64]) -> bool {
        let mut improved = false;
        for (individual, &f) in population.iter().zip(fitness) {
            if f > self.best_fitness {
                self.best_fitness = f;
                self.best = Some(individual.clone());
                improved = true;
            }
        }
        if improved {
            self.stagnation = 0;
            self.last_improvement = generation;
        } else {
            self.stagnation += 1;
        }
        improved
    }
}

/// Runs a [`GaProblem`] under a [`GaConfig`].
pub struct GaRunner;

impl GaRunner {
    /// Runs to termination.
    pub fn run<P: GaProblem>(problem: &P, config: &GaConfig) -> Result<GaResult<P::Individual>> {
        Self::run_with_cancel(problem, config, None)
    }

    /// Runs to termination or until `cancel` is raised.
    ///
    /// Fails with [`SolverError::NoSolutionFound`] when no generation was
    /// evaluated (e.g. `max_generations == 0`) or the problem cannot create
    /// an individual.
    pub fn run_with_cancel<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult<P::Individual>> {
        let start = Instant::now();
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let population_size = config.population.size_for(problem.problem_size());
        info!(
            "starting GA: population {}, genes {}, max generations {}",
            population_size,
            problem.problem_size(),
            config.max_generations
        );

        let Some(mut population) = (0..population_size)
            .map(|_| problem.create_individual(&mut rng))
            .collect::<Option<Vec<P::Individual>>>()
        else {
            warn!("problem could not produce an initial individual");
            return Err(SolverError::NoSolutionFound);
        };

        let mut progress = Progress::new();
        let mut history = Vec::with_capacity(config.max_generations);
        let mut termination = Termination::MaxGenerations;

        for generation in 0..config.max_generations {
            let fitness = evaluate_population(problem, &population, config.parallel);
            progress.observe(generation, &population, &fitness);
            history.push(progress.best_fitness);
            debug!(
                "generation {}: best {:.6}, stagnation {}",
                generation, progress.best_fitness, progress.stagnation
            );

            if let Some(reason) = check_termination(config, &progress, generation, start, cancel.as_deref()) {
                termination = reason;
                match reason {
                    Termination::Stagnation => info!(
                        "GA stagnated at generation {} (last improvement at {})",
                        generation, progress.last_improvement
                    ),
                    Termination::Converged => info!(
                        "GA converged at generation {} (best {:.6})",
                        generation, progress.best_fitness
                    ),
                    Termination::TimeLimit => warn!("GA time limit reached at generation {}", generation),
                    Termination::Cancelled => info!("GA cancelled at generation {}", generation),
                    _ => {}
                }
                break;
            }

            match breed(problem, config, &population, &fitness, population_size, &mut rng) {
                Ok(next) => population = next,
                Err(filled) => {
                    warn!(
                        "population filling reached max iterations at generation {} ({} of {})",
                        generation, filled, population_size
                    );
                    termination = Termination::BreedingStalled;
                    break;
                }
            }
        }

        let generations = history.len();
        let best_fitness = progress.best_fitness;
        let best = progress.best.ok_or(SolverError::NoSolutionFound)?;

        Ok(GaResult {
            best,
            best_fitness,
            generations,
            history,
            termination,
            population_size,
            elapsed: start.elapsed(),
        })
    }
}

fn evaluate_population<P: GaProblem>(problem: &P, population: &[P::Individual], parallel: bool) -> Vec<f64> {
    if parallel {
        population.par_iter().map(|ind| problem.evaluate(ind)).collect()
    } else {
        population.iter().map(|ind| problem.evaluate(ind)).collect()
    }
}

fn check_termination<I: Clone>(
    config: &GaConfig,
    progress: &Progress<I>,
    generation: usize,
    start: Instant,
    cancel: Option<&AtomicBool>,
) -> Option<Termination> {
    if progress.stagnation > config.stagnation_limit {
        return Some(Termination::Stagnation);
    }
    if progress.best_fitness >= config.target_fitness {
        return Some(Termination::Converged);
    }
    if generation + 1 >= config.max_generations {
        return Some(Termination::MaxGenerations);
    }
    if config.time_limit().is_some_and(|limit| start.elapsed() >= limit) {
        return Some(Termination::TimeLimit);
    }
    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        return Some(Termination::Cancelled);
    }
    None
}

/// Builds the next generation. `Err(len)` when the iteration cap was hit
/// before reaching `size`.
fn breed<P: GaProblem, R: Rng>(
    problem: &P,
    config: &GaConfig,
    population: &[P::Individual],
    fitness: &[f64],
    size: usize,
    rng: &mut R,
) -> std::result::Result<Vec<P::Individual>, usize> {
    let mut ranked: Vec<usize> = (0..population.len()).collect();
    ranked.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));

    let mut next: Vec<P::Individual> = Vec::with_capacity(size);
    for &idx in ranked.iter().take(config.elitism.min(size)) {
        next.push(population[idx].clone());
    }

    let crossover_rate = probability(config.crossover_rate);
    let max_iterations = size.saturating_mul(3);
    let mut iterations = 0;

    while next.len() < size && iterations < max_iterations {
        let (Some(a), Some(b)) = (
            tournament_select(fitness, config.tournament_size, rng),
            tournament_select(fitness, config.tournament_size, rng),
        ) else {
            break;
        };

        let (mut child1, mut child2) = if rng.random_bool(crossover_rate) {
            problem.crossover(&population[a], &population[b], rng)
        } else {
            (population[a].clone(), population[b].clone())
        };

        problem.mutate(&mut child1, rng);
        problem.mutate(&mut child2, rng);
        problem.repair(&mut child1, rng);
        problem.repair(&mut child2, rng);

        next.push(child1);
        if next.len() < size {
            next.push(child2);
        }
        iterations += 1;
    }

    if next.len() < size {
        Err(next.len())
    } else {
        Ok(next)
    }
}

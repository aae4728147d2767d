//! Solver entry point.
//!
//! Orchestrates one scheduling run:
//!
//! ```text
//! load → check catalog → index → validate → expand tasks → evolve → report
//! ```
//!
//! The solver reads through a [`DomainDataLoader`] (or takes a prepared
//! [`SolverInput`]) and returns a [`Solution`]; persisting it is a separate
//! step through a [`ResultMaterializer`].

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::ga::fitness::{ConflictScope, Evaluation, FitnessWeights};
use crate::ga::operators::GeneticOperators;
use crate::ga::{Chromosome, GaConfig, GaRunner, GeneCatalog, PracticumProblem, Termination};
use crate::index::ConstraintIndex;
use crate::loader::DomainDataLoader;
use crate::materialize::{MaterializeError, ResultMaterializer, ScheduleRecord};
use crate::models::{AcademicPeriod, CourseLinks, Room, Shift, TargetTask, TheoryScheduleEntry, expand_tasks};
use crate::report::ConflictReport;
use crate::validation::validate_input;

/// Everything configurable about a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Evolution parameters.
    pub ga: GaConfig,
    /// Mutation rate and retry budgets.
    pub operators: GeneticOperators,
    /// Penalty weights.
    pub weights: FitnessWeights,
    /// What counts as a double-booking.
    pub conflict_scope: ConflictScope,
}

impl SolverConfig {
    /// Sets the GA parameters.
    pub fn with_ga(mut self, ga: GaConfig) -> Self {
        self.ga = ga;
        self
    }

    /// Sets the operator parameters.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Sets the penalty weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the conflict scope.
    pub fn with_conflict_scope(mut self, scope: ConflictScope) -> Self {
        self.conflict_scope = scope;
        self
    }
}

/// Prepared solver input.
#[derive(Debug, Clone, Default)]
pub struct SolverInput {
    /// Theory schedule rows for the period.
    pub theory: Vec<TheoryScheduleEntry>,
    /// Shift catalog; inactive shifts are ignored.
    pub shifts: Vec<Shift>,
    /// Room catalog; inactive and non-lab rooms are ignored.
    pub rooms: Vec<Room>,
    /// Targets to schedule.
    pub tasks: Vec<TargetTask>,
    /// Instructors used when a course has no eligible list. Empty means
    /// every instructor in the theory timetable.
    pub fallback_instructors: Vec<String>,
    /// Practicum → theory links for re-keying eligible instructors.
    pub links: Option<CourseLinks>,
}

/// Best timetable found by a run.
#[derive(Debug, Clone)]
pub struct Solution {
    /// Winning chromosome.
    pub chromosome: Chromosome,
    /// Its fitness, in `(0, 1]`.
    pub best_score: f64,
    /// Penalty and counts behind the score.
    pub evaluation: Evaluation,
    /// Per-gene conflicts.
    pub conflicts: ConflictReport,
    /// Evaluated generations.
    pub generations: usize,
    /// Running-best fitness per generation.
    pub history: Vec<f64>,
    /// Stop reason.
    pub termination: Termination,
    /// Population size used.
    pub population_size: usize,
    /// Wall-clock duration of the evolution.
    pub elapsed: Duration,
}

impl Solution {
    /// Whether the timetable violates nothing.
    pub fn is_feasible(&self) -> bool {
        self.evaluation.is_feasible()
    }

    /// One record per gene.
    pub fn to_records(&self, period: &AcademicPeriod) -> Vec<ScheduleRecord> {
        self.chromosome
            .genes
            .iter()
            .map(|gene| ScheduleRecord::from_gene(gene, period))
            .collect()
    }

    /// Writes the records through `sink`; returns how many were stored.
    pub fn persist<M: ResultMaterializer>(
        &self,
        sink: &mut M,
        period: &AcademicPeriod,
    ) -> std::result::Result<usize, MaterializeError> {
        sink.persist(period, self.to_records(period))
    }
}

/// Practicum timetable solver.
///
/// # Example
/// ```
/// use lab_schedule::loader::InMemoryLoader;
/// use lab_schedule::models::{AcademicPeriod, Room, Shift, TargetTask, TheoryScheduleEntry, Weekday};
/// use lab_schedule::solver::{Solver, SolverConfig};
///
/// let period = AcademicPeriod::for_month(2025, 9);
/// let loader = InMemoryLoader::new()
///     .with_theory(
///         period.clone(),
///         vec![TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1")],
///     )
///     .with_shifts(vec![Shift::new("S1"), Shift::new("S2")])
///     .with_rooms(vec![Room::lab("L1")])
///     .with_tasks(vec![TargetTask::new("P1", "A")]);
///
/// let mut config = SolverConfig::default();
/// config.ga.seed = Some(42);
/// let solution = Solver::new(config).run(&loader, &period).unwrap();
/// assert_eq!(solution.to_records(&period).len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Solver {
    /// Creates a solver.
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Stops the run at the next generation boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Loads the period's data and solves it.
    pub fn run<L: DomainDataLoader>(&self, loader: &L, period: &AcademicPeriod) -> Result<Solution> {
        let theory = loader.load_theory_schedules(period).map_err(loader_error)?;
        if theory.is_empty() {
            warn!("no theory schedules for {}", period);
            return Err(SolverError::NoTheoryData);
        }
        let catalog = loader.load_active_shifts_and_rooms().map_err(loader_error)?;
        let tasks = loader.load_practicum_tasks(period).map_err(loader_error)?;
        let links = loader.load_course_links().map_err(loader_error)?;
        let fallback_instructors = loader.load_instructor_pool().map_err(loader_error)?;

        info!("solving {}: {} theory rows, {} targets", period, theory.len(), tasks.len());
        self.solve(&SolverInput {
            theory,
            shifts: catalog.shifts,
            rooms: catalog.rooms,
            tasks,
            fallback_instructors,
            links,
        })
    }

    /// Solves a prepared input.
    pub fn solve(&self, input: &SolverInput) -> Result<Solution> {
        if input.theory.is_empty() {
            return Err(SolverError::NoTheoryData);
        }

        let shift_ids: Vec<String> = input
            .shifts
            .iter()
            .filter(|s| s.is_active)
            .map(|s| s.id.clone())
            .collect();
        let room_ids: Vec<String> = input
            .rooms
            .iter()
            .filter(|r| r.is_schedulable())
            .map(|r| r.id.clone())
            .collect();
        if shift_ids.is_empty() || room_ids.is_empty() {
            return Err(SolverError::NoShiftsOrRooms);
        }

        let mut index = ConstraintIndex::build(&input.theory);
        if let Some(links) = &input.links {
            index = index.with_course_links(links);
        }

        let fallback = if input.fallback_instructors.is_empty() {
            index.theory_instructors()
        } else {
            input.fallback_instructors.clone()
        };

        validate_input(&input.tasks, &input.shifts, &input.rooms, &index, &fallback)
            .map_err(SolverError::InvalidInput)?;

        let instances = expand_tasks(&input.tasks);
        if instances.is_empty() {
            warn!("no practicum targets to schedule");
        }

        let catalog = GeneCatalog::new(shift_ids, room_ids, fallback).ok_or(SolverError::NoShiftsOrRooms)?;
        let problem = PracticumProblem::new(instances, catalog, index)?
            .with_weights(self.config.weights)
            .with_conflict_scope(self.config.conflict_scope)
            .with_operators(self.config.operators.clone());

        let result = GaRunner::run_with_cancel(&problem, &self.config.ga, self.cancel.clone())?;

        let evaluation = problem.evaluate_full(&result.best);
        let conflicts = ConflictReport::analyze(&result.best, problem.index(), problem.scope());
        info!(
            "solver finished after {} generations ({:?}): fitness {:.6}, penalty {}",
            result.generations, result.termination, evaluation.fitness, evaluation.penalty
        );

        Ok(Solution {
            chromosome: result.best,
            best_score: result.best_fitness,
            evaluation,
            conflicts,
            generations: result.generations,
            history: result.history,
            termination: result.termination,
            population_size: result.population_size,
            elapsed: result.elapsed,
        })
    }
}

fn loader_error<E: std::error::Error + Send + Sync + 'static>(err: E) -> SolverError {
    SolverError::Loader(Box::new(err))
}

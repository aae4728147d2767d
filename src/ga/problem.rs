//! Practicum timetabling as a [`GaProblem`].
//!
//! Bridges the domain inputs (task instances, gene catalog, constraint
//! index) to the generic runner. Fitness is the weighted-penalty score from
//! [`fitness`](super::fitness); every child is repaired for room clashes.

use rand::Rng;

use super::chromosome::{Chromosome, GeneCatalog};
use super::fitness::{ConflictScope, Evaluation, FitnessWeights, evaluate};
use super::operators::{GeneticOperators, single_point_crossover};
use super::runner::GaProblem;
use crate::error::{Result, SolverError};
use crate::index::ConstraintIndex;
use crate::models::TaskInstance;
use crate::validation::{ValidationError, ValidationErrorKind};

/// GA problem definition for practicum scheduling.
///
/// # Example
/// ```
/// use lab_schedule::ga::{GaConfig, GaRunner, GeneCatalog, PracticumProblem};
/// use lab_schedule::index::ConstraintIndex;
/// use lab_schedule::models::{TargetTask, TheoryScheduleEntry, Weekday, expand_tasks};
///
/// let theory = vec![TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1")];
/// let index = ConstraintIndex::build(&theory);
/// let catalog = GeneCatalog::new(vec!["S1".into()], vec!["L1".into()], vec![]).unwrap();
/// let instances = expand_tasks(&[TargetTask::new("P1", "A")]);
///
/// let problem = PracticumProblem::new(instances, catalog, index).unwrap();
/// let result = GaRunner::run(&problem, &GaConfig::default().with_seed(1)).unwrap();
/// assert_eq!(result.best.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct PracticumProblem {
    instances: Vec<TaskInstance>,
    catalog: GeneCatalog,
    index: ConstraintIndex,
    weights: FitnessWeights,
    scope: ConflictScope,
    operators: GeneticOperators,
}

impl PracticumProblem {
    /// Creates a problem with default weights, scope and operators.
    ///
    /// Fails with [`SolverError::InvalidInput`] when a course has neither an
    /// eligible instructor nor a fallback pool to draw from.
    pub fn new(instances: Vec<TaskInstance>, catalog: GeneCatalog, index: ConstraintIndex) -> Result<Self> {
        let mut missing: Vec<&str> = Vec::new();
        for instance in &instances {
            let course = instance.course_id.as_str();
            if !catalog.has_instructor_for(course, &index) && !missing.contains(&course) {
                missing.push(course);
            }
        }
        if !missing.is_empty() {
            let errors = missing
                .iter()
                .map(|course| {
                    ValidationError::new(
                        ValidationErrorKind::NoEligibleInstructor,
                        format!("Course '{}' has no instructor candidates", course),
                    )
                })
                .collect();
            return Err(SolverError::InvalidInput(errors));
        }

        Ok(Self {
            instances,
            catalog,
            index,
            weights: FitnessWeights::default(),
            scope: ConflictScope::default(),
            operators: GeneticOperators::default(),
        })
    }

    /// Sets penalty weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the double-booking scope.
    pub fn with_conflict_scope(mut self, scope: ConflictScope) -> Self {
        self.scope = scope;
        self
    }

    /// Sets operator parameters.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Task instances, in gene order.
    pub fn instances(&self) -> &[TaskInstance] {
        &self.instances
    }

    /// Gene value domain.
    pub fn catalog(&self) -> &GeneCatalog {
        &self.catalog
    }

    /// Constraint index.
    pub fn index(&self) -> &ConstraintIndex {
        &self.index
    }

    /// Penalty weights.
    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    /// Double-booking scope.
    pub fn scope(&self) -> ConflictScope {
        self.scope
    }

    /// Full evaluation (fitness, penalty, breakdown).
    pub fn evaluate_full(&self, chromosome: &Chromosome) -> Evaluation {
        evaluate(chromosome, &self.index, &self.weights, self.scope)
    }

    /// Generates `size` random chromosomes.
    pub fn initial_population<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<Chromosome> {
        (0..size).filter_map(|_| self.create_individual(rng)).collect()
    }
}

impl GaProblem for PracticumProblem {
    type Individual = Chromosome;

    fn problem_size(&self) -> usize {
        self.instances.len()
    }

    fn create_individual<R: Rng>(&self, rng: &mut R) -> Option<Chromosome> {
        self.operators
            .create(&self.instances, &self.catalog, &self.index, rng)
    }

    fn evaluate(&self, individual: &Chromosome) -> f64 {
        self.evaluate_full(individual).fitness
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Chromosome,
        parent2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        single_point_crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut Chromosome, rng: &mut R) {
        self.operators
            .mutate(individual, &self.catalog, &self.index, rng);
    }

    fn repair<R: Rng>(&self, individual: &mut Chromosome, rng: &mut R) {
        self.operators.repair(individual, &self.catalog, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{GaConfig, GaRunner};
    use crate::models::{TargetTask, TheoryScheduleEntry, Weekday, expand_tasks};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn sample_problem() -> PracticumProblem {
        let theory = vec![
            TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1"),
            TheoryScheduleEntry::new("P2", "B", Weekday::Tuesday, "S2").with_instructor("D2"),
        ];
        let index = ConstraintIndex::build(&theory);
        let catalog = GeneCatalog::new(
            vec!["S1".into(), "S2".into()],
            vec!["L1".into(), "L2".into()],
            vec![],
        )
        .unwrap();
        let instances = expand_tasks(&[TargetTask::new("P1", "A"), TargetTask::new("P2", "B")]);
        PracticumProblem::new(instances, catalog, index).unwrap()
    }

    #[test]
    fn test_initial_population_is_valid() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(42);
        let population = problem.initial_population(20, &mut rng);
        assert_eq!(population.len(), 20);
        for ch in &population {
            assert_eq!(ch.len(), problem.problem_size());
            assert!(ch.is_valid(problem.instances(), problem.catalog(), problem.index()));
        }
    }

    #[test]
    fn test_evaluate_matches_full() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(5);
        let ch = problem.create_individual(&mut rng).unwrap();
        let full = problem.evaluate_full(&ch);
        assert_eq!(problem.evaluate(&ch), full.fitness);
        assert!(full.fitness > 0.0 && full.fitness <= 1.0);
    }

    #[test]
    fn test_children_keep_task_alignment() {
        let problem = sample_problem();
        let mut rng = SmallRng::seed_from_u64(9);
        let a = problem.create_individual(&mut rng).unwrap();
        let b = problem.create_individual(&mut rng).unwrap();
        let (mut c1, mut c2) = problem.crossover(&a, &b, &mut rng);
        problem.mutate(&mut c1, &mut rng);
        problem.repair(&mut c1, &mut rng);
        problem.mutate(&mut c2, &mut rng);
        problem.repair(&mut c2, &mut rng);
        for child in [&c1, &c2] {
            assert!(child.is_valid(problem.instances(), problem.catalog(), problem.index()));
        }
    }

    #[test]
    fn test_run_reaches_feasible_timetable() {
        let problem = sample_problem();
        let config = GaConfig::default().with_max_generations(50).with_seed(17);
        let result = GaRunner::run(&problem, &config).unwrap();
        let eval = problem.evaluate_full(&result.best);
        assert!(eval.is_feasible(), "breakdown: {:?}", eval.breakdown);
        assert_eq!(result.best_fitness, 1.0);
    }

    #[test]
    fn test_course_without_instructors_is_rejected() {
        let index = ConstraintIndex::build(&[
            TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1"),
        ]);
        let catalog = GeneCatalog::new(vec!["S1".into()], vec!["L1".into()], vec![]).unwrap();
        let instances = expand_tasks(&[TargetTask::new("P9", "B").with_copies(2), TargetTask::new("P1", "A")]);

        let err = PracticumProblem::new(instances.clone(), catalog, index.clone()).unwrap_err();
        match err {
            SolverError::InvalidInput(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].kind, ValidationErrorKind::NoEligibleInstructor);
                assert!(errors[0].message.contains("P9"));
            }
            other => panic!("unexpected error: {other}"),
        }

        // A fallback pool gives P9 someone to draw from.
        let catalog = GeneCatalog::new(vec!["S1".into()], vec!["L1".into()], vec!["F1".into()]).unwrap();
        let problem = PracticumProblem::new(instances, catalog, index).unwrap();
        let result = GaRunner::run(&problem, &GaConfig::default().with_max_generations(3).with_seed(2)).unwrap();
        assert!(result.best.genes.iter().all(|g| !g.instructor_id.is_empty()));
        assert_eq!(result.best.genes[0].instructor_id, "F1");
    }

    #[test]
    fn test_builders_override_defaults() {
        let problem = sample_problem().with_conflict_scope(ConflictScope::Slot);
        assert_eq!(problem.scope(), ConflictScope::Slot);
        let weights = FitnessWeights {
            room_conflict: 1,
            ..FitnessWeights::default()
        };
        let problem = problem.with_weights(weights);
        assert_eq!(problem.weights().room_conflict, 1);
    }
}

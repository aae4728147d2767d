//! GA-based practicum timetabling.
//!
//! A small generational GA specialized to the lab-scheduling encoding,
//! with the problem binding kept behind the [`GaProblem`] trait.
//!
//! # Encoding
//!
//! - One [`Gene`] per task instance: (course, section, day, shift, room,
//!   instructor). Position `i` always belongs to task instance `i`.
//! - Fitness is `1 / (1 + penalty)` over weighted hard-constraint
//!   violations (see [`fitness`]).
//!
//! # Submodules
//!
//! - [`fitness`]: penalty terms, weights, and evaluation
//! - [`operators`]: tournament selection, one-point crossover, mutation,
//!   room repair
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Burke & Petrovic (2002), "Recent research directions in automated
//!   timetabling"

mod chromosome;
pub mod fitness;
pub mod operators;
mod problem;
mod runner;

pub use chromosome::{Chromosome, Gene, GeneCatalog, SlotOutcome};
pub use fitness::{ConflictScope, Evaluation, FitnessWeights, PenaltyBreakdown};
pub use operators::GeneticOperators;
pub use problem::PracticumProblem;
pub use runner::{GaConfig, GaProblem, GaResult, GaRunner, PopulationSizing, Termination};

//! Genetic-algorithm timetabling for laboratory practicum sessions.
//!
//! Places practicum (course, section) sessions onto day/shift/room/instructor
//! combinations around an existing, fixed theory timetable. Hard constraints
//! (room and instructor double-booking, instructor eligibility, clashes with
//! the class's own theory slots and with the instructor's theory teaching)
//! become weighted penalties, and a generational GA searches for the
//! lowest-penalty timetable.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `TheoryScheduleEntry`, `TargetTask`,
//!   `Shift`, `Room`, `Course`, `AcademicPeriod`, `Weekday`
//! - **`loader`**: `DomainDataLoader` seam and an in-memory implementation
//! - **`index`**: `ConstraintIndex` lookups derived from the theory timetable
//! - **`ga`**: Chromosome encoding, fitness, operators, and the GA runner
//! - **`solver`**: End-to-end orchestration (`Solver`, `Solution`)
//! - **`report`**: Per-gene conflict report for a finished timetable
//! - **`materialize`**: `ScheduleRecord` output and the `ResultMaterializer` seam
//! - **`validation`**: Input integrity checks (duplicate IDs, empty targets,
//!   missing instructor candidates)
//!
//! # Architecture
//!
//! The crate holds only scheduling logic. Storage, HTTP, and import/export
//! live behind the loader and materializer traits; the library logs through
//! the `log` facade and never installs a logger.
//!
//! # References
//!
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod error;
pub mod ga;
pub mod index;
pub mod loader;
pub mod materialize;
pub mod models;
pub mod report;
pub mod solver;
pub mod validation;

pub use error::{Result, SolverError};
pub use solver::{Solution, Solver, SolverConfig, SolverInput};

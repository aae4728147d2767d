//! Timetabling domain models.
//!
//! Plain in-memory records handed to the solver by the domain data loader,
//! and the period they belong to.
//!
//! # Domain Mappings
//!
//! | lab-schedule | Campus term | Meaning |
//! |--------------|-------------|---------|
//! | TheoryScheduleEntry | Lecture timetable row | Fixed constraint source |
//! | TargetTask | Practicum class | Lab session to place |
//! | Shift | Time band | Gene slot component |
//! | Room | Laboratory | Gene resource |

mod catalog;
mod course;
mod period;
mod task;
mod theory;

pub use catalog::{Room, Shift, Weekday};
pub use course::{Course, CourseLinks, derive_target_tasks};
pub use period::{AcademicPeriod, Term};
pub use task::{TargetTask, TaskInstance, expand_tasks, total_instances};
pub use theory::TheoryScheduleEntry;

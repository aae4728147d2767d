//! Practicum target tasks.
//!
//! A [`TargetTask`] is a (course, section) pair that still needs a lab
//! slot. Its `copies` count expands into independent [`TaskInstance`]s,
//! one chromosome position each.

use serde::{Deserialize, Serialize};

fn default_copies() -> u32 {
    1
}

/// A (practicum course, section) pair to schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTask {
    /// Practicum course identifier.
    pub course_id: String,
    /// Class/section label.
    pub section: String,
    /// Number of parallel sessions needing separate slots.
    #[serde(default = "default_copies")]
    pub copies: u32,
}

impl TargetTask {
    /// Creates a task with a single copy.
    pub fn new(course_id: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            section: section.into(),
            copies: 1,
        }
    }

    /// Sets the number of copies.
    pub fn with_copies(mut self, copies: u32) -> Self {
        self.copies = copies;
        self
    }
}

/// One concrete slot to fill, after expanding copies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInstance {
    /// Practicum course identifier.
    pub course_id: String,
    /// Class/section label.
    pub section: String,
    /// 0-based copy number within the originating task.
    pub copy: u32,
}

/// Expands tasks into instances, preserving task order.
pub fn expand_tasks(tasks: &[TargetTask]) -> Vec<TaskInstance> {
    tasks
        .iter()
        .flat_map(|t| {
            (0..t.copies).map(move |copy| TaskInstance {
                course_id: t.course_id.clone(),
                section: t.section.clone(),
                copy,
            })
        })
        .collect()
}

/// Total number of instances the tasks expand to.
pub fn total_instances(tasks: &[TargetTask]) -> usize {
    tasks.iter().map(|t| t.copies as usize).sum()
}

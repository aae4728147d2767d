//! Course catalog and practicum-to-theory linking.
//!
//! A practicum course inherits its sections and eligible instructors from
//! the theory course it accompanies. Links are resolved by name: the
//! practicum name with its `PRAKTIKUM` prefix removed is compared against
//! theory course names.

use std::collections::{BTreeSet, HashMap};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::{TargetTask, TheoryScheduleEntry};

const PRACTICUM_PREFIX: &str = "praktikum";

/// A course in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Course code.
    pub code: String,
    /// Course name.
    pub name: String,
    /// `true` for lectures, `false` for practicum (lab) courses.
    pub is_theory: bool,
}

impl Course {
    /// Creates a theory course.
    pub fn theory(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: String::new(),
            name: name.into(),
            is_theory: true,
        }
    }

    /// Creates a practicum course.
    pub fn practicum(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            is_theory: false,
            ..Self::theory(id, name)
        }
    }

    /// Sets the course code.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Name with a leading practicum prefix removed, lower-cased.
    fn base_name(&self) -> String {
        let trimmed = self.name.trim();
        let lower = trimmed.to_lowercase();
        match lower.strip_prefix(PRACTICUM_PREFIX) {
            Some(rest) => rest.trim().to_string(),
            None => lower,
        }
    }
}

/// Practicum course id → theory course id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseLinks {
    links: HashMap<String, String>,
}

impl CourseLinks {
    /// Creates an empty link table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an explicit link.
    pub fn with_link(mut self, practicum_id: impl Into<String>, theory_id: impl Into<String>) -> Self {
        self.links.insert(practicum_id.into(), theory_id.into());
        self
    }

    /// Links each practicum course to the first theory course whose name
    /// equals, contains, or is contained in the practicum base name.
    pub fn link(practicum: &[Course], theory: &[Course]) -> Self {
        let theory_names: Vec<(&Course, String)> =
            theory.iter().map(|t| (t, t.name.trim().to_lowercase())).collect();
        let mut links = HashMap::new();

        for course in practicum {
            let base = course.base_name();
            let matched = theory_names.iter().find(|(_, name)| {
                !name.is_empty() && (*name == base || name.contains(&base) || base.contains(name.as_str()))
            });

            match matched {
                Some((t, _)) if !base.is_empty() => {
                    info!("linked practicum '{}' to theory '{}'", course.name, t.name);
                    links.insert(course.id.clone(), t.id.clone());
                }
                _ => warn!("no theory course found for practicum '{}'", course.name),
            }
        }

        Self { links }
    }

    /// Theory course linked to a practicum course.
    pub fn theory_for(&self, practicum_id: &str) -> Option<&str> {
        self.links.get(practicum_id).map(|s| s.as_str())
    }

    /// Iterates (practicum id, theory id) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.links.iter().map(|(p, t)| (p.as_str(), t.as_str()))
    }

    /// Number of links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether there are no links.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Emits one single-copy task per section of each linked theory course.
///
/// Output is ordered by practicum id, then section.
pub fn derive_target_tasks(links: &CourseLinks, theory: &[TheoryScheduleEntry]) -> Vec<TargetTask> {
    let mut sections_by_course: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for entry in theory {
        if let Some(section) = entry.section.as_deref() {
            sections_by_course
                .entry(entry.course_id.as_str())
                .or_default()
                .insert(section);
        }
    }

    let mut practicum_ids: Vec<(&str, &str)> = links.iter().collect();
    practicum_ids.sort_unstable();

    let mut tasks = Vec::new();
    for (practicum_id, theory_id) in practicum_ids {
        if let Some(sections) = sections_by_course.get(theory_id) {
            for section in sections {
                tasks.push(TargetTask::new(practicum_id, *section));
            }
        }
    }
    tasks
}

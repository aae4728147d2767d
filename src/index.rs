//! Constraint index built from the theory timetable.
//!
//! Answers the two questions fitness evaluation and gene generation ask
//! for every gene:
//! - does slot S collide with class C's theory slots?
//! - how many theory rows already hold instructor I at slot S?
//!
//! It also records which instructors may teach each course.
//! The index is immutable once built and shared read-only by a run.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{CourseLinks, TheoryScheduleEntry, Weekday};

/// A (day, shift) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    /// Teaching day.
    pub day: Weekday,
    /// Shift identifier.
    pub shift_id: String,
}

impl Slot {
    /// Creates a slot.
    pub fn new(day: Weekday, shift_id: impl Into<String>) -> Self {
        Self {
            day,
            shift_id: shift_id.into(),
        }
    }
}

/// Read-only lookup tables derived from theory schedules.
#[derive(Debug, Clone, Default)]
pub struct ConstraintIndex {
    /// section → slots used by that section's theory classes.
    theory_slots_by_class: HashMap<String, HashSet<Slot>>,
    /// instructor → slot → number of theory rows.
    theory_instructor_slots: HashMap<String, HashMap<Slot, u32>>,
    /// course → eligible instructors, first-seen order, no duplicates.
    allowed_instructors_by_course: HashMap<String, Vec<String>>,
}

impl ConstraintIndex {
    /// Builds the index from theory schedule rows.
    ///
    /// Allowed instructors are keyed by the theory course id; see
    /// [`with_course_links`](Self::with_course_links) to re-key them to
    /// practicum courses.
    pub fn build(entries: &[TheoryScheduleEntry]) -> Self {
        let mut index = Self::default();

        for entry in entries {
            let slot = Slot::new(entry.day, entry.shift_id.clone());

            if let Some(section) = entry.section.as_deref() {
                index
                    .theory_slots_by_class
                    .entry(section.to_string())
                    .or_default()
                    .insert(slot.clone());
            }

            for instructor in &entry.instructor_ids {
                *index
                    .theory_instructor_slots
                    .entry(instructor.clone())
                    .or_default()
                    .entry(slot.clone())
                    .or_insert(0) += 1;

                let allowed = index
                    .allowed_instructors_by_course
                    .entry(entry.course_id.clone())
                    .or_default();
                if !allowed.contains(instructor) {
                    allowed.push(instructor.clone());
                }
            }
        }

        index
    }

    /// Replaces the allowed-instructor table with one keyed by practicum
    /// course: each practicum course gets its linked theory course's list.
    ///
    /// Practicum courses whose theory course has no instructors get no entry.
    pub fn with_course_links(mut self, links: &CourseLinks) -> Self {
        let mut remapped = HashMap::new();
        for (practicum_id, theory_id) in links.iter() {
            if let Some(list) = self.allowed_instructors_by_course.get(theory_id) {
                remapped.insert(practicum_id.to_string(), list.clone());
            }
        }
        self.allowed_instructors_by_course = remapped;
        self
    }

    /// Overrides the eligible instructors for one course.
    pub fn with_allowed_instructors(
        mut self,
        course_id: impl Into<String>,
        instructors: Vec<String>,
    ) -> Self {
        self.allowed_instructors_by_course
            .insert(course_id.into(), instructors);
        self
    }

    /// Theory slots of a section, if it has any.
    pub fn class_slots(&self, section: &str) -> Option<&HashSet<Slot>> {
        self.theory_slots_by_class.get(section)
    }

    /// Whether `slot` is used by `section`'s theory schedule.
    pub fn overlaps_theory(&self, section: &str, slot: &Slot) -> bool {
        self.theory_slots_by_class
            .get(section)
            .is_some_and(|slots| slots.contains(slot))
    }

    /// Number of theory rows placing `instructor` at `slot`.
    pub fn theory_instructor_load(&self, instructor: &str, slot: &Slot) -> u32 {
        self.theory_instructor_slots
            .get(instructor)
            .and_then(|slots| slots.get(slot))
            .copied()
            .unwrap_or(0)
    }

    /// Eligible instructors for a course (empty when none are known).
    pub fn allowed_instructors(&self, course_id: &str) -> &[String] {
        self.allowed_instructors_by_course
            .get(course_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `instructor` may teach `course_id`.
    pub fn is_allowed(&self, course_id: &str, instructor: &str) -> bool {
        self.allowed_instructors(course_id)
            .iter()
            .any(|i| i == instructor)
    }

    /// Every instructor appearing in the theory timetable, sorted.
    pub fn theory_instructors(&self) -> Vec<String> {
        self.theory_instructor_slots
            .keys()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of sections with recorded theory slots.
    pub fn class_count(&self) -> usize {
        self.theory_slots_by_class.len()
    }
}

//! Input validation for practicum scheduling.
//!
//! Checks structural integrity of the loaded data before a run. Detects:
//! - Duplicate shift/room IDs
//! - Duplicate (course, section) targets
//! - Empty targets (zero copies or blank identifiers)
//! - Targets with no instructor to draw from
//!
//! Every issue is collected; validation never stops at the first one.

use crate::index::ConstraintIndex;
use crate::models::{Room, Shift, TargetTask};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A target has no copies or a blank course/section.
    EmptyTask,
    /// Neither the course's eligible list nor the fallback pool has anyone.
    NoEligibleInstructor,
}

impl ValidationError {
    /// Creates an error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input data for a practicum scheduling run.
///
/// Checks:
/// 1. No duplicate shift IDs
/// 2. No duplicate room IDs
/// 3. No duplicate (course, section) targets
/// 4. Every target has at least one copy and non-blank identifiers
/// 5. Every target can draw an instructor, either from its eligible list
///    or from `fallback_instructors`
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    tasks: &[TargetTask],
    shifts: &[Shift],
    rooms: &[Room],
    index: &ConstraintIndex,
    fallback_instructors: &[String],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut shift_ids = HashSet::new();
    for s in shifts {
        if !shift_ids.insert(s.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate shift ID: {}", s.id),
            ));
        }
    }

    let mut room_ids = HashSet::new();
    for r in rooms {
        if !room_ids.insert(r.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate room ID: {}", r.id),
            ));
        }
    }

    let mut targets = HashSet::new();
    for task in tasks {
        if !targets.insert((task.course_id.as_str(), task.section.as_str())) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!(
                    "Duplicate target: course '{}' section '{}'",
                    task.course_id, task.section
                ),
            ));
        }

        if task.copies == 0 || task.course_id.trim().is_empty() || task.section.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyTask,
                format!(
                    "Target course '{}' section '{}' is empty",
                    task.course_id, task.section
                ),
            ));
        }

        if index.allowed_instructors(&task.course_id).is_empty() && fallback_instructors.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NoEligibleInstructor,
                format!("Course '{}' has no instructor candidates", task.course_id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TheoryScheduleEntry, Weekday};

    fn sample_shifts() -> Vec<Shift> {
        vec![
            Shift::new("S1").with_name("Shift 1").with_time(7 * 60, 9 * 60),
            Shift::new("S2").with_name("Shift 2").with_time(9 * 60, 11 * 60),
        ]
    }

    fn sample_rooms() -> Vec<Room> {
        vec![Room::lab("L1").with_name("Lab 1"), Room::lab("L2").with_name("Lab 2")]
    }

    fn sample_index() -> ConstraintIndex {
        ConstraintIndex::build(&[
            TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1"),
            TheoryScheduleEntry::new("P2", "B", Weekday::Tuesday, "S1").with_instructor("D2"),
        ])
    }

    fn sample_tasks() -> Vec<TargetTask> {
        vec![TargetTask::new("P1", "A"), TargetTask::new("P2", "B").with_copies(2)]
    }

    #[test]
    fn test_valid_input() {
        let result = validate_input(&sample_tasks(), &sample_shifts(), &sample_rooms(), &sample_index(), &[]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_duplicate_shift_id() {
        let shifts = vec![Shift::new("S1"), Shift::new("S1")];
        let errors = validate_input(&sample_tasks(), &shifts, &sample_rooms(), &sample_index(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("shift")));
    }

    #[test]
    fn test_duplicate_room_id() {
        let rooms = vec![Room::lab("L1"), Room::lab("L1")];
        let errors = validate_input(&sample_tasks(), &sample_shifts(), &rooms, &sample_index(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("room")));
    }

    #[test]
    fn test_duplicate_target() {
        let tasks = vec![TargetTask::new("P1", "A"), TargetTask::new("P1", "A")];
        let errors = validate_input(&tasks, &sample_shifts(), &sample_rooms(), &sample_index(), &[]).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateId);
    }

    #[test]
    fn test_empty_task() {
        let tasks = vec![TargetTask::new("P1", "A").with_copies(0), TargetTask::new("P2", " ")];
        let errors = validate_input(&tasks, &sample_shifts(), &sample_rooms(), &sample_index(), &[]).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::EmptyTask)
                .count(),
            2
        );
    }

    #[test]
    fn test_no_eligible_instructor() {
        let tasks = vec![TargetTask::new("P9", "A")];
        let errors = validate_input(&tasks, &sample_shifts(), &sample_rooms(), &sample_index(), &[]).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NoEligibleInstructor));

        // A fallback pool makes the target schedulable (with penalty).
        let fallback = vec!["D1".to_string()];
        assert!(validate_input(&tasks, &sample_shifts(), &sample_rooms(), &sample_index(), &fallback).is_ok());
    }

    #[test]
    fn test_multiple_errors() {
        let tasks = vec![TargetTask::new("P1", "A").with_copies(0), TargetTask::new("P9", "C")];
        let rooms = vec![Room::lab("L1"), Room::lab("L1")];
        let errors = validate_input(&tasks, &sample_shifts(), &rooms, &sample_index(), &[]).unwrap_err();
        assert!(errors.len() >= 3);
    }
}

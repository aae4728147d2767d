//! Fixed theory-course timetable entries.

use serde::{Deserialize, Serialize};

use super::Weekday;

/// One row of the existing theory timetable.
///
/// Read-only input: practicum genes must avoid its class slots and its
/// instructors' slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TheoryScheduleEntry {
    /// Theory course identifier.
    pub course_id: String,
    /// Class/section label. `None` for rows without a class.
    pub section: Option<String>,
    /// Teaching day.
    pub day: Weekday,
    /// Shift identifier.
    pub shift_id: String,
    /// Instructors attached to this row.
    pub instructor_ids: Vec<String>,
}

impl TheoryScheduleEntry {
    /// Creates an entry for a course section at a day/shift.
    pub fn new(
        course_id: impl Into<String>,
        section: impl Into<String>,
        day: Weekday,
        shift_id: impl Into<String>,
    ) -> Self {
        Self {
            course_id: course_id.into(),
            section: Some(section.into()),
            day,
            shift_id: shift_id.into(),
            instructor_ids: Vec::new(),
        }
    }

    /// Clears the section label.
    pub fn without_section(mut self) -> Self {
        self.section = None;
        self
    }

    /// Attaches an instructor.
    pub fn with_instructor(mut self, instructor_id: impl Into<String>) -> Self {
        self.instructor_ids.push(instructor_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let e = TheoryScheduleEntry::new("T-ALG", "A", Weekday::Tuesday, "S1")
            .with_instructor("D1")
            .with_instructor("D2");
        assert_eq!(e.course_id, "T-ALG");
        assert_eq!(e.section.as_deref(), Some("A"));
        assert_eq!(e.day, Weekday::Tuesday);
        assert_eq!(e.instructor_ids, vec!["D1", "D2"]);

        let e = e.without_section();
        assert!(e.section.is_none());
    }

    #[test]
    fn test_entry_deserialize() {
        let json = r#"{
            "course_id": "T1",
            "section": "B",
            "day": "FRIDAY",
            "shift_id": "S2",
            "instructor_ids": ["D9"]
        }"#;
        let e: TheoryScheduleEntry = serde_json::from_str(json).unwrap();
        assert_eq!(e.day, Weekday::Friday);
        assert_eq!(e.instructor_ids, vec!["D9"]);
    }
}

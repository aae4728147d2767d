//! Persisting the winning timetable.
//!
//! A solution becomes one [`ScheduleRecord`] per gene, tagged with its
//! academic period. Storage sits behind [`ResultMaterializer`]; a period
//! that already holds a generated timetable is refused rather than
//! overwritten.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ga::Gene;
use crate::models::{AcademicPeriod, Weekday};

/// One scheduled practicum session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    /// Practicum course identifier.
    pub course_id: String,
    /// Class/section label.
    pub section: String,
    /// Teaching day. Serializes as the English upper-case name; a store
    /// with its own day labels maps them in its materializer.
    pub day: Weekday,
    /// Shift identifier.
    pub shift_id: String,
    /// Room identifier.
    pub room_id: String,
    /// Instructor identifier.
    pub instructor_id: String,
    /// Period the session belongs to.
    pub period: AcademicPeriod,
}

impl ScheduleRecord {
    /// Builds a record from a gene.
    pub fn from_gene(gene: &Gene, period: &AcademicPeriod) -> Self {
        Self {
            course_id: gene.course_id.clone(),
            section: gene.section.clone(),
            day: gene.day,
            shift_id: gene.shift_id.clone(),
            room_id: gene.room_id.clone(),
            instructor_id: gene.instructor_id.clone(),
            period: period.clone(),
        }
    }
}

/// Materialization failures.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The period already has a generated timetable.
    #[error("schedules for {0} already exist")]
    AlreadyGenerated(AcademicPeriod),

    /// The backing store failed.
    #[error("schedule store failed: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Sink for generated schedules.
pub trait ResultMaterializer {
    /// Stores every record of one period.
    fn persist(&mut self, period: &AcademicPeriod, records: Vec<ScheduleRecord>) -> Result<usize, MaterializeError>;

    /// Whether `period` already has records.
    fn has_period(&self, period: &AcademicPeriod) -> bool;
}

/// In-memory schedule store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMaterializer {
    records: HashMap<AcademicPeriod, Vec<ScheduleRecord>>,
}

impl InMemoryMaterializer {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records stored for a period.
    pub fn records(&self, period: &AcademicPeriod) -> &[ScheduleRecord] {
        self.records.get(period).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Number of stored periods.
    pub fn period_count(&self) -> usize {
        self.records.len()
    }
}

impl ResultMaterializer for InMemoryMaterializer {
    fn persist(&mut self, period: &AcademicPeriod, records: Vec<ScheduleRecord>) -> Result<usize, MaterializeError> {
        if self.has_period(period) {
            return Err(MaterializeError::AlreadyGenerated(period.clone()));
        }
        let count = records.len();
        self.records.insert(period.clone(), records);
        Ok(count)
    }

    fn has_period(&self, period: &AcademicPeriod) -> bool {
        self.records.get(period).is_some_and(|r| !r.is_empty())
    }
}

//! Domain data loading.
//!
//! The solver reads everything through [`DomainDataLoader`]: theory
//! schedules for a period, the active shift/room catalog, the practicum
//! targets, and optional course links and instructor pool. Storage is
//! someone else's concern; [`InMemoryLoader`] backs tests and embedding.

use std::collections::HashMap;
use std::convert::Infallible;

use log::debug;

use crate::models::{
    derive_target_tasks, AcademicPeriod, Course, CourseLinks, Room, Shift, TargetTask,
    TheoryScheduleEntry,
};

/// Active shifts and schedulable lab rooms.
#[derive(Debug, Clone, Default)]
pub struct ActiveCatalog {
    /// Active shifts.
    pub shifts: Vec<Shift>,
    /// Active lab rooms.
    pub rooms: Vec<Room>,
}

/// Read-only source of solver input.
pub trait DomainDataLoader {
    /// Loader failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Theory-course schedule rows for `period`.
    fn load_theory_schedules(&self, period: &AcademicPeriod) -> Result<Vec<TheoryScheduleEntry>, Self::Error>;

    /// Active shifts and active lab rooms.
    fn load_active_shifts_and_rooms(&self) -> Result<ActiveCatalog, Self::Error>;

    /// Practicum (course, section) targets for `period`.
    fn load_practicum_tasks(&self, period: &AcademicPeriod) -> Result<Vec<TargetTask>, Self::Error>;

    /// Practicum → theory course links. `None` means allowed instructors
    /// are already keyed by practicum course id.
    fn load_course_links(&self) -> Result<Option<CourseLinks>, Self::Error> {
        Ok(None)
    }

    /// Instructors usable when a course has no eligible list. Empty means
    /// "everyone in the theory timetable".
    fn load_instructor_pool(&self) -> Result<Vec<String>, Self::Error> {
        Ok(Vec::new())
    }
}

/// In-memory loader.
///
/// Applies the same filters a database-backed loader would: inactive shifts
/// and inactive or non-lab rooms are dropped. Without explicit tasks,
/// targets are derived from the course links and the period's theory
/// sections.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    theory: HashMap<AcademicPeriod, Vec<TheoryScheduleEntry>>,
    shifts: Vec<Shift>,
    rooms: Vec<Room>,
    tasks: Option<Vec<TargetTask>>,
    courses: Vec<Course>,
    instructor_pool: Vec<String>,
}

impl InMemoryLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds theory rows for a period.
    pub fn with_theory(mut self, period: AcademicPeriod, entries: Vec<TheoryScheduleEntry>) -> Self {
        self.theory.entry(period).or_default().extend(entries);
        self
    }

    /// Sets the shift catalog.
    pub fn with_shifts(mut self, shifts: Vec<Shift>) -> Self {
        self.shifts = shifts;
        self
    }

    /// Sets the room catalog.
    pub fn with_rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = rooms;
        self
    }

    /// Sets explicit targets, bypassing derivation.
    pub fn with_tasks(mut self, tasks: Vec<TargetTask>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    /// Sets the course catalog used for linking.
    pub fn with_courses(mut self, courses: Vec<Course>) -> Self {
        self.courses = courses;
        self
    }

    /// Sets the fallback instructor pool.
    pub fn with_instructor_pool(mut self, pool: Vec<String>) -> Self {
        self.instructor_pool = pool;
        self
    }

    fn links(&self) -> Option<CourseLinks> {
        if self.courses.is_empty() {
            return None;
        }
        let (theory, practicum): (Vec<Course>, Vec<Course>) =
            self.courses.iter().cloned().partition(|c| c.is_theory);
        Some(CourseLinks::link(&practicum, &theory))
    }
}

impl DomainDataLoader for InMemoryLoader {
    type Error = Infallible;

    fn load_theory_schedules(&self, period: &AcademicPeriod) -> Result<Vec<TheoryScheduleEntry>, Infallible> {
        Ok(self.theory.get(period).cloned().unwrap_or_default())
    }

    fn load_active_shifts_and_rooms(&self) -> Result<ActiveCatalog, Infallible> {
        let shifts: Vec<Shift> = self.shifts.iter().filter(|s| s.is_active).cloned().collect();
        let rooms: Vec<Room> = self.rooms.iter().filter(|r| r.is_schedulable()).cloned().collect();
        debug!(
            "catalog: {} of {} shifts active, {} of {} rooms schedulable",
            shifts.len(),
            self.shifts.len(),
            rooms.len(),
            self.rooms.len()
        );
        Ok(ActiveCatalog { shifts, rooms })
    }

    fn load_practicum_tasks(&self, period: &AcademicPeriod) -> Result<Vec<TargetTask>, Infallible> {
        if let Some(tasks) = &self.tasks {
            return Ok(tasks.clone());
        }
        let theory = self.load_theory_schedules(period)?;
        Ok(self
            .links()
            .map(|links| derive_target_tasks(&links, &theory))
            .unwrap_or_default())
    }

    fn load_course_links(&self) -> Result<Option<CourseLinks>, Infallible> {
        Ok(self.links())
    }

    fn load_instructor_pool(&self) -> Result<Vec<String>, Infallible> {
        Ok(self.instructor_pool.clone())
    }
}

//! Gene/chromosome encoding for practicum timetabling.
//!
//! # Encoding
//!
//! A chromosome is a fixed-length vector of [`Gene`]s, one per task
//! instance. Position `i` always belongs to the `i`-th task instance, so
//! positional crossover keeps every gene attached to its task. Gene order
//! carries no meaning beyond that.
//!
//! Genes are drawn from a [`GeneCatalog`] (active shift ids, active room
//! ids, fallback instructor pool) and steered away from the section's
//! theory slots with a bounded retry loop.

use rand::Rng;
use rand::prelude::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::index::{ConstraintIndex, Slot};
use crate::models::{TaskInstance, Weekday};

/// One scheduling decision: a task instance placed at day/shift/room with
/// an instructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Gene {
    /// Practicum course identifier.
    pub course_id: String,
    /// Class/section label.
    pub section: String,
    /// Teaching day.
    pub day: Weekday,
    /// Shift identifier.
    pub shift_id: String,
    /// Room identifier.
    pub room_id: String,
    /// Instructor identifier.
    pub instructor_id: String,
}

impl Gene {
    /// 0-based day index, always in `[0, 6)`.
    pub fn day_index(&self) -> usize {
        self.day.index()
    }

    /// The (day, shift) slot this gene occupies.
    pub fn slot(&self) -> Slot {
        Slot::new(self.day, self.shift_id.clone())
    }
}

/// A full candidate timetable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Chromosome {
    /// One gene per task instance.
    pub genes: Vec<Gene>,
}

impl Chromosome {
    /// Wraps a gene vector.
    pub fn new(genes: Vec<Gene>) -> Self {
        Self { genes }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Whether the chromosome has no genes.
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Builds a random chromosome, one gene per instance.
    ///
    /// `None` when some instance has no instructor candidate.
    pub fn random<R: Rng>(
        instances: &[TaskInstance],
        catalog: &GeneCatalog,
        index: &ConstraintIndex,
        slot_retries: u32,
        rng: &mut R,
    ) -> Option<Self> {
        let genes = instances
            .iter()
            .map(|instance| {
                catalog
                    .random_gene(instance, index, slot_retries, rng)
                    .map(|(gene, _)| gene)
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self { genes })
    }

    /// Whether every gene references the catalog and sits on a valid task.
    pub fn is_valid(&self, instances: &[TaskInstance], catalog: &GeneCatalog, index: &ConstraintIndex) -> bool {
        self.genes.len() == instances.len()
            && self.genes.iter().zip(instances).all(|(gene, instance)| {
                gene.course_id == instance.course_id
                    && gene.section == instance.section
                    && catalog.contains_shift(&gene.shift_id)
                    && catalog.contains_room(&gene.room_id)
                    && catalog
                        .instructor_candidates(&gene.course_id, index)
                        .contains(&gene.instructor_id)
            })
    }
}

impl From<Vec<Gene>> for Chromosome {
    fn from(genes: Vec<Gene>) -> Self {
        Self::new(genes)
    }
}

/// Result of a best-effort attempt to keep a gene off its section's
/// theory slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
    /// The final slot does not collide with the section's theory slots.
    Clear,
    /// Retries were exhausted and the colliding slot was kept.
    Accepted {
        /// Number of re-rolls tried.
        attempts: u32,
    },
}

impl SlotOutcome {
    /// Whether the gene was left on a theory slot.
    pub fn is_accepted(self) -> bool {
        matches!(self, SlotOutcome::Accepted { .. })
    }
}

/// The value domain genes are drawn from.
///
/// Shift and room lists are never empty; [`GeneCatalog::new`] refuses them.
#[derive(Debug, Clone)]
pub struct GeneCatalog {
    shift_ids: Vec<String>,
    room_ids: Vec<String>,
    fallback_instructors: Vec<String>,
}

impl GeneCatalog {
    /// Creates a catalog. `None` when there is no shift or no room.
    pub fn new(
        shift_ids: Vec<String>,
        room_ids: Vec<String>,
        fallback_instructors: Vec<String>,
    ) -> Option<Self> {
        if shift_ids.is_empty() || room_ids.is_empty() {
            return None;
        }
        Some(Self {
            shift_ids,
            room_ids,
            fallback_instructors,
        })
    }

    /// Active shift ids.
    pub fn shift_ids(&self) -> &[String] {
        &self.shift_ids
    }

    /// Active room ids.
    pub fn room_ids(&self) -> &[String] {
        &self.room_ids
    }

    /// Instructors used for courses with no eligible list.
    pub fn fallback_instructors(&self) -> &[String] {
        &self.fallback_instructors
    }

    /// Whether `shift_id` is in the catalog.
    pub fn contains_shift(&self, shift_id: &str) -> bool {
        self.shift_ids.iter().any(|s| s == shift_id)
    }

    /// Whether `room_id` is in the catalog.
    pub fn contains_room(&self, room_id: &str) -> bool {
        self.room_ids.iter().any(|r| r == room_id)
    }

    /// Instructors a gene for `course_id` is drawn from: the eligible list
    /// when non-empty, otherwise the fallback pool.
    pub fn instructor_candidates<'a>(&'a self, course_id: &str, index: &'a ConstraintIndex) -> &'a [String] {
        let allowed = index.allowed_instructors(course_id);
        if allowed.is_empty() {
            &self.fallback_instructors
        } else {
            allowed
        }
    }

    /// Uniform random day.
    pub fn random_day<R: Rng>(&self, rng: &mut R) -> Weekday {
        Weekday::ALL[rng.random_range(0..Weekday::COUNT)]
    }

    /// Uniform random shift id.
    pub fn random_shift<R: Rng>(&self, rng: &mut R) -> String {
        pick_nonempty(&self.shift_ids, rng)
    }

    /// Uniform random room id.
    pub fn random_room<R: Rng>(&self, rng: &mut R) -> String {
        pick_nonempty(&self.room_ids, rng)
    }

    /// Whether a gene for `course_id` has at least one instructor to draw.
    pub fn has_instructor_for(&self, course_id: &str, index: &ConstraintIndex) -> bool {
        !self.instructor_candidates(course_id, index).is_empty()
    }

    /// Uniform random instructor for a course. `None` when both the
    /// eligible list and the fallback pool are empty.
    pub fn random_instructor<R: Rng>(&self, course_id: &str, index: &ConstraintIndex, rng: &mut R) -> Option<String> {
        self.instructor_candidates(course_id, index).choose(rng).cloned()
    }

    /// Draws a gene for `instance`, or `None` when the course has no
    /// instructor candidate.
    ///
    /// When the section has theory slots, re-rolls day, shift and room up to
    /// `slot_retries` times while the slot collides. A colliding slot is
    /// kept once retries run out; fitness penalizes it later.
    pub fn random_gene<R: Rng>(
        &self,
        instance: &TaskInstance,
        index: &ConstraintIndex,
        slot_retries: u32,
        rng: &mut R,
    ) -> Option<(Gene, SlotOutcome)> {
        if !self.has_instructor_for(&instance.course_id, index) {
            return None;
        }
        let mut day = self.random_day(rng);
        let mut shift_id = self.random_shift(rng);
        let mut room_id = self.random_room(rng);
        let mut outcome = SlotOutcome::Clear;

        if let Some(avoid) = index.class_slots(&instance.section) {
            let mut attempts = 0;
            while avoid.contains(&Slot::new(day, shift_id.as_str())) {
                if attempts >= slot_retries {
                    outcome = SlotOutcome::Accepted { attempts };
                    break;
                }
                day = self.random_day(rng);
                shift_id = self.random_shift(rng);
                room_id = self.random_room(rng);
                attempts += 1;
            }
        }

        let gene = Gene {
            course_id: instance.course_id.clone(),
            section: instance.section.clone(),
            day,
            shift_id,
            room_id,
            instructor_id: self.random_instructor(&instance.course_id, index, rng)?,
        };
        Some((gene, outcome))
    }
}

/// Shift and room lists are non-empty by construction.
fn pick_nonempty<R: Rng>(values: &[String], rng: &mut R) -> String {
    values[rng.random_range(0..values.len())].clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TargetTask, TheoryScheduleEntry, expand_tasks};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn sample_catalog() -> GeneCatalog {
        GeneCatalog::new(
            vec!["S1".into(), "S2".into()],
            vec!["L1".into(), "L2".into(), "L3".into()],
            vec!["F1".into()],
        )
        .unwrap()
    }

    fn sample_index() -> ConstraintIndex {
        ConstraintIndex::build(&[
            TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1"),
            TheoryScheduleEntry::new("P1", "A", Weekday::Tuesday, "S2").with_instructor("D2"),
        ])
    }

    fn sample_instances() -> Vec<TaskInstance> {
        expand_tasks(&[
            TargetTask::new("P1", "A").with_copies(2),
            TargetTask::new("P2", "B"),
        ])
    }

    #[test]
    fn test_catalog_requires_shifts_and_rooms() {
        assert!(GeneCatalog::new(vec![], vec!["L1".into()], vec![]).is_none());
        assert!(GeneCatalog::new(vec!["S1".into()], vec![], vec![]).is_none());
        assert!(GeneCatalog::new(vec!["S1".into()], vec!["L1".into()], vec![]).is_some());
    }

    #[test]
    fn test_random_chromosome_is_valid() {
        let catalog = sample_catalog();
        let index = sample_index();
        let instances = sample_instances();
        let mut rng = SmallRng::seed_from_u64(42);
        let ch = Chromosome::random(&instances, &catalog, &index, 10, &mut rng).unwrap();

        assert_eq!(ch.len(), 3);
        assert!(ch.is_valid(&instances, &catalog, &index));
        // P1 draws from its eligible list, P2 from the fallback pool.
        assert!(["D1", "D2"].contains(&ch.genes[0].instructor_id.as_str()));
        assert_eq!(ch.genes[2].instructor_id, "F1");
    }

    #[test]
    fn test_random_gene_avoids_theory_slots() {
        let catalog = sample_catalog();
        let index = sample_index();
        let instance = &sample_instances()[0];
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..200 {
            let (gene, outcome) = catalog.random_gene(instance, &index, 10, &mut rng).unwrap();
            if outcome == SlotOutcome::Clear {
                assert!(!index.overlaps_theory("A", &gene.slot()));
            } else {
                assert!(index.overlaps_theory("A", &gene.slot()));
            }
        }
    }

    #[test]
    fn test_exhausted_retries_report_acceptance() {
        // Every slot of section A collides: one day, one shift.
        let catalog = GeneCatalog::new(vec!["S1".into()], vec!["L1".into()], vec!["F1".into()]).unwrap();
        let entries: Vec<_> = Weekday::ALL
            .iter()
            .map(|d| TheoryScheduleEntry::new("T1", "A", *d, "S1"))
            .collect();
        let index = ConstraintIndex::build(&entries);
        let instance = TaskInstance {
            course_id: "P1".into(),
            section: "A".into(),
            copy: 0,
        };
        let mut rng = SmallRng::seed_from_u64(1);
        let (_, outcome) = catalog.random_gene(&instance, &index, 10, &mut rng).unwrap();
        assert_eq!(outcome, SlotOutcome::Accepted { attempts: 10 });
        assert!(outcome.is_accepted());
    }

    #[test]
    fn test_invalid_chromosome() {
        let catalog = sample_catalog();
        let index = sample_index();
        let instances = sample_instances();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut ch = Chromosome::random(&instances, &catalog, &index, 10, &mut rng).unwrap();
        ch.genes[1].room_id = "NOPE".into();
        assert!(!ch.is_valid(&instances, &catalog, &index));

        let short = Chromosome::new(ch.genes[..2].to_vec());
        assert!(!short.is_valid(&instances, &catalog, &index));
    }

    #[test]
    fn test_no_instructor_candidate_yields_no_gene() {
        let catalog = GeneCatalog::new(vec!["S1".into()], vec!["L1".into()], vec![]).unwrap();
        let index = sample_index();
        let instance = TaskInstance {
            course_id: "P9".into(),
            section: "B".into(),
            copy: 0,
        };
        let mut rng = SmallRng::seed_from_u64(4);
        assert!(!catalog.has_instructor_for("P9", &index));
        assert!(catalog.has_instructor_for("P1", &index));
        assert!(catalog.random_instructor("P9", &index, &mut rng).is_none());
        assert!(catalog.random_gene(&instance, &index, 10, &mut rng).is_none());
        assert!(Chromosome::random(&[instance], &catalog, &index, 10, &mut rng).is_none());
    }

    #[test]
    fn test_gene_day_index() {
        let gene = Gene {
            course_id: "P1".into(),
            section: "A".into(),
            day: Weekday::Saturday,
            shift_id: "S1".into(),
            room_id: "L1".into(),
            instructor_id: "D1".into(),
        };
        assert_eq!(gene.day_index(), 5);
        assert_eq!(gene.slot(), Slot::new(Weekday::Saturday, "S1"));
    }
}

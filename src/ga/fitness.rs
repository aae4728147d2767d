//! Weighted-penalty fitness for practicum chromosomes.
//!
//! # Penalty terms
//!
//! | Term | Counted as | Default weight |
//! |------|-----------|----------------|
//! | Room double-booking | `max(0, n-1)` per room | 2000 |
//! | Instructor double-booking | `max(0, n-1)` per instructor | 2000 |
//! | Ineligible instructor | 1 per gene | 5000 |
//! | Theory overlap | 1 per gene on its section's theory slot | 4000 |
//! | Instructor busy in theory | theory rows at the gene's slot | 3000 |
//!
//! `fitness = 1 / (1 + penalty)`, so fitness lies in `(0, 1]` and equals 1
//! only for a zero-penalty chromosome.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Chromosome;
use crate::index::{ConstraintIndex, Slot};

/// Relative penalty weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Per extra occupant of a room.
    pub room_conflict: u64,
    /// Per extra booking of an instructor.
    pub instructor_conflict: u64,
    /// Per gene with an ineligible instructor.
    pub invalid_instructor: u64,
    /// Per gene on its section's theory slot.
    pub theory_overlap: u64,
    /// Per theory row holding the gene's instructor at the gene's slot.
    pub theory_instructor_conflict: u64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            room_conflict: 2000,
            instructor_conflict: 2000,
            invalid_instructor: 5000,
            theory_overlap: 4000,
            theory_instructor_conflict: 3000,
        }
    }
}

/// What counts as a double-booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictScope {
    /// Any two genes sharing a room (or instructor) anywhere in the
    /// chromosome.
    #[default]
    Resource,
    /// Two genes sharing a room (or instructor) in the same (day, shift).
    Slot,
}

/// Raw violation counts for one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PenaltyBreakdown {
    /// Extra room occupants.
    pub room_conflicts: u64,
    /// Extra instructor bookings.
    pub instructor_conflicts: u64,
    /// Genes with an ineligible instructor.
    pub invalid_instructor: u64,
    /// Genes on their section's theory slots.
    pub theory_overlap: u64,
    /// Theory rows clashing with gene instructors.
    pub theory_instructor_conflict: u64,
}

impl PenaltyBreakdown {
    /// Counts violations in `chromosome`.
    pub fn compute(chromosome: &Chromosome, index: &ConstraintIndex, scope: ConflictScope) -> Self {
        let mut room_counts: HashMap<(&str, Option<Slot>), u64> = HashMap::new();
        let mut instructor_counts: HashMap<(&str, Option<Slot>), u64> = HashMap::new();
        let mut breakdown = Self::default();

        for gene in &chromosome.genes {
            let slot = gene.slot();
            let scoped = match scope {
                ConflictScope::Resource => None,
                ConflictScope::Slot => Some(slot.clone()),
            };

            *room_counts.entry((gene.room_id.as_str(), scoped.clone())).or_insert(0) += 1;
            *instructor_counts
                .entry((gene.instructor_id.as_str(), scoped))
                .or_insert(0) += 1;

            if !index.is_allowed(&gene.course_id, &gene.instructor_id) {
                breakdown.invalid_instructor += 1;
            }
            if index.overlaps_theory(&gene.section, &slot) {
                breakdown.theory_overlap += 1;
            }
            breakdown.theory_instructor_conflict +=
                u64::from(index.theory_instructor_load(&gene.instructor_id, &slot));
        }

        breakdown.room_conflicts = excess(room_counts.values());
        breakdown.instructor_conflicts = excess(instructor_counts.values());
        breakdown
    }

    /// Weighted sum of the counts, saturating at `u64::MAX`.
    pub fn penalty(&self, weights: &FitnessWeights) -> u64 {
        [
            (weights.room_conflict, self.room_conflicts),
            (weights.instructor_conflict, self.instructor_conflicts),
            (weights.invalid_instructor, self.invalid_instructor),
            (weights.theory_overlap, self.theory_overlap),
            (weights.theory_instructor_conflict, self.theory_instructor_conflict),
        ]
        .into_iter()
        .fold(0u64, |sum, (weight, count)| sum.saturating_add(weight.saturating_mul(count)))
    }

    /// Total number of counted violations.
    pub fn total(&self) -> u64 {
        self.room_conflicts
            + self.instructor_conflicts
            + self.invalid_instructor
            + self.theory_overlap
            + self.theory_instructor_conflict
    }
}

fn excess<'a>(counts: impl Iterator<Item = &'a u64>) -> u64 {
    counts.map(|&n| n.saturating_sub(1)).sum()
}

/// Fitness and penalty of one chromosome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    /// `1 / (1 + penalty)`, in `(0, 1]`.
    pub fitness: f64,
    /// Weighted penalty.
    pub penalty: u64,
    /// Raw counts behind the penalty.
    pub breakdown: PenaltyBreakdown,
}

impl Evaluation {
    /// Whether the chromosome violates nothing.
    pub fn is_feasible(&self) -> bool {
        self.penalty == 0
    }
}

/// Converts a penalty into a fitness in `(0, 1]`.
pub fn fitness_from_penalty(penalty: u64) -> f64 {
    1.0 / (1.0 + penalty as f64)
}

/// Evaluates a chromosome. Pure function of its inputs.
pub fn evaluate(
    chromosome: &Chromosome,
    index: &ConstraintIndex,
    weights: &FitnessWeights,
    scope: ConflictScope,
) -> Evaluation {
    let breakdown = PenaltyBreakdown::compute(chromosome, index, scope);
    let penalty = breakdown.penalty(weights);
    Evaluation {
        fitness: fitness_from_penalty(penalty),
        penalty,
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::Gene;
    use crate::models::{TheoryScheduleEntry, Weekday};

    fn gene(course: &str, section: &str, day: Weekday, shift: &str, room: &str, instructor: &str) -> Gene {
        Gene {
            course_id: course.into(),
            section: section.into(),
            day,
            shift_id: shift.into(),
            room_id: room.into(),
            instructor_id: instructor.into(),
        }
    }

    fn sample_index() -> ConstraintIndex {
        ConstraintIndex::build(&[
            TheoryScheduleEntry::new("P1", "A", Weekday::Monday, "S1").with_instructor("D1"),
            TheoryScheduleEntry::new("P1", "B", Weekday::Monday, "S1").with_instructor("D1"),
            TheoryScheduleEntry::new("P2", "B", Weekday::Tuesday, "S1").with_instructor("D2"),
        ])
    }

    #[test]
    fn test_feasible_chromosome() {
        let index = sample_index();
        let ch = Chromosome::new(vec![
            gene("P1", "A", Weekday::Wednesday, "S1", "L1", "D1"),
            gene("P2", "B", Weekday::Thursday, "S2", "L2", "D2"),
        ]);
        let eval = evaluate(&ch, &index, &FitnessWeights::default(), ConflictScope::Resource);
        assert_eq!(eval.penalty, 0);
        assert_eq!(eval.fitness, 1.0);
        assert!(eval.is_feasible());
    }

    #[test]
    fn test_empty_chromosome_is_feasible() {
        let eval = evaluate(
            &Chromosome::default(),
            &sample_index(),
            &FitnessWeights::default(),
            ConflictScope::Resource,
        );
        assert_eq!(eval.fitness, 1.0);
    }

    #[test]
    fn test_each_penalty_term() {
        let index = sample_index();
        let weights = FitnessWeights::default();
        let ch = Chromosome::new(vec![
            // On A's theory slot, D1 busy there once.
            gene("P1", "A", Weekday::Monday, "S1", "L1", "D1"),
            // Same room and instructor as above; D1 not eligible for P2.
            gene("P2", "C", Weekday::Friday, "S2", "L1", "D1"),
        ]);
        let eval = evaluate(&ch, &index, &weights, ConflictScope::Resource);
        let b = eval.breakdown;
        assert_eq!(b.room_conflicts, 1);
        assert_eq!(b.instructor_conflicts, 1);
        assert_eq!(b.invalid_instructor, 1);
        assert_eq!(b.theory_overlap, 1);
        // D1 has two theory rows at Monday/S1.
        assert_eq!(b.theory_instructor_conflict, 2);
        assert_eq!(b.total(), 6);
        assert_eq!(eval.penalty, 2000 + 2000 + 5000 + 4000 + 2 * 3000);
        assert!((eval.fitness - 1.0 / 19001.0).abs() < 1e-15);
    }

    #[test]
    fn test_room_conflict_adds_exactly_one_weight() {
        let index = sample_index();
        let weights = FitnessWeights::default();
        let mut genes = vec![
            gene("P1", "A", Weekday::Wednesday, "S1", "L1", "D1"),
            gene("P2", "B", Weekday::Thursday, "S2", "L2", "D2"),
        ];
        let before = evaluate(&Chromosome::new(genes.clone()), &index, &weights, ConflictScope::Resource);

        genes[1].room_id = "L1".into();
        let after = evaluate(&Chromosome::new(genes), &index, &weights, ConflictScope::Resource);

        assert_eq!(after.penalty, before.penalty + weights.room_conflict);
        assert!(after.fitness < before.fitness);
    }

    #[test]
    fn test_three_occupants_count_two_conflicts() {
        let index = ConstraintIndex::default();
        let ch = Chromosome::new(vec![
            gene("P1", "A", Weekday::Monday, "S1", "L1", "X1"),
            gene("P1", "B", Weekday::Tuesday, "S1", "L1", "X2"),
            gene("P1", "C", Weekday::Friday, "S1", "L1", "X3"),
        ]);
        let b = PenaltyBreakdown::compute(&ch, &index, ConflictScope::Resource);
        assert_eq!(b.room_conflicts, 2);
        assert_eq!(b.instructor_conflicts, 0);
        // Empty eligible list means every instructor is ineligible.
        assert_eq!(b.invalid_instructor, 3);
    }

    #[test]
    fn test_slot_scope_ignores_different_slots() {
        let index = ConstraintIndex::default();
        let ch = Chromosome::new(vec![
            gene("P1", "A", Weekday::Monday, "S1", "L1", "X1"),
            gene("P1", "B", Weekday::Tuesday, "S1", "L1", "X1"),
            gene("P1", "C", Weekday::Tuesday, "S1", "L1", "X2"),
        ]);
        let b = PenaltyBreakdown::compute(&ch, &index, ConflictScope::Slot);
        assert_eq!(b.room_conflicts, 1);
        assert_eq!(b.instructor_conflicts, 0);
        let b = PenaltyBreakdown::compute(&ch, &index, ConflictScope::Resource);
        assert_eq!(b.room_conflicts, 2);
        assert_eq!(b.instructor_conflicts, 1);
    }

    #[test]
    fn test_huge_weight_saturates() {
        let index = ConstraintIndex::default();
        let weights = FitnessWeights {
            room_conflict: 1 << 63,
            ..FitnessWeights::default()
        };
        let ch = Chromosome::new(vec![
            gene("P1", "A", Weekday::Monday, "S1", "L1", "X1"),
            gene("P1", "B", Weekday::Tuesday, "S1", "L1", "X2"),
            gene("P1", "C", Weekday::Friday, "S1", "L1", "X3"),
        ]);
        let eval = evaluate(&ch, &index, &weights, ConflictScope::Resource);
        assert_eq!(eval.breakdown.room_conflicts, 2);
        assert_eq!(eval.penalty, u64::MAX);
        assert!(!eval.is_feasible());
        assert!(eval.fitness < 1.0);

        let all_max = FitnessWeights {
            room_conflict: u64::MAX,
            instructor_conflict: u64::MAX,
            invalid_instructor: u64::MAX,
            theory_overlap: u64::MAX,
            theory_instructor_conflict: u64::MAX,
        };
        assert_eq!(eval.breakdown.penalty(&all_max), u64::MAX);
    }

    #[test]
    fn test_fitness_bounds() {
        assert_eq!(fitness_from_penalty(0), 1.0);
        for p in [1, 2000, 5_000_000, u64::MAX] {
            let f = fitness_from_penalty(p);
            assert!(f > 0.0 && f < 1.0);
        }
    }

    #[test]
    fn test_weights_deserialize_with_defaults() {
        let w: FitnessWeights = serde_json::from_str(r#"{"room_conflict": 10}"#).unwrap();
        assert_eq!(w.room_conflict, 10);
        assert_eq!(w.invalid_instructor, 5000);
    }
}

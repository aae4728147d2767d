//! Genetic operators for practicum chromosomes.
//!
//! - [`tournament_select`]: best of `k` uniform draws
//! - [`single_point_crossover`]: positional one-cut crossover
//! - [`mutate`]: per-gene re-roll of day, shift, room, or instructor
//! - [`repair_room_conflicts`]: greedy room swap for (room, slot) clashes
//!
//! Mutation and repair are best-effort: exhausted retry budgets leave the
//! violation in place for fitness to penalize, and are reported in the
//! returned [`MutationReport`] / [`RepairReport`].
//!
//! [`GeneticOperators`] bundles the rates and retry budgets.
//!
//! # Usage
//!
//! ```
//! use lab_schedule::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.mutation_rate, 0.1);
//! assert_eq!(ops.repair_attempts, 3);
//! ```

use std::collections::HashSet;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{Chromosome, GeneCatalog, SlotOutcome};
use crate::index::{ConstraintIndex, Slot};
use crate::models::TaskInstance;

/// Clamps a rate into a valid probability. Non-finite rates become 0.
pub(crate) fn probability(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

// ======================== Selection ========================

/// Tournament selection over a fitness slice (higher = better).
///
/// Draws `size` contestants uniformly with replacement and returns the
/// index of the fittest; ties keep the first drawn. `None` for an empty
/// population.
pub fn tournament_select<R: Rng>(fitness: &[f64], size: usize, rng: &mut R) -> Option<usize> {
    if fitness.is_empty() {
        return None;
    }
    let mut best = rng.random_range(0..fitness.len());
    for _ in 1..size.max(1) {
        let idx = rng.random_range(0..fitness.len());
        if fitness[idx] > fitness[best] {
            best = idx;
        }
    }
    Some(best)
}

// ======================== Crossover ========================

/// Single cut-point crossover.
///
/// The cut is uniform in `[1, len-1]`; child 1 takes `p1[..cut] + p2[cut..]`
/// and child 2 the mirror. Parents shorter than 2 genes, or of unequal
/// length, are returned unchanged.
pub fn single_point_crossover<R: Rng>(
    p1: &Chromosome,
    p2: &Chromosome,
    rng: &mut R,
) -> (Chromosome, Chromosome) {
    let len = p1.len();
    if len < 2 || p2.len() != len {
        return (p1.clone(), p2.clone());
    }

    let cut = rng.random_range(1..len);
    let child1 = p1.genes[..cut].iter().chain(&p2.genes[cut..]).cloned().collect();
    let child2 = p2.genes[..cut].iter().chain(&p1.genes[cut..]).cloned().collect();
    (Chromosome::new(child1), Chromosome::new(child2))
}

// ======================== Mutation ========================

/// Outcome of one [`mutate`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationReport {
    /// Genes that were re-rolled.
    pub mutated: usize,
    /// Mutated genes left on their section's theory slot.
    pub unresolved: usize,
}

/// Per-gene mutation.
///
/// Each gene mutates with probability `rate`. A mutating gene re-rolls one
/// of day, shift, room, or instructor (uniformly chosen). If the section
/// has theory slots, the day and shift are then re-rolled up to
/// `slot_retries` times while the slot collides.
pub fn mutate<R: Rng>(
    chromosome: &mut Chromosome,
    catalog: &GeneCatalog,
    index: &ConstraintIndex,
    rate: f64,
    slot_retries: u32,
    rng: &mut R,
) -> MutationReport {
    let rate = probability(rate);
    let mut report = MutationReport::default();

    for gene in &mut chromosome.genes {
        if !rng.random_bool(rate) {
            continue;
        }
        report.mutated += 1;

        match rng.random_range(0..4) {
            0 => gene.day = catalog.random_day(rng),
            1 => gene.shift_id = catalog.random_shift(rng),
            2 => gene.room_id = catalog.random_room(rng),
            _ => {
                if let Some(instructor_id) = catalog.random_instructor(&gene.course_id, index, rng) {
                    gene.instructor_id = instructor_id;
                }
            }
        }

        if let Some(avoid) = index.class_slots(&gene.section) {
            let mut attempts = 0;
            let outcome = loop {
                if !avoid.contains(&gene.slot()) {
                    break SlotOutcome::Clear;
                }
                if attempts >= slot_retries {
                    break SlotOutcome::Accepted { attempts };
                }
                gene.day = catalog.random_day(rng);
                gene.shift_id = catalog.random_shift(rng);
                attempts += 1;
            };
            if outcome.is_accepted() {
                report.unresolved += 1;
            }
        }
    }

    report
}

// ======================== Repair ========================

/// Outcome of one [`repair_room_conflicts`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Genes moved to a free room.
    pub repaired: usize,
    /// Clashing genes left in place.
    pub unresolved: usize,
}

impl RepairReport {
    /// Whether the pass found no clash, or fixed every clash it found.
    pub fn is_clean(&self) -> bool {
        self.unresolved == 0
    }
}

/// Greedy (room, slot) clash repair.
///
/// Scans genes in order while tracking occupied (room, slot) pairs. A gene
/// landing on an occupied pair tries up to `attempts` random rooms and
/// moves to the first free one; otherwise it stays put.
pub fn repair_room_conflicts<R: Rng>(
    chromosome: &mut Chromosome,
    catalog: &GeneCatalog,
    attempts: u32,
    rng: &mut R,
) -> RepairReport {
    let mut occupied: HashSet<(String, Slot)> = HashSet::with_capacity(chromosome.len());
    let mut report = RepairReport::default();

    for gene in &mut chromosome.genes {
        let slot = gene.slot();
        if !occupied.contains(&(gene.room_id.clone(), slot.clone())) {
            occupied.insert((gene.room_id.clone(), slot));
            continue;
        }

        let mut moved = false;
        for _ in 0..attempts {
            let room = catalog.random_room(rng);
            let key = (room, slot.clone());
            if !occupied.contains(&key) {
                gene.room_id = key.0.clone();
                occupied.insert(key);
                moved = true;
                break;
            }
        }

        if moved {
            report.repaired += 1;
        } else {
            report.unresolved += 1;
        }
    }

    report
}

// ======================== Operator bundle ========================

/// Mutation rate and retry budgets used by the practicum GA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticOperators {
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Slot re-rolls when creating a gene.
    pub init_slot_retries: u32,
    /// Slot re-rolls after a mutation.
    pub mutation_slot_retries: u32,
    /// Room swaps tried per clashing gene during repair.
    pub repair_attempts: u32,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self {
            mutation_rate: 0.1,
            init_slot_retries: 10,
            mutation_slot_retries: 4,
            repair_attempts: 3,
        }
    }
}

impl GeneticOperators {
    /// Sets the per-gene mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the number of slot re-rolls used at gene creation.
    pub fn with_init_slot_retries(mut self, retries: u32) -> Self {
        self.init_slot_retries = retries;
        self
    }

    /// Sets the number of slot re-rolls used after mutation.
    pub fn with_mutation_slot_retries(mut self, retries: u32) -> Self {
        self.mutation_slot_retries = retries;
        self
    }

    /// Sets the number of room swaps tried during repair.
    pub fn with_repair_attempts(mut self, attempts: u32) -> Self {
        self.repair_attempts = attempts;
        self
    }

    /// Creates a random chromosome; `None` when an instance has no
    /// instructor candidate.
    pub fn create<R: Rng>(
        &self,
        instances: &[TaskInstance],
        catalog: &GeneCatalog,
        index: &ConstraintIndex,
        rng: &mut R,
    ) -> Option<Chromosome> {
        Chromosome::random(instances, catalog, index, self.init_slot_retries, rng)
    }

    /// Applies per-gene mutation with the configured rate.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut Chromosome,
        catalog: &GeneCatalog,
        index: &ConstraintIndex,
        rng: &mut R,
    ) -> MutationReport {
        let report = mutate(
            chromosome,
            catalog,
            index,
            self.mutation_rate,
            self.mutation_slot_retries,
            rng,
        );
        if report.unresolved > 0 {
            trace!(
                "mutation left {} of {} genes on theory slots",
                report.unresolved, report.mutated
            );
        }
        report
    }

    /// Runs the greedy room repair.
    pub fn repair<R: Rng>(
        &self,
        chromosome: &mut Chromosome,
        catalog: &GeneCatalog,
        rng: &mut R,
    ) -> RepairReport {
        let report = repair_room_conflicts(chromosome, catalog, self.repair_attempts, rng);
        if !report.is_clean() {
            trace!(
                "repair moved {} genes, {} room clashes left",
                report.repaired, report.unresolved
            );
        }
        report
    }
}

//! Conflict report for a finished timetable.
//!
//! Explains a chromosome's penalty gene by gene, so callers can show which
//! sessions still clash when the run stopped short of a feasible result.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Conflicts | One entry per offending gene and violation kind |
//! | Clean Gene Rate | Fraction of genes with no conflict |
//! | Sessions by Room | Genes placed in each room |
//!
//! Room and instructor double-bookings flag every occupant after the first,
//! so their counts match [`PenaltyBreakdown`].

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::ga::fitness::{ConflictScope, PenaltyBreakdown};
use crate::ga::Chromosome;
use crate::index::{ConstraintIndex, Slot};

/// Kind of violation attached to one gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ConflictKind {
    /// Room already taken by an earlier gene.
    RoomDoubleBooked {
        /// Room identifier.
        room_id: String,
    },
    /// Instructor already booked by an earlier gene.
    InstructorDoubleBooked {
        /// Instructor identifier.
        instructor_id: String,
    },
    /// Instructor not eligible for the course.
    IneligibleInstructor,
    /// Gene sits on its section's theory slot.
    TheoryOverlap,
    /// Instructor teaches theory at the same slot.
    InstructorInTheory {
        /// Clashing theory rows.
        rows: u32,
    },
}

/// A violation located at a gene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneConflict {
    /// Gene position in the chromosome.
    pub gene_index: usize,
    /// What is wrong.
    #[serde(flatten)]
    pub kind: ConflictKind,
}

/// Per-gene explanation of a chromosome's penalty.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictReport {
    /// Every located violation, ordered by gene.
    pub conflicts: Vec<GeneConflict>,
    /// Aggregated counts.
    pub breakdown: PenaltyBreakdown,
    /// Fraction of genes with no conflict (0.0..1.0).
    pub clean_gene_rate: f64,
    /// Number of genes per room.
    pub sessions_by_room: HashMap<String, usize>,
}

impl ConflictReport {
    /// Analyzes a chromosome.
    pub fn analyze(chromosome: &Chromosome, index: &ConstraintIndex, scope: ConflictScope) -> Self {
        let mut conflicts = Vec::new();
        let mut rooms_seen: HashSet<(&str, Option<Slot>)> = HashSet::new();
        let mut instructors_seen: HashSet<(&str, Option<Slot>)> = HashSet::new();
        let mut sessions_by_room: HashMap<String, usize> = HashMap::new();

        for (i, gene) in chromosome.genes.iter().enumerate() {
            let slot = gene.slot();
            let scoped = match scope {
                ConflictScope::Resource => None,
                ConflictScope::Slot => Some(slot.clone()),
            };

            *sessions_by_room.entry(gene.room_id.clone()).or_insert(0) += 1;

            if !rooms_seen.insert((gene.room_id.as_str(), scoped.clone())) {
                conflicts.push(GeneConflict {
                    gene_index: i,
                    kind: ConflictKind::RoomDoubleBooked {
                        room_id: gene.room_id.clone(),
                    },
                });
            }
            if !instructors_seen.insert((gene.instructor_id.as_str(), scoped)) {
                conflicts.push(GeneConflict {
                    gene_index: i,
                    kind: ConflictKind::InstructorDoubleBooked {
                        instructor_id: gene.instructor_id.clone(),
                    },
                });
            }
            if !index.is_allowed(&gene.course_id, &gene.instructor_id) {
                conflicts.push(GeneConflict {
                    gene_index: i,
                    kind: ConflictKind::IneligibleInstructor,
                });
            }
            if index.overlaps_theory(&gene.section, &slot) {
                conflicts.push(GeneConflict {
                    gene_index: i,
                    kind: ConflictKind::TheoryOverlap,
                });
            }
            let rows = index.theory_instructor_load(&gene.instructor_id, &slot);
            if rows > 0 {
                conflicts.push(GeneConflict {
                    gene_index: i,
                    kind: ConflictKind::InstructorInTheory { rows },
                });
            }
        }

        let offending: HashSet<usize> = conflicts.iter().map(|c| c.gene_index).collect();
        let clean_gene_rate = if chromosome.is_empty() {
            1.0
        } else {
            (chromosome.len() - offending.len()) as f64 / chromosome.len() as f64
        };

        Self {
            conflicts,
            breakdown: PenaltyBreakdown::compute(chromosome, index, scope),
            clean_gene_rate,
            sessions_by_room,
        }
    }

    /// Whether no violation was found.
    pub fn is_feasible(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts attached to one gene.
    pub fn for_gene(&self, gene_index: usize) -> impl Iterator<Item = &GeneConflict> {
        self.conflicts
            .iter()
            .filter(move |c| c.gene_index == gene_index)
    }
}

/*!
 * Structural integrity checks for a loaded annotation document.
 *
 * The checker never fails and never mutates: it lists what is wrong so the
 * user can decide whether a file is safe to edit. Checked:
 * - Annotation and tier id uniqueness
 * - Declared slot values never decrease
 * - Slot, governing, parent and type references resolve
 * - Every annotation has a defined interval
 * - Annotation representation matches the tier's linguistic type
 */

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::document::{AnnotationKind, Document};

/// Types of integrity issues
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    /// Annotation id used more than once
    DuplicateAnnotationId {
        annotation_id: String,
        count: usize,
    },
    /// Tier id used more than once
    DuplicateTierId {
        tier_id: String,
        count: usize,
    },
    /// Declared slot value below an earlier declared value
    NonMonotonicSlot {
        slot_id: String,
        value_ms: u64,
        previous_ms: u64,
    },
    /// Anchored annotation pointing at a missing slot
    DanglingSlotReference {
        annotation_id: String,
        slot_id: String,
    },
    /// Referential annotation pointing at a missing annotation
    DanglingGoverningReference {
        annotation_id: String,
        governing: String,
    },
    /// Interval could not be resolved within the chain bound
    UndefinedInterval {
        annotation_id: String,
    },
    /// Parent reference to a tier that does not exist
    UnknownParentTier {
        tier_id: String,
        parent: String,
    },
    /// Linguistic type reference that is not declared
    UnknownLinguisticType {
        tier_id: String,
        type_id: String,
    },
    /// Annotation representation does not match the tier's type
    RepresentationMismatch {
        tier_id: String,
        annotation_id: String,
        time_alignable: bool,
    },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::DuplicateAnnotationId { annotation_id, count } => {
                write!(f, "Annotation id {} is used {} times", annotation_id, count)
            }
            IntegrityIssue::DuplicateTierId { tier_id, count } => {
                write!(f, "Tier id {} is used {} times", tier_id, count)
            }
            IntegrityIssue::NonMonotonicSlot {
                slot_id,
                value_ms,
                previous_ms,
            } => {
                write!(
                    f,
                    "Time slot {} at {}ms comes after a slot at {}ms",
                    slot_id, value_ms, previous_ms
                )
            }
            IntegrityIssue::DanglingSlotReference { annotation_id, slot_id } => {
                write!(f, "Annotation {} references missing time slot {}", annotation_id, slot_id)
            }
            IntegrityIssue::DanglingGoverningReference { annotation_id, governing } => {
                write!(
                    f,
                    "Annotation {} references missing annotation {}",
                    annotation_id, governing
                )
            }
            IntegrityIssue::UndefinedInterval { annotation_id } => {
                write!(f, "Annotation {} has no resolvable interval", annotation_id)
            }
            IntegrityIssue::UnknownParentTier { tier_id, parent } => {
                write!(f, "Tier {} has unknown parent {}", tier_id, parent)
            }
            IntegrityIssue::UnknownLinguisticType { tier_id, type_id } => {
                write!(f, "Tier {} uses undeclared linguistic type {}", tier_id, type_id)
            }
            IntegrityIssue::RepresentationMismatch {
                tier_id,
                annotation_id,
                time_alignable,
            } => {
                let expected = if *time_alignable { "time-alignable" } else { "symbolic" };
                write!(
                    f,
                    "Annotation {} does not match the {} type of tier {}",
                    annotation_id, expected, tier_id
                )
            }
        }
    }
}

/// Result of checking one document
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Name of the checked document
    pub document: String,
    /// Overall pass/fail status
    pub passed: bool,
    /// Issues in check order
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    /// Issues that are recovered by the model at load time
    pub fn recoverable(&self) -> Vec<&IntegrityIssue> {
        self.issues
            .iter()
            .filter(|issue| {
                matches!(
                    issue,
                    IntegrityIssue::DuplicateTierId { .. } | IntegrityIssue::UndefinedInterval { .. }
                )
            })
            .collect()
    }
}

/// Integrity checker for annotation documents
#[derive(Debug, Default)]
pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    /// Run every check against a document
    pub fn check(&self, document: &Document) -> IntegrityReport {
        let mut issues = Vec::new();
        issues.extend(self.check_unique_ids(document));
        issues.extend(self.check_slot_order(document));
        issues.extend(self.check_references(document));
        issues.extend(self.check_representation(document));

        debug!("Integrity check of {}: {} issue(s)", document.name(), issues.len());

        IntegrityReport {
            document: document.name().to_string(),
            passed: issues.is_empty(),
            issues,
        }
    }

    fn check_unique_ids(&self, document: &Document) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        for tier_id in document.duplicate_tier_ids() {
            let count = document.tiers().iter().filter(|t| t.id == tier_id).count();
            issues.push(IntegrityIssue::DuplicateTierId { tier_id, count });
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for annotation in document.tiers().iter().flat_map(|t| t.annotations.iter()) {
            let count = counts.entry(annotation.id.as_str()).or_default();
            *count += 1;
            if *count == 2 {
                order.push(&annotation.id);
            }
        }
        for annotation_id in order {
            issues.push(IntegrityIssue::DuplicateAnnotationId {
                annotation_id: annotation_id.to_string(),
                count: counts[annotation_id],
            });
        }
        issues
    }

    fn check_slot_order(&self, document: &Document) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let mut previous: Option<u64> = None;
        for slot in document.time_slots() {
            let Some(value_ms) = slot.value else {
                continue;
            };
            match previous {
                Some(previous_ms) if value_ms < previous_ms => {
                    issues.push(IntegrityIssue::NonMonotonicSlot {
                        slot_id: slot.id.clone(),
                        value_ms,
                        previous_ms,
                    });
                }
                _ => previous = Some(value_ms),
            }
        }
        issues
    }

    fn check_references(&self, document: &Document) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        let slot_ids: HashSet<&str> = document.time_slots().iter().map(|s| s.id.as_str()).collect();
        let annotation_ids: HashSet<&str> = document
            .tiers()
            .iter()
            .flat_map(|t| t.annotations.iter())
            .map(|a| a.id.as_str())
            .collect();

        for tier in document.tiers() {
            if let Some(parent) = tier.parent.as_deref().filter(|p| !document.has_tier(p)) {
                issues.push(IntegrityIssue::UnknownParentTier {
                    tier_id: tier.id.clone(),
                    parent: parent.to_string(),
                });
            }
            if document.linguistic_type(&tier.linguistic_type).is_none() {
                issues.push(IntegrityIssue::UnknownLinguisticType {
                    tier_id: tier.id.clone(),
                    type_id: tier.linguistic_type.clone(),
                });
            }

            for annotation in &tier.annotations {
                match &annotation.kind {
                    AnnotationKind::Anchored { start_slot, stop_slot } => {
                        for slot_id in [start_slot, stop_slot] {
                            if !slot_ids.contains(slot_id.as_str()) {
                                issues.push(IntegrityIssue::DanglingSlotReference {
                                    annotation_id: annotation.id.clone(),
                                    slot_id: slot_id.clone(),
                                });
                            }
                        }
                    }
                    AnnotationKind::Referential { governing, .. } => {
                        if !annotation_ids.contains(governing.as_str()) {
                            issues.push(IntegrityIssue::DanglingGoverningReference {
                                annotation_id: annotation.id.clone(),
                                governing: governing.clone(),
                            });
                        }
                    }
                }
            }
        }

        for annotation_id in document.index().undefined_ids() {
            issues.push(IntegrityIssue::UndefinedInterval {
                annotation_id: annotation_id.to_string(),
            });
        }
        issues
    }

    fn check_representation(&self, document: &Document) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();
        for tier in document.tiers() {
            let Some(linguistic_type) = document.linguistic_type(&tier.linguistic_type) else {
                continue;
            };
            let time_alignable = linguistic_type.time_alignable;
            for annotation in tier.annotations.iter().filter(|a| a.is_anchored() != time_alignable) {
                issues.push(IntegrityIssue::RepresentationMismatch {
                    tier_id: tier.id.clone(),
                    annotation_id: annotation.id.clone(),
                    time_alignable,
                });
            }
        }
        issues
    }
}

/*!
 * Interval resolution for every annotation in a document.
 *
 * The index is derived data: it is rebuilt from scratch after each
 * structural mutation. Referential annotations are resolved by following
 * their governing references up to a configurable number of hops; chains
 * that are longer, cyclic or dangling resolve to an undefined interval.
 */

use std::collections::HashMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::model::{Annotation, AnnotationKind, Tier, TimeSlot};

/// Default bound on governing-reference hops
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 5;

/// A resolved `[start, stop)` interval in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start_ms: u64,
    pub stop_ms: u64,
}

impl Interval {
    pub fn new(start_ms: u64, stop_ms: u64) -> Self {
        Self { start_ms, stop_ms }
    }

    /// Half-open containment of an instant
    pub fn covers(&self, time_ms: u64) -> bool {
        self.start_ms <= time_ms && time_ms < self.stop_ms
    }

    /// Full containment within `[start_ms, stop_ms]`
    pub fn lies_within(&self, start_ms: u64, stop_ms: u64) -> bool {
        start_ms <= self.start_ms && self.stop_ms <= stop_ms
    }

    /// Render the start as `m:ss.s`
    pub fn format_human(&self) -> String {
        format_human_time(self.start_ms)
    }
}

/// Format milliseconds as minutes and tenths of seconds (`3:07.5`)
pub fn format_human_time(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) as f64 / 1000.0;
    format!("{}:{:0>4.1}", minutes, seconds)
}

/// Resolve slot values in document order.
///
/// A slot without a declared value gets the previous resolved value plus one
/// millisecond; the first slot's predecessor is 0.
pub fn resolve_slot_values(slots: &[TimeSlot]) -> Vec<(&str, u64)> {
    let mut previous: u64 = 0;
    slots
        .iter()
        .map(|slot| {
            let now = slot.value.unwrap_or(previous.saturating_add(1));
            previous = now;
            (slot.id.as_str(), now)
        })
        .collect()
}

/// Lookup table from annotation id to resolved interval.
#[derive(Debug, Clone, Default)]
pub struct TimeIndex {
    slots: HashMap<String, u64>,
    intervals: HashMap<String, Option<Interval>>,
    all: Interval,
    max_chain_depth: usize,
}

impl TimeIndex {
    /// Build the index over the given slots and tiers
    pub fn build(slots: &[TimeSlot], tiers: &[Tier], max_chain_depth: usize) -> Self {
        let mut slot_values = HashMap::with_capacity(slots.len());
        let mut max_value = 0;
        for (id, value) in resolve_slot_values(slots) {
            max_value = max_value.max(value);
            slot_values.insert(id.to_string(), value);
        }

        let annotations = tiers.iter().flat_map(|t| t.annotations.iter());

        let mut anchored: HashMap<&str, Option<Interval>> = HashMap::new();
        let mut links: HashMap<&str, &str> = HashMap::new();
        for annotation in annotations.clone() {
            match &annotation.kind {
                AnnotationKind::Anchored { start_slot, stop_slot } => {
                    let interval = match (slot_values.get(start_slot), slot_values.get(stop_slot)) {
                        (Some(&start), Some(&stop)) => Some(Interval::new(start, stop)),
                        _ => {
                            warn!(
                                "Annotation {} references unknown time slots {}/{}",
                                annotation.id, start_slot, stop_slot
                            );
                            None
                        }
                    };
                    anchored.insert(&annotation.id, interval);
                }
                AnnotationKind::Referential { governing, .. } => {
                    links.insert(&annotation.id, governing);
                }
            }
        }

        let mut intervals: HashMap<String, Option<Interval>> = anchored
            .iter()
            .map(|(id, interval)| (id.to_string(), *interval))
            .collect();

        let mut undefined = 0;
        for annotation in annotations.filter(|a| a.is_referential()) {
            let resolved = follow_chain(&annotation.id, &links, &anchored, max_chain_depth);
            if resolved.is_none() {
                undefined += 1;
                warn!(
                    "Annotation {} has no interval within {} hops",
                    annotation.id, max_chain_depth
                );
            }
            intervals.insert(annotation.id.clone(), resolved);
        }

        debug!(
            "Time index built: {} slots, {} annotations, {} undefined",
            slot_values.len(),
            intervals.len(),
            undefined
        );

        Self {
            slots: slot_values,
            intervals,
            all: Interval::new(0, max_value),
            max_chain_depth,
        }
    }

    /// Resolved interval of an indexed annotation
    pub fn interval(&self, annotation_id: &str) -> Option<Interval> {
        self.intervals.get(annotation_id).copied().flatten()
    }

    /// True when the annotation is indexed but its interval is undefined
    pub fn is_undefined(&self, annotation_id: &str) -> bool {
        matches!(self.intervals.get(annotation_id), Some(None))
    }

    /// Ids of all annotations whose interval could not be resolved, sorted
    pub fn undefined_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .intervals
            .iter()
            .filter(|(_, interval)| interval.is_none())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort();
        ids
    }

    /// Synthetic interval spanning the whole document
    pub fn all(&self) -> Interval {
        self.all
    }

    pub fn slot_value(&self, slot_id: &str) -> Option<u64> {
        self.slots.get(slot_id).copied()
    }

    pub fn max_chain_depth(&self) -> usize {
        self.max_chain_depth
    }

    /// Resolve an annotation that may not be part of the indexed document.
    ///
    /// Anchored annotations go through the slot table, referential ones
    /// through the interval of their governing annotation.
    pub fn resolve(&self, annotation: &Annotation) -> Option<Interval> {
        match &annotation.kind {
            AnnotationKind::Anchored { start_slot, stop_slot } => {
                let start = self.slot_value(start_slot)?;
                let stop = self.slot_value(stop_slot)?;
                Some(Interval::new(start, stop))
            }
            AnnotationKind::Referential { governing, .. } => self.interval(governing),
        }
    }
}

fn follow_chain(
    start: &str,
    links: &HashMap<&str, &str>,
    anchored: &HashMap<&str, Option<Interval>>,
    max_depth: usize,
) -> Option<Interval> {
    let mut current = start;
    for _ in 0..max_depth {
        let next = *links.get(current)?;
        if let Some(interval) = anchored.get(next) {
            return *interval;
        }
        current = next;
    }
    None
}

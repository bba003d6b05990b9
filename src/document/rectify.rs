/*!
 * Type rectification.
 *
 * After a tier is retyped or reparented its annotations may no longer match
 * what the linguistic type demands. Rectification swaps each mismatching
 * annotation between the anchored and the referential representation,
 * leaving order, values and tier membership untouched.
 */

use log::{debug, warn};

use super::core::Document;
use super::model::{slot_number, AnnotationKind, Tier, TimeSlot};
use super::time_index::resolve_slot_values;
use crate::errors::DocumentError;

/// Outcome of rectifying one tier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RectifyReport {
    /// Tier that was rectified
    pub tier_id: String,

    /// Annotations whose representation changed
    pub converted: Vec<String>,

    /// Conditions that left annotations unconverted
    pub skipped: Vec<DocumentError>,
}

impl RectifyReport {
    fn new(tier_id: &str) -> Self {
        Self {
            tier_id: tier_id.to_string(),
            ..Self::default()
        }
    }

    /// True when nothing was left behind
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// True when the tier already matched its type
    pub fn is_noop(&self) -> bool {
        self.converted.is_empty() && self.skipped.is_empty()
    }
}

impl Document {
    /// Bring a tier's annotations in line with its linguistic type.
    ///
    /// The tier may be detached (a fresh copy) or taken out of the document.
    /// Conversions that cannot be carried out are logged and listed in the
    /// report; the affected annotations keep their old representation.
    pub fn rectify_type(&mut self, tier: &mut Tier) -> RectifyReport {
        let mut report = RectifyReport::new(&tier.id);

        let time_alignable = match self.linguistic_type(&tier.linguistic_type) {
            Some(lt) => lt.time_alignable,
            None => {
                let error = DocumentError::UnknownLinguisticType(tier.linguistic_type.clone());
                warn!("Cannot rectify tier {}: {}", tier.id, error);
                report.skipped.push(error);
                return report;
            }
        };

        if time_alignable {
            self.anchor_referential(tier, &mut report);
        } else {
            self.link_anchored(tier, &mut report);
        }

        if !report.converted.is_empty() {
            debug!(
                "Rectified {} annotation(s) on tier {}",
                report.converted.len(),
                tier.id
            );
        }
        report
    }

    /// Rectify the tier at `position` in place and rebuild the index
    pub(crate) fn rectify_at(&mut self, position: usize) -> Result<RectifyReport, DocumentError> {
        let mut tier = std::mem::take(&mut self.tiers[position]);
        let report = self.rectify_type(&mut tier);
        self.tiers[position] = tier;
        self.rebuild_index();
        Ok(report)
    }

    /// Rectify an attached tier by id
    pub fn rectify_tier(&mut self, tier_id: &str) -> Result<RectifyReport, DocumentError> {
        let position = self.tier_position(tier_id)?;
        self.rectify_at(position)
    }

    fn anchor_referential(&mut self, tier: &mut Tier, report: &mut RectifyReport) {
        let mut slots_added = false;
        for annotation in tier.annotations.iter_mut().filter(|a| a.is_referential()) {
            let Some(interval) = self.index.resolve(annotation) else {
                let error = DocumentError::UndefinedInterval(annotation.id.clone());
                warn!("Referential annotation in time-alignable tier {}: {}", tier.id, error);
                report.skipped.push(error);
                continue;
            };

            let (start_slot, added_start) = self.materialize_slot(interval.start_ms);
            let (stop_slot, added_stop) = self.materialize_slot(interval.stop_ms);
            slots_added |= added_start || added_stop;

            annotation.kind = AnnotationKind::Anchored { start_slot, stop_slot };
            report.converted.push(annotation.id.clone());
        }
        if slots_added {
            self.rebuild_index();
        }
    }

    fn link_anchored(&mut self, tier: &mut Tier, report: &mut RectifyReport) {
        let parent = tier.parent.clone();
        for annotation in tier.annotations.iter_mut().filter(|a| a.is_anchored()) {
            let Some(interval) = self.index.resolve(annotation) else {
                let error = DocumentError::UndefinedInterval(annotation.id.clone());
                warn!("Anchored annotation in symbolic tier {}: {}", tier.id, error);
                report.skipped.push(error);
                continue;
            };

            let governing = parent
                .as_deref()
                .and_then(|p| self.annotation_at(p, interval.start_ms))
                .map(|a| a.id.clone());

            match governing {
                Some(governing) => {
                    annotation.kind = AnnotationKind::Referential {
                        governing,
                        previous: None,
                    };
                    report.converted.push(annotation.id.clone());
                }
                None => {
                    let error = DocumentError::NoGoverningAnnotation {
                        annotation_id: annotation.id.clone(),
                        parent: parent.clone(),
                        time_ms: interval.start_ms,
                    };
                    warn!(
                        "Leaving {} anchored at {}: {}",
                        annotation.id,
                        interval.format_human(),
                        error
                    );
                    report.skipped.push(error);
                }
            }
        }
    }

    /// Slot id carrying `value_ms`, creating one if needed.
    ///
    /// A slot that already declares the value is reused. New slots are placed
    /// before the first slot that resolves later, which keeps resolved values
    /// non-decreasing. Returns whether a slot was added.
    fn materialize_slot(&mut self, value_ms: u64) -> (String, bool) {
        if let Some(existing) = self.time_slots.iter().find(|s| s.value == Some(value_ms)) {
            return (existing.id.clone(), false);
        }

        let next_number = self
            .time_slots
            .iter()
            .filter_map(|s| slot_number(&s.id))
            .max()
            .unwrap_or(0)
            + 1;
        let id = format!("ts{}", next_number);

        let position = resolve_slot_values(&self.time_slots)
            .iter()
            .position(|&(_, resolved)| resolved > value_ms)
            .unwrap_or(self.time_slots.len());
        self.time_slots.insert(position, TimeSlot::new(&id, Some(value_ms)));
        (id, true)
    }
}

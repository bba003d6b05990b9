/*!
 * Time-range queries over tiers, coverage statistics and export rows.
 */

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::core::Document;
use super::model::{split_tier_id, Annotation};

/// How the baseline tier of a speaker group is chosen for coverage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaselineSelector {
    /// First tier of the group in document order
    #[default]
    FirstInGroup,
    /// The group's tier with this field name, else the first tier
    Named(String),
}

impl BaselineSelector {
    pub fn from_field(field: Option<&str>) -> Self {
        match field.filter(|f| !f.is_empty()) {
            Some(field) => Self::Named(field.to_string()),
            None => Self::FirstInGroup,
        }
    }
}

/// One exported annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Tier id the annotation belongs to
    #[serde(rename = "fieldname")]
    pub tier_id: String,

    #[serde(rename = "start")]
    pub start_ms: u64,

    #[serde(rename = "end")]
    pub stop_ms: u64,

    /// Trimmed annotation text
    pub value: String,

    /// Name of the source document
    #[serde(rename = "filename")]
    pub document: String,
}

impl Document {
    /// First annotation of a tier whose interval covers `time_ms`.
    ///
    /// Unknown tiers and undefined intervals yield nothing.
    pub fn annotation_at(&self, tier_id: &str, time_ms: u64) -> Option<&Annotation> {
        let tier = self.tier(tier_id).ok()?;
        tier.annotations
            .iter()
            .find(|a| self.interval(a).is_some_and(|i| i.covers(time_ms)))
    }

    /// Annotations of a tier lying fully inside `[start_ms, stop_ms]`.
    ///
    /// `stop_ms` defaults to the end of the document. Unknown tiers give an
    /// empty list; annotations with undefined intervals are left out.
    pub fn annotations_in(&self, tier_id: &str, start_ms: u64, stop_ms: Option<u64>) -> Vec<&Annotation> {
        let Ok(tier) = self.tier(tier_id) else {
            return Vec::new();
        };
        let stop_ms = stop_ms.unwrap_or(self.index.all().stop_ms);
        tier.annotations
            .iter()
            .filter(|a| self.interval(a).is_some_and(|i| i.lies_within(start_ms, stop_ms)))
            .collect()
    }

    /// The referential annotation on `tier_id` governed by `governing`
    pub fn annotation_on(&self, tier_id: &str, governing: &Annotation) -> Option<&Annotation> {
        let tier = self.tier(tier_id).ok()?;
        tier.annotations
            .iter()
            .find(|a| a.governing() == Some(governing.id.as_str()))
    }

    /// Tier ids taking part in a field selection, deduplicated, in document order
    fn selected_tier_ids(&self, fields: Option<&[&str]>) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for tier in &self.tiers {
            let selected = fields.is_none_or(|fields| fields.contains(&tier.field_name()));
            if selected && !ids.contains(&tier.id) {
                ids.push(tier.id.clone());
            }
        }
        ids
    }

    /// Share of baseline annotations matched by a non-empty annotation, per tier.
    ///
    /// Tiers are grouped by the speaker part of their id. Within each group a
    /// baseline is chosen and, for every tier of the group, the fraction of
    /// baseline intervals containing at least one annotation with content is
    /// reported, rounded to two decimals.
    pub fn coverage(&self, fields: Option<&[&str]>, baseline: &BaselineSelector) -> BTreeMap<String, f64> {
        let tier_ids = self.selected_tier_ids(fields);

        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for id in &tier_ids {
            groups.entry(split_tier_id(id).1).or_default().push(id);
        }

        let mut coverage = BTreeMap::new();
        for (speaker, group) in groups {
            let baseline_id = match baseline {
                BaselineSelector::Named(field) => group
                    .iter()
                    .find(|id| split_tier_id(id).0 == field)
                    .unwrap_or(&group[0]),
                BaselineSelector::FirstInGroup => &group[0],
            };
            debug!("Coverage baseline for speaker '{}': {}", speaker, baseline_id);

            let base_notes = self.annotations_in(baseline_id, 0, None);
            for tier_id in &group {
                let fraction = if base_notes.is_empty() {
                    0.0
                } else {
                    let matched = base_notes
                        .iter()
                        .filter_map(|note| self.interval(note))
                        .filter(|span| {
                            self.annotations_in(tier_id, span.start_ms, Some(span.stop_ms))
                                .iter()
                                .any(|a| a.has_value())
                        })
                        .count();
                    round_to_hundredths(matched as f64 / base_notes.len() as f64)
                };
                coverage.insert(tier_id.to_string(), fraction);
            }
        }
        coverage
    }

    /// Rows for every annotation of the selected tiers
    pub fn export_rows(&self, fields: Option<&[&str]>) -> Vec<ExportRow> {
        let mut rows = Vec::new();
        for tier_id in self.selected_tier_ids(fields) {
            for annotation in self.annotations_in(&tier_id, 0, None) {
                let Some(interval) = self.interval(annotation) else {
                    continue;
                };
                rows.push(ExportRow {
                    tier_id: tier_id.clone(),
                    start_ms: interval.start_ms,
                    stop_ms: interval.stop_ms,
                    value: annotation.value.trim().to_string(),
                    document: self.name.clone(),
                });
            }
        }
        rows
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

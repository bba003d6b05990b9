/*!
 * Tier hierarchy management.
 *
 * Lookup, insertion, copying, renaming and reparenting of tiers, plus the
 * linguistic-type catalog queries that decide which types a tier may take.
 */

use std::collections::HashMap;

use log::{debug, info, warn};

use super::core::Document;
use super::model::{annotation_id, AnnotationKind, Tier};
use super::rectify::RectifyReport;
use crate::errors::DocumentError;

impl Document {
    /// Tier ids in document order (duplicates included)
    pub fn tier_ids(&self) -> Vec<String> {
        self.tiers.iter().map(|t| t.id.clone()).collect()
    }

    pub fn has_tier(&self, tier_id: &str) -> bool {
        self.tiers.iter().any(|t| t.id == tier_id)
    }

    /// Look up a tier by id.
    ///
    /// When malformed input carries the same id more than once, the tier
    /// with the most annotations wins and a warning is logged.
    pub fn tier(&self, tier_id: &str) -> Result<&Tier, DocumentError> {
        let position = self.tier_position(tier_id)?;
        Ok(&self.tiers[position])
    }

    /// Position of a tier in document order, with the same duplicate policy as `tier`
    pub fn tier_position(&self, tier_id: &str) -> Result<usize, DocumentError> {
        let matches: Vec<usize> = self
            .tiers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.id == tier_id)
            .map(|(i, _)| i)
            .collect();

        match matches.len() {
            0 => Err(DocumentError::TierNotFound {
                tier_id: tier_id.to_string(),
                known: self.tier_ids(),
            }),
            1 => Ok(matches[0]),
            _ => {
                let sizes: Vec<usize> = matches.iter().map(|&i| self.tiers[i].annotations.len()).collect();
                let largest = sizes.iter().copied().max().unwrap_or(0);
                let chosen = sizes.iter().position(|&s| s == largest).unwrap_or(0);
                let ambiguity = DocumentError::AmbiguousTierId {
                    tier_id: tier_id.to_string(),
                    matches: matches.len(),
                    sizes,
                };
                warn!("{}; using the largest", ambiguity);
                Ok(matches[chosen])
            }
        }
    }

    /// Tier ids that occur more than once, in order of first appearance
    pub fn duplicate_tier_ids(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for tier in &self.tiers {
            *counts.entry(tier.id.as_str()).or_default() += 1;
        }
        let mut duplicates = Vec::new();
        for tier in &self.tiers {
            if counts[tier.id.as_str()] > 1 && !duplicates.contains(&tier.id) {
                duplicates.push(tier.id.clone());
            }
        }
        duplicates
    }

    /// Tiers whose parent reference is `tier_id`
    pub fn child_tier_ids(&self, tier_id: &str) -> Vec<String> {
        self.tiers
            .iter()
            .filter(|t| t.parent.as_deref() == Some(tier_id))
            .map(|t| t.id.clone())
            .collect()
    }

    /// Insert a tier, renumbering its annotations to fresh document-wide ids.
    ///
    /// The tier goes right after `after` when given, otherwise after the last
    /// tier. `PREVIOUS_ANNOTATION` links inside the tier follow the new ids;
    /// governing references point at the parent tier and are kept as is.
    pub fn insert_tier(&mut self, mut tier: Tier, after: Option<&str>) -> Result<(), DocumentError> {
        if self.has_tier(&tier.id) {
            return Err(DocumentError::DuplicateTierId(tier.id));
        }

        let position = match after.filter(|a| !a.is_empty()) {
            Some(after_id) => self.tier_position(after_id)? + 1,
            None => self.tiers.len(),
        };

        let mut next = self.last_used_annotation_id + 1;
        let mut renumbered: HashMap<String, String> = HashMap::with_capacity(tier.annotations.len());
        for annotation in tier.annotations.iter_mut() {
            let fresh = annotation_id(next);
            renumbered.insert(std::mem::replace(&mut annotation.id, fresh.clone()), fresh);
            next += 1;
        }
        for annotation in tier.annotations.iter_mut() {
            if let AnnotationKind::Referential {
                previous: Some(previous),
                ..
            } = &mut annotation.kind
            {
                if let Some(fresh) = renumbered.get(previous.as_str()) {
                    *previous = fresh.clone();
                }
            }
        }
        self.last_used_annotation_id = next - 1;

        debug!(
            "Inserting tier {} at position {} with {} annotations (last id a{})",
            tier.id,
            position,
            tier.annotations.len(),
            self.last_used_annotation_id
        );
        self.tiers.insert(position, tier);
        self.rebuild_index();
        Ok(())
    }

    /// Deep-copy a tier under a new id.
    ///
    /// `parent` sets the copy's parent, `None` clears it. A requested type
    /// must suit the copy's independence class. The copy is rectified against
    /// its type but not inserted.
    ///
    /// Converting to a time-alignable type anchors every annotation on a
    /// slot with a declared value. Slots missing for those values are added
    /// to this document's time order even when the copy is never inserted.
    pub fn copy_tier(
        &mut self,
        source_id: &str,
        target_id: &str,
        parent: Option<&str>,
        linguistic_type: Option<&str>,
    ) -> Result<Tier, DocumentError> {
        let mut target = self.tier(source_id)?.clone();
        target.id = target_id.to_string();
        target.parent = parent.filter(|p| !p.is_empty()).map(str::to_string);

        if let Some(type_id) = linguistic_type {
            let valid = self.valid_types(Some(!target.is_dependent()), None);
            if !valid.iter().any(|v| v == type_id) {
                return Err(DocumentError::InvalidLinguisticType {
                    type_id: type_id.to_string(),
                    valid,
                });
            }
            target.linguistic_type = type_id.to_string();
        }

        let report = self.rectify_type(&mut target);
        if !report.is_complete() {
            warn!(
                "Copy {} of {} is only partially rectified: {} annotation(s) skipped",
                target_id,
                source_id,
                report.skipped.len()
            );
        }
        info!("Copied tier {} to {}", source_id, target_id);
        Ok(target)
    }

    /// Rename a tier and every parent reference pointing at it
    pub fn rename_tier(&mut self, tier_id: &str, new_id: &str) -> Result<(), DocumentError> {
        if self.has_tier(new_id) {
            return Err(DocumentError::DuplicateTierId(new_id.to_string()));
        }
        let position = self.tier_position(tier_id)?;
        self.tiers[position].id = new_id.to_string();

        for dependent in self
            .tiers
            .iter_mut()
            .filter(|t| t.parent.as_deref() == Some(tier_id))
        {
            dependent.parent = Some(new_id.to_string());
        }
        debug!("Renamed tier {} to {}", tier_id, new_id);
        Ok(())
    }

    /// Set or clear the parent of a tier, optionally retyping it, then rectify.
    pub fn change_parent(
        &mut self,
        tier_id: &str,
        new_parent: Option<&str>,
        linguistic_type: Option<&str>,
    ) -> Result<RectifyReport, DocumentError> {
        let position = self.tier_position(tier_id)?;

        if let Some(type_id) = linguistic_type {
            let valid = self.valid_types(None, None);
            if !valid.iter().any(|v| v == type_id) {
                return Err(DocumentError::InvalidLinguisticType {
                    type_id: type_id.to_string(),
                    valid,
                });
            }
        }

        let tier = &mut self.tiers[position];
        tier.parent = new_parent.filter(|p| !p.is_empty()).map(str::to_string);
        if let Some(type_id) = linguistic_type {
            tier.linguistic_type = type_id.to_string();
        }

        self.rectify_at(position)
    }

    /// Linguistic type ids filtered by independence and time-alignability
    pub fn valid_types(&self, independent: Option<bool>, time_alignable: Option<bool>) -> Vec<String> {
        self.linguistic_types
            .iter()
            .filter(|lt| independent.is_none_or(|ind| lt.is_independent() == ind))
            .filter(|lt| time_alignable.is_none_or(|ta| lt.time_alignable == ta))
            .map(|lt| lt.id.clone())
            .collect()
    }

    /// Append the linguistic types of a template that are not declared yet
    pub fn import_types(&mut self, template: &Document) -> usize {
        let mut imported = 0;
        for linguistic_type in &template.linguistic_types {
            if self.linguistic_type(&linguistic_type.id).is_none() {
                self.linguistic_types.push(linguistic_type.clone());
                imported += 1;
            }
        }
        if imported > 0 {
            info!("Imported {} linguistic type(s) from {}", imported, template.name);
        }
        imported
    }
}

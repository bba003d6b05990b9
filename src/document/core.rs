/*!
 * The annotation document aggregate.
 *
 * A `Document` owns the tiers, time slots and linguistic types of one
 * `.eaf` file together with the derived `TimeIndex`. Every structural
 * operation offered here rebuilds the index before it returns.
 */

use std::path::Path;

use log::{debug, warn};

use super::model::{annotation_number, Annotation, Attributes, LinguisticType, Tier, TimeSlot};
use super::time_index::{Interval, TimeIndex, DEFAULT_MAX_CHAIN_DEPTH};
use crate::eaf::xml::XmlElement;
use crate::errors::DocumentError;

/// In-memory annotation document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source document name, reported in exports
    pub(crate) name: String,

    /// Attributes of the root element
    pub(crate) root_attributes: Attributes,

    /// HEADER element, carried through
    pub(crate) header: Option<XmlElement>,

    pub(crate) time_slots: Vec<TimeSlot>,
    pub(crate) tiers: Vec<Tier>,
    pub(crate) linguistic_types: Vec<LinguisticType>,

    /// Top-level elements after the linguistic types (CONSTRAINT, LANGUAGE, ...)
    pub(crate) trailing: Vec<XmlElement>,

    /// Highest annotation number handed out so far
    pub(crate) last_used_annotation_id: u64,

    pub(crate) index: TimeIndex,
}

impl Document {
    /// Start building a document by hand
    pub fn builder(name: &str) -> DocumentBuilder {
        DocumentBuilder::new(name)
    }

    /// Load an `.eaf` file with the default chain depth
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DocumentError> {
        crate::eaf::read_document(path, DEFAULT_MAX_CHAIN_DEPTH)
    }

    /// Write the document to an `.eaf` file
    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), DocumentError> {
        crate::eaf::write_document(self, path)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn linguistic_types(&self) -> &[LinguisticType] {
        &self.linguistic_types
    }

    pub fn linguistic_type(&self, type_id: &str) -> Option<&LinguisticType> {
        self.linguistic_types.iter().find(|lt| lt.id == type_id)
    }

    pub fn last_used_annotation_id(&self) -> u64 {
        self.last_used_annotation_id
    }

    pub fn header(&self) -> Option<&XmlElement> {
        self.header.as_ref()
    }

    pub fn trailing_elements(&self) -> &[XmlElement] {
        &self.trailing
    }

    pub fn root_attributes(&self) -> &Attributes {
        &self.root_attributes
    }

    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Resolved interval of an annotation in this document
    pub fn interval(&self, annotation: &Annotation) -> Option<Interval> {
        self.index.interval(&annotation.id)
    }

    /// Resolved interval by annotation id
    pub fn interval_of(&self, annotation_id: &str) -> Option<Interval> {
        self.index.interval(annotation_id)
    }

    /// Find an annotation anywhere in the document
    pub fn annotation(&self, annotation_id: &str) -> Option<&Annotation> {
        self.tiers
            .iter()
            .flat_map(|t| t.annotations.iter())
            .find(|a| a.id == annotation_id)
    }

    /// Replace the text of an annotation; returns false if the id is unknown
    pub fn set_annotation_value(&mut self, annotation_id: &str, value: &str) -> bool {
        match self
            .tiers
            .iter_mut()
            .flat_map(|t| t.annotations.iter_mut())
            .find(|a| a.id == annotation_id)
        {
            Some(annotation) => {
                annotation.value = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Recompute the derived time index from the current structure
    pub fn rebuild_index(&mut self) {
        let depth = self.index.max_chain_depth();
        self.index = TimeIndex::build(&self.time_slots, &self.tiers, depth);
    }

    /// Highest `aN` number present in any tier
    pub(crate) fn max_annotation_number(&self) -> u64 {
        self.tiers
            .iter()
            .flat_map(|t| t.annotations.iter())
            .filter_map(|a| annotation_number(&a.id))
            .max()
            .unwrap_or(0)
    }
}

/// Assembles a `Document` from parsed or hand-made records.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    name: String,
    root_attributes: Attributes,
    header: Option<XmlElement>,
    time_slots: Vec<TimeSlot>,
    tiers: Vec<Tier>,
    linguistic_types: Vec<LinguisticType>,
    trailing: Vec<XmlElement>,
    last_used_annotation_id: Option<u64>,
    max_chain_depth: Option<usize>,
}

impl DocumentBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn root_attributes(mut self, attributes: Attributes) -> Self {
        self.root_attributes = attributes;
        self
    }

    pub fn header(mut self, header: XmlElement) -> Self {
        self.header = Some(header);
        self
    }

    pub fn time_slot(mut self, id: &str, value: Option<u64>) -> Self {
        self.time_slots.push(TimeSlot::new(id, value));
        self
    }

    pub fn time_slots(mut self, slots: Vec<TimeSlot>) -> Self {
        self.time_slots.extend(slots);
        self
    }

    pub fn tier(mut self, tier: Tier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn linguistic_type(mut self, linguistic_type: LinguisticType) -> Self {
        self.linguistic_types.push(linguistic_type);
        self
    }

    pub fn trailing(mut self, element: XmlElement) -> Self {
        self.trailing.push(element);
        self
    }

    /// Seed for the annotation id counter, as read from the header
    pub fn last_used_annotation_id(mut self, last_used: u64) -> Self {
        self.last_used_annotation_id = Some(last_used);
        self
    }

    pub fn max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = Some(depth);
        self
    }

    /// Build the document and its time index.
    ///
    /// Without a header seed the counter starts at the highest annotation
    /// number in use. A seed below that number is raised to it so freshly
    /// allocated ids can never collide.
    pub fn build(self) -> Document {
        let depth = self.max_chain_depth.unwrap_or(DEFAULT_MAX_CHAIN_DEPTH);
        let index = TimeIndex::build(&self.time_slots, &self.tiers, depth);
        let mut document = Document {
            name: self.name,
            root_attributes: self.root_attributes,
            header: self.header,
            time_slots: self.time_slots,
            tiers: self.tiers,
            linguistic_types: self.linguistic_types,
            trailing: self.trailing,
            last_used_annotation_id: 0,
            index,
        };

        let in_use = document.max_annotation_number();
        document.last_used_annotation_id = match self.last_used_annotation_id {
            Some(seed) if seed < in_use => {
                warn!(
                    "lastUsedAnnotationId {} is below the highest id in use (a{}), raising it",
                    seed,
                    in_use
                );
                in_use
            }
            Some(seed) => seed,
            None => in_use,
        };
        debug!(
            "Document {} built with {} tiers, {} slots",
            document.name,
            document.tiers.len(),
            document.time_slots.len()
        );
        document
    }
}

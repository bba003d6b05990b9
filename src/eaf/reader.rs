/*!
 * Parse an `.eaf` XML string into a `Document`.
 */

use log::{debug, warn};
use roxmltree::Node;

use super::xml::{node_attributes, XmlElement};
use super::LAST_USED_ANNOTATION_ID;
use crate::document::model::{Annotation, AnnotationKind, Attributes, LinguisticType, Tier, TimeSlot};
use crate::document::Document;
use crate::errors::DocumentError;

/// Root element name of an annotation document
pub const ROOT_ELEMENT: &str = "ANNOTATION_DOCUMENT";

/// Parse a document from its XML text.
///
/// `name` identifies the source in errors and exports.
pub fn parse_document(xml: &str, name: &str, max_chain_depth: usize) -> Result<Document, DocumentError> {
    let parsed = roxmltree::Document::parse(xml)?;
    let root = parsed.root_element();
    if root.tag_name().name() != ROOT_ELEMENT {
        return Err(DocumentError::NotAnAnnotationDocument(format!(
            "{} (root element is {})",
            name,
            root.tag_name().name()
        )));
    }

    let mut builder = Document::builder(name)
        .root_attributes(node_attributes(&root))
        .max_chain_depth(max_chain_depth);

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "HEADER" => {
                let header = XmlElement::from_node(child);
                if let Some(last_used) = last_used_annotation_id(&header) {
                    builder = builder.last_used_annotation_id(last_used);
                }
                builder = builder.header(header);
            }
            "TIME_ORDER" => {
                let slots = child
                    .children()
                    .filter(|n| n.has_tag_name("TIME_SLOT"))
                    .map(|slot| parse_time_slot(&slot))
                    .collect::<Result<Vec<_>, _>>()?;
                builder = builder.time_slots(slots);
            }
            "TIER" => builder = builder.tier(parse_tier(&child)?),
            "LINGUISTIC_TYPE" => builder = builder.linguistic_type(parse_linguistic_type(&child)?),
            _ => builder = builder.trailing(XmlElement::from_node(child)),
        }
    }

    let document = builder.build();
    debug!(
        "Parsed {}: {} tiers, {} linguistic types, {} pass-through elements",
        name,
        document.tiers().len(),
        document.linguistic_types().len(),
        document.trailing_elements().len()
    );
    Ok(document)
}

/// Counter value stored in the header, if present and numeric
fn last_used_annotation_id(header: &XmlElement) -> Option<u64> {
    let property = header
        .elements()
        .find(|e| e.name == "PROPERTY" && e.attribute("NAME") == Some(LAST_USED_ANNOTATION_ID))?;
    let text = property.text();
    match text.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring non-numeric {} '{}'", LAST_USED_ANNOTATION_ID, text.trim());
            None
        }
    }
}

fn required<'a>(node: &'a Node, attribute: &str) -> Result<&'a str, DocumentError> {
    node.attribute(attribute).ok_or_else(|| {
        DocumentError::Malformed(format!(
            "{} element is missing the {} attribute",
            node.tag_name().name(),
            attribute
        ))
    })
}

/// Attributes not in `modelled`, in document order
fn extra_attributes(node: &Node, modelled: &[&str]) -> Attributes {
    node_attributes(node)
        .into_iter()
        .filter(|(name, _)| !modelled.contains(&name.as_str()))
        .collect()
}

fn parse_time_slot(node: &Node) -> Result<TimeSlot, DocumentError> {
    let id = required(node, "TIME_SLOT_ID")?;
    let value = match node.attribute("TIME_VALUE") {
        Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
            DocumentError::Malformed(format!("TIME_VALUE '{}' of {} is not a millisecond count", raw, id))
        })?),
        None => None,
    };
    Ok(TimeSlot::new(id, value))
}

fn parse_tier(node: &Node) -> Result<Tier, DocumentError> {
    let mut tier = Tier::new(required(node, "TIER_ID")?, required(node, "LINGUISTIC_TYPE_REF")?);
    tier.parent = node.attribute("PARENT_REF").map(str::to_string);
    tier.participant = node.attribute("PARTICIPANT").map(str::to_string);
    tier.extra = extra_attributes(node, &["TIER_ID", "LINGUISTIC_TYPE_REF", "PARENT_REF", "PARTICIPANT"]);

    for wrapper in node.children().filter(|n| n.has_tag_name("ANNOTATION")) {
        let Some(inner) = wrapper.children().find(|n| n.is_element()) else {
            warn!("Empty ANNOTATION element in tier {}", tier.id);
            continue;
        };
        tier.annotations.push(parse_annotation(&inner)?);
    }
    Ok(tier)
}

fn parse_annotation(node: &Node) -> Result<Annotation, DocumentError> {
    let id = required(node, "ANNOTATION_ID")?.to_string();
    let value: String = node
        .children()
        .find(|n| n.has_tag_name("ANNOTATION_VALUE"))
        .map(|v| v.children().filter(|c| c.is_text()).filter_map(|c| c.text()).collect())
        .unwrap_or_default();

    let (kind, extra) = match node.tag_name().name() {
        "ALIGNABLE_ANNOTATION" => (
            AnnotationKind::Anchored {
                start_slot: required(node, "TIME_SLOT_REF1")?.to_string(),
                stop_slot: required(node, "TIME_SLOT_REF2")?.to_string(),
            },
            extra_attributes(node, &["ANNOTATION_ID", "TIME_SLOT_REF1", "TIME_SLOT_REF2"]),
        ),
        "REF_ANNOTATION" => (
            AnnotationKind::Referential {
                governing: required(node, "ANNOTATION_REF")?.to_string(),
                previous: node.attribute("PREVIOUS_ANNOTATION").map(str::to_string),
            },
            extra_attributes(node, &["ANNOTATION_ID", "ANNOTATION_REF", "PREVIOUS_ANNOTATION"]),
        ),
        other => {
            return Err(DocumentError::Malformed(format!(
                "unexpected {} inside ANNOTATION {}",
                other, id
            )))
        }
    };

    Ok(Annotation { id, value, kind, extra })
}

fn parse_linguistic_type(node: &Node) -> Result<LinguisticType, DocumentError> {
    let mut linguistic_type = LinguisticType::new(
        required(node, "LINGUISTIC_TYPE_ID")?,
        node.attribute("TIME_ALIGNABLE") == Some("true"),
    );
    linguistic_type.constraints = node.attribute("CONSTRAINTS").map(str::to_string);
    linguistic_type.extra = extra_attributes(node, &["LINGUISTIC_TYPE_ID", "TIME_ALIGNABLE", "CONSTRAINTS"]);
    Ok(linguistic_type)
}

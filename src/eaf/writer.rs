/*!
 * Serialize a `Document` back to `.eaf` XML.
 *
 * Element order: HEADER, TIME_ORDER, tiers, linguistic types, then the
 * pass-through elements in the order they were read. Modelled attributes
 * are written in ELAN's order, followed by the unmodelled ones as read.
 */

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesText, Event};
use quick_xml::Writer;

use super::reader::ROOT_ELEMENT;
use super::xml::{start_tag, XmlElement, XmlNode};
use super::LAST_USED_ANNOTATION_ID;
use crate::document::model::{Annotation, AnnotationKind, Attributes, LinguisticType, Tier, TimeSlot};
use crate::document::Document;
use crate::errors::DocumentError;

const INDENT: usize = 4;

/// Render the whole document as an XML string
pub fn to_xml_string(document: &Document) -> Result<String, DocumentError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root_attributes = root_attributes(document);
    writer.write_event(Event::Start(start_tag(ROOT_ELEMENT, &root_attributes)))?;

    header_with_counter(document).write(&mut writer)?;
    write_time_order(&mut writer, document.time_slots())?;
    for tier in document.tiers() {
        write_tier(&mut writer, tier)?;
    }
    for linguistic_type in document.linguistic_types() {
        linguistic_type_element(linguistic_type).write(&mut writer)?;
    }
    for element in document.trailing_elements() {
        element.write(&mut writer)?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT_ELEMENT)))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    String::from_utf8(bytes).map_err(|e| DocumentError::Malformed(e.to_string()))
}

/// Root attributes, with defaults for a document built from scratch
fn root_attributes(document: &Document) -> Attributes {
    if !document.root_attributes().is_empty() {
        return document.root_attributes().clone();
    }
    vec![
        ("AUTHOR".to_string(), String::new()),
        ("FORMAT".to_string(), "3.0".to_string()),
        ("VERSION".to_string(), "3.0".to_string()),
    ]
}

/// The stored header (or a default one) carrying the current counter
fn header_with_counter(document: &Document) -> XmlElement {
    let mut header = document.header().cloned().unwrap_or_else(|| {
        XmlElement::new("HEADER")
            .with_attribute("MEDIA_FILE", "")
            .with_attribute("TIME_UNITS", "milliseconds")
    });
    let counter = document.last_used_annotation_id().to_string();

    let is_counter = |e: &XmlElement| e.name == "PROPERTY" && e.attribute("NAME") == Some(LAST_USED_ANNOTATION_ID);
    let existing = header.elements_mut().find(|e| is_counter(e));
    if let Some(property) = existing {
        property.children = vec![XmlNode::Text(counter)];
        return header;
    }
    header.with_child(
        XmlElement::new("PROPERTY")
            .with_attribute("NAME", LAST_USED_ANNOTATION_ID)
            .with_text(&counter),
    )
}

fn write_time_order<W: Write>(writer: &mut Writer<W>, slots: &[TimeSlot]) -> Result<(), DocumentError> {
    let mut time_order = XmlElement::new("TIME_ORDER");
    for slot in slots {
        let mut element = XmlElement::new("TIME_SLOT").with_attribute("TIME_SLOT_ID", &slot.id);
        if let Some(value) = slot.value {
            element.set_attribute("TIME_VALUE", &value.to_string());
        }
        time_order = time_order.with_child(element);
    }
    time_order.write(writer)
}

fn write_tier<W: Write>(writer: &mut Writer<W>, tier: &Tier) -> Result<(), DocumentError> {
    let mut attributes: Attributes = vec![("LINGUISTIC_TYPE_REF".to_string(), tier.linguistic_type.clone())];
    if let Some(parent) = &tier.parent {
        attributes.push(("PARENT_REF".to_string(), parent.clone()));
    }
    if let Some(participant) = &tier.participant {
        attributes.push(("PARTICIPANT".to_string(), participant.clone()));
    }
    attributes.push(("TIER_ID".to_string(), tier.id.clone()));
    attributes.extend(tier.extra.iter().cloned());

    if tier.annotations.is_empty() {
        writer.write_event(Event::Empty(start_tag("TIER", &attributes)))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start_tag("TIER", &attributes)))?;
    for annotation in &tier.annotations {
        write_annotation(writer, annotation)?;
    }
    writer.write_event(Event::End(BytesEnd::new("TIER")))?;
    Ok(())
}

fn write_annotation<W: Write>(writer: &mut Writer<W>, annotation: &Annotation) -> Result<(), DocumentError> {
    let (name, mut attributes): (&str, Attributes) = match &annotation.kind {
        AnnotationKind::Anchored { start_slot, stop_slot } => (
            "ALIGNABLE_ANNOTATION",
            vec![
                ("ANNOTATION_ID".to_string(), annotation.id.clone()),
                ("TIME_SLOT_REF1".to_string(), start_slot.clone()),
                ("TIME_SLOT_REF2".to_string(), stop_slot.clone()),
            ],
        ),
        AnnotationKind::Referential { governing, previous } => {
            let mut attributes = vec![
                ("ANNOTATION_ID".to_string(), annotation.id.clone()),
                ("ANNOTATION_REF".to_string(), governing.clone()),
            ];
            if let Some(previous) = previous {
                attributes.push(("PREVIOUS_ANNOTATION".to_string(), previous.clone()));
            }
            ("REF_ANNOTATION", attributes)
        }
    };
    attributes.extend(annotation.extra.iter().cloned());

    writer.write_event(Event::Start(start_tag("ANNOTATION", &Attributes::new())))?;
    writer.write_event(Event::Start(start_tag(name, &attributes)))?;
    // value element stays on one line even when empty
    writer.write_event(Event::Start(start_tag("ANNOTATION_VALUE", &Attributes::new())))?;
    writer.write_event(Event::Text(BytesText::new(&annotation.value)))?;
    writer.write_event(Event::End(BytesEnd::new("ANNOTATION_VALUE")))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    writer.write_event(Event::End(BytesEnd::new("ANNOTATION")))?;
    Ok(())
}

fn linguistic_type_element(linguistic_type: &LinguisticType) -> XmlElement {
    let mut element = XmlElement::new("LINGUISTIC_TYPE");
    if let Some(constraints) = &linguistic_type.constraints {
        element.set_attribute("CONSTRAINTS", constraints);
    }
    element.set_attribute("LINGUISTIC_TYPE_ID", &linguistic_type.id);
    element.set_attribute(
        "TIME_ALIGNABLE",
        if linguistic_type.time_alignable { "true" } else { "false" },
    );
    element.attributes.extend(linguistic_type.extra.iter().cloned());
    element
}

/*!
 * Load, edit, write and reload annotation documents
 */

use eafkit::document::{AnnotationKind, Document, Interval, TimeSlot, DEFAULT_MAX_CHAIN_DEPTH};
use eafkit::eaf;
use eafkit::validation::IntegrityChecker;

use crate::common;

#[test]
fn test_roundtrip_withUntouchedDocument_shouldPreserveModel() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    let output = dir.path().join("copy.eaf");

    let original = Document::from_path(&input).unwrap();
    original.write_to_path(&output).unwrap();
    let reloaded = Document::from_path(&output).unwrap();

    assert_eq!(reloaded.tiers(), original.tiers());
    assert_eq!(reloaded.time_slots(), original.time_slots());
    assert_eq!(reloaded.linguistic_types(), original.linguistic_types());
    assert_eq!(reloaded.trailing_elements(), original.trailing_elements());
    assert_eq!(reloaded.root_attributes(), original.root_attributes());
    assert_eq!(reloaded.last_used_annotation_id(), 6);
}

#[test]
fn test_roundtrip_writingTwice_shouldProduceIdenticalXml() {
    let document = common::sample_document();
    let first = eaf::to_xml_string(&document).unwrap();

    let reparsed = eaf::parse_document(&first, "sample.eaf", DEFAULT_MAX_CHAIN_DEPTH).unwrap();
    let second = eaf::to_xml_string(&reparsed).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_roundtrip_shouldKeepUnmodelledContent() {
    let document = common::sample_document();
    let xml = eaf::to_xml_string(&document).unwrap();

    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains(r#"xsi:noNamespaceSchemaLocation="http://www.mpi.nl/tools/elan/EAFv3.0.xsd""#));
    assert!(xml.contains(r#"<MEDIA_DESCRIPTOR MEDIA_URL="file:///session.wav" MIME_TYPE="audio/x-wav"/>"#));
    assert!(xml.contains("urn:nl-mpi-tools-elan-eaf:sample"));
    assert!(xml.contains(r#"<TIME_SLOT TIME_SLOT_ID="ts3"/>"#));
    assert!(xml.contains(r#"<LANGUAGE LANG_ID="eng" LANG_LABEL="English (eng)"/>"#));
    assert!(xml.contains(r#"GRAPHIC_REFERENCES="false""#));

    let languages = xml.find("<LANGUAGE").unwrap();
    let last_type = xml.rfind("<LINGUISTIC_TYPE").unwrap();
    assert!(last_type < languages);
}

#[test]
fn test_roundtrip_afterCopyAndInsert_shouldPersistNewTier() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    let output = dir.path().join("session.edited.eaf");

    let mut document = Document::from_path(&input).unwrap();
    let copy = document
        .copy_tier("Broad@JL", "Narrow@JL", Some("Broad@JL"), Some("Gloss"))
        .unwrap();
    document.insert_tier(copy, Some("Broad@JL")).unwrap();
    document.write_to_path(&output).unwrap();

    let reloaded = Document::from_path(&output).unwrap();
    assert_eq!(
        reloaded.tier_ids(),
        vec!["Broad@JL", "Narrow@JL", "Gloss@JL", "Broad@MB"]
    );
    assert_eq!(reloaded.last_used_annotation_id(), 9);
    assert_eq!(reloaded.time_slots().len(), 6);
    assert_eq!(reloaded.time_slots()[2], TimeSlot::new("ts3", None));
    assert_eq!(reloaded.trailing_elements().len(), 3);

    let narrow = reloaded.tier("Narrow@JL").unwrap();
    let ids: Vec<&str> = narrow.annotations.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["a7", "a8", "a9"]);
    let governing: Vec<Option<&str>> = narrow.annotations.iter().map(|a| a.governing()).collect();
    assert_eq!(governing, vec![Some("a1"), Some("a2"), Some("a3")]);
    assert_eq!(reloaded.interval_of("a8"), Some(Interval::new(100, 200)));

    let report = IntegrityChecker::new().check(&reloaded);
    assert!(report.passed, "unexpected issues: {:?}", report.issues);
}

#[test]
fn test_roundtrip_withStaleCounter_shouldRaiseItToHighestId() {
    let xml = common::SAMPLE_EAF.replace(
        r#"<PROPERTY NAME="lastUsedAnnotationId">6</PROPERTY>"#,
        r#"<PROPERTY NAME="lastUsedAnnotationId">2</PROPERTY>"#,
    );
    let mut document = eaf::parse_document(&xml, "stale.eaf", DEFAULT_MAX_CHAIN_DEPTH).unwrap();
    assert_eq!(document.last_used_annotation_id(), 6);

    let copy = document.copy_tier("Broad@MB", "Other@MB", None, None).unwrap();
    document.insert_tier(copy, None).unwrap();

    let inserted = document.tier("Other@MB").unwrap();
    assert_eq!(inserted.annotations[0].id, "a7");
    assert!(matches!(inserted.annotations[0].kind, AnnotationKind::Anchored { .. }));

    let written = eaf::to_xml_string(&document).unwrap();
    assert!(written.contains(r#"<PROPERTY NAME="lastUsedAnnotationId">7</PROPERTY>"#));
}

#[test]
fn test_roundtrip_withEditedValue_shouldEscapeMarkup() {
    let mut document = common::sample_document();
    assert!(document.set_annotation_value("a6", "yes & <no>"));

    let xml = eaf::to_xml_string(&document).unwrap();
    assert!(xml.contains("yes &amp; &lt;no&gt;"));

    let reparsed = eaf::parse_document(&xml, "sample.eaf", DEFAULT_MAX_CHAIN_DEPTH).unwrap();
    assert_eq!(reparsed.annotation("a6").unwrap().value, "yes & <no>");
}

/*!
 * Tests for the application controller
 */

use std::path::PathBuf;

use eafkit::app_config::Config;
use eafkit::app_controller::{Controller, OutputOptions, TierEdit};

use crate::common;

#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let config = Config {
        max_chain_depth: 0,
        ..Config::default()
    };
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_controller_withMissingTemplate_shouldFail() {
    let config = Config {
        template: Some("/nonexistent/template.etf".to_string()),
        ..Config::default()
    };
    assert!(Controller::with_config(config).is_err());
}

#[test]
fn test_load_withTemplate_shouldImportMissingTypes() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    let template = common::create_test_file(dir.path(), "types.etf", common::SAMPLE_ETF).unwrap();

    let config = Config {
        template: Some(template.to_string_lossy().to_string()),
        ..common::test_config(dir.path())
    };
    let controller = Controller::with_config(config).unwrap();
    let document = controller.load(&input).unwrap();

    let types: Vec<&str> = document.linguistic_types().iter().map(|lt| lt.id.as_str()).collect();
    assert_eq!(types, vec!["Transcription", "Gloss", "Translation"]);
}

#[test]
fn test_inputs_withFileOrFolder_shouldListDocuments() {
    let dir = common::create_temp_dir().unwrap();
    let first = common::create_sample_eaf(dir.path(), "a.eaf").unwrap();
    let second = common::create_sample_eaf(dir.path(), "b.eaf").unwrap();
    let controller = Controller::new_for_test().unwrap();

    assert_eq!(controller.inputs(&first).unwrap(), vec![first.clone()]);
    assert_eq!(controller.inputs(dir.path()).unwrap(), vec![first, second]);
    assert!(controller.inputs(&dir.path().join("missing.eaf")).is_err());
}

#[test]
fn test_inputs_withEmptyFolder_shouldFail() {
    let dir = common::create_temp_dir().unwrap();
    let controller = Controller::new_for_test().unwrap();
    assert!(controller.inputs(dir.path()).is_err());
}

#[test]
fn test_tierListing_shouldDescribeEveryTier() {
    let controller = Controller::new_for_test().unwrap();
    let document = common::sample_document();

    let listing = controller.tier_listing(&document);

    assert_eq!(
        listing,
        vec![
            "Broad@JL\tTranscription\t-\tJL\t3",
            "Gloss@JL\tGloss\tBroad@JL\tJL\t2",
            "Broad@MB\tTranscription\t-\tMB\t1",
        ]
    );
}

#[test]
fn test_outputPath_shouldFollowOptions() {
    let controller = Controller::new_for_test().unwrap();
    let input = PathBuf::from("/corpus/session.eaf");

    let beside = controller.output_path(&input, &OutputOptions::default());
    assert_eq!(beside, PathBuf::from("/corpus/session.edited.eaf"));

    let elsewhere = controller.output_path(
        &input,
        &OutputOptions {
            output_dir: Some(PathBuf::from("/out")),
            ..OutputOptions::default()
        },
    );
    assert_eq!(elsewhere, PathBuf::from("/out/session.edited.eaf"));

    let in_place = controller.output_path(
        &input,
        &OutputOptions {
            in_place: true,
            ..OutputOptions::default()
        },
    );
    assert_eq!(in_place, input);
}

#[test]
fn test_edit_withExistingOutput_shouldSkipUnlessForced() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    common::create_test_file(dir.path(), "session.edited.eaf", "old").unwrap();

    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();
    let edit = TierEdit::Rename {
        tier: "Broad@MB".to_string(),
        new_id: "Words@MB".to_string(),
    };

    let skipped = controller.edit(&input, &edit, &OutputOptions::default()).unwrap();
    assert_eq!(skipped.skipped, 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("session.edited.eaf")).unwrap(),
        "old"
    );

    let forced = controller
        .edit(
            &input,
            &edit,
            &OutputOptions {
                force_overwrite: true,
                ..OutputOptions::default()
            },
        )
        .unwrap();
    assert_eq!(forced.processed, 1);

    let edited = controller.load(&dir.path().join("session.edited.eaf")).unwrap();
    assert!(edited.has_tier("Words@MB"));
}

#[test]
fn test_edit_withBrokenDocumentInFolder_shouldCountFailure() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    common::create_sample_eaf(dir.path(), "a.eaf").unwrap();
    common::create_test_file(dir.path(), "b.eaf", "<ANNOTATION_DOCUMENT>").unwrap();
    let out = dir.path().join("out");

    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();
    let edit = TierEdit::Rename {
        tier: "Broad@JL".to_string(),
        new_id: "Base@JL".to_string(),
    };
    let summary = controller
        .edit(
            dir.path(),
            &edit,
            &OutputOptions {
                output_dir: Some(out.clone()),
                ..OutputOptions::default()
            },
        )
        .unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 1);
    assert!(out.join("a.edited.eaf").exists());
    assert!(!out.join("b.edited.eaf").exists());
}

#[test]
fn test_edit_withUnknownTier_shouldFailForSingleFile() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();

    let edit = TierEdit::Rename {
        tier: "Missing@JL".to_string(),
        new_id: "Other@JL".to_string(),
    };
    assert!(controller.edit(&input, &edit, &OutputOptions::default()).is_err());
    assert!(!dir.path().join("session.edited.eaf").exists());
}

#[test]
fn test_check_withSampleDocument_shouldPass() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();

    let reports = controller.check(&input).unwrap();

    assert_eq!(reports.len(), 1);
    assert!(reports[0].passed, "unexpected issues: {:?}", reports[0].issues);
    assert_eq!(reports[0].document, "session.eaf");
}

/*!
 * Coverage reporting and CSV export through the controller
 */

use std::fs;

use eafkit::app_config::Config;
use eafkit::app_controller::Controller;
use eafkit::document::BaselineSelector;

use crate::common;

#[test]
fn test_status_withDefaultBaseline_shouldUseFirstTierPerSpeaker() {
    let controller = Controller::new_for_test().unwrap();
    let document = common::sample_document();

    let coverage = controller.status(&document);

    assert_eq!(coverage.len(), 3);
    assert_eq!(coverage["Broad@JL"], 0.67);
    assert_eq!(coverage["Gloss@JL"], 0.67);
    assert_eq!(coverage["Broad@MB"], 1.0);
}

#[test]
fn test_status_withNamedBaseline_shouldFallBackPerSpeaker() {
    let config = Config {
        baseline_field: Some("Gloss".to_string()),
        ..Config::default()
    };
    let controller = Controller::with_config(config).unwrap();
    let document = common::sample_document();

    let coverage = controller.status(&document);

    assert_eq!(coverage["Broad@JL"], 1.0);
    assert_eq!(coverage["Gloss@JL"], 1.0);
    assert_eq!(coverage["Broad@MB"], 1.0);
}

#[test]
fn test_coverage_withFieldFilter_shouldOnlyReportSelectedTiers() {
    let document = common::sample_document();
    let fields = ["Gloss"];

    let coverage = document.coverage(Some(&fields[..]), &BaselineSelector::FirstInGroup);

    assert_eq!(coverage.keys().collect::<Vec<_>>(), vec!["Gloss@JL"]);
    assert_eq!(coverage["Gloss@JL"], 1.0);
}

#[test]
fn test_export_withSingleDocument_shouldWriteEveryAnnotation() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();
    let controller = Controller::with_config(common::test_config(dir.path())).unwrap();

    let (summary, rows) = controller.export(&input).unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(rows, 6);

    let content = fs::read_to_string(dir.path().join("export.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "fieldname,start,end,value,filename",
            "Broad@JL,0,100,hello,session.eaf",
            "Broad@JL,100,200,world,session.eaf",
            "Broad@JL,200,300,,session.eaf",
            "Gloss@JL,0,100,HI,session.eaf",
            "Gloss@JL,100,200,WORLD,session.eaf",
            "Broad@MB,300,400,yes,session.eaf",
        ]
    );
}

#[test]
fn test_export_withFolderAndFields_shouldCombineDocuments() {
    common::init_logging();
    let dir = common::create_temp_dir().unwrap();
    let corpus = dir.path().join("corpus");
    fs::create_dir_all(&corpus).unwrap();
    common::create_sample_eaf(&corpus, "a.eaf").unwrap();
    common::create_sample_eaf(&corpus, "b.eaf").unwrap();

    let config = Config {
        export_fields: vec!["Gloss".to_string()],
        ..common::test_config(dir.path())
    };
    let controller = Controller::with_config(config).unwrap();

    let (summary, rows) = controller.export(&corpus).unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(rows, 4);

    let content = fs::read_to_string(dir.path().join("export.csv")).unwrap();
    assert_eq!(content.lines().count(), 5);
    assert_eq!(content.matches(",a.eaf").count(), 2);
    assert_eq!(content.matches(",b.eaf").count(), 2);
    assert!(!content.contains("Broad@"));
}

#[test]
fn test_export_inAppendMode_shouldKeepEarlierRows() {
    let dir = common::create_temp_dir().unwrap();
    let input = common::create_sample_eaf(dir.path(), "session.eaf").unwrap();

    let first = Controller::with_config(common::test_config(dir.path())).unwrap();
    first.export(&input).unwrap();

    let config = Config {
        csv_append: true,
        ..common::test_config(dir.path())
    };
    let second = Controller::with_config(config).unwrap();
    second.export(&input).unwrap();

    let content = fs::read_to_string(dir.path().join("export.csv")).unwrap();
    assert_eq!(content.lines().count(), 13);
    assert_eq!(content.matches("fieldname").count(), 1);
}

/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::PathBuf;

use eafkit::file_utils::FileManager;

use crate::common;

#[test]
fn test_generate_output_path_withSuffix_shouldInsertBeforeExtension() {
    let output = FileManager::generate_output_path("/corpus/session.eaf", "/out", "edited");
    assert_eq!(output, PathBuf::from("/out/session.edited.eaf"));
}

#[test]
fn test_generate_output_path_withEmptySuffix_shouldKeepName() {
    let output = FileManager::generate_output_path("/corpus/session.eaf", "/out", "");
    assert_eq!(output, PathBuf::from("/out/session.eaf"));
}

#[test]
fn test_find_documents_withNestedFolders_shouldReturnSortedEafFiles() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("b");
    fs::create_dir_all(&nested).unwrap();

    common::create_test_file(dir.path(), "z.eaf", "").unwrap();
    common::create_test_file(dir.path(), "a.EAF", "").unwrap();
    common::create_test_file(&nested, "m.eaf", "").unwrap();
    common::create_test_file(dir.path(), "notes.txt", "").unwrap();
    common::create_test_file(dir.path(), "template.etf", "").unwrap();

    let found = FileManager::find_documents(dir.path()).unwrap();
    let names: Vec<String> = found
        .iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(names, vec!["a.EAF", "b/m.eaf", "z.eaf"]);
}

#[test]
fn test_ensure_dir_withMissingParents_shouldCreateAll() {
    let dir = common::create_temp_dir().unwrap();
    let nested = dir.path().join("deep").join("er");

    FileManager::ensure_dir(&nested).unwrap();
    FileManager::ensure_dir(&nested).unwrap();

    assert!(nested.is_dir());
}

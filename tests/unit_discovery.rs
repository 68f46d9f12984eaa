// tests/unit_discovery.rs
//! Unit tests for directory discovery.

use codesim_core::discovery::{compile_excludes, discover, read_source};
use codesim_core::error::CodesimError;
use std::fs;

#[test]
fn finds_only_source_extensions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.c"), "x = 1;").unwrap();
    fs::write(dir.path().join("b.h"), "int x;").unwrap();
    fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    fs::write(dir.path().join("binary.o"), [0u8, 1, 2]).unwrap();

    let files = discover(dir.path(), &[]).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["a.c", "b.h"]);
}

#[test]
fn recurses_into_subdirectories_deterministically() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub/inner.c"), "y = 2;").unwrap();
    fs::write(dir.path().join("outer.c"), "x = 1;").unwrap();

    let files = discover(dir.path(), &[]).unwrap();
    assert_eq!(files.len(), 2);
    // Sorted order is stable across runs.
    let again = discover(dir.path(), &[]).unwrap();
    assert_eq!(files, again);
}

#[test]
fn exclude_patterns_filter_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("vendor")).unwrap();
    fs::write(dir.path().join("vendor/lib.c"), "v = 0;").unwrap();
    fs::write(dir.path().join("main.c"), "x = 1;").unwrap();

    let excludes = compile_excludes(&["vendor/".to_string()]).unwrap();
    let files = discover(dir.path(), &excludes).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("main.c"));
}

#[test]
fn invalid_exclude_pattern_is_an_error() {
    let err = compile_excludes(&["[unclosed".to_string()]).unwrap_err();
    assert!(matches!(err, CodesimError::Pattern(_)));
}

#[test]
fn non_directory_root_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("lone.c");
    fs::write(&file, "x = 1;").unwrap();

    let err = discover(&file, &[]).unwrap_err();
    assert!(matches!(err, CodesimError::NotADirectory(_)));
}

#[test]
fn read_source_tags_the_failing_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.c");
    let err = read_source(&missing).unwrap_err();
    match err {
        CodesimError::Io { path, .. } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other}"),
    }
}

use std::fs;

use studio_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_export_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("deck").join("export");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf()).unwrap();

    let first = writer.write("page_1.txt", "draft").unwrap();
    assert_eq!(first.file_name().unwrap(), "page_1.txt");
    assert_eq!(fs::read_to_string(&first).unwrap(), "draft");

    let second = writer.write("page_1.txt", "final").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "final");
    // Only the target remains; no temp files are left behind.
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn file_in_place_of_dir_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let result = AtomicFileWriter::new(file_path.clone());
    assert!(matches!(result, Err(PersistError::OutputDir(_))));
    assert!(!file_path.with_file_name("page_1.txt").exists());
}

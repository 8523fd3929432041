use std::fs;

use composer_engine::{PersistError, StateDir};
use tempfile::TempDir;

#[test]
fn open_creates_a_missing_state_dir() {
    let temp = TempDir::new().unwrap();
    let nested = temp.path().join("state").join("composer");
    assert!(!nested.exists());

    let dir = StateDir::open(&nested).unwrap();

    assert!(nested.is_dir());
    assert_eq!(dir.path(), nested);
    assert_eq!(fs::read_dir(&nested).unwrap().count(), 0);
}

#[test]
fn replace_overwrites_without_leaving_temp_files() {
    let temp = TempDir::new().unwrap();
    let dir = StateDir::open(temp.path()).unwrap();
    assert_eq!(dir.read(".composer_session.ron").unwrap(), None);

    let first = dir.replace(".composer_session.ron", "(values: {})").unwrap();
    let second = dir
        .replace(".composer_session.ron", "(values: {\"k\": \"v\"})")
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        dir.read(".composer_session.ron").unwrap().as_deref(),
        Some("(values: {\"k\": \"v\"})")
    );
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn a_file_in_place_of_the_dir_is_refused_at_open() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let err = StateDir::open(&file_path).unwrap_err();

    assert!(matches!(err, PersistError::StateDir { path, .. } if path == file_path));
}

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use apajac_admin::validation::{RawInput, RawValues};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique data directory for one test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn raw(pairs: &[(&str, &str)]) -> RawValues {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), RawInput::text(*value)))
        .collect()
}

/// Parent step input as typed, with one masked phone.
pub fn parent(name: &str, ocupation: &str, phone: &str) -> RawValues {
    let mut values = raw(&[("name", name), ("ocupation", ocupation)]);
    values.insert("phones".into(), RawInput::List(vec![phone.to_string()]));
    values
}

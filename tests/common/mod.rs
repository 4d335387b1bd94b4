#![allow(dead_code)]

use std::{fs, path::PathBuf};

use tempfile::{TempDir, tempdir};

/// Checked-in quote CSVs live in `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Joins a header and data rows into comma-separated text. Cells are not quoted.
pub fn csv_text(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut text = header.join(",");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    text
}

/// Quote inputs that are built per test instead of checked in, such as
/// legacy-encoded or deliberately undecodable bytes.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempdir().expect("temp dir"),
        }
    }

    /// Writes raw CSV bytes, encoding untouched, and returns the file's path.
    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, bytes).expect("write input file");
        path
    }
}

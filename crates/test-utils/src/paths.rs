//! Path utilities for locating test data and writing scratch files.

use std::io::Write;
use std::path::PathBuf;

/// Returns the workspace root directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Returns `crates/{crate_name}/testdata/`.
pub fn crate_testdata_dir(crate_name: &str) -> PathBuf {
    workspace_root()
        .join("crates")
        .join(crate_name)
        .join("testdata")
}

/// Directory holding the coefficient files shipped with the model crate.
pub fn model_data_dir() -> PathBuf {
    workspace_root().join("crates").join("geomag-model").join("data")
}

/// Searches for a test file in multiple locations.
///
/// Checked in order:
/// 1. `TEST_DATA_DIR` (if set)
/// 2. `crates/geomag-model/data/`
/// 3. `crates/geomag-model/testdata/`
/// 4. workspace-level `testdata/`
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        model_data_dir().join(name),
        crate_testdata_dir("geomag-model").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Creates a temporary directory for test output, removed on drop.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}

/// Writes SHC text to a named temporary file with an `.shc` suffix.
pub fn temp_shc_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".shc")
        .tempfile()
        .expect("Failed to create temporary SHC file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary SHC file");
    file.flush().expect("Failed to flush temporary SHC file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_is_valid() {
        let root = workspace_root();
        assert!(
            root.join("Cargo.toml").exists(),
            "Workspace root should contain Cargo.toml: {:?}",
            root
        );
    }

    #[test]
    fn test_builtin_model_file_is_found() {
        let path = find_test_file("igrf13_degree3.shc");
        assert!(path.is_some());
    }

    #[test]
    fn test_temp_shc_file_round_trip() {
        let file = temp_shc_file("1 1 1\n2020.0\n1 0 -30000.0\n");
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with("1 1 1"));
        assert!(file.path().to_string_lossy().ends_with(".shc"));
    }

    #[test]
    fn test_temp_test_dir_is_removed_on_drop() {
        let dir = temp_test_dir();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        drop(dir);
        assert!(!path.exists());
    }
}

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Minimal valid configuration pointing the indexer at `indexer_url`.
pub fn minimal_config(indexer_url: &str) -> String {
    format!(
        r#"
[indexer]
urls = ["{indexer_url}"]
timeout_secs = 2

[price]
enabled = false

[logging]
level = "warn"
format = "pretty"
"#
    )
}

/// Write `contents` to `config.toml` inside a fresh temp dir.
///
/// Keep the returned dir alive for as long as the file is needed.
pub fn write_temp_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("write temp config");
    (dir, path)
}

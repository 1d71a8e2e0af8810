use std::path::Path;

use crate::error::ScrapeError;
use crate::types::GameRecord;

/// Write the manifest as 2-space indented JSON, creating parent directories.
///
/// Non-ASCII names are written as-is. The file is replaced in one `write`
/// call, without a temp file.
pub fn write_manifest(path: &Path, records: &[GameRecord]) -> Result<(), ScrapeError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;

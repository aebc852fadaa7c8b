//! JSON state file holding the table snapshot between invocations

use std::path::Path;

use tracing::debug;

use super::CliError;
use crate::tracking::{ShortenerOptions, TrackingShortener};

/// Shortener restored from `path`, or an empty one if the file does not exist yet.
pub fn load_shortener(path: &str, options: ShortenerOptions) -> Result<TrackingShortener, CliError> {
    let mut shortener = TrackingShortener::with_options(options);
    if !Path::new(path).exists() {
        debug!("State file {} not found, starting with empty tables", path);
        return Ok(shortener);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::StateError(format!("Failed to read '{}': {}", path, e)))?;
    shortener
        .import_json(&content)
        .map_err(|e| CliError::StateError(format!("Invalid state file '{}': {}", path, e)))?;
    debug!("Loaded tables from {}", path);
    Ok(shortener)
}

pub fn save_shortener(path: &str, shortener: &TrackingShortener) -> Result<(), CliError> {
    let content = shortener.export_json()?;

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            CliError::StateError(format!("Failed to create '{}': {}", parent.display(), e))
        })?;
    }

    std::fs::write(path, content)
        .map_err(|e| CliError::StateError(format!("Failed to write '{}': {}", path, e)))?;
    debug!("Saved tables to {}", path);
    Ok(())
}

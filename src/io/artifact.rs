//! Read/write model artifact JSON files.
//!
//! The schema is defined by `model::ModelArtifact`.

use std::fs::File;
use std::path::Path;

use crate::error::AppError;
use crate::model::ModelArtifact;

/// Write a model artifact JSON file, creating the parent directory if needed.
pub fn write_artifact_json(path: &Path, artifact: &ModelArtifact) -> Result<(), AppError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AppError::storage(format!("Failed to create model dir '{}': {e}", parent.display()))
        })?;
    }
    let file = File::create(path)
        .map_err(|e| AppError::storage(format!("Failed to create artifact '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, artifact)
        .map_err(|e| AppError::storage(format!("Failed to write artifact JSON: {e}")))?;

    Ok(())
}

/// Read a model artifact JSON file.
pub fn read_artifact_json(path: &Path) -> Result<ModelArtifact, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::storage(format!("Failed to open artifact '{}': {e}", path.display())))?;
    let artifact: ModelArtifact = serde_json::from_reader(file)
        .map_err(|e| AppError::storage(format!("Invalid artifact JSON '{}': {e}", path.display())))?;
    Ok(artifact)
}

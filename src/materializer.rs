//! Artifact materialization into the target directory.
//!
//! Copies are all-or-nothing per artifact: bytes land in a `.part`
//! sibling that is renamed into place on success and removed on failure,
//! so a crash never leaves a half-written artifact under its final name.
//! Existing files are overwritten unconditionally; a fresh run never
//! trusts output left behind by an earlier one.

use crate::repository::ResolvedArtifact;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Copy one resolved artifact into `target_dir` under its normalized
/// name. Returns the final path.
pub fn materialize_artifact(artifact: &ResolvedArtifact, target_dir: &Path) -> Result<PathBuf> {
    let file_name = artifact.file_name();
    let final_path = target_dir.join(&file_name);
    let part_path = target_dir.join(format!("{file_name}.part"));

    let write = || -> std::io::Result<()> {
        fs::write(&part_path, &artifact.bytes)?;
        fs::rename(&part_path, &final_path)
    };

    if let Err(err) = write() {
        let _ = fs::remove_file(&part_path);
        return Err(Error::Materialization {
            artifact: file_name,
            reason: err.to_string(),
        });
    }
    Ok(final_path)
}

/// Copy every artifact into `target_dir`, creating it first.
///
/// Fails on the first artifact that cannot be written; downstream
/// consumers assume a complete, consistent output set.
pub fn materialize(artifacts: &[ResolvedArtifact], target_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(target_dir).map_err(|err| Error::Materialization {
        artifact: target_dir.display().to_string(),
        reason: err.to_string(),
    })?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        written.push(materialize_artifact(artifact, target_dir)?);
    }
    Ok(written)
}

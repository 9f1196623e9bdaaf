//! Compiled artifacts read from a build output directory.
//!
//! Both Hardhat (`"bytecode": "0x.."`) and Foundry
//! (`"bytecode": { "object": "0x.." }`) layouts are understood.

use std::fs;
use std::path::{Path, PathBuf};

use alloy_primitives::Bytes;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::port::{Artifact, ArtifactSource};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactFile {
    bytecode: Value,
    #[serde(default)]
    source_name: Option<String>,
}

/// Looks up `<Name>.json` anywhere below a root directory.
pub struct FileArtifactSource {
    root: PathBuf,
}

impl FileArtifactSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn find(&self, file_name: &str) -> Result<Option<PathBuf>> {
        let mut pending = vec![self.root.clone()];
        let mut found = Vec::new();
        while let Some(dir) = pending.pop() {
            if !dir.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if path.file_name().and_then(|n| n.to_str()) == Some(file_name) {
                    found.push(path);
                }
            }
        }
        // shallowest match first
        found.sort_by_key(|p| (p.components().count(), p.clone()));
        Ok(found.into_iter().next())
    }
}

fn artifact_error(name: &str, reason: impl Into<String>) -> Error {
    Error::Artifact {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn parse_artifact(name: &str, path: &Path) -> Result<Artifact> {
    let file: ArtifactFile = serde_json::from_str(&fs::read_to_string(path)?)?;
    let hex = match &file.bytecode {
        Value::String(s) => s.as_str(),
        Value::Object(map) => map
            .get("object")
            .and_then(Value::as_str)
            .ok_or_else(|| artifact_error(name, "bytecode.object is missing"))?,
        _ => return Err(artifact_error(name, "unrecognised bytecode field")),
    };

    let bytecode: Bytes = hex
        .parse()
        .map_err(|e| artifact_error(name, format!("invalid bytecode hex: {e}")))?;
    if bytecode.is_empty() {
        return Err(artifact_error(name, "bytecode is empty (abstract contract or interface?)"));
    }

    Ok(Artifact {
        name: name.to_string(),
        bytecode,
        source_name: file.source_name,
    })
}

impl ArtifactSource for FileArtifactSource {
    fn load(&self, name: &str) -> Result<Artifact> {
        let file_name = format!("{name}.json");
        let path = self.find(&file_name)?.ok_or_else(|| {
            artifact_error(
                name,
                format!("{file_name} not found under {}", self.root.display()),
            )
        })?;
        parse_artifact(name, &path)
    }
}

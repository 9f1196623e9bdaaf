//! Deployment stores.
//!
//! [`JsonFileDeploymentStore`] keeps one JSON document per deployment under
//! `<dir>/<network>/<name>.json`, so records survive between runs and can be
//! committed alongside the project. [`InMemoryDeploymentStore`] is used for
//! ephemeral networks whose state disappears with the node.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::port::{DeploymentRecord, DeploymentStore};

const RECORD_EXTENSION: &str = "json";

/// File-backed store, one namespace directory per network.
pub struct JsonFileDeploymentStore {
    dir: PathBuf,
}

impl JsonFileDeploymentStore {
    /// Store rooted at `<root>/<network>`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl AsRef<Path>, network: &str) -> Self {
        Self {
            dir: root.as_ref().join(network),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(ConfigError::InvalidValue {
                field: "deployment name",
                reason: format!("'{name}' is not a valid file name"),
            }
            .into());
        }
        Ok(self.dir.join(format!("{name}.{RECORD_EXTENSION}")))
    }
}

impl DeploymentStore for JsonFileDeploymentStore {
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, name: &str, record: &DeploymentRecord) -> Result<()> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(record)?)?;
        fs::rename(&tmp, &path)?;
        debug!(name, path = %path.display(), "Deployment recorded");
        Ok(())
    }

    fn all(&self) -> Result<Vec<(String, DeploymentRecord)>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let record = serde_json::from_str(&fs::read_to_string(&path)?)?;
            records.push((name.to_string(), record));
        }
        records.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(records)
    }
}

/// Process-local store.
#[derive(Default)]
pub struct InMemoryDeploymentStore {
    records: RwLock<BTreeMap<String, DeploymentRecord>>,
}

impl InMemoryDeploymentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeploymentStore for InMemoryDeploymentStore {
    fn get(&self, name: &str) -> Result<Option<DeploymentRecord>> {
        Ok(self.records.read().get(name).cloned())
    }

    fn save(&self, name: &str, record: &DeploymentRecord) -> Result<()> {
        self.records.write().insert(name.to_string(), record.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<(String, DeploymentRecord)>> {
        Ok(self
            .records
            .read()
            .iter()
            .map(|(name, record)| (name.clone(), record.clone()))
            .collect())
    }
}

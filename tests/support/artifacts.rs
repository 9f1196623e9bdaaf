//! Artifact source serving a fixed bytecode for every contract name.

use parking_lot::Mutex;

use lpforge::error::Result;
use lpforge::port::{Artifact, ArtifactSource};

/// Creation bytecode of every test artifact.
pub const BYTECODE: [u8; 4] = [0x60, 0x80, 0x60, 0x40];

/// Serves [`BYTECODE`] and records which names were loaded.
#[derive(Default)]
pub struct StaticArtifacts {
    loaded: Mutex<Vec<String>>,
}

impl StaticArtifacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().clone()
    }
}

impl ArtifactSource for StaticArtifacts {
    fn load(&self, name: &str) -> Result<Artifact> {
        self.loaded.lock().push(name.to_string());
        Ok(Artifact {
            name: name.to_string(),
            bytecode: BYTECODE.to_vec().into(),
            source_name: Some(format!("contracts/{name}.sol")),
        })
    }
}

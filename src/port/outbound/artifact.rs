//! Compiled contract artifacts.

use alloy_primitives::Bytes;

use crate::error::Result;

/// Creation bytecode plus the compiler metadata needed for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytecode: Bytes,
    /// Fully qualified `path:Name`, when the artifact records it.
    pub source_name: Option<String>,
}

impl Artifact {
    /// Creation transaction input: bytecode followed by constructor args.
    #[must_use]
    pub fn init_code(&self, constructor_args: &[u8]) -> Bytes {
        let mut code = Vec::with_capacity(self.bytecode.len() + constructor_args.len());
        code.extend_from_slice(&self.bytecode);
        code.extend_from_slice(constructor_args);
        code.into()
    }

    /// Name the explorer expects, `path:Name` when known.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        self.source_name
            .as_ref()
            .map_or_else(|| self.name.clone(), |source| format!("{source}:{}", self.name))
    }
}

/// Resolves artifact names to compiled bytecode.
pub trait ArtifactSource: Send + Sync {
    fn load(&self, name: &str) -> Result<Artifact>;
}

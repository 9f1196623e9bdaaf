//! Operator confirmation port.

use crate::error::Result;

/// Asks the operator before a risky step.
pub trait Confirmer: Send + Sync {
    /// Returns the operator's answer, `default` when they just press enter.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

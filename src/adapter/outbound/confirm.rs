//! Operator confirmation prompts.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

use crate::error::Result;
use crate::port::Confirmer;

/// Asks on the terminal.
pub struct DialoguerConfirmer;

impl Confirmer for DialoguerConfirmer {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}

/// Always gives the same answer (`--yes`, non-interactive runs).
pub struct StaticConfirmer(pub bool);

impl Confirmer for StaticConfirmer {
    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(self.0)
    }
}

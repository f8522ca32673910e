//! Operator confirmation before a sync touches the project.

use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};
use is_terminal::IsTerminal;

pub trait Confirmer {
    fn confirm(&self, prompt: &str) -> std::io::Result<bool>;
}

/// Asks on the terminal. Without an interactive stdin the answer is "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> std::io::Result<bool> {
        if !std::io::stdin().is_terminal() {
            println!(
                "  {} No interactive terminal; pass {} to sync without confirmation",
                "!".yellow(),
                "--force".cyan()
            );
            return Ok(false);
        }

        let answer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        Ok(answer)
    }
}

/// Always gives the same answer
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmer(pub bool);

impl Confirmer for FixedConfirmer {
    fn confirm(&self, _prompt: &str) -> std::io::Result<bool> {
        Ok(self.0)
    }
}

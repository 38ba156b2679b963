// 💬 Interactive filter prompt (terminal)

use crate::pipeline::FilterSource;
use crate::validation::{DataStats, FilterOptions};
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::io::{self, IsTerminal};

pub fn prompt_yes_no(prompt: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}

/// Free-text answer; empty input is allowed
pub fn prompt_optional(prompt: &str) -> Result<String> {
    let answer: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    Ok(answer.trim().to_string())
}

/// Parse an amount answer. Empty → no bound; non-numeric → warning, no bound.
pub fn parse_amount_answer(answer: &str, which: &str) -> Option<f64> {
    if answer.is_empty() {
        return None;
    }
    match answer.parse::<f64>() {
        Ok(amount) => Some(amount),
        Err(_) => {
            eprintln!("⚠️  Invalid number, ignoring {} amount.", which);
            None
        }
    }
}

/// True when both stdin and stderr are attached to a terminal
pub fn terminal_available() -> bool {
    io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Asks on the terminal whether and how to filter.
///
/// Without a terminal (piped input, CI) nothing is asked and no filters apply.
#[derive(Debug, Clone, Copy)]
pub struct PromptFilters {
    terminal: bool,
}

impl PromptFilters {
    pub fn new(terminal: bool) -> Self {
        PromptFilters { terminal }
    }

    /// Prompt only if the process is attached to a terminal
    pub fn detect() -> Self {
        Self::new(terminal_available())
    }
}

impl FilterSource for PromptFilters {
    fn choose_filters(&mut self, _stats: &DataStats) -> Result<FilterOptions> {
        if !self.terminal {
            log::warn!("No terminal attached; skipping filter prompt, no filters applied");
            return Ok(FilterOptions::none());
        }

        if !prompt_yes_no("Do you want to filter data?")? {
            return Ok(FilterOptions::none());
        }

        let region = prompt_optional("Enter Region to filter by (leave empty for all)")?;
        let min = prompt_optional("Enter Min Amount (leave empty for None)")?;
        let max = prompt_optional("Enter Max Amount (leave empty for None)")?;

        Ok(FilterOptions {
            region: Some(region).filter(|r| !r.is_empty()),
            min_amount: parse_amount_answer(&min, "min"),
            max_amount: parse_amount_answer(&max, "max"),
        })
    }
}

//! Terminal prompts backed by `dialoguer`.

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use ghwf_engine::Prompter;

#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl Prompter for DialoguerPrompter {
    fn select(&self, prompt: &str, items: &[String], default: usize) -> Result<usize> {
        let index = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact()?;
        Ok(index)
    }

    fn input(&self, prompt: &str, default: &str, allow_empty: bool) -> Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(allow_empty);
        if !default.is_empty() {
            input = input.default(default.to_string());
        }
        Ok(input.interact_text()?)
    }
}

/// Never asks anything; used when the terminal cannot prompt.
pub struct NoPrompter;

impl Prompter for NoPrompter {
    fn select(&self, prompt: &str, _items: &[String], _default: usize) -> Result<usize> {
        anyhow::bail!("cannot prompt for '{prompt}' when not running interactively")
    }

    fn input(&self, prompt: &str, _default: &str, _allow_empty: bool) -> Result<String> {
        anyhow::bail!("cannot prompt for '{prompt}' when not running interactively")
    }
}

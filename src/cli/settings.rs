//! Settings subcommand implementation.

use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;
use std::path::Path;

/// Show the effective settings, or write a settings file.
#[derive(Parser, Debug)]
pub struct SettingsCommand {
    /// Write the effective settings to the settings file
    #[arg(long)]
    pub init: bool,

    /// Overwrite an existing file when used with --init
    #[arg(long, requires = "init")]
    pub force: bool,
}

impl SettingsCommand {
    /// Execute the settings command. `config` is the `--config` override.
    pub fn execute(&self, config: Option<&Path>) -> CliResult<()> {
        let path = match config {
            Some(path) => path.to_path_buf(),
            None => Paths::discover()?.settings_file(),
        };

        let settings = if path.exists() {
            AppSettings::load_from(&path)?
        } else {
            AppSettings::default()
        };

        if !self.init {
            output::print_info(&format!("settings file: {}", path.display()));
            let json = serde_json::to_string_pretty(&settings)
                .map_err(|e| CliError::Other(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        if path.exists() && !self.force {
            return Err(CliError::Other(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        settings.save_to(&path)?;
        output::print_info(&format!("wrote {}", path.display()));
        Ok(())
    }
}

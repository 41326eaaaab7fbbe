use std::path::Path;

use anyhow::Result;
use owo_colors::OwoColorize;

use crate::cli::{ConfigCommand, ConfigSubcommand};
use crate::config::{self, Config};

pub fn config_command(data_dir: &Path, command: ConfigCommand) -> Result<()> {
    match command.command.unwrap_or(ConfigSubcommand::Show) {
        ConfigSubcommand::Show => {
            let config = Config::load(data_dir)?;
            print!("{}", toml::to_string_pretty(&config.masked())?);
        }
        ConfigSubcommand::Path => {
            println!("{}", config::config_path(data_dir).display());
        }
        ConfigSubcommand::Set { key, value } => {
            config::set_value(data_dir, &key, &value)?;
            let shown = if key == "sync.token" { "********" } else { value.as_str() };
            println!("{} Set {} = {}", "✓".green().bold(), key, shown);
        }
    }
    Ok(())
}

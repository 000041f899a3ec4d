use std::{env, fs};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::cli::{exit_status::ExitStatus, report::SUCCESS_MARK};
use crate::config::{CONFIG_FILE_NAME, default_config_json};

pub fn init() -> Result<ExitStatus> {
    let root = env::current_dir().context("Failed to get current directory")?;
    let config_path = root.join(CONFIG_FILE_NAME);

    if config_path.exists() {
        eprintln!("Error: {} already exists", CONFIG_FILE_NAME);
        return Ok(ExitStatus::Failure);
    }

    fs::write(&config_path, default_config_json()? + "\n")
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    println!(
        "{} {}",
        SUCCESS_MARK.green(),
        format!("Created {}", CONFIG_FILE_NAME).green()
    );

    Ok(ExitStatus::Success)
}

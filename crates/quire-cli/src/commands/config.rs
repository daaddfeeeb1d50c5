//! Config command handlers

use anyhow::{bail, Context, Result};

use quire_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "dual_page_min_width": config.dual_page_min_width,
                    "snippet_context": config.snippet_context,
                    "speech_command": config.speech_command,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!("  dual_page_min_width: {}", config.dual_page_min_width);
            println!("  snippet_context:     {}", config.snippet_context);
            println!(
                "  speech_command:      {}",
                config.speech_command.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  log_file:            {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    apply(&mut config, &key, &value)?;
    config.save().context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "dual_page_min_width" => {
            config.dual_page_min_width = value
                .parse()
                .context("Invalid value for dual_page_min_width. Use a column count.")?;
        }
        "snippet_context" => {
            config.snippet_context = value
                .parse()
                .context("Invalid value for snippet_context. Use a character count.")?;
        }
        "speech_command" => {
            config.speech_command = optional(value);
        }
        "log_file" => {
            config.log_file = optional(value).map(Into::into);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, dual_page_min_width, snippet_context, speech_command, log_file",
                key
            );
        }
    }
    Ok(())
}

/// Empty or "none" clears an optional value
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

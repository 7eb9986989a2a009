use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::compare::MAX_COMPARE;
use crate::config::{get_config_path, validate_config, write_config, Config, SourceKind};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt with a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Write the default config without asking anything.
///
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = path.unwrap_or_else(get_config_path);
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    write_config(&config_path, &Config::default())?;
    Ok(config_path)
}

/// Interactive setup: choose a data source and comparison size, then write the config.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("College Compare Configuration");
    println!("=============================");
    println!();

    let mut config = Config::default();

    println!("Colleges can come from the bundled sample data or from a running API.");
    let use_remote = prompt_yes_no("Use a remote API?", false)?;
    if use_remote {
        config.source.kind = SourceKind::Remote;
        let api_url = loop {
            let url = prompt_with_default("API base URL", "http://localhost:5000/api")?;
            match reqwest::Url::parse(&url) {
                Ok(_) => break url,
                Err(e) => println!("  Invalid URL: {}. Try again.", e),
            }
        };
        config.source.api_url = Some(api_url);

        config.source.cache_ttl = loop {
            let ttl = prompt_with_default("Cache responses for", &config.source.cache_ttl)?;
            match humantime::parse_duration(&ttl) {
                Ok(_) => break ttl,
                Err(e) => println!("  Invalid duration: {}. Try again.", e),
            }
        };
    } else {
        let fixture = prompt("Fixture JSON path (empty for bundled data): ")?;
        if !fixture.is_empty() {
            config.source.fixture = Some(PathBuf::from(fixture));
        }
    }

    println!();
    config.compare.max_colleges = loop {
        let input = prompt_with_default(
            "Colleges to compare at once (2-4)",
            &MAX_COMPARE.to_string(),
        )?;
        match input.parse::<usize>() {
            Ok(n) if (2..=MAX_COMPARE).contains(&n) => break n,
            _ => println!("  Invalid: enter a number from 2 to {}. Try again.", MAX_COMPARE),
        }
    };

    if let Err(errors) = validate_config(&config) {
        println!();
        println!("Configuration has problems:");
        for e in &errors {
            println!("  - {}", e);
        }
        if !prompt_yes_no("Save anyway?", false)? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `college-compare` to get started.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_write_default_config_refuses_overwrite() {
        let path = env::temp_dir().join("college_compare_test_init.yaml");
        let _ = std::fs::remove_file(&path);

        let written = write_default_config(Some(path.clone()), false).unwrap();
        assert_eq!(written, path);
        assert!(write_default_config(Some(path.clone()), false).is_err());
        assert!(write_default_config(Some(path.clone()), true).is_ok());

        let loaded = crate::config::load_config(Some(path.clone())).unwrap();
        assert_eq!(loaded, Config::default());

        let _ = std::fs::remove_file(&path);
    }
}

//
//  graph-login
//  cli/config.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI configuration commands
//!
//! Reads and writes dotted keys (`app.app_id`, `api.version`, ...) in the
//! TOML configuration file.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{Config, KEYS};

use super::GlobalOptions;

/// Keys whose values are masked in listings.
const SECRET_KEYS: &[&str] = &["app.app_secret"];

/// Manage CLI configuration
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get a configuration value
    Get(GetArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// List all configuration values
    #[command(visible_alias = "ls")]
    List,

    /// Show configuration file path
    Path,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Configuration key
    pub key: String,
}

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Configuration key
    pub key: String,

    /// Configuration value
    pub value: String,
}

impl ConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ConfigSubcommand::Get(args) => self.get(args, global),
            ConfigSubcommand::Set(args) => self.set(args, global),
            ConfigSubcommand::List => self.list(global),
            ConfigSubcommand::Path => self.path(global),
        }
    }

    fn get(&self, args: &GetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known(&args.key)?;
        let config = Config::load()?;
        let value = config.get(&args.key);

        if global.json {
            let result = serde_json::json!({
                "key": args.key,
                "value": value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if let Some(v) = value {
            println!("{}", v);
        }

        Ok(())
    }

    fn set(&self, args: &SetArgs, global: &GlobalOptions) -> Result<()> {
        ensure_known(&args.key)?;
        let mut config = Config::load()?;
        config.set(&args.key, &args.value)?;
        config.save()?;

        if global.json {
            let result = serde_json::json!({
                "success": true,
                "key": args.key,
                "value": args.value,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!(
                "{} Set {} = {}",
                style("✓").green(),
                style(&args.key).cyan(),
                display_value(&args.key, &args.value)
            );
        }

        Ok(())
    }

    fn list(&self, global: &GlobalOptions) -> Result<()> {
        let config = Config::load()?;

        if global.json {
            let values: serde_json::Map<String, serde_json::Value> = KEYS
                .iter()
                .map(|key| {
                    let value = config
                        .get(key)
                        .map(|v| serde_json::Value::String(display_value(key, &v)))
                        .unwrap_or(serde_json::Value::Null);
                    (key.to_string(), value)
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
            return Ok(());
        }

        println!();
        println!("{}", style("Configuration").bold());
        println!("{}", "-".repeat(50));
        for key in KEYS {
            let value = config
                .get(key)
                .map(|v| display_value(key, &v))
                .unwrap_or_else(|| "-".to_string());
            println!("  {}: {}", style(key).cyan(), value);
        }
        println!();
        Ok(())
    }

    fn path(&self, global: &GlobalOptions) -> Result<()> {
        let config_path = Config::config_path()?;

        if global.json {
            let result = serde_json::json!({
                "path": config_path.display().to_string(),
                "exists": config_path.exists(),
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", config_path.display());
        }

        Ok(())
    }
}

fn ensure_known(key: &str) -> Result<()> {
    if !KEYS.contains(&key) {
        bail!(
            "Unknown configuration key '{}'. Valid keys: {}",
            key,
            KEYS.join(", ")
        );
    }
    Ok(())
}

fn display_value(key: &str, value: &str) -> String {
    if SECRET_KEYS.contains(&key) && !value.is_empty() {
        "********".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_masked() {
        assert_eq!(display_value("app.app_secret", "s3cret"), "********");
        assert_eq!(display_value("app.app_secret", ""), "");
        assert_eq!(display_value("app.app_id", "42"), "42");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ensure_known("api.version").is_ok());
        assert!(ensure_known("core.editor").is_err());
    }
}

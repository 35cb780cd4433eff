//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use reprise_config::{self, RepriseConfig};

use super::Context;

/// Project-local config file name.
const LOCAL_CONFIG_FILE: &str = "reprise.toml";

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./reprise.toml) instead of user config
        #[arg(long)]
        local: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init { local } => cmd_init(local),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = reprise_config::load_config(None)?;

    println!("# Reprise Configuration");

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)");
    } else {
        for path in sources {
            println!("# Loaded from: {}", path.display());
        }
    }
    if ctx.verbose {
        for source in loaded.sources.iter().filter(|s| !s.loaded) {
            println!("# Not found: {}", source.path.display());
        }
    }
    for warning in &loaded.warnings {
        eprintln!("warning: {warning}");
    }
    println!();

    let mut resolved = RepriseConfig::with_defaults();
    resolved.merge(loaded.config);
    print!("{}", resolved.to_toml()?);

    Ok(())
}

fn cmd_path() -> Result<()> {
    match reprise_config::xdg_config_path() {
        Some(path) => println!("{}", path.display()),
        None => eprintln!("Could not determine config directory"),
    }
    Ok(())
}

fn cmd_init(local: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else {
        reprise_config::xdg_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
    };

    if path.exists() {
        println!("Config file already exists: {}", path.display());
        return Ok(());
    }

    reprise_config::save_config(&RepriseConfig::with_defaults(), &path)?;
    println!("Created config file: {}", path.display());

    Ok(())
}

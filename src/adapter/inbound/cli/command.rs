//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

fn default_config() -> PathBuf {
    PathBuf::from("config.toml")
}

/// Announce new eCash blocks on Telegram
#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the chain and post announcements (foreground)
    Run(ConfigPathArg),

    /// Render the announcement for one block without sending it
    Block(BlockArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Check connectivity to external services
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `herald config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a commented configuration template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file.
    Validate(ConfigPathArg),
}

/// Subcommands for `herald check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Query the tip from every configured indexer URL.
    Indexer(ConfigPathArg),
    /// Verify the bot token and optionally post a test message.
    Telegram(TelegramCheckArgs),
}

#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = default_config())]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct BlockArgs {
    /// Block height or hash.
    pub block: String,

    /// Skip the price lookup.
    #[arg(long)]
    pub no_prices: bool,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = default_config())]
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Output path for the generated configuration file.
    #[arg(default_value_os_t = default_config())]
    pub path: PathBuf,
    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
pub struct TelegramCheckArgs {
    /// Post a test message to the configured chat.
    #[arg(long)]
    pub send: bool,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = default_config())]
    pub config: PathBuf,
}

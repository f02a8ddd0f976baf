//! CLI module graph.

pub mod block;
pub mod check;
pub mod command;
pub mod config;
pub mod output;
pub mod run;

use crate::error::Result;

use command::{CheckCommand, Cli, Commands, ConfigCommand};

/// Run the parsed command line.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(output::OutputConfig::new(cli.json, cli.quiet));

    match cli.command {
        Commands::Run(args) => run::execute(&args).await,
        Commands::Block(args) => block::execute(&args).await,
        Commands::Config(ConfigCommand::Init(args)) => config::execute_init(&args.path, args.force),
        Commands::Config(ConfigCommand::Show(args)) => config::execute_show(&args.config),
        Commands::Config(ConfigCommand::Validate(args)) => config::execute_validate(&args.config),
        Commands::Check(CheckCommand::Indexer(args)) => check::execute_indexer(&args.config).await,
        Commands::Check(CheckCommand::Telegram(args)) => {
            check::execute_telegram(&args.config, args.send).await
        }
    }
}

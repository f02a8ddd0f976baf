//! Handler for the `run` command.

use tokio::signal;
use tracing::info;

use crate::adapter::inbound::cli::command::ConfigPathArg;
use crate::adapter::inbound::cli::output;
use crate::app::{App, Config};
use crate::error::Result;

/// Execute the run command.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let config = Config::load(&args.config)?;
    config.init_logging();

    print_startup(&config);

    tokio::select! {
        result = App::run(config) => result?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("herald stopped");
    Ok(())
}

fn print_startup(config: &Config) {
    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Indexer", config.indexer.urls.join(", "));
    output::field(
        "Poll",
        format!("every {}ms", config.tracker.poll_interval_ms),
    );
    output::field(
        "Telegram",
        if config.telegram.enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    if config.summary.enabled {
        output::field("Summary", format!("daily at {:02}:00 UTC", config.summary.hour_utc));
    }
    if let Some(path) = &config.tracker.state_file {
        output::field("State file", path.display());
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use relay_bot::console::{run_console, ConsoleClient};
use relay_bot::{build_commands, BotConfig, Relay, User};
use relay_commands::{init_subscriber_with_config, TracingFormat};
use tokio::io::BufReader;
use tracing::{info, warn};

/// Relay direct messages to a moderator channel, driven from the console
#[derive(Debug, Parser)]
#[command(name = "relay-bot", version, about)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "RELAY_BOT_CONFIG", default_value = "relay.toml")]
    config: PathBuf,

    /// Log format, overriding the config file (pretty, compact, json)
    #[arg(long)]
    log_format: Option<TracingFormat>,

    /// User id the console speaks as
    #[arg(long, default_value_t = 1)]
    user_id: u64,

    /// User name the console speaks as
    #[arg(long, default_value = "console")]
    user_name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // 2. Initialize tracing
    let mut tracing_config = config.tracing_config()?;
    if let Some(format) = cli.log_format {
        tracing_config.format = format;
    }
    init_subscriber_with_config(tracing_config)?;

    // The console transport does not authenticate, so a missing token only warns
    match config.token() {
        Ok(_) => info!("Bot token configured"),
        Err(e) => warn!(error = %e, "Running without a bot token"),
    }

    // 3. Build the command tree and the relay
    let commands = Arc::new(build_commands()?);
    let client = Arc::new(ConsoleClient::stdout());
    let relay = Relay::new(commands, client, config.relay.clone());

    info!(
        guild = %config.relay.guild_id,
        input = %config.relay.input_channel,
        output = %config.relay.output_channel,
        "Bot ready"
    );

    // 4. Relay console input until EOF
    let author = User::new(cli.user_id, cli.user_name);
    run_console(&relay, author, BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}

///
/// This module implements the CLI interface for reddit-pick: command parsing,
/// argument validation, and the async entrypoint used by `main` and by tests.
///
/// All selection logic lives in the [`reddit-pick-core`] crate; this module
/// only wires configuration, transport and content store together.
///
/// ## How To Use
/// - `reddit-pick pick --config bot.yaml [SUBREDDIT]` prints the content to post as JSON.
/// - `reddit-pick show-config --config bot.yaml` prints the effective configuration.
///
/// [`reddit-pick-core`]: ../../reddit-pick-core/
use crate::load_config::load_config;
use crate::upload::ConfiguredStore;
use anyhow::Result;
use clap::{Parser, Subcommand};
use reddit_pick_core::contract::RngDraw;
use reddit_pick_core::pipeline::Picker;
use reddit_pick_core::transport::HttpTransport;
use std::path::PathBuf;

/// CLI for reddit-pick: fetch a random post from a subreddit.
#[derive(Parser)]
#[clap(
    name = "reddit-pick",
    version,
    about = "Fetch a random image or post from a subreddit"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pick one post and print the content that would be sent to the chat
    Pick {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Subreddit name or r/-style path; defaults to `default_subreddit`
        subreddit: Option<String>,
    },
    /// Validate the config file and print it with defaults applied
    ShowConfig {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    // Emit a top-level 'trace_initialised' event at the very start
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Pick { config, subreddit } => {
            let config = load_config(config)?;
            tracing::info!(command = "pick", trigger = %config.trigger, "Starting pick");

            let transport = HttpTransport::new(&config.feed)
                .map_err(|e| anyhow::anyhow!("Failed to build HTTP transport: {e}"))?;
            let store = ConfiguredStore::for_config(&config);
            let picker = Picker::new(config, transport, store);
            let mut draw = RngDraw::from_entropy();

            match picker.handle(subreddit.as_deref(), &mut draw).await {
                Ok(output) => {
                    tracing::info!(command = "pick", mode = %output.mode, "Pick complete");
                    println!("{}", serde_json::to_string_pretty(&output)?);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!(command = "pick", error = %e, "Pick failed");
                    eprintln!("{}", e.user_message());
                    Err(anyhow::Error::new(e))
                }
            }
        }
        Commands::ShowConfig { config } => {
            let config = load_config(config)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

//! Passphrase-gated completion proxy.
//!
//! `serve` (the default) reads PASSPHRASE_HASH, GEMINI_API_KEY, GEMINI_MODEL
//! and PROXY_ADDR from the environment. `hash` prints the value to put in
//! PASSPHRASE_HASH.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use ambientdesk_lib::proxy_server::{hash_passphrase, serve, GeminiUpstream, ProxyConfig, ProxyState};

#[derive(Parser, Debug)]
#[command(name = "ambientdesk-proxy", about = "Passphrase-gated completion proxy")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<ProxyCommand>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ProxyCommand {
    /// Serve /api/llm.
    Serve,
    /// Print the SHA-256 hex of a passphrase.
    Hash {
        /// Words are joined with single spaces.
        #[arg(required = true, num_args = 1..)]
        phrase: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(ProxyCommand::Serve) {
        ProxyCommand::Hash { phrase } => {
            println!("{}", hash_passphrase(&phrase.join(" ")));
        }
        ProxyCommand::Serve => {
            let config =
                ProxyConfig::from_env().map_err(|e| anyhow::anyhow!("Failed to load proxy config: {e}"))?;
            let state = ProxyState {
                config,
                upstream: Arc::new(GeminiUpstream::new()),
            };
            serve(state).await?;
        }
    }
    Ok(())
}

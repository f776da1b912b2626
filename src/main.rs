//! AmbientDesk console.
//!
//! Usage: `ambientdesk` (config from `~/.ambientdesk/config.json` plus
//! `AMBIENTDESK_*` environment overrides).

use chrono::Local;

use ambientdesk_lib::completion::client_from_config;
use ambientdesk_lib::console;
use ambientdesk_lib::orchestrator::{welcome_message, Orchestrator, TurnSettings};
use ambientdesk_lib::state::load_config;
use ambientdesk_lib::workspace::Workspace;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {e}"))?;
    let client = client_from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to set up {}: {e}", config.llm.mode.label()))?;

    let workspace = if config.workspace.seed {
        Workspace::seeded(Local::now().date_naive())
    } else {
        Workspace::default()
    };

    let orchestrator = Orchestrator::new(client, TurnSettings::from(&config.llm), workspace);
    orchestrator.push_assistant(&welcome_message(config.llm.mode.label()));

    console::run(orchestrator).await?;
    Ok(())
}

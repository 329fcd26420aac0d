//! slircbot - Straylight IRC bot.

use slircbot::config::{AclLists, Config, validate};
use slircbot::dispatch::Registry;
use slircbot::{Bot, bot, plugins};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "slircbot.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validate(&config) {
        for e in &errors {
            error!(path = %config_path, "{}", e);
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }
    warn_on_mixed_lists(&config);

    info!(
        clients = config.clients.len(),
        path = %config_path,
        "Starting slircbot"
    );

    let registry = Arc::new(Registry::new());
    registry.reload(plugins::register)?;

    let bot = Bot::new(&config, registry);
    bot::run_until_ctrl_c(bot).await;

    info!("Goodbye");
    Ok(())
}

/// An allow list makes the deny list at the same scope dead weight.
fn warn_on_mixed_lists(config: &Config) {
    let mixed = |acl: &AclLists| !acl.allow.is_empty() && !acl.deny.is_empty();
    for client in &config.clients {
        if client.plugins.as_ref().is_some_and(mixed) {
            warn!(client = %client.name, "plugins: allow list set, deny list ignored");
        }
        for channel in &client.channels {
            if channel.acl().is_some_and(mixed) {
                warn!(client = %client.name, channel = %channel.name(), "allow list set, deny list ignored");
            }
        }
    }
}

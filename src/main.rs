use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use magpie::{
    agent::Agent,
    config::Config,
    integrations::{OpenAiClient, OpenAiConfig},
    platform::TwitterClient,
    store::Store,
};

#[tokio::main]
async fn main() -> Result<()> {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "magpie=info");
    }

    magpie::init().context("Failed to initialize logging")?;

    info!(
        "Starting magpie v{} on {}",
        magpie::version(),
        std::env::consts::OS
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let store =
        Store::open(Some(&config.database_path)).context("Failed to open the agent database")?;
    info!("Using database at {}", store.path().display());

    let platform = Arc::new(TwitterClient::new(
        &config.twitter_bearer_token,
        &config.twitter_access_token,
        &config.twitter_username,
    ));

    let generator = Arc::new(OpenAiClient::new(Some(OpenAiConfig {
        api_key: Some(config.openai_api_key.clone()),
        ..OpenAiConfig::default()
    })));

    let agent = Agent::new(
        store,
        platform,
        generator,
        config.twitter_username.clone(),
        &config.learning,
        config.timezone,
    );

    agent
        .run_once()
        .await
        .context("Agent invocation failed")?;

    info!("Invocation complete");

    Ok(())
}

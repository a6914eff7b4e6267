// Magpie - a social-media engagement agent
// Learns which action to take at which time of day from engagement feedback

pub mod agent;
pub mod config;
pub mod engagement;
pub mod error;
pub mod integrations;
pub mod platform;
pub mod reinforcement;
pub mod store;

pub use error::{MagpieError, MagpieResult};

use anyhow::Result;
use tracing::info;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Initialize logging for the agent binary
pub fn init() -> Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    fmt::Subscriber::builder()
        .with_ansi(true)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .init();

    info!("Initializing magpie agent v{}", version());

    Ok(())
}

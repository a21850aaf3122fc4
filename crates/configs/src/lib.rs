//! # Configs
//!
//! Layered runtime configuration. Precedence, lowest to highest: baked-in
//! defaults, an optional TOML file (`rusty-news.toml`, or the path in
//! `RUSTY_NEWS_CONFIG`), then `RUSTY_NEWS__*` environment variables with
//! `__` separating nesting levels, e.g. `RUSTY_NEWS__SERVER__BIND`.
//!
//! The vote token passphrase has no default: starting a node without one
//! fails loudly rather than minting tokens under a well-known key.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "rusty-news.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigsError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub site: SiteConfig,
    pub vote_tokens: VoteTokenConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP listener binds to.
    pub bind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Title used until an operator saves site settings.
    pub default_title: String,
    /// Gravity used when the settings row is absent.
    pub default_gravity: f64,
    pub admin_user_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VoteTokenConfig {
    pub passphrase: SecretString,
    /// When true, a vote token is only honored for the viewer it names.
    pub require_voter_match: bool,
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, config::ConfigError> {
    Config::builder()
        .set_default("server.bind", "127.0.0.1:8080")?
        .set_default("database.url", "sqlite://rusty-news.db")?
        .set_default("database.max_connections", 5)?
        .set_default("site.default_title", "Rusty News")?
        .set_default("site.default_gravity", 1.5)?
        .set_default("site.admin_user_id", 1)?
        .set_default("vote_tokens.require_voter_match", true)
}

/// Loads the full configuration, erroring on missing required values
/// (currently only `vote_tokens.passphrase`). A `.env` file in the working
/// directory is folded into the process environment first.
pub fn load() -> Result<AppConfig, ConfigsError> {
    let _ = dotenvy::dotenv();
    let file = std::env::var("RUSTY_NEWS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
    let config = defaults()?
        .add_source(File::with_name(&file).required(false))
        .add_source(Environment::with_prefix("RUSTY_NEWS").separator("__"))
        .build()?;
    let app: AppConfig = config.try_deserialize()?;
    tracing::debug!(config_file = %file, bind = %app.server.bind, "configuration loaded");
    Ok(app)
}

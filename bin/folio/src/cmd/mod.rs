//! Command implementations.

pub mod article;
pub mod check;
pub mod export;
pub mod render;
pub mod site;
pub mod sync;

use std::{path::Path, time::Duration};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::{Config, config::SourceConfig};
use folio_source::{CachedSource, ContentApi, FallbackSource, HttpJsonSource, JsonFileSource};

/// Load the configuration file layered with `FOLIO__*` environment overrides.
pub fn load_config(path: &Path) -> Result<Config> {
    Config::load_with_env(path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", path.display()))
}

/// Content API token from the configured environment variable.
pub fn api_token(config: &SourceConfig) -> Option<String> {
    std::env::var(&config.token_env)
        .ok()
        .filter(|t| !t.trim().is_empty())
}

/// Static JSON files first, then the HTTP mirror when one is configured, then the
/// content API when databases are configured and its token is set.
pub fn content_source(config: &SourceConfig) -> Result<CachedSource<FallbackSource>> {
    content_source_with_token(config, api_token(config))
}

/// [`content_source`] with an explicit content API token.
pub fn content_source_with_token(
    config: &SourceConfig,
    token: Option<String>,
) -> Result<CachedSource<FallbackSource>> {
    let mut chain = FallbackSource::new().with(JsonFileSource::from_config(config));
    if let Some(http) =
        HttpJsonSource::from_config(config).wrap_err("Failed to set up HTTP source")?
    {
        chain.push(Box::new(http));
    }

    if !config.databases.is_empty() {
        match token {
            Some(token) => {
                let api = ContentApi::from_config_with_token(config, token)
                    .wrap_err("Failed to set up content API source")?
                    .with_page_content(true);
                chain.push(Box::new(api));
            }
            None => tracing::debug!(
                token_env = %config.token_env,
                "content API token not set, leaving the API out of the chain"
            ),
        }
    }

    tracing::debug!(sources = chain.len(), "content source chain ready");
    Ok(CachedSource::with_ttl(
        chain,
        Duration::from_secs(config.cache_ttl_secs),
    ))
}

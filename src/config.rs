use chrono::TimeDelta;
use reqwest::Url;

use crate::cli::Cli;
use crate::error::ConfigError;

/// Validated run configuration, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub registry: Url,
    pub policy: RetentionPolicy,
}

/// How old a tag may get, and which repositories are never touched.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub ttl: TimeDelta,
    pub exclusions: Vec<String>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let registry = parse_registry_url(&cli.registry)?;
        let exclusions = cli
            .except
            .iter()
            .filter(|name| !name.is_empty())
            .cloned()
            .collect();

        Ok(Self {
            registry,
            policy: RetentionPolicy {
                ttl: cli.ttl,
                exclusions,
            },
        })
    }
}

fn parse_registry_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::MissingRegistry);
    }

    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidRegistryUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidRegistryUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

use std::fmt;

use derive_more::{Display, From};
use serde::Deserialize;
use serde_valid::yaml::FromYamlStr;
use serde_valid::Validate;

// Config Type
#[derive(Debug)]
pub struct Config {
    // API Server Configuration
    pub server: ServerConfig,
    // CoinGecko API configuration
    pub coingecko: CoinGeckoConfig,
    // Blockchain node provider (JSON-RPC) configuration
    pub node_provider: NodeProviderConfig,
    // Secrets resolved from the environment at load time
    pub credentials: Credentials,
}

impl Config {
    pub fn from_file(file_path: &str) -> Result<Self, ConfigError> {
        let config_file_content = std::fs::read_to_string(file_path)?;
        Self::from_yaml_str(&config_file_content)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Self::from_yaml_str_with_env(s, |name| std::env::var(name).ok())
    }

    /// Parses the yaml and resolves every `api_key_env` through `lookup_env`.
    pub fn from_yaml_str_with_env<F>(s: &str, lookup_env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_config = RawConfig::from_yaml_str(s)?;

        let resolve = |name: &str| lookup_env(name).filter(|value| !value.trim().is_empty());

        let node_provider_api_key = resolve(&raw_config.node_provider.api_key_env).ok_or_else(
            || ConfigError::MissingCredential(raw_config.node_provider.api_key_env.clone()),
        )?;

        let coingecko_api_key = raw_config.coingecko.api_key_env.as_deref().and_then(resolve);

        Ok(Config {
            server: raw_config.server,
            coingecko: raw_config.coingecko,
            node_provider: raw_config.node_provider,
            credentials: Credentials { node_provider_api_key, coingecko_api_key },
        })
    }
}

#[derive(Debug, From, Display)]
pub enum ConfigError {
    #[display("Missing credential: environment variable {} is not set", _0)]
    #[from(ignore)]
    MissingCredential(String),

    #[display("Serde Error: {}", _0)]
    SerdeError(serde_valid::Error<serde_yaml::Error>),

    #[display("Error Reading Config File: {}", _0)]
    IoError(std::io::Error),
}

// Intermediate Config Type as Deserialization Target
#[derive(Debug, Deserialize, Validate)]
pub struct RawConfig {
    #[validate]
    pub server: ServerConfig,
    #[validate]
    pub coingecko: CoinGeckoConfig,
    #[validate]
    pub node_provider: NodeProviderConfig,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct ServerConfig {
    // The port the server will listen on
    #[validate(minimum = 1)]
    pub port: u16,

    // The host the server will listen on
    #[validate(min_length = 1)]
    pub host: String,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct CoinGeckoConfig {
    // The base URL of the CoinGecko API
    #[validate(
        pattern = r"https?:\/\/(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)"
    )]
    pub base_url: String,

    // Environment variable holding the (optional) pro API key
    #[serde(default)]
    pub api_key_env: Option<String>,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct NodeProviderConfig {
    // The base URL of the node provider, the API key is appended as the last path segment
    #[validate(
        pattern = r"https?:\/\/(www\.)?[-a-zA-Z0-9@:%._\+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_\+.~#?&//=]*)"
    )]
    pub base_url: String,

    // Environment variable holding the node provider API key
    #[validate(min_length = 1)]
    pub api_key_env: String,
}

#[derive(Clone)]
pub struct Credentials {
    pub node_provider_api_key: String,
    pub coingecko_api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("node_provider_api_key", &"<redacted>")
            .field("coingecko_api_key", &self.coingecko_api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
pub fn get_sample_config() -> Config {
    Config::from_yaml_str_with_env(
        &std::fs::read_to_string("../../config.yaml.example").unwrap(),
        |name| Some(format!("sample-{}", name.to_lowercase())),
    )
    .unwrap()
}

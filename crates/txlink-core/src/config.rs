use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use evm_call::chains;
use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_PLACEHOLDER;
use crate::error::ConfigError;

/// Settings for link assembly and RPC resolution. Passed explicitly to the
/// operations that need it; nothing reads it from global state.
///
/// ```toml
/// base_url = "https://links.example.org"
/// route = "transaction"
///
/// [rpc_overrides]
/// 137 = "https://polygon.example.org/rpc"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path segment in front of the token.
    #[serde(default = "default_route")]
    pub route: String,
    /// Literal an unresolved route leaves where the token belongs.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// RPC URLs keyed by decimal chain id. Checked before the built-in
    /// network table.
    #[serde(default)]
    pub rpc_overrides: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_route() -> String {
    "transaction".to_string()
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_string()
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            route: default_route(),
            placeholder: default_placeholder(),
            rpc_overrides: BTreeMap::new(),
        }
    }
}

impl LinkConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&content)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.route.trim_matches('/').is_empty() {
            return Err(ConfigError::Parse("route must not be empty".into()));
        }
        for key in self.rpc_overrides.keys() {
            if key.parse::<u64>().map_or(true, |id| id == 0) {
                return Err(ConfigError::Parse(format!(
                    "rpc_overrides key `{key}` is not a positive chain id"
                )));
            }
        }
        Ok(())
    }

    /// Picks the RPC URL for a call: the descriptor's own URL when set, then
    /// a configured override, then the network default.
    pub fn resolve_rpc_url(&self, chain_id: u64, explicit: &str) -> Result<String, ConfigError> {
        if !explicit.trim().is_empty() {
            return Ok(explicit.trim().to_string());
        }
        if let Some(url) = self.rpc_overrides.get(&chain_id.to_string()) {
            return Ok(url.clone());
        }
        chains::default_rpc_url(chain_id)
            .map(str::to_string)
            .ok_or(ConfigError::UnsupportedChain(chain_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_defaults() {
        let config = LinkConfig::from_toml_str("").unwrap();
        assert_eq!(config, LinkConfig::default());
        assert_eq!(config.placeholder, ":txData");
        assert_eq!(config.route, "transaction");
    }

    #[test]
    fn overrides_parse() {
        let config = LinkConfig::from_toml_str(
            r#"
            base_url = "https://links.example.org"

            [rpc_overrides]
            137 = "https://polygon.example.org/rpc"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://links.example.org");
        assert_eq!(
            config.resolve_rpc_url(137, "").unwrap(),
            "https://polygon.example.org/rpc"
        );
    }

    #[test]
    fn bad_override_key_is_rejected() {
        let err = LinkConfig::from_toml_str("[rpc_overrides]\npolygon = \"https://x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            LinkConfig::from_toml_str("base_url = "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn explicit_url_wins() {
        let config = LinkConfig::default();
        assert_eq!(
            config.resolve_rpc_url(1, " https://my.node ").unwrap(),
            "https://my.node"
        );
    }

    #[test]
    fn falls_back_to_network_table() {
        let config = LinkConfig::default();
        assert_eq!(config.resolve_rpc_url(137, "").unwrap(), "https://polygon-rpc.com");
    }

    #[test]
    fn unknown_chain_without_override_fails() {
        let config = LinkConfig::default();
        assert_eq!(
            config.resolve_rpc_url(999_999, ""),
            Err(ConfigError::UnsupportedChain(999_999))
        );
    }

    #[test]
    fn retired_testnet_needs_an_override() {
        assert_eq!(
            LinkConfig::default().resolve_rpc_url(5, ""),
            Err(ConfigError::UnsupportedChain(5))
        );

        let config = LinkConfig::from_toml_str(
            "[rpc_overrides]\n5 = \"https://goerli.example.org\"",
        )
        .unwrap();
        assert_eq!(config.resolve_rpc_url(5, "").unwrap(), "https://goerli.example.org");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LinkConfig::load(Path::new("/nonexistent/txlink.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

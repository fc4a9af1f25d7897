// src/config.rs

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Which tool family this process serves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerKind {
    Evm,
    Solana,
    Pumpfun,
}

impl ServerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerKind::Evm => "evm",
            ServerKind::Solana => "solana",
            ServerKind::Pumpfun => "pumpfun",
        }
    }
}

impl fmt::Display for ServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "evm" => Ok(ServerKind::Evm),
            "solana" => Ok(ServerKind::Solana),
            "pumpfun" | "pump.fun" | "pump" => Ok(ServerKind::Pumpfun),
            other => bail!("unknown server kind '{}' (expected evm, solana or pumpfun)", other),
        }
    }
}

// Public endpoints used when the environment does not override them.
pub const DEFAULT_ETHEREUM_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";
pub const DEFAULT_ARBITRUM_RPC_URL: &str = "https://arbitrum-one-rpc.publicnode.com";
pub const DEFAULT_BASE_RPC_URL: &str = "https://base-rpc.publicnode.com";
pub const DEFAULT_BSC_RPC_URL: &str = "https://bsc-rpc.publicnode.com";
pub const DEFAULT_SONIC_RPC_URL: &str = "https://rpc.soniclabs.com";
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Loaded once at startup; adapters only ever see the URL strings.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,
    pub server: ServerKind,
    pub rpc_timeout: Duration,

    // EVM family
    pub ethereum_rpc_url: String,
    pub arbitrum_rpc_url: String,
    pub base_rpc_url: String,
    pub bsc_rpc_url: String,
    pub sonic_rpc_url: String,

    // Solana family (also used by the pump.fun tools)
    pub solana_rpc_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            server: ServerKind::Evm,
            rpc_timeout: Duration::from_secs(90),
            ethereum_rpc_url: DEFAULT_ETHEREUM_RPC_URL.to_string(),
            arbitrum_rpc_url: DEFAULT_ARBITRUM_RPC_URL.to_string(),
            base_rpc_url: DEFAULT_BASE_RPC_URL.to_string(),
            bsc_rpc_url: DEFAULT_BSC_RPC_URL.to_string(),
            sonic_rpc_url: DEFAULT_SONIC_RPC_URL.to_string(),
            solana_rpc_url: DEFAULT_SOLANA_RPC_URL.to_string(),
        }
    }
}

impl Config {
    /// (chain name, endpoint) for every EVM chain, in registration order.
    pub fn evm_endpoints(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("ethereum", self.ethereum_rpc_url.as_str()),
            ("arbitrum", self.arbitrum_rpc_url.as_str()),
            ("base", self.base_rpc_url.as_str()),
            ("binance smart chain", self.bsc_rpc_url.as_str()),
            ("sonic", self.sonic_rpc_url.as_str()),
        ]
    }

    pub fn solana_endpoints(&self) -> Vec<(&'static str, &str)> {
        vec![("solana", self.solana_rpc_url.as_str())]
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |key: &str, default: &str| -> Result<String> {
            let value = lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string());
            validate_endpoint(&value).with_context(|| format!("{} is not a usable RPC URL", key))?;
            Ok(value.trim().to_string())
        };

        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid number")?;

        let timeout_secs = lookup("RPC_TIMEOUT_SECS")
            .unwrap_or_else(|| "90".to_string())
            .parse::<u64>()
            .context("RPC_TIMEOUT_SECS must be a valid number")?;
        if timeout_secs == 0 {
            bail!("RPC_TIMEOUT_SECS must be greater than zero");
        }

        let server = match lookup("MCP_SERVER") {
            Some(kind) => kind.parse().context("MCP_SERVER is invalid")?,
            None => ServerKind::Evm,
        };

        Ok(Config {
            port,
            server,
            rpc_timeout: Duration::from_secs(timeout_secs),
            ethereum_rpc_url: url("ETHEREUM_RPC_URL", DEFAULT_ETHEREUM_RPC_URL)?,
            arbitrum_rpc_url: url("ARBITRUM_RPC_URL", DEFAULT_ARBITRUM_RPC_URL)?,
            base_rpc_url: url("BASE_RPC_URL", DEFAULT_BASE_RPC_URL)?,
            bsc_rpc_url: url("BINANCE_SMART_CHAIN_RPC_URL", DEFAULT_BSC_RPC_URL)?,
            sonic_rpc_url: url("SONIC_RPC_URL", DEFAULT_SONIC_RPC_URL)?,
            solana_rpc_url: url("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL)?,
        })
    }
}

fn validate_endpoint(value: &str) -> Result<()> {
    let parsed = url::Url::parse(value.trim()).context("malformed URL")?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported scheme '{}'", other),
    }
    if parsed.host_str().is_none() {
        bail!("URL has no host");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.server, ServerKind::Evm);
        assert_eq!(config.rpc_timeout, Duration::from_secs(90));
        assert_eq!(config.solana_rpc_url, DEFAULT_SOLANA_RPC_URL);
        assert_eq!(config.evm_endpoints().len(), 5);
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("ETHEREUM_RPC_URL", "http://127.0.0.1:8545"),
            ("MCP_SERVER", "Solana"),
            ("RPC_TIMEOUT_SECS", "5"),
            ("PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(config.ethereum_rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.server, ServerKind::Solana);
        assert_eq!(config.rpc_timeout, Duration::from_secs(5));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn malformed_settings_fail_loudly() {
        let err = Config::from_lookup(lookup(&[("BASE_RPC_URL", "not a url")])).unwrap_err();
        assert!(format!("{:#}", err).contains("BASE_RPC_URL"));
        assert!(Config::from_lookup(lookup(&[("SONIC_RPC_URL", "ftp://x.example")])).is_err());
        assert!(Config::from_lookup(lookup(&[("RPC_TIMEOUT_SECS", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("MCP_SERVER", "cosmos")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn server_kind_parsing() {
        assert_eq!("pumpfun".parse::<ServerKind>().unwrap(), ServerKind::Pumpfun);
        assert_eq!("EVM".parse::<ServerKind>().unwrap(), ServerKind::Evm);
        assert_eq!(ServerKind::Solana.to_string(), "solana");
    }
}

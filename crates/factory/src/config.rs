//! Layered configuration.
//!
//! Values are resolved in order: built-in defaults, the TOML configuration file,
//! then `KICKSTART_*` environment variables. Command line flags are applied on
//! top by the binary.

use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use alloy_core::primitives::{Address, address};
use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{deployment::DeploymentRecord, wallet::DEFAULT_ACCOUNT_COUNT};

/// The default name of the configuration file.
pub const CONFIG_FILENAME: &str = "Kickstart.toml";

/// Prefix of the environment variables overriding configuration values.
pub const ENV_PREFIX: &str = "KICKSTART_";

/// Default RPC endpoint (a local dev node).
pub const DEFAULT_RPC_URL: &str = "http://localhost:8545";

/// Default path of the compiled factory artifact.
pub const DEFAULT_ARTIFACT_PATH: &str = "ethereum/build/CampaignFactory.json";

/// Gas limit of the contract-creation transaction.
pub const DEFAULT_GAS_LIMIT: u64 = 1_500_000;

/// Address of the published factory, used when neither the configuration nor a
/// deployment record names one.
pub const DEFAULT_FACTORY_ADDRESS: Address = address!("33a960cf8de68b09dc8fd98edbfde8769aad1682");

/// Default listen address of the listing page.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Configuration of the listing page server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.parse().expect("default bind address is valid"),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KickstartConfig {
    /// JSON-RPC endpoint of the ledger.
    pub rpc_url: Url,
    /// Seed phrase the signing accounts are derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
    /// Index of the account transactions are sent from.
    pub account_index: u32,
    /// Number of accounts derived from the mnemonic.
    pub accounts: u32,
    /// Path to the compiled factory artifact.
    pub artifact: PathBuf,
    /// Gas limit of the contract-creation transaction.
    pub gas_limit: u64,
    /// Address of an already-deployed factory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factory_address: Option<Address>,
    /// Directory holding the deployment record.
    pub outdata: PathBuf,
    /// Listing page server.
    pub server: ServerConfig,
}

impl Default for KickstartConfig {
    fn default() -> Self {
        Self {
            rpc_url: Url::parse(DEFAULT_RPC_URL).expect("default RPC URL is valid"),
            mnemonic: None,
            account_index: 0,
            accounts: DEFAULT_ACCOUNT_COUNT,
            artifact: PathBuf::from(DEFAULT_ARTIFACT_PATH),
            gas_limit: DEFAULT_GAS_LIMIT,
            factory_address: None,
            outdata: PathBuf::from("."),
            server: ServerConfig::default(),
        }
    }
}

impl KickstartConfig {
    /// Load the configuration.
    ///
    /// When `path` is `None`, `Kickstart.toml` in the working directory is used if
    /// present. An explicit path must exist; a directory resolves to the
    /// `Kickstart.toml` it contains.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Configuration file or directory not found: {}", path.display());
                }
                let resolved = if path.is_dir() {
                    path.join(CONFIG_FILENAME)
                } else {
                    path.to_path_buf()
                };
                Some(resolved)
            }
            None => {
                let default = PathBuf::from(CONFIG_FILENAME);
                default.exists().then_some(default)
            }
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(ref config_path) = config_path {
            figment = figment.merge(Toml::file(config_path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;

        match config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Configuration loaded"),
            None => tracing::debug!("Configuration loaded from defaults and environment"),
        }

        Ok(config)
    }

    /// Check the cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.accounts == 0 {
            anyhow::bail!("`accounts` must be at least 1");
        }
        if self.account_index >= self.accounts {
            anyhow::bail!(
                "`account_index` ({}) must be lower than `accounts` ({})",
                self.account_index,
                self.accounts
            );
        }
        Ok(())
    }

    /// Save the configuration to a TOML file.
    ///
    /// The mnemonic is never written out.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let redacted = Self {
            mnemonic: None,
            ..self.clone()
        };
        let content = toml::to_string_pretty(&redacted)
            .context("Failed to serialize configuration to TOML")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// The seed phrase, or an error explaining how to provide one.
    pub fn mnemonic(&self) -> Result<&str> {
        self.mnemonic.as_deref().with_context(|| {
            format!(
                "No mnemonic configured: set `mnemonic` in {} or the {}MNEMONIC environment variable",
                CONFIG_FILENAME, ENV_PREFIX
            )
        })
    }

    /// Path of the deployment record.
    pub fn record_path(&self) -> PathBuf {
        crate::deployment::record_path(&self.outdata)
    }

    /// Resolve the factory the client should talk to on chain `chain_id`.
    ///
    /// An explicitly configured address wins, then the address of the last
    /// deployment recorded in `outdata` if it was made on the same chain, then
    /// the built-in address.
    pub fn resolve_factory_address(&self, chain_id: u64) -> Result<Address> {
        if let Some(address) = self.factory_address {
            return Ok(address);
        }

        let record_path = self.record_path();
        if record_path.exists() {
            let record = DeploymentRecord::load_from_file(&record_path)?;
            if record.chain_id == chain_id {
                tracing::debug!(
                    address = %record.address,
                    path = %record_path.display(),
                    "Using factory address from deployment record"
                );
                return Ok(record.address);
            }

            tracing::debug!(
                recorded_chain_id = record.chain_id,
                chain_id,
                "Ignoring deployment record made on another chain"
            );
        }

        Ok(DEFAULT_FACTORY_ADDRESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use tempdir::TempDir;

    #[test]
    fn test_defaults() {
        let config = KickstartConfig::default();

        assert_eq!(config.rpc_url.as_str(), "http://localhost:8545/");
        assert_eq!(config.gas_limit, 1_500_000);
        assert_eq!(config.accounts, 10);
        assert_eq!(config.account_index, 0);
        assert!(config.mnemonic.is_none());
        assert_eq!(config.server.bind.port(), 3000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_factory_address() {
        assert_eq!(
            DEFAULT_FACTORY_ADDRESS,
            "0x33a960cf8de68b09dc8fd98edbfde8769aad1682"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_file_and_env_layering() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILENAME,
                r#"
                rpc_url = "http://127.0.0.1:9545"
                gas_limit = 2000000

                [server]
                bind = "0.0.0.0:8080"
                "#,
            )?;
            jail.set_env("KICKSTART_GAS_LIMIT", "3000000");
            jail.set_env("KICKSTART_SERVER__BIND", "0.0.0.0:9090");

            let config = KickstartConfig::load(None).expect("config should load");

            assert_eq!(config.rpc_url.as_str(), "http://127.0.0.1:9545/");
            assert_eq!(config.gas_limit, 3_000_000);
            assert_eq!(config.server.bind.port(), 9090);
            assert_eq!(config.artifact, PathBuf::from(DEFAULT_ARTIFACT_PATH));
            Ok(())
        });
    }

    #[test]
    fn test_load_from_directory() {
        Jail::expect_with(|jail| {
            std::fs::create_dir("conf").expect("create dir");
            jail.create_file(
                format!("conf/{}", CONFIG_FILENAME),
                r#"factory_address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8""#,
            )?;

            let config = KickstartConfig::load(Some(Path::new("conf"))).expect("config should load");

            assert_eq!(
                config.factory_address,
                Some(
                    "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
                        .parse::<Address>()
                        .unwrap()
                )
            );
            Ok(())
        });
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = KickstartConfig::load(Some(Path::new("/nonexistent/Kickstart.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_account_index() {
        let config = KickstartConfig {
            account_index: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_mnemonic() {
        let config = KickstartConfig::default();
        let err = config.mnemonic().unwrap_err();
        assert!(err.to_string().contains("KICKSTART_MNEMONIC"));
    }

    #[test]
    fn test_save_omits_mnemonic() {
        let temp_dir = TempDir::new("kickstart-test").expect("Failed to create temp dir");
        let path = temp_dir.path().join(CONFIG_FILENAME);

        let config = KickstartConfig {
            mnemonic: Some("test test test test test test test test test test test junk".into()),
            ..Default::default()
        };
        config.save_to_file(&path).expect("Failed to save config");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("mnemonic"));

        let loaded = KickstartConfig::load(Some(&path)).expect("Failed to load config");
        assert_eq!(loaded.gas_limit, config.gas_limit);
        assert_eq!(loaded.rpc_url, config.rpc_url);
        assert!(loaded.mnemonic.is_none());
    }

    #[test]
    fn test_resolve_factory_address_prefers_explicit() {
        let explicit: Address = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse().unwrap();
        let config = KickstartConfig {
            factory_address: Some(explicit),
            ..Default::default()
        };

        assert_eq!(config.resolve_factory_address(1).unwrap(), explicit);
    }

    #[test]
    fn test_resolve_factory_address_from_record() {
        let temp_dir = TempDir::new("kickstart-test").expect("Failed to create temp dir");
        let recorded: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();

        let record = DeploymentRecord {
            address: recorded,
            transaction_hash: Default::default(),
            deployer: Address::ZERO,
            chain_id: 31337,
            block_number: Some(1),
            bytecode_hash: "00".repeat(32),
            deployed_at: 1737316800,
            kickstart_version: "0.1.0".to_string(),
        };
        record
            .save_to_file(&crate::deployment::record_path(temp_dir.path()))
            .unwrap();

        let config = KickstartConfig {
            outdata: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        assert_eq!(config.resolve_factory_address(31337).unwrap(), recorded);
        assert_eq!(
            config.resolve_factory_address(11155111).unwrap(),
            DEFAULT_FACTORY_ADDRESS,
            "a record made on another chain must not be reused"
        );
    }

    #[test]
    fn test_resolve_factory_address_falls_back_to_default() {
        let temp_dir = TempDir::new("kickstart-test").expect("Failed to create temp dir");
        let config = KickstartConfig {
            outdata: temp_dir.path().to_path_buf(),
            ..Default::default()
        };

        assert_eq!(
            config.resolve_factory_address(31337).unwrap(),
            DEFAULT_FACTORY_ADDRESS
        );
    }
}

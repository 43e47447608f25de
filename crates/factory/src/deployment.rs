use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, TxHash};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// File name of the deployment record inside the output data directory.
pub const RECORD_FILENAME: &str = "deployment.json";

/// Path of the deployment record for an output data directory.
pub fn record_path(outdata: &Path) -> PathBuf {
    outdata.join(RECORD_FILENAME)
}

/// Metadata of a factory deployment, stored next to the deployment outputs.
///
/// The bytecode hash lets a later run detect that the same artifact is already
/// live on the same chain and skip the redeployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Address of the deployed factory.
    pub address: Address,
    /// Hash of the contract-creation transaction.
    pub transaction_hash: TxHash,
    /// Account the deployment was sent from.
    pub deployer: Address,
    /// Chain the factory lives on.
    pub chain_id: u64,
    /// Block that included the creation transaction.
    pub block_number: Option<u64>,
    /// SHA-256 of the creation bytecode
    pub bytecode_hash: String,
    /// Unix timestamp of the deployment
    pub deployed_at: u64,
    /// Version of the tool that performed the deployment
    pub kickstart_version: String,
}

impl DeploymentRecord {
    /// Create a record for a deployment that just completed.
    pub fn new(
        address: Address,
        transaction_hash: TxHash,
        deployer: Address,
        chain_id: u64,
        block_number: Option<u64>,
        bytecode_hash: String,
    ) -> Self {
        Self {
            address,
            transaction_hash,
            deployer,
            chain_id,
            block_number,
            bytecode_hash,
            deployed_at: chrono::Utc::now().timestamp().max(0) as u64,
            kickstart_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Whether this record describes the given bytecode on the given chain.
    pub fn matches(&self, chain_id: u64, bytecode_hash: &str) -> bool {
        self.chain_id == chain_id && self.bytecode_hash == bytecode_hash
    }

    /// Save this record as formatted JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize deployment record")?;

        std::fs::write(path, json).context(format!(
            "Failed to write deployment record to {}",
            path.display()
        ))?;

        Ok(())
    }

    /// Load a record from a file.
    ///
    /// Returns an error if the file doesn't exist, is malformed, or cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Deployment record does not exist: {}", path.display());
        }

        let content = std::fs::read_to_string(path).context(format!(
            "Failed to read deployment record from {}",
            path.display()
        ))?;

        let record: Self =
            serde_json::from_str(&content).context("Failed to parse deployment record JSON")?;

        Ok(record)
    }
}

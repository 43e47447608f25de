//! Deployment of the campaign factory.

use std::path::{Path, PathBuf};

use alloy_core::primitives::Address;
use alloy_network::TransactionBuilder;
use alloy_provider::Provider;
use alloy_rpc_types_eth::{TransactionReceipt, TransactionRequest};
use anyhow::{Context, Result};

use crate::{
    ContractArtifact, KickstartConfig,
    deployment::{DeploymentRecord, record_path},
    rpc,
};

/// Publishes the factory's creation bytecode and records where it landed.
#[derive(Debug, Clone)]
pub struct FactoryDeployer {
    artifact: ContractArtifact,
    gas_limit: u64,
    outdata: PathBuf,
}

impl FactoryDeployer {
    pub fn new(artifact: ContractArtifact, gas_limit: u64, outdata: impl Into<PathBuf>) -> Self {
        Self {
            artifact,
            gas_limit,
            outdata: outdata.into(),
        }
    }

    /// Build a deployer from the configured artifact, gas limit and output directory.
    pub fn from_config(config: &KickstartConfig) -> Result<Self> {
        let artifact = ContractArtifact::load(&config.artifact)?;
        Ok(Self::new(artifact, config.gas_limit, config.outdata.clone()))
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    /// The contract-creation transaction sent from `from`.
    pub fn creation_request(&self, from: Address) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(from)
            .with_deploy_code(self.artifact.bytecode().clone())
            .with_gas_limit(self.gas_limit)
    }

    /// Deploy the factory from `from`.
    ///
    /// Unless `redeploy` is set, a previous deployment of the same bytecode on the
    /// same chain whose code is still live is reused instead.
    pub async fn deploy<P: Provider>(
        &self,
        provider: &P,
        from: Address,
        redeploy: bool,
    ) -> Result<DeploymentRecord> {
        tracing::info!(account = %from, "Attempting to deploy from account");

        let chain_id = rpc::chain_id(provider).await?;
        let bytecode_hash = self.artifact.bytecode_hash();
        let record_path = record_path(&self.outdata);

        if !redeploy {
            if let Some(existing) =
                existing_deployment(provider, &record_path, chain_id, &bytecode_hash).await?
            {
                tracing::info!(
                    address = %existing.address,
                    chain_id,
                    "Factory already deployed, skipping deployment"
                );
                return Ok(existing);
            }
        }

        let pending = provider
            .send_transaction(self.creation_request(from))
            .await
            .context("Failed to send contract-creation transaction")?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(
            tx_hash = %tx_hash,
            gas_limit = self.gas_limit,
            "Contract-creation transaction sent"
        );

        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to fetch contract-creation receipt")?;

        let address = deployed_address(&receipt)?;

        tracing::info!(address = %address, chain_id, "Contract deployed to");

        let record = DeploymentRecord::new(
            address,
            tx_hash,
            from,
            chain_id,
            receipt.block_number,
            bytecode_hash,
        );

        self.save_record(&record, &record_path).with_context(|| {
            format!("Factory deployed to {} but its record was not saved", address)
        })?;

        Ok(record)
    }

    fn save_record(&self, record: &DeploymentRecord, path: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.outdata).context("Failed to create output data directory")?;
        record.save_to_file(path)
    }
}

/// Address of the contract created by a successful contract-creation transaction.
fn deployed_address(receipt: &TransactionReceipt) -> Result<Address> {
    rpc::ensure_success(receipt, "Contract-creation")?;
    receipt
        .contract_address
        .context("Contract-creation receipt has no contract address")
}

/// The recorded deployment, if it matches this bytecode and chain and still has code.
async fn existing_deployment<P: Provider>(
    provider: &P,
    path: &Path,
    chain_id: u64,
    bytecode_hash: &str,
) -> Result<Option<DeploymentRecord>> {
    if !path.exists() {
        return Ok(None);
    }

    let record = match DeploymentRecord::load_from_file(path) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(
                error = %e,
                path = %path.display(),
                "Ignoring unreadable deployment record"
            );
            return Ok(None);
        }
    };

    if !record.matches(chain_id, bytecode_hash) {
        tracing::debug!(
            recorded_chain_id = record.chain_id,
            chain_id,
            "Deployment record is for another chain or artifact"
        );
        return Ok(None);
    }

    let code = provider
        .get_code_at(record.address)
        .await
        .context("Failed to fetch code of the recorded factory")?;

    if code.is_empty() {
        tracing::debug!(address = %record.address, "No code at recorded factory address");
        return Ok(None);
    }

    Ok(Some(record))
}

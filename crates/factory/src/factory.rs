//! Client for a deployed campaign factory.

use std::sync::Arc;

use alloy_core::{
    dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
    json_abi::{Function, JsonAbi},
    primitives::{Address, TxHash, U256},
};
use alloy_network::TransactionBuilder;
use alloy_provider::Provider;
use alloy_rpc_types_eth::TransactionRequest;
use anyhow::{Context, Result};

use crate::rpc;

/// Interface description of the campaign factory.
pub const FACTORY_ABI: &str = include_str!("../abi/CampaignFactory.json");

/// Parse the built-in factory interface.
pub fn factory_interface() -> Result<JsonAbi> {
    serde_json::from_str(FACTORY_ABI).context("Failed to parse built-in factory ABI")
}

/// Read/write handle to a campaign factory at a fixed address.
#[derive(Debug, Clone)]
pub struct CampaignFactory<P> {
    address: Address,
    abi: Arc<JsonAbi>,
    provider: P,
}

impl<P: Provider> CampaignFactory<P> {
    /// Handle to the factory at `address`, using the built-in interface.
    pub fn new(address: Address, provider: P) -> Result<Self> {
        Ok(Self::with_abi(address, factory_interface()?, provider))
    }

    /// Handle to the factory at `address` with a custom interface.
    pub fn with_abi(address: Address, abi: JsonAbi, provider: P) -> Self {
        Self {
            address,
            abi: Arc::new(abi),
            provider,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn function(&self, name: &str) -> Result<&Function> {
        self.abi
            .function(name)
            .and_then(|overloads| overloads.first())
            .with_context(|| format!("Factory interface has no `{}` method", name))
    }

    /// Addresses of every campaign the factory has created.
    pub async fn get_deployed_campaigns(&self) -> Result<Vec<Address>> {
        let function = self.function("getDeployedCampaigns")?;
        let calldata = function
            .abi_encode_input(&[])
            .context("Failed to encode getDeployedCampaigns call")?;

        let tx = TransactionRequest::default()
            .with_to(self.address)
            .with_input(calldata);

        let output = self
            .provider
            .call(tx)
            .await
            .with_context(|| format!("getDeployedCampaigns call to {} failed", self.address))?;

        if output.is_empty() {
            anyhow::bail!("No contract code at factory address {}", self.address);
        }

        let values = function
            .abi_decode_output(&output)
            .context("Failed to decode getDeployedCampaigns output")?;

        let campaigns = decode_addresses(values)?;

        tracing::debug!(
            factory = %self.address,
            count = campaigns.len(),
            "Fetched deployed campaigns"
        );

        Ok(campaigns)
    }

    /// Create a campaign requiring `minimum` wei per contribution, sent from `from`.
    ///
    /// Waits for the transaction to be mined and fails if it reverted.
    pub async fn create_campaign(&self, minimum: U256, from: Address) -> Result<TxHash> {
        let function = self.function("createCampaign")?;
        let calldata = function
            .abi_encode_input(&[DynSolValue::Uint(minimum, 256)])
            .context("Failed to encode createCampaign call")?;

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(self.address)
            .with_input(calldata);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .context("Failed to send createCampaign transaction")?;
        let tx_hash = *pending.tx_hash();

        tracing::info!(tx_hash = %tx_hash, %minimum, "createCampaign transaction sent");

        let receipt = pending
            .get_receipt()
            .await
            .context("Failed to fetch createCampaign receipt")?;

        rpc::ensure_success(&receipt, "createCampaign")?;

        Ok(tx_hash)
    }
}

/// Extract the `address[]` returned by `getDeployedCampaigns`.
fn decode_addresses(values: Vec<DynSolValue>) -> Result<Vec<Address>> {
    let [value]: [DynSolValue; 1] = values
        .try_into()
        .map_err(|values: Vec<DynSolValue>| {
            anyhow::anyhow!("Expected a single return value, got {}", values.len())
        })?;

    value
        .as_array()
        .context("Expected an array of addresses")?
        .iter()
        .map(|item| item.as_address().context("Expected an address"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_core::primitives::{Bytes, keccak256};
    use alloy_provider::{ProviderBuilder, mock::Asserter};

    fn interface() -> JsonAbi {
        factory_interface().unwrap()
    }

    fn get_deployed_campaigns() -> Function {
        interface().function("getDeployedCampaigns").unwrap()[0].clone()
    }

    #[test]
    fn test_builtin_interface() {
        let abi = interface();

        assert!(abi.function("createCampaign").is_some());
        assert!(abi.function("deployedCampaigns").is_some());
        assert!(abi.function("getDeployedCampaigns").is_some());
    }

    #[test]
    fn test_get_deployed_campaigns_calldata_is_selector() {
        let function = get_deployed_campaigns();
        let calldata = function.abi_encode_input(&[]).unwrap();

        assert_eq!(calldata.len(), 4);
        assert_eq!(&calldata[..], &keccak256("getDeployedCampaigns()")[..4]);
    }

    #[test]
    fn test_create_campaign_calldata() {
        let function = interface().function("createCampaign").unwrap()[0].clone();
        let calldata = function
            .abi_encode_input(&[DynSolValue::Uint(U256::from(100u64), 256)])
            .unwrap();

        assert_eq!(calldata.len(), 4 + 32);
        assert_eq!(&calldata[..4], &keccak256("createCampaign(uint256)")[..4]);
        assert_eq!(calldata[35], 100);
    }

    #[test]
    fn test_decode_campaign_list() {
        let a: Address = "0x5FbDB2315678afecb367f032d93F642f64180aa3".parse().unwrap();
        let b: Address = "0xa16E02E87b7454126E5E10d957A927A7F5B5d2be".parse().unwrap();

        let encoded = DynSolValue::Tuple(vec![DynSolValue::Array(vec![
            DynSolValue::Address(a),
            DynSolValue::Address(b),
        ])])
        .abi_encode_params();

        let values = get_deployed_campaigns().abi_decode_output(&encoded).unwrap();

        assert_eq!(decode_addresses(values).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_decode_empty_campaign_list() {
        // offset 0x20, length 0
        let mut encoded = vec![0u8; 64];
        encoded[31] = 0x20;

        let values = get_deployed_campaigns().abi_decode_output(&encoded).unwrap();

        assert!(decode_addresses(values).unwrap().is_empty());
    }

    #[test]
    fn test_decode_addresses_rejects_unexpected_shapes() {
        assert!(decode_addresses(vec![]).is_err());
        assert!(decode_addresses(vec![DynSolValue::Bool(true)]).is_err());
        assert!(decode_addresses(vec![DynSolValue::Array(vec![DynSolValue::Bool(true)])]).is_err());
        assert!(
            decode_addresses(vec![
                DynSolValue::Array(vec![]),
                DynSolValue::Array(vec![])
            ])
            .is_err()
        );
    }

    fn mocked_factory() -> (Asserter, CampaignFactory<impl Provider>) {
        let asserter = Asserter::new();
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_mocked_client(asserter.clone());
        let factory = CampaignFactory::new(Address::repeat_byte(0x33), provider).unwrap();
        (asserter, factory)
    }

    #[tokio::test]
    async fn test_get_deployed_campaigns() {
        let a = Address::repeat_byte(0xaa);
        let (asserter, factory) = mocked_factory();
        asserter.push_success(&Bytes::from(
            DynSolValue::Tuple(vec![DynSolValue::Array(vec![DynSolValue::Address(a)])])
                .abi_encode_params(),
        ));

        assert_eq!(factory.get_deployed_campaigns().await.unwrap(), vec![a]);
        assert!(asserter.read_q().is_empty());
    }

    #[tokio::test]
    async fn test_get_deployed_campaigns_without_code() {
        let (asserter, factory) = mocked_factory();
        asserter.push_success(&Bytes::new());

        let err = factory.get_deployed_campaigns().await.unwrap_err();

        assert!(err.to_string().contains("No contract code"), "{err}");
        assert!(err.to_string().contains(&factory.address().to_string()));
    }

    #[tokio::test]
    async fn test_get_deployed_campaigns_rpc_failure() {
        let (asserter, factory) = mocked_factory();
        asserter.push_failure_msg("execution reverted");

        let err = factory.get_deployed_campaigns().await.unwrap_err();

        assert!(format!("{err:#}").contains("getDeployedCampaigns call"), "{err:#}");
    }

    #[tokio::test]
    async fn test_create_campaign_send_failure() {
        let (asserter, factory) = mocked_factory();
        asserter.push_failure_msg("insufficient funds");

        let err = factory
            .create_campaign(U256::from(100u64), Address::repeat_byte(0x01))
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("Failed to send createCampaign transaction"));
        assert!(asserter.read_q().is_empty());
    }
}

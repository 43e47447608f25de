//! kickstart-factory - Deployment and client library for the campaign factory.
//!
//! This crate deploys a precompiled `CampaignFactory` artifact with accounts
//! derived from a seed phrase, and talks to a deployed factory to create and
//! enumerate campaigns.

mod artifact;
pub use artifact::ContractArtifact;

mod config;
pub use config::{
    CONFIG_FILENAME, DEFAULT_ARTIFACT_PATH, DEFAULT_BIND, DEFAULT_FACTORY_ADDRESS,
    DEFAULT_GAS_LIMIT, DEFAULT_RPC_URL, ENV_PREFIX, KickstartConfig, ServerConfig,
};

mod deployer;
pub use deployer::FactoryDeployer;

pub mod deployment;
pub use deployment::DeploymentRecord;

mod factory;
pub use factory::{CampaignFactory, FACTORY_ABI, factory_interface};

pub mod rpc;

mod wallet;
pub use wallet::{DEFAULT_ACCOUNT_COUNT, HdWallet};

pub use alloy_core::primitives::{Address, TxHash, U256};

use std::{net::SocketAddr, path::PathBuf};

use clap::{Args, Parser, Subcommand};
use kickstart_factory::{Address, CONFIG_FILENAME, DEFAULT_RPC_URL, U256};
use tracing::level_filters::LevelFilter;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum RpcProvider {
    Localhost,
    Sepolia,
    Mainnet,
    #[strum(default)]
    Custom(String),
}

impl RpcProvider {
    pub fn to_rpc_url(&self) -> anyhow::Result<Url> {
        let url = match self {
            RpcProvider::Localhost => DEFAULT_RPC_URL,
            RpcProvider::Sepolia => "https://ethereum-sepolia-rpc.publicnode.com",
            RpcProvider::Mainnet => "https://ethereum-mainnet-rpc.publicnode.com",
            RpcProvider::Custom(url) => url.as_str(),
        };
        Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid RPC URL '{}': {}", url, e))
    }
}

#[derive(Parser)]
#[command(name = "kickstart")]
#[command(
    author,
    version,
    about = "Deploy a campaign factory and list the campaigns it created"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, global = true, env = "KICKSTART_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to a Kickstart.toml configuration file, or a directory containing one.
    ///
    /// If not provided, ./Kickstart.toml is used when it exists.
    #[arg(long, global = true, alias = "conf", env = "KICKSTART_CONFIG")]
    pub config: Option<PathBuf>,

    /// The RPC endpoint: `localhost`, `sepolia`, `mainnet` or a custom URL.
    ///
    /// Overrides `rpc_url` from the configuration file and KICKSTART_RPC_URL.
    #[arg(long, global = true, alias = "rpc")]
    pub rpc_url: Option<RpcProvider>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deploy the campaign factory and print its address.
    Deploy(DeployArgs),
    /// List the accounts derived from the mnemonic.
    Accounts,
    /// Print the campaigns created by the factory, one per line.
    Campaigns(FactoryArgs),
    /// Create a new campaign through the factory.
    CreateCampaign(CreateCampaignArgs),
    /// Serve the campaigns index page.
    Serve(ServeArgs),
    /// Write the effective configuration to a file.
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    /// Path to the compiled factory artifact.
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// Gas limit of the contract-creation transaction.
    #[arg(long)]
    pub gas_limit: Option<u64>,

    /// Deploy even if the same artifact is already deployed on this chain.
    #[arg(long, default_value_t = false)]
    pub redeploy: bool,
}

#[derive(Debug, Args)]
pub struct FactoryArgs {
    /// Address of the factory. Defaults to the configured or last deployed one.
    #[arg(long)]
    pub factory: Option<Address>,
}

#[derive(Debug, Args)]
pub struct CreateCampaignArgs {
    /// Minimum contribution, in wei.
    #[arg(long)]
    pub minimum: U256,

    #[clap(flatten)]
    pub factory: FactoryArgs,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    #[clap(flatten)]
    pub factory: FactoryArgs,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the configuration.
    #[arg(long, default_value = CONFIG_FILENAME)]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

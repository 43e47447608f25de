//! kickstart deploys a campaign factory contract and serves the list of campaigns it created.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command, CreateCampaignArgs, DeployArgs, FactoryArgs, InitArgs, ServeArgs};
use alloy_provider::Provider;
use kickstart_factory::{Address, CampaignFactory, FactoryDeployer, HdWallet, KickstartConfig, rpc};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let mut config = KickstartConfig::load(cli.config.as_deref())?;

    if let Some(rpc_provider) = &cli.rpc_url {
        config.rpc_url = rpc_provider.to_rpc_url()?;
    }

    match cli.command {
        Command::Deploy(args) => deploy(config, args).await,
        Command::Accounts => accounts(&config),
        Command::Campaigns(args) => campaigns(&config, args).await,
        Command::CreateCampaign(args) => create_campaign(&config, args).await,
        Command::Serve(args) => serve(&config, args).await,
        Command::Init(args) => init(&config, args),
    }
}

fn wallet(config: &KickstartConfig) -> Result<HdWallet> {
    HdWallet::from_mnemonic(config.mnemonic()?, config.accounts, config.account_index)
}

async fn factory_address<P: Provider>(
    config: &KickstartConfig,
    args: &FactoryArgs,
    provider: &P,
) -> Result<Address> {
    if let Some(address) = args.factory.or(config.factory_address) {
        return Ok(address);
    }

    let chain_id = rpc::chain_id(provider).await?;
    config.resolve_factory_address(chain_id)
}

async fn deploy(mut config: KickstartConfig, args: DeployArgs) -> Result<()> {
    if let Some(artifact) = args.artifact {
        config.artifact = artifact;
    }
    if let Some(gas_limit) = args.gas_limit {
        config.gas_limit = gas_limit;
    }

    let wallet = wallet(&config)?;
    let deployer = FactoryDeployer::from_config(&config)?;

    tracing::info!(
        rpc_url = %config.rpc_url,
        artifact = %config.artifact.display(),
        gas_limit = config.gas_limit,
        redeploy = args.redeploy,
        "Deploying campaign factory..."
    );

    let provider = rpc::connect_signing(config.rpc_url.clone(), wallet.ethereum_wallet());
    let record = deployer
        .deploy(&provider, wallet.default_account(), args.redeploy)
        .await?;

    println!("{}", record.address);

    Ok(())
}

fn accounts(config: &KickstartConfig) -> Result<()> {
    let wallet = wallet(config)?;
    let sender = wallet.default_account();

    for (index, account) in wallet.accounts().into_iter().enumerate() {
        let marker = if account == sender { " (sender)" } else { "" };
        println!("{index}: {account}{marker}");
    }

    Ok(())
}

async fn campaigns(config: &KickstartConfig, args: FactoryArgs) -> Result<()> {
    let provider = rpc::connect_read_only(config.rpc_url.clone());
    let address = factory_address(config, &args, &provider).await?;
    let factory = CampaignFactory::new(address, provider)?;

    let campaigns = factory.get_deployed_campaigns().await?;

    tracing::info!(factory = %address, count = campaigns.len(), "Retrieved deployed campaigns");

    for campaign in campaigns {
        println!("{campaign}");
    }

    Ok(())
}

async fn create_campaign(config: &KickstartConfig, args: CreateCampaignArgs) -> Result<()> {
    let wallet = wallet(config)?;
    let provider = rpc::connect_signing(config.rpc_url.clone(), wallet.ethereum_wallet());
    let address = factory_address(config, &args.factory, &provider).await?;
    let factory = CampaignFactory::new(address, provider)?;

    let tx_hash = factory
        .create_campaign(args.minimum, wallet.default_account())
        .await?;

    println!("{tx_hash}");

    Ok(())
}

async fn serve(config: &KickstartConfig, args: ServeArgs) -> Result<()> {
    let bind = args.bind.unwrap_or(config.server.bind);
    let provider = rpc::connect_read_only(config.rpc_url.clone());
    let address = factory_address(config, &args.factory, &provider).await?;
    let factory = CampaignFactory::new(address, provider)?;

    kickstart_web::serve(factory, bind).await
}

fn init(config: &KickstartConfig, args: InitArgs) -> Result<()> {
    if args.path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite it",
            args.path.display()
        );
    }

    config
        .save_to_file(&args.path)
        .with_context(|| format!("Failed to initialize {}", args.path.display()))
}

//! accrue-cli: operate a reward pool stored in a local RocksDB database.
//!
//! The CLI acts as the host: the operator supplies eligible balances and
//! supplies on every call, and claims are paid into a local ledger by minting
//! reward tokens or by transferring from a funded treasury.

mod config;

use std::path::PathBuf;

use accrue_core::{
    AccrualError, Address, Amount, DeliveryKind, Precision, RewardAccumulator, RewardHandler,
};
use accrue_store::RocksRewardStore;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "accrue-cli")]
#[command(version, about = "Lazy reward accrual for a local reward pool")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (default: <data dir>/accrue).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Reward pool name.
    #[arg(long, global = true)]
    pool: Option<String>,

    /// Decimal digits of the internal reward unit.
    #[arg(long, global = true)]
    rscore_decimals: Option<u8>,

    /// Claim delivery ("mint" or "transfer").
    #[arg(long, global = true)]
    delivery: Option<DeliveryKind>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json").
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Distribute an amount across the eligible supply.
    Distribute(DistributeArgs),
    /// Checkpoint a participant before its balance changes.
    Update(BalanceArgs),
    /// Show what a participant could withdraw now.
    Query(BalanceArgs),
    /// Withdraw what a participant is owed without paying it out.
    Withdraw(BalanceArgs),
    /// Withdraw and pay out through the configured delivery.
    Claim(BalanceArgs),
    /// Add native currency to the treasury used by transfer delivery.
    Fund(FundArgs),
    /// Show pools, a participant's checkpoint, and ledger balances.
    Status(StatusArgs),
}

#[derive(Args)]
struct DistributeArgs {
    /// Amount to distribute.
    #[arg(short, long)]
    amount: Amount,

    /// Total eligible supply at the time of distribution.
    #[arg(short, long)]
    supply: Amount,
}

#[derive(Args)]
struct BalanceArgs {
    /// Participant address (32-byte hex).
    #[arg(short, long)]
    address: Address,

    /// Participant's current eligible balance.
    #[arg(short, long)]
    balance: Amount,
}

#[derive(Args)]
struct FundArgs {
    /// Amount to add to the treasury.
    #[arg(short, long)]
    amount: Amount,
}

#[derive(Args)]
struct StatusArgs {
    /// Participant to show.
    #[arg(short, long)]
    address: Option<Address>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct PoolStatus {
    name: String,
    reward_rate_sum: String,
}

#[derive(Serialize)]
struct ParticipantStatus {
    address: String,
    entry_rate: String,
    accrued: String,
    token_balance: Amount,
    native_balance: Amount,
}

#[derive(Serialize)]
struct StatusReport {
    pool: String,
    rscore_decimals: u8,
    delivery: DeliveryKind,
    pools: Vec<PoolStatus>,
    participant: Option<ParticipantStatus>,
    treasury: Amount,
    token_supply: Amount,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(cli.global)?;

    init_logging(&config.log_level, config.log_format);
    debug!(data_dir = %config.data_dir.display(), pool = %config.pool, "configuration loaded");

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("failed to create {}", config.data_dir.display()))?;
    let store = RocksRewardStore::open(config.db_path())
        .with_context(|| format!("failed to open {}", config.db_path().display()))?;
    let precision = Precision::new(config.rscore_decimals)?;
    let accumulator = RewardAccumulator::new(config.pool.clone(), precision, store.clone())
        .with_context(|| format!("failed to open pool {}", config.pool))?;

    match cli.command {
        Commands::Distribute(args) => distribute(accumulator, args),
        Commands::Update(args) => update(accumulator, args),
        Commands::Query(args) => query(accumulator, args),
        Commands::Withdraw(args) => withdraw(accumulator, args),
        Commands::Claim(args) => claim(accumulator, &store, config.delivery, args),
        Commands::Fund(args) => fund(&store, args),
        Commands::Status(args) => status(&accumulator, &store, &config, args),
    }
}

/// Config file and environment first, then command-line flags.
fn resolve_config(args: GlobalArgs) -> Result<CliConfig> {
    let mut config = CliConfig::load(args.config.as_deref()).context("failed to load config")?;
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(pool) = args.pool {
        config.pool = pool;
    }
    if let Some(decimals) = args.rscore_decimals {
        config.rscore_decimals = decimals;
    }
    if let Some(delivery) = args.delivery {
        config.delivery = delivery;
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn distribute(mut acc: RewardAccumulator<RocksRewardStore>, args: DistributeArgs) -> Result<()> {
    let increment = acc.distribute(args.amount, args.supply)?;
    println!("rate increment: {increment}");
    println!("reward rate sum: {}", acc.reward_rate_sum()?);
    Ok(())
}

fn update(mut acc: RewardAccumulator<RocksRewardStore>, args: BalanceArgs) -> Result<()> {
    acc.update(&args.address, args.balance)?;
    println!("checkpointed {}", args.address);
    Ok(())
}

fn query(acc: RewardAccumulator<RocksRewardStore>, args: BalanceArgs) -> Result<()> {
    println!("{}", acc.query(&args.address, args.balance)?);
    Ok(())
}

fn withdraw(mut acc: RewardAccumulator<RocksRewardStore>, args: BalanceArgs) -> Result<()> {
    match acc.withdraw(&args.address, args.balance) {
        Ok(owed) => {
            println!("withdrew {owed}");
            Ok(())
        }
        Err(AccrualError::NothingToClaim) => {
            println!("nothing to withdraw");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn claim(
    acc: RewardAccumulator<RocksRewardStore>,
    store: &RocksRewardStore,
    delivery: DeliveryKind,
    args: BalanceArgs,
) -> Result<()> {
    let mut handler = RewardHandler::new(acc, delivery.select(store.ledger()));
    let paid = handler
        .claim(&args.address, args.balance)
        .with_context(|| format!("claim for {} failed", args.address))?;
    info!(%delivery, amount = %paid, "claim paid");
    println!("paid {paid} via {delivery}");
    Ok(())
}

fn fund(store: &RocksRewardStore, args: FundArgs) -> Result<()> {
    let treasury = store.ledger().fund_treasury(args.amount)?;
    println!("treasury: {treasury}");
    Ok(())
}

fn status(
    acc: &RewardAccumulator<RocksRewardStore>,
    store: &RocksRewardStore,
    config: &CliConfig,
    args: StatusArgs,
) -> Result<()> {
    let ledger = store.ledger();
    let pools = store
        .pools()?
        .into_iter()
        .map(|(name, rate)| PoolStatus {
            name,
            reward_rate_sum: rate.to_string(),
        })
        .collect();
    let participant = match args.address {
        Some(address) => {
            let state = acc.participant(&address)?;
            Some(ParticipantStatus {
                address: address.to_string(),
                entry_rate: state.entry_rate.to_string(),
                accrued: state.accrued.to_string(),
                token_balance: ledger.token_balance(&address)?,
                native_balance: ledger.native_balance(&address)?,
            })
        }
        None => None,
    };
    let report = StatusReport {
        pool: config.pool.clone(),
        rscore_decimals: config.rscore_decimals,
        delivery: config.delivery,
        pools,
        participant,
        treasury: ledger.treasury()?,
        token_supply: ledger.token_supply()?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "pool:          {} ({} decimals, {} delivery)",
        report.pool, report.rscore_decimals, report.delivery
    );
    for pool in &report.pools {
        println!("  {:<20} rate sum {}", pool.name, pool.reward_rate_sum);
    }
    if let Some(p) = &report.participant {
        println!("participant:   {}", p.address);
        println!("  entry rate:  {}", p.entry_rate);
        println!("  accrued:     {}", p.accrued);
        println!("  tokens:      {}", p.token_balance);
        println!("  native:      {}", p.native_balance);
    }
    println!("treasury:      {}", report.treasury);
    println!("token supply:  {}", report.token_supply);
    Ok(())
}

fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

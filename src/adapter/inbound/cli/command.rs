//! Command-line interface definitions.
//!
//! Every command operates on one network, chosen by `network` in the
//! configuration file or by `--network`.

use std::path::PathBuf;

use alloy_primitives::Address;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;

use crate::domain::curve::{SideMode, Spacing};
use crate::infrastructure::config::settings::DEFAULT_CONFIG_FILE;

/// Idempotent provisioning of liquidity-provider registries, instances and
/// fundraising rounds.
#[derive(Parser, Debug)]
#[command(name = "lpforge")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Override the configured network
    #[arg(short, long, global = true)]
    pub network: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy registries, instances and fundraising rounds
    #[command(subcommand)]
    Provision(ProvisionCommand),

    /// Add, remove and seed instance liquidity
    #[command(subcommand)]
    Liquidity(LiquidityCommand),

    /// Manage registry membership
    #[command(subcommand)]
    Registry(RegistryCommand),

    /// Manage rebalance automation tasks
    #[command(subcommand)]
    Task(TaskCommand),

    /// Inspect fee curves
    #[command(subcommand)]
    Curve(CurveCommand),

    /// Inspect the address ledger
    #[command(subcommand)]
    Ledger(LedgerCommand),
}

/// Subcommands for `lpforge provision`.
#[derive(Subcommand, Debug)]
pub enum ProvisionCommand {
    /// Singletons, every market's instances and every fundraising round
    All,
    /// Singletons and the instances of one market
    Market(MarketArg),
    /// Fundraising singletons and rounds
    Fundraising,
}

/// Subcommands for `lpforge liquidity`.
#[derive(Subcommand, Debug)]
pub enum LiquidityCommand {
    /// Deposit settlement tokens into an instance
    Add(LiquidityArgs),
    /// Redeem instance tokens
    Remove(LiquidityArgs),
    /// Deposit each tier's initial liquidity into a market's instances
    Seed(MarketArg),
    /// List unregistered instances the wallet still holds tokens of
    ListRemovable(RegistryArg),
    /// Withdraw everything from unregistered instances
    RemoveUnregistered(RegistryArg),
}

/// Subcommands for `lpforge registry`.
#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// Register every ledger instance (local networks only)
    RegisterAll,
    /// Unregister every ledger instance (local networks only)
    UnregisterAll,
    /// Register one instance
    Register(LpArg),
    /// Unregister one instance
    Unregister(LpArg),
    /// List instances the registry has unregistered
    ListUnregistered(RegistryArg),
}

/// Subcommands for `lpforge task`.
#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create the rebalance task of every ledger instance
    CreateAll,
    /// Cancel the rebalance task of every ledger instance
    CancelAll,
}

/// Subcommands for `lpforge curve`.
#[derive(Subcommand, Debug)]
pub enum CurveCommand {
    /// Print a generated curve, or the configured tiers' curves
    Preview(CurvePreviewArgs),
}

/// Subcommands for `lpforge ledger`.
#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Print every recorded singleton and instance
    Show,
}

#[derive(Args, Debug)]
pub struct MarketArg {
    /// Market address
    #[arg(long)]
    pub market: Address,
}

#[derive(Args, Debug)]
pub struct LpArg {
    /// Instance address
    #[arg(long)]
    pub lp: Address,
}

#[derive(Args, Debug)]
pub struct RegistryArg {
    /// Registry address, defaults to the recorded registry
    #[arg(long)]
    pub registry: Option<Address>,
}

#[derive(Args, Debug)]
pub struct LiquidityArgs {
    /// Instance address
    #[arg(long)]
    pub lp: Address,
    /// Amount in whole tokens
    #[arg(long)]
    pub amount: Decimal,
}

/// Arguments for `lpforge curve preview`.
///
/// Without `--start` the configured tiers are shown.
#[derive(Args, Debug)]
pub struct CurvePreviewArgs {
    /// Start of the utilization range, 0-100
    #[arg(long, requires_all = ["end", "buckets"])]
    pub start: Option<u32>,
    /// End of the utilization range, 0-100
    #[arg(long)]
    pub end: Option<u32>,
    /// Buckets per side
    #[arg(long)]
    pub buckets: Option<usize>,
    #[arg(long, value_enum, default_value = "linear")]
    pub spacing: SpacingArg,
    #[arg(long, value_enum, default_value = "both")]
    pub side: SideArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SpacingArg {
    Linear,
    Sqrt,
}

impl From<SpacingArg> for Spacing {
    fn from(arg: SpacingArg) -> Self {
        match arg {
            SpacingArg::Linear => Self::Linear,
            SpacingArg::Sqrt => Self::Sqrt,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SideArg {
    Both,
    Long,
    Short,
}

impl From<SideArg> for SideMode {
    fn from(arg: SideArg) -> Self {
        match arg {
            SideArg::Both => Self::Both,
            SideArg::Long => Self::Long,
            SideArg::Short => Self::Short,
        }
    }
}

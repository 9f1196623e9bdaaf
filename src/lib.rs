//! lpforge - Idempotent provisioning of liquidity-provider infrastructure.
//!
//! Deploys and wires an instance registry, automation adapters, one
//! liquidity-provider instance per (market, risk tier) pair and a set of
//! fundraising rounds on an EVM network. Every deployment is recorded so
//! rerunning a command converges instead of duplicating work.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Pure logic: fee curves, the address ledger, tier and
//!   round specifications, run summaries
//! - **`port`** - Traits the application drives (chain, store, artifacts,
//!   verifier, confirmation, observer)
//! - **`application`** - Retry policy, the idempotent resource provisioner
//!   and the stage orchestrator
//! - **`adapter`** - JSON-RPC chain client, file deployment store, explorer
//!   verifier and the command-line interface
//! - **`infrastructure`** - Configuration loading and runtime wiring
//!
//! # Example
//!
//! ```no_run
//! use lpforge::domain::curve::{CurveGenerator, SideMode};
//!
//! let curve = CurveGenerator::linear(0, 50, 4, SideMode::Both).unwrap();
//! assert_eq!(curve.fee_rates(), &[-4, -3, -2, -1, 1, 2, 3, 4]);
//! ```

pub mod adapter;
pub mod application;
pub mod contracts;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

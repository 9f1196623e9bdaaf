//! CLI module graph.

pub mod command;
pub mod curve;
pub mod dispatch;
pub mod ledger;
pub mod liquidity;
pub mod output;
pub mod provision;
pub mod registry;
pub mod report;

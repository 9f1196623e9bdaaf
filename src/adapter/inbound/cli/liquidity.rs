//! Handlers for `lpforge liquidity`.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::LiquidityCommand;
use crate::adapter::inbound::cli::output;
use crate::adapter::inbound::cli::report::{self, Outcome};
use crate::application::orchestrator::{Orchestrator, LP_TOKEN_DECIMALS};
use crate::domain::units::format_base_units;
use crate::error::Result;

#[derive(Tabled)]
struct RemovableRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Instance")]
    lp: String,
    #[tabled(rename = "Balance")]
    amount: String,
}

/// Execute a liquidity subcommand.
///
/// # Errors
///
/// Returns an error if the operation fails as a whole.
pub async fn execute(orchestrator: &Orchestrator, command: LiquidityCommand) -> Result<Outcome> {
    match command {
        LiquidityCommand::Add(args) => {
            let progress = output::progress("Adding liquidity...");
            match orchestrator.add_liquidity(args.lp, args.amount).await {
                Ok(base) => {
                    progress.succeed(&format!("Deposited {} into {}", args.amount, args.lp));
                    if output::is_json() {
                        output::result(json!({
                            "command": "liquidity.add",
                            "lp": args.lp,
                            "amount": base.to_string(),
                        }));
                    }
                    Ok(Outcome::Completed)
                }
                Err(e) => {
                    progress.fail("Deposit failed");
                    Err(e)
                }
            }
        }
        LiquidityCommand::Remove(args) => {
            let progress = output::progress("Removing liquidity...");
            match orchestrator.remove_liquidity(args.lp, args.amount).await {
                Ok(base) => {
                    progress.succeed(&format!("Redeemed {} from {}", args.amount, args.lp));
                    if output::is_json() {
                        output::result(json!({
                            "command": "liquidity.remove",
                            "lp": args.lp,
                            "amount": base.to_string(),
                        }));
                    }
                    Ok(Outcome::Completed)
                }
                Err(e) => {
                    progress.fail("Withdrawal failed");
                    Err(e)
                }
            }
        }
        LiquidityCommand::Seed(arg) => {
            output::section("Seeding market");
            output::field("Market", arg.market);
            let summary = orchestrator.seed_market(arg.market).await?;
            Ok(report::summary("liquidity.seed", &summary))
        }
        LiquidityCommand::ListRemovable(arg) => {
            let removable = orchestrator.list_removable(arg.registry).await?;
            if output::is_json() {
                output::result(json!({
                    "command": "liquidity.list-removable",
                    "removable": removable,
                }));
                return Ok(Outcome::Completed);
            }

            output::section("Removable liquidity");
            if removable.is_empty() {
                output::note("No unregistered instance holds wallet liquidity");
                return Ok(Outcome::Completed);
            }
            let rows: Vec<_> = removable
                .iter()
                .map(|item| RemovableRow {
                    market: item.market.to_string(),
                    lp: item.lp.to_string(),
                    amount: format_base_units(item.amount, LP_TOKEN_DECIMALS),
                })
                .collect();
            output::table(&Table::new(rows).to_string());
            output::hint("withdraw with `lpforge liquidity remove-unregistered`");
            Ok(Outcome::Completed)
        }
        LiquidityCommand::RemoveUnregistered(arg) => {
            output::section("Removing unregistered liquidity");
            let outcome = orchestrator.remove_unregistered_liquidity(arg.registry).await?;
            Ok(report::bulk("liquidity.remove-unregistered", &outcome))
        }
    }
}

//! Handler for `lpforge ledger show`.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::domain::ledger::AddressLedger;

#[derive(Tabled)]
struct SingletonRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "Market")]
    market: String,
    #[tabled(rename = "Instance")]
    instance: String,
}

/// Print every singleton and instance the ledger holds.
pub fn show(ledger: &AddressLedger) {
    if output::is_json() {
        output::result(json!({
            "command": "ledger.show",
            "ledger": ledger,
        }));
        return;
    }

    output::section("Singletons");
    let singletons: Vec<_> = ledger
        .singletons()
        .map(|(name, address)| SingletonRow {
            name: name.to_string(),
            address: address.to_string(),
        })
        .collect();
    if singletons.is_empty() {
        output::note("None recorded");
    } else {
        output::table(&Table::new(singletons).to_string());
    }

    output::section("Instances");
    let instances: Vec<_> = ledger
        .markets()
        .iter()
        .flat_map(|market| {
            ledger.instances_of(*market).iter().map(|lp| InstanceRow {
                market: market.to_string(),
                instance: lp.to_string(),
            })
        })
        .collect();
    if instances.is_empty() {
        output::note("None recorded");
    } else {
        output::table(&Table::new(instances).to_string());
    }
}

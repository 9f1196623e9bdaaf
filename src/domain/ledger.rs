//! Session-scoped address bookkeeping.
//!
//! The ledger records which singleton resources (registry, automation
//! adapters, fundraising factory) and which per-market instances have been
//! provisioned or discovered during a session. It is an explicit value passed
//! by reference into the orchestrator, never an ambient global.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::Address;
use serde::Serialize;

use super::error::LedgerError;

/// Ledger key of the instance registry.
pub const REGISTRY: &str = "registry";
/// Ledger key of the liquidity-provider automation adapter.
pub const AUTOMATION_ADAPTER_LP: &str = "automation-adapter-LP";
/// Ledger key of the fundraising automation adapter.
pub const AUTOMATION_ADAPTER_FUNDRAISING: &str = "automation-adapter-fundraising";
/// Ledger key of the fundraising factory.
pub const FUNDRAISING_FACTORY: &str = "fundraising-factory";
/// Ledger key of the shared instance logic contract.
pub const INSTANCE_LOGIC: &str = "instance-logic";

/// Mapping of logical names and markets to provisioned addresses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressLedger {
    singletons: BTreeMap<String, Address>,
    market_order: Vec<Address>,
    instances_by_market: HashMap<Address, Vec<Address>>,
}

impl AddressLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a singleton address.
    ///
    /// Recording the same address twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Conflict`] if `name` is already recorded with a
    /// different address.
    pub fn record_singleton(&mut self, name: &str, address: Address) -> Result<(), LedgerError> {
        match self.singletons.get(name) {
            Some(existing) if *existing == address => Ok(()),
            Some(existing) => Err(LedgerError::Conflict {
                name: name.to_string(),
                existing: *existing,
                requested: address,
            }),
            None => {
                self.singletons.insert(name.to_string(), address);
                Ok(())
            }
        }
    }

    /// Replace a singleton address, returning the previous one.
    pub fn update_singleton(&mut self, name: &str, address: Address) -> Option<Address> {
        self.singletons.insert(name.to_string(), address)
    }

    /// Look up a singleton.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NotFound`] if `name` has not been recorded.
    pub fn lookup_singleton(&self, name: &str) -> Result<Address, LedgerError> {
        self.singletons
            .get(name)
            .copied()
            .ok_or_else(|| LedgerError::NotFound {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn has_singleton(&self, name: &str) -> bool {
        self.singletons.contains_key(name)
    }

    /// Append an instance to a market, preserving insertion order.
    pub fn append_instance(&mut self, market: Address, instance: Address) {
        if !self.instances_by_market.contains_key(&market) {
            self.market_order.push(market);
        }
        self.instances_by_market
            .entry(market)
            .or_default()
            .push(instance);
    }

    /// Instances of `market` in provisioning order; empty if none.
    #[must_use]
    pub fn instances_of(&self, market: Address) -> &[Address] {
        self.instances_by_market
            .get(&market)
            .map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains_instance(&self, market: Address, instance: Address) -> bool {
        self.instances_of(market).contains(&instance)
    }

    /// All instances, market by market in the order markets were first seen.
    #[must_use]
    pub fn all_instance_addresses(&self) -> Vec<Address> {
        self.market_order
            .iter()
            .flat_map(|market| self.instances_of(*market).iter().copied())
            .collect()
    }

    /// Markets with at least one instance, in first-seen order.
    #[must_use]
    pub fn markets(&self) -> &[Address] {
        &self.market_order
    }

    /// Singleton names and addresses in name order.
    pub fn singletons(&self) -> impl Iterator<Item = (&str, Address)> {
        self.singletons.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::repeat_byte(byte)
    }

    #[test]
    fn record_singleton_is_idempotent_for_same_address() {
        let mut ledger = AddressLedger::new();
        ledger.record_singleton(REGISTRY, addr(1)).unwrap();
        ledger.record_singleton(REGISTRY, addr(1)).unwrap();
        assert_eq!(ledger.lookup_singleton(REGISTRY), Ok(addr(1)));
    }

    #[test]
    fn record_singleton_rejects_different_address() {
        let mut ledger = AddressLedger::new();
        ledger.record_singleton(REGISTRY, addr(1)).unwrap();
        assert_eq!(
            ledger.record_singleton(REGISTRY, addr(2)),
            Err(LedgerError::Conflict {
                name: REGISTRY.into(),
                existing: addr(1),
                requested: addr(2),
            })
        );
    }

    #[test]
    fn update_singleton_overwrites_explicitly() {
        let mut ledger = AddressLedger::new();
        ledger.record_singleton(FUNDRAISING_FACTORY, addr(1)).unwrap();
        assert_eq!(ledger.update_singleton(FUNDRAISING_FACTORY, addr(2)), Some(addr(1)));
        assert_eq!(ledger.lookup_singleton(FUNDRAISING_FACTORY), Ok(addr(2)));
    }

    #[test]
    fn lookup_missing_singleton_is_not_found() {
        let ledger = AddressLedger::new();
        assert_eq!(
            ledger.lookup_singleton(AUTOMATION_ADAPTER_LP),
            Err(LedgerError::NotFound {
                name: AUTOMATION_ADAPTER_LP.into()
            })
        );
    }

    #[test]
    fn instances_keep_insertion_order() {
        let mut ledger = AddressLedger::new();
        ledger.append_instance(addr(0xaa), addr(2));
        ledger.append_instance(addr(0xaa), addr(1));
        assert_eq!(ledger.instances_of(addr(0xaa)), &[addr(2), addr(1)]);
    }

    #[test]
    fn unknown_market_has_no_instances() {
        let ledger = AddressLedger::new();
        assert!(ledger.instances_of(addr(0xbb)).is_empty());
    }

    #[test]
    fn all_instances_flatten_market_then_insertion_order() {
        let mut ledger = AddressLedger::new();
        ledger.append_instance(addr(0xbb), addr(1));
        ledger.append_instance(addr(0xaa), addr(2));
        ledger.append_instance(addr(0xbb), addr(3));
        assert_eq!(
            ledger.all_instance_addresses(),
            vec![addr(1), addr(3), addr(2)]
        );
        assert_eq!(ledger.markets(), &[addr(0xbb), addr(0xaa)]);
    }
}

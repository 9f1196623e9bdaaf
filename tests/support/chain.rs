//! In-memory chain that understands the calls the orchestrator makes.

use std::collections::{HashMap, HashSet};

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::{SolCall, SolEvent, SolValue};
use async_trait::async_trait;
use parking_lot::Mutex;

use lpforge::contracts::{
    IAutomationRegistry, IBPFactory, IERC20Metadata, ILPRegistry, IMarketFactory, LPConfig,
    LPMeta, ILP,
};
use lpforge::error::{ChainError, Error, Result};
use lpforge::port::{ChainClient, LogEntry, SignedTransaction, TxReceipt};

use super::artifacts::BYTECODE;

/// Sender of every mock transaction.
pub const SENDER: Address = Address::repeat_byte(0x5e);

/// Settlement token registered by [`MockChain::with_markets`].
pub const USDC: Address = Address::repeat_byte(0xee);

/// Market factory the mock answers for.
pub const MARKET_FACTORY: Address = Address::repeat_byte(0xfa);

type InstanceArgs = (Address, LPMeta, LPConfig, Vec<i16>, Vec<u16>, Address);

#[derive(Default)]
struct State {
    next_address: u64,
    block: u64,
    deploys: Vec<Bytes>,
    transactions: Vec<(Address, Bytes)>,
    failing_deploys: Vec<Address>,
    failing_targets: HashSet<Address>,
    transient_read_failures: u32,
    dropped_receipts: u32,
    signed: u32,
    unsent: HashMap<B256, (Option<Address>, Bytes)>,
    mined: HashMap<B256, std::result::Result<TxReceipt, ChainError>>,
    tokens: HashMap<Address, (String, u8)>,
    markets: Vec<(Address, Address)>,
    registry: HashMap<Address, Vec<Address>>,
    instances: HashMap<Address, (Address, String, String)>,
    allowlisted: HashSet<Address>,
    token_balances: HashMap<(Address, Address), U256>,
    allowances: HashMap<(Address, Address, Address), U256>,
    lp_balances: HashMap<(Address, Address), U256>,
    logs: Vec<LogEntry>,
}

impl State {
    fn next_address(&mut self) -> Address {
        self.next_address += 1;
        Address::left_padding_from(&(0xc0de_0000_u64 + self.next_address).to_be_bytes())
    }

    fn receipt(&mut self, contract_address: Option<Address>, logs: Vec<LogEntry>) -> TxReceipt {
        self.block += 1;
        TxReceipt {
            tx_hash: B256::from(U256::from(self.block)),
            contract_address,
            block_number: Some(self.block),
            logs,
        }
    }

    fn log<E: SolEvent>(&self, address: Address, event: &E) -> LogEntry {
        let data = event.encode_log_data();
        LogEntry {
            address,
            topics: data.topics().to_vec(),
            data: data.data.clone(),
            block_number: Some(self.block + 1),
        }
    }

    fn token_of(&self, lp: Address) -> Option<Address> {
        let (market, _, _) = self.instances.get(&lp)?;
        self.markets
            .iter()
            .find(|(m, _)| m == market)
            .map(|(_, token)| *token)
    }
}

/// Scriptable [`ChainClient`] double.
pub struct MockChain {
    state: Mutex<State>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Register `count` markets settling in a 6-decimal USDC the sender
    /// holds plenty of.
    pub fn with_markets(count: u8) -> Self {
        let chain = Self::new();
        chain.add_token(USDC, "USDC", 6);
        chain.set_token_balance(USDC, SENDER, U256::from(1_000_000_000_000_u64));
        for i in 0..count {
            chain.add_market(market(i), USDC);
        }
        chain
    }

    pub fn add_token(&self, token: Address, symbol: &str, decimals: u8) {
        self.state
            .lock()
            .tokens
            .insert(token, (symbol.to_string(), decimals));
    }

    pub fn add_market(&self, market: Address, token: Address) {
        self.state.lock().markets.push((market, token));
    }

    pub fn set_token_balance(&self, token: Address, owner: Address, amount: U256) {
        self.state.lock().token_balances.insert((token, owner), amount);
    }

    pub fn set_lp_balance(&self, lp: Address, owner: Address, amount: U256) {
        self.state.lock().lp_balances.insert((lp, owner), amount);
    }

    /// Make every creation whose init code mentions `market` fail.
    pub fn fail_deploys_for(&self, market: Address) {
        self.state.lock().failing_deploys.push(market);
    }

    /// Make every transaction sent to `target` fail.
    pub fn fail_transactions_to(&self, target: Address) {
        self.state.lock().failing_targets.insert(target);
    }

    /// Fail the next `count` read calls with an RPC error.
    pub fn fail_next_reads(&self, count: u32) {
        self.state.lock().transient_read_failures = count;
    }

    /// Lose the next `count` receipts after their transactions are mined.
    pub fn drop_next_receipts(&self, count: u32) {
        self.state.lock().dropped_receipts = count;
    }

    /// Transactions signed so far, mined or not.
    pub fn signed_count(&self) -> u32 {
        self.state.lock().signed
    }

    /// Pretend an instance exists without deploying it.
    pub fn add_instance(&self, lp: Address, market: Address, name: &str, tag: &str) {
        self.state
            .lock()
            .instances
            .insert(lp, (market, name.to_string(), tag.to_string()));
    }

    pub fn deploy_count(&self) -> usize {
        self.state.lock().deploys.len()
    }

    /// Non-creation transactions in submission order.
    pub fn transactions(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().transactions.clone()
    }

    pub fn transaction_count(&self) -> usize {
        self.state.lock().transactions.len()
    }

    /// Transactions whose calldata starts with `C`'s selector.
    pub fn calls_of<C: SolCall>(&self) -> Vec<C> {
        self.state
            .lock()
            .transactions
            .iter()
            .filter(|(_, data)| data.starts_with(&C::SELECTOR))
            .filter_map(|(_, data)| C::abi_decode(data).ok())
            .collect()
    }

    pub fn registered(&self, market: Address) -> Vec<Address> {
        self.state
            .lock()
            .registry
            .get(&market)
            .cloned()
            .unwrap_or_default()
    }

    pub fn lp_balance(&self, lp: Address, owner: Address) -> U256 {
        self.state
            .lock()
            .lp_balances
            .get(&(lp, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_allowlisted(&self, adapter: Address) -> bool {
        self.state.lock().allowlisted.contains(&adapter)
    }

    fn deploy(&self, data: &Bytes) -> Result<TxReceipt> {
        let mut state = self.state.lock();
        let address = state.next_address();
        state.deploys.push(data.clone());
        if let Some(args) = data
            .get(BYTECODE.len()..)
            .and_then(|args| InstanceArgs::abi_decode_params(args).ok())
        {
            let (_, meta, config, _, _, _) = args;
            state
                .instances
                .insert(address, (config.market, meta.lpName, meta.tag));
        }
        Ok(state.receipt(Some(address), Vec::new()))
    }

    fn transact(&self, to: Address, data: &Bytes) -> Result<TxReceipt> {
        let mut state = self.state.lock();
        if state.failing_targets.contains(&to) {
            return Err(ChainError::Reverted {
                tx_hash: format!("{to}"),
            }
            .into());
        }
        state.transactions.push((to, data.clone()));

        let mut logs = Vec::new();
        if let Ok(call) = ILPRegistry::registerCall::abi_decode(data) {
            let market = state
                .instances
                .get(&call.lp)
                .map(|(market, _, _)| *market)
                .ok_or_else(|| ChainError::Reverted {
                    tx_hash: "unknown lp".into(),
                })?;
            state.registry.entry(market).or_default().push(call.lp);
            logs.push(state.log(to, &ILPRegistry::LPRegistered { market, lp: call.lp }));
        } else if let Ok(call) = ILPRegistry::unregisterCall::abi_decode(data) {
            let market = state
                .instances
                .get(&call.lp)
                .map(|(market, _, _)| *market)
                .unwrap_or_default();
            if let Some(list) = state.registry.get_mut(&market) {
                list.retain(|lp| *lp != call.lp);
            }
            let log = state.log(to, &ILPRegistry::LPUnregistered { market, lp: call.lp });
            state.logs.push(log.clone());
            logs.push(log);
        } else if let Ok(call) = IAutomationRegistry::addWhitelistedRegistrarCall::abi_decode(data) {
            state.allowlisted.insert(call.registrar);
        } else if let Ok(call) = IERC20Metadata::approveCall::abi_decode(data) {
            state
                .allowances
                .insert((to, SENDER, call.spender), call.amount);
        } else if let Ok(call) = ILP::addLiquidityCall::abi_decode(data) {
            let token = state.token_of(to).unwrap_or_default();
            let balance = state.token_balances.entry((token, SENDER)).or_default();
            *balance = balance.saturating_sub(call.amount);
            *state.lp_balances.entry((to, call.recipient)).or_default() += call.amount;
        } else if let Ok(call) = ILP::removeLiquidityCall::abi_decode(data) {
            let held = state.lp_balances.entry((to, SENDER)).or_default();
            *held = held.saturating_sub(call.lpTokenAmount);
        } else if let Ok(call) = IBPFactory::createBPCall::abi_decode(data) {
            let bp = state.next_address();
            logs.push(state.log(
                to,
                &IBPFactory::BPCreated {
                    lp: call.config.lp,
                    bp,
                },
            ));
        }
        Ok(state.receipt(None, logs))
    }

    fn answer(&self, to: Address, data: &Bytes) -> Result<Bytes> {
        let mut state = self.state.lock();
        if state.transient_read_failures > 0 {
            state.transient_read_failures -= 1;
            return Err(ChainError::Rpc("connection reset".into()).into());
        }

        let encoded = if let Ok(call) = ILPRegistry::lpListByMarketCall::abi_decode(data) {
            state
                .registry
                .get(&call.market)
                .cloned()
                .unwrap_or_default()
                .abi_encode()
        } else if let Ok(call) = IAutomationRegistry::isWhitelistedRegistrarCall::abi_decode(data) {
            state.allowlisted.contains(&call.registrar).abi_encode()
        } else if ILP::marketCall::abi_decode(data).is_ok() {
            instance(&state, to)?.0.abi_encode()
        } else if ILP::settlementTokenCall::abi_decode(data).is_ok() {
            state.token_of(to).unwrap_or_default().abi_encode()
        } else if ILP::lpNameCall::abi_decode(data).is_ok() {
            instance(&state, to)?.1.abi_encode()
        } else if ILP::lpTagCall::abi_decode(data).is_ok() {
            instance(&state, to)?.2.abi_encode()
        } else if let Ok(call) = ILP::balanceOfCall::abi_decode(data) {
            // same selector for instance and token balances
            let balances = if state.instances.contains_key(&to) {
                &state.lp_balances
            } else {
                &state.token_balances
            };
            balances
                .get(&(to, call.account))
                .copied()
                .unwrap_or_default()
                .abi_encode()
        } else if let Ok(call) = IERC20Metadata::allowanceCall::abi_decode(data) {
            state
                .allowances
                .get(&(to, call.owner, call.spender))
                .copied()
                .unwrap_or_default()
                .abi_encode()
        } else if IERC20Metadata::symbolCall::abi_decode(data).is_ok() {
            token(&state, to)?.0.abi_encode()
        } else if IERC20Metadata::decimalsCall::abi_decode(data).is_ok() {
            U256::from(token(&state, to)?.1).abi_encode()
        } else if IMarketFactory::registeredSettlementTokensCall::abi_decode(data).is_ok() {
            let mut tokens: Vec<Address> = Vec::new();
            for (_, token) in &state.markets {
                if !tokens.contains(token) {
                    tokens.push(*token);
                }
            }
            tokens.abi_encode()
        } else if let Ok(call) = IMarketFactory::getMarketsBySettlmentTokenCall::abi_decode(data) {
            state
                .markets
                .iter()
                .filter(|(_, token)| *token == call.settlementToken)
                .map(|(market, _)| *market)
                .collect::<Vec<_>>()
                .abi_encode()
        } else {
            return Err(ChainError::Rpc(format!("unsupported call to {to}")).into());
        };
        Ok(encoded.into())
    }
}

fn instance(state: &State, lp: Address) -> Result<(Address, String, String)> {
    state
        .instances
        .get(&lp)
        .cloned()
        .ok_or_else(|| ChainError::Rpc(format!("{lp} is not an instance")).into())
}

fn token(state: &State, address: Address) -> Result<(String, u8)> {
    state
        .tokens
        .get(&address)
        .cloned()
        .ok_or_else(|| ChainError::Rpc(format!("{address} is not a token")).into())
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Address of the `i`-th mock market.
pub fn market(i: u8) -> Address {
    Address::repeat_byte(0x10 + i)
}

#[async_trait]
impl ChainClient for MockChain {
    fn sender(&self) -> Address {
        SENDER
    }

    async fn sign(&self, to: Option<Address>, data: Bytes) -> Result<SignedTransaction> {
        let mut state = self.state.lock();
        if to.is_none()
            && state
                .failing_deploys
                .iter()
                .any(|market| contains(&data, market.as_slice()))
        {
            // gas estimation runs the creation and sees the revert
            return Err(ChainError::Rpc("execution reverted".into()).into());
        }
        state.signed += 1;
        let tx_hash = B256::from(U256::from(0x7a00_0000_u64 + u64::from(state.signed)));
        state.unsent.insert(tx_hash, (to, data.clone()));
        Ok(SignedTransaction {
            tx_hash,
            raw: data,
            to,
        })
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<()> {
        let unsent = {
            let mut state = self.state.lock();
            if state.mined.contains_key(&tx.tx_hash) {
                return Ok(());
            }
            state.unsent.remove(&tx.tx_hash)
        };
        let Some((to, data)) = unsent else {
            return Err(ChainError::Rpc(format!("unknown transaction {}", tx.tx_hash)).into());
        };

        let outcome = match to {
            None => self.deploy(&data),
            Some(to) => self.transact(to, &data),
        };
        let outcome = match outcome {
            Ok(receipt) => Ok(TxReceipt {
                tx_hash: tx.tx_hash,
                ..receipt
            }),
            Err(Error::Chain(ChainError::Reverted { .. })) => Err(ChainError::Reverted {
                tx_hash: tx.tx_hash.to_string(),
            }),
            Err(e) => Err(ChainError::Rpc(e.to_string())),
        };
        self.state.lock().mined.insert(tx.tx_hash, outcome);
        Ok(())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TxReceipt> {
        let mut state = self.state.lock();
        let timeout = ChainError::ReceiptTimeout {
            tx_hash: tx_hash.to_string(),
            waited_secs: 0,
        };
        if state.dropped_receipts > 0 {
            state.dropped_receipts -= 1;
            return Err(timeout.into());
        }
        match state.mined.get(&tx_hash) {
            Some(outcome) => outcome.clone().map_err(Into::into),
            None => Err(timeout.into()),
        }
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        self.answer(to, &data)
    }

    async fn get_logs(
        &self,
        address: Address,
        event_signature: B256,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<LogEntry>> {
        let state = self.state.lock();
        Ok(state
            .logs
            .iter()
            .filter(|log| log.address == address)
            .filter(|log| log.topics.first() == Some(&event_signature))
            .filter(|log| {
                log.block_number
                    .is_some_and(|b| b >= from_block && b <= to_block)
            })
            .cloned()
            .collect())
    }

    async fn current_block_number(&self) -> Result<u64> {
        Ok(self.state.lock().block)
    }
}

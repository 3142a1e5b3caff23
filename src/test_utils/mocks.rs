//! Mock implementations for testing.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

use crate::domain::types::{format_chain_id, parse_chain_id};
use crate::domain::{
    NameResolver, ProviderEvent, ProviderFlags, WalletError, WalletProvider,
};

/// Default connected account
pub const MOCK_ACCOUNT: &str = "0xA11cE0000000000000000000000000000000A11c";

/// Hash returned for every submitted transaction
pub const MOCK_TX_HASH: &str =
    "0x5eed5eed00000000000000000000000000000000000000000000000000000001";

/// Scripted EIP-1193 wallet.
///
/// Starts with one account on Base (8453), knowing only Base. Every request
/// is recorded so tests can assert on what reached the wallet.
pub struct MockWallet {
    flags: ProviderFlags,
    accounts: Mutex<Vec<String>>,
    chain_id: Mutex<u64>,
    known_chains: Mutex<HashSet<u64>>,
    request_accounts_error: Mutex<Option<WalletError>>,
    switch_error: Mutex<Option<WalletError>>,
    send_error: Mutex<Option<WalletError>>,
    receipt_status: Mutex<String>,
    pending_receipt_polls: AtomicUsize,
    calls: Mutex<Vec<(String, Value)>>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockWallet {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            flags: ProviderFlags::default(),
            accounts: Mutex::new(vec![MOCK_ACCOUNT.to_string()]),
            chain_id: Mutex::new(8453),
            known_chains: Mutex::new(HashSet::from([8453])),
            request_accounts_error: Mutex::new(None),
            switch_error: Mutex::new(None),
            send_error: Mutex::new(None),
            receipt_status: Mutex::new("0x1".to_string()),
            pending_receipt_polls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ProviderFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_accounts(self, accounts: &[&str]) -> Self {
        *self.accounts.lock().unwrap() = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    /// Start on `chain_id`, which the wallet knows about.
    #[must_use]
    pub fn on_chain(self, chain_id: u64) -> Self {
        *self.chain_id.lock().unwrap() = chain_id;
        self.known_chains.lock().unwrap().insert(chain_id);
        self
    }

    /// Forget `chain_id`, so switching to it fails with 4902.
    #[must_use]
    pub fn without_chain(self, chain_id: u64) -> Self {
        self.known_chains.lock().unwrap().remove(&chain_id);
        self
    }

    #[must_use]
    pub fn failing_request_accounts(self, error: WalletError) -> Self {
        *self.request_accounts_error.lock().unwrap() = Some(error);
        self
    }

    #[must_use]
    pub fn failing_switch(self, error: WalletError) -> Self {
        *self.switch_error.lock().unwrap() = Some(error);
        self
    }

    #[must_use]
    pub fn failing_send(self, error: WalletError) -> Self {
        *self.send_error.lock().unwrap() = Some(error);
        self
    }

    /// Receipts report `0x0`.
    #[must_use]
    pub fn reverting(self) -> Self {
        *self.receipt_status.lock().unwrap() = "0x0".to_string();
        self
    }

    /// Return `null` for the first `polls` receipt queries.
    #[must_use]
    pub fn with_pending_receipt_polls(self, polls: usize) -> Self {
        self.pending_receipt_polls.store(polls, Ordering::SeqCst);
        self
    }

    pub fn set_chain(&self, chain_id: u64) {
        *self.chain_id.lock().unwrap() = chain_id;
    }

    pub fn current_chain(&self) -> u64 {
        *self.chain_id.lock().unwrap()
    }

    pub fn emit(&self, event: ProviderEvent) {
        let _ = self.events.send(event);
    }

    /// Methods requested so far, in order
    pub fn methods(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.methods().iter().filter(|m| *m == method).count()
    }

    /// Params of every call to `method`
    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    fn requested_chain(params: &Value) -> Option<u64> {
        params[0]["chainId"].as_str().and_then(parse_chain_id)
    }
}

impl Default for MockWallet {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn flags(&self) -> ProviderFlags {
        self.flags
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params.clone()));

        match method {
            "eth_requestAccounts" => {
                if let Some(err) = self.request_accounts_error.lock().unwrap().clone() {
                    return Err(err);
                }
                Ok(json!(*self.accounts.lock().unwrap()))
            }
            "eth_accounts" => Ok(json!(*self.accounts.lock().unwrap())),
            "eth_chainId" => Ok(json!(format_chain_id(self.current_chain()))),
            "wallet_switchEthereumChain" => {
                if let Some(err) = self.switch_error.lock().unwrap().clone() {
                    return Err(err);
                }
                let chain_id = Self::requested_chain(&params)
                    .ok_or_else(|| WalletError::from_code(-32602, "missing chainId"))?;
                if !self.known_chains.lock().unwrap().contains(&chain_id) {
                    return Err(WalletError::from_code(
                        4902,
                        format!("Unrecognized chain ID {}", format_chain_id(chain_id)),
                    ));
                }
                self.set_chain(chain_id);
                self.emit(ProviderEvent::ChainChanged(chain_id));
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let chain_id = Self::requested_chain(&params)
                    .ok_or_else(|| WalletError::from_code(-32602, "missing chainId"))?;
                self.known_chains.lock().unwrap().insert(chain_id);
                Ok(Value::Null)
            }
            "eth_sendTransaction" => {
                if let Some(err) = self.send_error.lock().unwrap().clone() {
                    return Err(err);
                }
                Ok(json!(MOCK_TX_HASH))
            }
            "eth_getTransactionReceipt" => {
                let pending = self.pending_receipt_polls.load(Ordering::SeqCst);
                if pending > 0 {
                    self.pending_receipt_polls.store(pending - 1, Ordering::SeqCst);
                    return Ok(Value::Null);
                }
                Ok(json!({
                    "transactionHash": params[0],
                    "blockNumber": "0x1234",
                    "status": *self.receipt_status.lock().unwrap(),
                }))
            }
            _ => Err(WalletError::from_code(
                -32601,
                format!("Method {method} not supported"),
            )),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// In-memory name table
pub struct MockNameResolver {
    names: HashMap<String, String>,
    failure: Option<String>,
    lookups: Mutex<Vec<String>>,
}

impl MockNameResolver {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: HashMap::new(),
            failure: None,
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Every lookup errors with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: &str, address: &str) -> Self {
        self.names.insert(name.to_string(), address.to_string());
        self
    }

    /// Names looked up so far
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

impl Default for MockNameResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameResolver for MockNameResolver {
    async fn resolve_name(
        &self,
        _wallet: &dyn WalletProvider,
        name: &str,
    ) -> Result<Option<String>, WalletError> {
        self.lookups.lock().unwrap().push(name.to_string());
        if let Some(message) = &self.failure {
            return Err(WalletError::Transport(message.clone()));
        }
        Ok(self.names.get(name).cloned())
    }
}

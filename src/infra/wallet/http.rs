//! Wallet capability reached over HTTP JSON-RPC.
//!
//! Desktop wallets such as Frame expose the same request surface an injected
//! browser provider does, on a local HTTP port. HTTP cannot push
//! notifications, so account and chain changes are detected by polling
//! (see [`spawn_event_watcher`]).

use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::app::query_chain_id;
use crate::domain::{ProviderEvent, ProviderFlags, WalletError, WalletProvider, request_as};

/// Frame's default local endpoint
pub const DEFAULT_WALLET_RPC_URL: &str = "http://127.0.0.1:1248";

/// Default interval between account/chain polls (4 seconds)
const DEFAULT_WATCH_INTERVAL_MS: u64 = 4_000;

/// Buffered notifications per subscriber
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// HTTP wallet configuration
#[derive(Debug, Clone)]
pub struct HttpWalletConfig {
    pub rpc_url: String,
    /// Flags to report for wallet detection; HTTP wallets cannot set them
    /// on an injected object, so they are configured.
    pub flags: ProviderFlags,
}

impl Default for HttpWalletConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_WALLET_RPC_URL.to_string(),
            flags: ProviderFlags::default(),
        }
    }
}

impl HttpWalletConfig {
    pub fn from_env() -> Self {
        let rpc_url = env::var("WALLET_RPC_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_WALLET_RPC_URL.to_string());
        Self {
            rpc_url,
            ..Default::default()
        }
    }
}

/// [`WalletProvider`] backed by an HTTP JSON-RPC endpoint
pub struct HttpWalletProvider {
    rpc_url: String,
    http_client: reqwest::Client,
    flags: ProviderFlags,
    next_id: AtomicU64,
    events: broadcast::Sender<ProviderEvent>,
}

impl HttpWalletProvider {
    pub fn new(config: HttpWalletConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        info!(url = %config.rpc_url, "HTTP wallet provider created");
        Self {
            rpc_url: config.rpc_url,
            http_client: reqwest::Client::new(),
            flags: config.flags,
            next_id: AtomicU64::new(1),
            events,
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Push a notification to every subscriber.
    pub fn emit(&self, event: ProviderEvent) {
        // No subscribers is fine: nobody is listening yet.
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl WalletProvider for HttpWalletProvider {
    fn flags(&self) -> ProviderFlags {
        self.flags
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "Wallet request");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WalletError::Transport(format!(
                "HTTP {} from wallet",
                response.status()
            )));
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;

        if let Some(error) = body.error {
            debug!(method, code = error.code, message = %error.message, "Wallet returned error");
            return Err(WalletError::from_code(error.code, error.message));
        }
        Ok(body.result.unwrap_or(Value::Null))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

/// Polling configuration for the event watcher
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    pub enabled: bool,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_WATCH_INTERVAL_MS),
            enabled: true,
        }
    }
}

impl WatcherConfig {
    pub fn from_env() -> Self {
        let poll_ms = env::var("WALLET_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_WATCH_INTERVAL_MS);
        Self {
            poll_interval: Duration::from_millis(poll_ms),
            ..Default::default()
        }
    }
}

/// Turns successive account/chain snapshots into change notifications.
/// The first snapshot only sets the baseline.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    accounts: Option<Vec<String>>,
    chain_id: Option<u64>,
}

impl ChangeDetector {
    pub fn observe(&mut self, accounts: Vec<String>, chain_id: u64) -> Vec<ProviderEvent> {
        let mut events = Vec::new();

        match &self.accounts {
            Some(previous) if *previous != accounts => {
                events.push(ProviderEvent::AccountsChanged(accounts.clone()));
            }
            _ => {}
        }
        match self.chain_id {
            Some(previous) if previous != chain_id => {
                events.push(ProviderEvent::ChainChanged(chain_id));
            }
            _ => {}
        }

        self.accounts = Some(accounts);
        self.chain_id = Some(chain_id);
        events
    }
}

/// Poll the wallet for account and chain changes and broadcast them.
/// Returns the task handle and a shutdown sender; send `true` to stop.
pub fn spawn_event_watcher(
    provider: Arc<HttpWalletProvider>,
    config: WatcherConfig,
) -> (JoinHandle<()>, watch::Sender<bool>) {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        if !config.enabled {
            info!("Wallet event watcher disabled");
            return;
        }
        info!(interval_ms = config.poll_interval.as_millis() as u64, "Wallet event watcher started");

        let mut detector = ChangeDetector::default();
        let mut ticker = tokio::time::interval(config.poll_interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let accounts = request_as::<Vec<String>>(provider.as_ref(), "eth_accounts", json!([])).await;
                    let chain_id = query_chain_id(provider.as_ref()).await;
                    match (accounts, chain_id) {
                        (Ok(accounts), Ok(chain_id)) => {
                            for event in detector.observe(accounts, chain_id) {
                                debug!(?event, "Wallet state changed");
                                provider.emit(event);
                            }
                        }
                        (Err(e), _) | (_, Err(e)) => {
                            warn!(error = %e, "Wallet poll failed");
                        }
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Wallet event watcher stopping");
                        break;
                    }
                }
            }
        }
    });

    (handle, shutdown_tx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_detector_baseline_emits_nothing() {
        let mut detector = ChangeDetector::default();
        assert!(detector.observe(vec!["0xa".to_string()], 8453).is_empty());
        assert!(detector.observe(vec!["0xa".to_string()], 8453).is_empty());
    }

    #[test]
    fn test_change_detector_reports_account_and_chain_changes() {
        let mut detector = ChangeDetector::default();
        detector.observe(vec!["0xa".to_string()], 8453);

        assert_eq!(
            detector.observe(vec!["0xb".to_string()], 8453),
            vec![ProviderEvent::AccountsChanged(vec!["0xb".to_string()])]
        );
        assert_eq!(
            detector.observe(vec![], 1),
            vec![
                ProviderEvent::AccountsChanged(vec![]),
                ProviderEvent::ChainChanged(1)
            ]
        );
    }

    #[test]
    fn test_http_wallet_config_default_url() {
        assert_eq!(HttpWalletConfig::default().rpc_url, DEFAULT_WALLET_RPC_URL);
    }

    #[tokio::test]
    async fn test_emit_reaches_subscribers() {
        let provider = HttpWalletProvider::new(HttpWalletConfig::default());
        let mut rx = provider.subscribe();
        provider.emit(ProviderEvent::ChainChanged(8453));
        assert_eq!(rx.recv().await.unwrap(), ProviderEvent::ChainChanged(8453));
    }
}

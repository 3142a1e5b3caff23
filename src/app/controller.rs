//! Connection manager: owns the single wallet session and drives the
//! connect, send and event-reaction flows.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

use super::events::EventSubscription;
use super::resolve::resolve_recipient;
use super::session::{ProviderHandle, SignerHandle, query_chain_id};
use crate::domain::types::{truncate_address, truncate_hash};
use crate::domain::{
    AppError, BASE_MAINNET, ConnectionState, NameResolver, NetworkError, ProviderEvent,
    StatusMessage, TargetNetwork, TipView, TransferRequest, TxReceipt, WalletDetection,
    WalletError, WalletProvider, request_as,
};

/// Default interval between receipt polls (2 seconds)
const DEFAULT_RECEIPT_POLL_MS: u64 = 2_000;

/// Tunables for the client flow
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub target: TargetNetwork,
    pub receipt_poll_interval: Duration,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            target: BASE_MAINNET,
            receipt_poll_interval: Duration::from_millis(DEFAULT_RECEIPT_POLL_MS),
        }
    }
}

impl FlowConfig {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let receipt_poll_ms = env::var("RECEIPT_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RECEIPT_POLL_MS);

        Self {
            receipt_poll_interval: Duration::from_millis(receipt_poll_ms),
            ..Default::default()
        }
    }
}

/// Classify whatever wallet capability the host exposes.
#[must_use]
pub fn detect_wallet(wallet: Option<&dyn WalletProvider>) -> WalletDetection {
    match wallet {
        None => WalletDetection::Absent,
        Some(wallet) => match wallet.flags().kind() {
            Some(kind) => WalletDetection::Named(kind),
            None => WalletDetection::GenericWeb3,
        },
    }
}

/// The one live connection
#[derive(Clone)]
pub struct Session {
    pub address: String,
    /// Chain the wallet last reported; may differ from the provider's
    /// chain after the user leaves the target network.
    pub chain_id: u64,
    pub provider: ProviderHandle,
    pub signer: SignerHandle,
}

/// Owns the session and the view; all mutation goes through `&mut self`,
/// so a second send cannot start while one is in flight.
pub struct TipController<V: TipView> {
    wallet: Option<Arc<dyn WalletProvider>>,
    resolver: Arc<dyn NameResolver>,
    config: FlowConfig,
    view: V,
    state: ConnectionState,
    session: Option<Session>,
}

impl<V: TipView> TipController<V> {
    #[must_use]
    pub fn new(
        wallet: Option<Arc<dyn WalletProvider>>,
        resolver: Arc<dyn NameResolver>,
        view: V,
    ) -> Self {
        Self::with_config(wallet, resolver, view, FlowConfig::default())
    }

    #[must_use]
    pub fn with_config(
        wallet: Option<Arc<dyn WalletProvider>>,
        resolver: Arc<dyn NameResolver>,
        mut view: V,
        config: FlowConfig,
    ) -> Self {
        view.set_connect_visible(true);
        view.set_send_visible(false);
        Self {
            wallet,
            resolver,
            config,
            view,
            state: ConnectionState::Disconnected,
            session: None,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    pub fn detection(&self) -> WalletDetection {
        detect_wallet(self.wallet.as_deref())
    }

    /// Subscribe to the wallet's change notifications, if a wallet exists.
    pub fn subscribe(&self) -> Option<EventSubscription> {
        self.wallet
            .as_ref()
            .map(|wallet| EventSubscription::new(wallet.subscribe()))
    }

    fn status(&mut self, status: StatusMessage) {
        self.view.show_status(&status);
    }

    /// Connect action. Errors end up in the status line, never returned.
    #[instrument(skip(self))]
    pub async fn connect(&mut self) {
        let detection = self.detection();
        let Some(wallet) = self.wallet.clone() else {
            warn!("No wallet capability available");
            self.status(StatusMessage::error(
                "Please install MetaMask or a Web3 wallet!",
            ));
            return;
        };
        match detection {
            WalletDetection::Named(kind) => debug!(wallet = kind.name(), "Wallet detected"),
            _ => debug!("Generic Web3 wallet detected"),
        }

        let previous = std::mem::replace(&mut self.state, ConnectionState::Connecting);

        match self.establish_session(wallet).await {
            Ok(session) => {
                info!(address = %session.address, "Wallet connected");
                self.state = ConnectionState::Connected {
                    address: session.address.clone(),
                    on_target: true,
                };
                self.status(StatusMessage::info(format!(
                    "Connected: {}",
                    truncate_address(&session.address)
                )));
                self.session = Some(session);
                self.view.set_connect_visible(false);
                self.view.set_send_visible(true);
            }
            Err(e) => {
                self.state = previous;
                let status = match &e {
                    AppError::Wallet(WalletError::UserRejected) => {
                        warn!("Connection request rejected by user");
                        StatusMessage::error("Connection request cancelled")
                    }
                    AppError::Wallet(WalletError::RequestPending) => {
                        warn!("Connection request already pending in wallet");
                        StatusMessage::error(
                            "Connection request already pending. Please check your wallet.",
                        )
                    }
                    _ => {
                        error!(error = %e, "Failed to connect wallet");
                        StatusMessage::error(format!("Failed to connect wallet: {e}"))
                    }
                };
                self.status(status);
            }
        }
    }

    async fn establish_session(&self, wallet: Arc<dyn WalletProvider>) -> Result<Session, AppError> {
        let accounts: Vec<String> =
            request_as(wallet.as_ref(), "eth_requestAccounts", json!([])).await?;
        let address = accounts.into_iter().next().ok_or(WalletError::NoAccounts)?;

        let chain_id = query_chain_id(wallet.as_ref()).await?;
        let chain_id = if chain_id == self.config.target.chain_id {
            chain_id
        } else {
            info!(
                current = chain_id,
                target = self.config.target.chain_id,
                "Switching wallet to target network"
            );
            self.switch_to_target(wallet.as_ref()).await?
        };

        // Handles are derived after any switch so they never reference the
        // previous chain.
        let provider = ProviderHandle::new(wallet, Arc::clone(&self.resolver), chain_id);
        let signer = provider.signer(&address, self.config.receipt_poll_interval);

        Ok(Session {
            address,
            chain_id,
            provider,
            signer,
        })
    }

    /// Switch to the target chain, registering it first if the wallet does
    /// not know it. Returns the chain id the wallet reports afterwards.
    async fn switch_to_target(&self, wallet: &dyn WalletProvider) -> Result<u64, AppError> {
        let target = &self.config.target;
        let switch_params = json!([{ "chainId": target.chain_id_hex() }]);

        match wallet
            .request("wallet_switchEthereumChain", switch_params.clone())
            .await
        {
            Ok(_) => {}
            Err(WalletError::UnrecognizedChain(_)) => {
                info!(chain = target.name, "Registering target network with wallet");
                wallet
                    .request(
                        "wallet_addEthereumChain",
                        json!([target.add_chain_params()]),
                    )
                    .await
                    .map_err(|e| NetworkError::SwitchFailed(e.to_string()))?;
                wallet
                    .request("wallet_switchEthereumChain", switch_params)
                    .await
                    .map_err(|e| NetworkError::SwitchFailed(e.to_string()))?;
            }
            Err(e) => return Err(NetworkError::SwitchFailed(e.to_string()).into()),
        }

        let actual = query_chain_id(wallet).await?;
        if actual != target.chain_id {
            return Err(NetworkError::Mismatch {
                expected: target.chain_id,
                actual,
            }
            .into());
        }
        Ok(actual)
    }

    /// Send action. Inputs are cleared only after the receipt arrives.
    #[instrument(skip(self))]
    pub async fn send_tip(&mut self) {
        match self.submit_tip().await {
            Ok(receipt) => {
                info!(hash = %receipt.transaction_hash, "Tip confirmed");
                self.status(StatusMessage::info(format!(
                    "✅ Tip sent successfully! TX: {}",
                    truncate_hash(&receipt.transaction_hash)
                )));
                self.view.clear_form();
            }
            Err(e @ AppError::Validation(_)) | Err(e @ AppError::Wallet(WalletError::NotConnected)) => {
                warn!(error = %e, "Tip rejected before submission");
                self.status(StatusMessage::error(e.to_string()));
            }
            Err(e) => {
                error!(error = %e, "Failed to send tip");
                self.status(StatusMessage::error(format!("Failed to send tip: {e}")));
            }
        }
    }

    async fn submit_tip(&mut self) -> Result<TxReceipt, AppError> {
        let form = self.view.read_form();
        let value = form.check()?;

        let session = self
            .session
            .clone()
            .ok_or(AppError::Wallet(WalletError::NotConnected))?;
        if session.chain_id != self.config.target.chain_id {
            return Err(NetworkError::Mismatch {
                expected: self.config.target.chain_id,
                actual: session.chain_id,
            }
            .into());
        }

        self.status(StatusMessage::info("Resolving recipient..."));
        let to = resolve_recipient(&session.provider, &form.recipient).await?;

        self.status(StatusMessage::info("Preparing transaction..."));
        let request = TransferRequest {
            to,
            value,
            data: form.payload(),
        };

        self.status(StatusMessage::info(
            "Please confirm transaction in your wallet...",
        ));
        let pending = session.signer.send_transaction(&request).await?;

        self.status(StatusMessage::info(
            "Transaction sent! Waiting for confirmation...",
        ));
        pending.wait().await
    }

    /// Apply one wallet notification in place. The page is never reloaded.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts),
            ProviderEvent::ChainChanged(chain_id) => self.on_chain_changed(chain_id),
        }
    }

    fn on_accounts_changed(&mut self, accounts: Vec<String>) {
        let Some(address) = accounts.into_iter().next() else {
            info!("Wallet reported no accounts, disconnecting");
            self.session = None;
            self.state = ConnectionState::Disconnected;
            self.view.set_connect_visible(true);
            self.view.set_send_visible(false);
            self.status(StatusMessage::error("Wallet disconnected"));
            return;
        };

        let poll = self.config.receipt_poll_interval;
        let Some(session) = self.session.as_mut() else {
            debug!(address = %address, "Account change without a session, ignoring");
            return;
        };
        session.signer = session.provider.signer(&address, poll);
        session.address = address.clone();
        let on_target = session.chain_id == self.config.target.chain_id;

        info!(address = %address, "Active account switched");
        self.state = ConnectionState::Connected {
            address: address.clone(),
            on_target,
        };
        self.status(StatusMessage::info(format!(
            "Switched to: {}",
            truncate_address(&address)
        )));
    }

    fn on_chain_changed(&mut self, chain_id: u64) {
        let target = self.config.target.clone();
        let poll = self.config.receipt_poll_interval;
        let resolver = Arc::clone(&self.resolver);
        let Some(session) = self.session.as_mut() else {
            debug!(chain_id, "Chain change without a session, ignoring");
            return;
        };

        if chain_id == target.chain_id {
            session.provider = ProviderHandle::new(
                Arc::clone(session.provider.wallet()),
                resolver,
                chain_id,
            );
            session.signer = session.provider.signer(&session.address, poll);
            session.chain_id = chain_id;
            let address = session.address.clone();

            info!(chain_id, "Wallet on target network");
            self.state = ConnectionState::Connected {
                address,
                on_target: true,
            };
            self.view.set_send_visible(true);
            self.status(StatusMessage::info(format!(
                "Still connected to {}",
                target.name
            )));
        } else {
            session.chain_id = chain_id;
            let address = session.address.clone();

            warn!(chain_id, target = target.chain_id, "Wallet left target network");
            self.state = ConnectionState::Connected {
                address,
                on_target: false,
            };
            self.view.set_send_visible(false);
            self.status(StatusMessage::error(format!(
                "Wrong network. Please switch back to {}.",
                target.name
            )));
        }
    }
}

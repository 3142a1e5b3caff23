//! Domain traits defining contracts for the wallet capability and the UI.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::broadcast;

use super::error::WalletError;
use super::types::{ProviderEvent, ProviderFlags, StatusMessage, TipForm};

/// An EIP-1193 style wallet capability: one `request` entry point plus
/// account and chain change notifications.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Identification flags the wallet sets on itself
    fn flags(&self) -> ProviderFlags {
        ProviderFlags::default()
    }

    /// Issue a JSON-RPC request through the wallet. May prompt the user.
    async fn request(&self, method: &str, params: Value) -> Result<Value, WalletError>;

    /// Subscribe to `accountsChanged` / `chainChanged` notifications
    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Issue a request and decode the result into `T`.
pub async fn request_as<T: DeserializeOwned>(
    wallet: &dyn WalletProvider,
    method: &str,
    params: Value,
) -> Result<T, WalletError> {
    let value = wallet.request(method, params).await?;
    serde_json::from_value(value)
        .map_err(|e| WalletError::InvalidResponse(format!("{method}: {e}")))
}

/// Forward name lookup through the active wallet connection
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Resolve `name` to a literal address. `Ok(None)` means the name has
    /// no address record.
    async fn resolve_name(
        &self,
        wallet: &dyn WalletProvider,
        name: &str,
    ) -> Result<Option<String>, WalletError>;
}

/// The widget surface: one status line, two action controls and three
/// input fields.
pub trait TipView: Send {
    fn show_status(&mut self, status: &StatusMessage);

    fn set_connect_visible(&mut self, visible: bool);

    fn set_send_visible(&mut self, visible: bool);

    /// Current contents of the recipient, amount and message fields
    fn read_form(&self) -> TipForm;

    fn clear_form(&mut self);
}

//! Provider and signer handles derived from the wallet capability.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::domain::types::parse_chain_id;
use crate::domain::{
    AppError, NameResolver, SubmissionError, TransferRequest, TxReceipt, WalletError,
    WalletProvider, request_as,
};

/// Ask the wallet which chain it is currently on.
pub async fn query_chain_id(wallet: &dyn WalletProvider) -> Result<u64, WalletError> {
    let raw: Value = wallet.request("eth_chainId", json!([])).await?;
    let parsed = match &raw {
        Value::String(s) => parse_chain_id(s),
        Value::Number(n) => n.as_u64(),
        _ => None,
    };
    parsed.ok_or_else(|| WalletError::InvalidResponse(format!("eth_chainId: {raw}")))
}

/// Read-side handle bound to the chain the wallet was on when it was made
#[derive(Clone)]
pub struct ProviderHandle {
    wallet: Arc<dyn WalletProvider>,
    resolver: Arc<dyn NameResolver>,
    chain_id: u64,
}

impl ProviderHandle {
    #[must_use]
    pub fn new(
        wallet: Arc<dyn WalletProvider>,
        resolver: Arc<dyn NameResolver>,
        chain_id: u64,
    ) -> Self {
        Self {
            wallet,
            resolver,
            chain_id,
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn wallet(&self) -> &Arc<dyn WalletProvider> {
        &self.wallet
    }

    pub async fn resolve_name(&self, name: &str) -> Result<Option<String>, WalletError> {
        self.resolver.resolve_name(self.wallet.as_ref(), name).await
    }

    /// Derive a signer for `address` on this provider's chain.
    #[must_use]
    pub fn signer(&self, address: &str, receipt_poll_interval: Duration) -> SignerHandle {
        SignerHandle {
            wallet: Arc::clone(&self.wallet),
            address: address.to_string(),
            chain_id: self.chain_id,
            receipt_poll_interval,
        }
    }
}

/// Write-side handle: submits transactions from one account
#[derive(Clone)]
pub struct SignerHandle {
    wallet: Arc<dyn WalletProvider>,
    address: String,
    chain_id: u64,
    receipt_poll_interval: Duration,
}

impl SignerHandle {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Hand the transfer to the wallet for signing and broadcast.
    /// The wallet shows its own confirmation prompt.
    #[instrument(skip(self, request), fields(to = %request.to, value = %request.value))]
    pub async fn send_transaction(
        &self,
        request: &TransferRequest,
    ) -> Result<PendingTransaction, AppError> {
        let params = json!([request.to_call_params(&self.address)]);
        let hash: String = request_as(self.wallet.as_ref(), "eth_sendTransaction", params)
            .await
            .map_err(|e| match e {
                WalletError::UserRejected | WalletError::RequestPending => AppError::Wallet(e),
                other => AppError::Submission(SubmissionError::Broadcast(other.to_string())),
            })?;
        debug!(hash = %hash, "Transaction accepted by wallet");

        Ok(PendingTransaction {
            wallet: Arc::clone(&self.wallet),
            hash,
            poll_interval: self.receipt_poll_interval,
        })
    }
}

/// A broadcast transaction awaiting inclusion
pub struct PendingTransaction {
    wallet: Arc<dyn WalletProvider>,
    hash: String,
    poll_interval: Duration,
}

impl PendingTransaction {
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Poll for the receipt until the transaction is included. No deadline
    /// is applied here; the wallet and node decide when to give up.
    #[instrument(skip(self), fields(hash = %self.hash))]
    pub async fn wait(self) -> Result<TxReceipt, AppError> {
        loop {
            let receipt: Option<TxReceipt> = request_as(
                self.wallet.as_ref(),
                "eth_getTransactionReceipt",
                json!([self.hash]),
            )
            .await
            .map_err(|e| SubmissionError::Confirmation(e.to_string()))?;

            match receipt {
                Some(receipt) if receipt.succeeded() => return Ok(receipt),
                Some(receipt) => {
                    return Err(SubmissionError::Reverted(receipt.transaction_hash).into());
                }
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

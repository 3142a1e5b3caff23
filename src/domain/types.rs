//! Domain types for the tipping flow.

use alloy_primitives::{Bytes, U256, hex, utils::parse_ether};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{ResolutionError, ValidationError};

/// Literal address prefix
pub const ADDRESS_PREFIX: &str = "0x";
/// Length of a hex-encoded 20-byte address including the prefix
pub const ADDRESS_LEN: usize = 42;
/// Name-service suffix accepted as a recipient
pub const BASENAME_SUFFIX: &str = ".base.eth";

/// Native currency display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// The single network tips are sent on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetNetwork {
    pub chain_id: u64,
    pub name: &'static str,
    pub currency_name: &'static str,
    pub currency_symbol: &'static str,
    pub decimals: u8,
    pub rpc_url: &'static str,
    pub explorer_url: &'static str,
}

/// Base mainnet
pub const BASE_MAINNET: TargetNetwork = TargetNetwork {
    chain_id: 8453,
    name: "Base",
    currency_name: "Ethereum",
    currency_symbol: "ETH",
    decimals: 18,
    rpc_url: "https://mainnet.base.org",
    explorer_url: "https://basescan.org",
};

impl TargetNetwork {
    /// Chain id as the `0x`-prefixed quantity wallets expect
    #[must_use]
    pub fn chain_id_hex(&self) -> String {
        format_chain_id(self.chain_id)
    }

    /// Parameters for `wallet_addEthereumChain`
    #[must_use]
    pub fn add_chain_params(&self) -> AddChainParams {
        AddChainParams {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.to_string(),
            native_currency: NativeCurrency {
                name: self.currency_name.to_string(),
                symbol: self.currency_symbol.to_string(),
                decimals: self.decimals,
            },
            rpc_urls: vec![self.rpc_url.to_string()],
            block_explorer_urls: vec![self.explorer_url.to_string()],
        }
    }
}

/// EIP-3085 chain registration payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

#[must_use]
pub fn format_chain_id(chain_id: u64) -> String {
    format!("{ADDRESS_PREFIX}{chain_id:x}")
}

/// Parse a chain id reported as a hex quantity (`0x2105`) or decimal (`8453`).
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix(ADDRESS_PREFIX) {
        Some(hex_digits) => u64::from_str_radix(hex_digits, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Wallet brands recognised from the capability's self-reported flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    MetaMask,
    CoinbaseWallet,
    Brave,
    Rabby,
}

impl WalletKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::MetaMask => "MetaMask",
            Self::CoinbaseWallet => "Coinbase Wallet",
            Self::Brave => "Brave Wallet",
            Self::Rabby => "Rabby",
        }
    }
}

/// Identification flags an injected wallet sets on itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderFlags {
    #[serde(default)]
    pub is_meta_mask: bool,
    #[serde(default)]
    pub is_coinbase_wallet: bool,
    #[serde(default)]
    pub is_brave_wallet: bool,
    #[serde(default)]
    pub is_rabby: bool,
}

impl ProviderFlags {
    /// Brave and Rabby also set `isMetaMask`, so they are checked first.
    #[must_use]
    pub fn kind(&self) -> Option<WalletKind> {
        if self.is_brave_wallet {
            Some(WalletKind::Brave)
        } else if self.is_rabby {
            Some(WalletKind::Rabby)
        } else if self.is_coinbase_wallet {
            Some(WalletKind::CoinbaseWallet)
        } else if self.is_meta_mask {
            Some(WalletKind::MetaMask)
        } else {
            None
        }
    }
}

/// Result of inspecting the host for a wallet capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletDetection {
    Absent,
    GenericWeb3,
    Named(WalletKind),
}

/// Status line severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Normal,
    Error,
}

/// The one status line shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Normal,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Contents of the three input fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TipForm {
    #[validate(length(min = 1, message = "Please enter recipient address or BaseName"))]
    pub recipient: String,
    #[validate(custom(function = "validate_tip_amount"))]
    pub amount: String,
    pub message: String,
}

impl TipForm {
    /// Build a form from raw field values. The recipient is trimmed.
    pub fn new(
        recipient: impl AsRef<str>,
        amount: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.as_ref().trim().to_string(),
            amount: amount.into(),
            message: message.into(),
        }
    }

    /// Validate in field order, so a missing recipient is reported before
    /// a bad amount, and return the amount in wei.
    pub fn check(&self) -> Result<U256, ValidationError> {
        if let Err(errors) = self.validate() {
            let fields = errors.field_errors();
            if fields.contains_key("recipient") {
                return Err(ValidationError::MissingRecipient);
            }
            return Err(ValidationError::InvalidAmount);
        }
        parse_tip_amount(&self.amount)
    }

    /// Message bytes for the transaction payload, empty when no message
    pub fn payload(&self) -> Bytes {
        if self.message.is_empty() {
            Bytes::new()
        } else {
            Bytes::copy_from_slice(self.message.as_bytes())
        }
    }
}

fn validate_tip_amount(amount: &str) -> Result<(), validator::ValidationError> {
    parse_tip_amount(amount)
        .map(|_| ())
        .map_err(|_| validator::ValidationError::new("invalid_amount"))
}

/// Convert a plain decimal ETH amount (`[0-9]*(.[0-9]*)?`) into wei. Zero,
/// signed, exponent and separator forms are rejected, as are amounts finer
/// than 18 decimals once trailing zeros are dropped.
pub fn parse_tip_amount(amount: &str) -> Result<U256, ValidationError> {
    let (whole, fraction) = match amount.trim().split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount.trim(), ""),
    };
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(whole) || !is_digits(fraction) || (whole.is_empty() && fraction.is_empty()) {
        return Err(ValidationError::InvalidAmount);
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > usize::from(BASE_MAINNET.decimals) {
        return Err(ValidationError::InvalidAmount);
    }
    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{whole}.{fraction}")
    };

    match parse_ether(&normalized) {
        Ok(wei) if !wei.is_zero() => Ok(wei),
        _ => Err(ValidationError::InvalidAmount),
    }
}

/// Classification of a trimmed recipient input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// Literal address, used verbatim
    Address(String),
    /// Name to resolve through the name service
    Name(String),
}

impl Recipient {
    pub fn classify(input: &str) -> Result<Self, ResolutionError> {
        if input.starts_with(ADDRESS_PREFIX) && input.len() == ADDRESS_LEN {
            Ok(Self::Address(input.to_string()))
        } else if input.ends_with(BASENAME_SUFFIX) {
            Ok(Self::Name(input.to_string()))
        } else {
            Err(ResolutionError::InvalidRecipient)
        }
    }
}

/// A value transfer ready for the signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: String,
    pub value: U256,
    pub data: Bytes,
}

impl TransferRequest {
    /// `eth_sendTransaction` parameter object
    #[must_use]
    pub fn to_call_params(&self, from: &str) -> serde_json::Value {
        serde_json::json!({
            "from": from,
            "to": self.to,
            "value": format!("{:#x}", self.value),
            "data": hex::encode_prefixed(&self.data),
        })
    }
}

/// The subset of a transaction receipt the flow cares about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted; absent on pre-Byzantium chains
    #[serde(default)]
    pub status: Option<String>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        !matches!(self.status.as_deref(), Some("0x0") | Some("0x00"))
    }
}

/// Notifications emitted by the wallet capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(u64),
}

/// Connection lifecycle as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected { address: String, on_target: bool },
}

/// `0x1234...abcd`
#[must_use]
pub fn truncate_address(address: &str) -> String {
    let len = address.chars().count();
    if len < 10 {
        return address.to_string();
    }
    let head: String = address.chars().take(6).collect();
    let tail: String = address.chars().skip(len - 4).collect();
    format!("{head}...{tail}")
}

/// `0x12345678...`
#[must_use]
pub fn truncate_hash(hash: &str) -> String {
    match hash.get(..10) {
        Some(head) => format!("{head}..."),
        None => hash.to_string(),
    }
}

/// Error response body for the asset server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub r#type: String,
    pub message: String,
}

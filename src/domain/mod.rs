//! Domain layer containing core types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    AppError, ConfigError, NetworkError, ResolutionError, SubmissionError, ValidationError,
    WalletError,
};
pub use traits::{NameResolver, TipView, WalletProvider, request_as};
pub use types::{
    BASE_MAINNET, ConnectionState, ErrorDetail, ErrorResponse, ProviderEvent, ProviderFlags,
    Recipient, Severity, StatusMessage, TargetNetwork, TipForm, TransferRequest, TxReceipt,
    WalletDetection, WalletKind,
};

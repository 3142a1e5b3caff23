//! Wallet capability transports.

pub mod http;

pub use http::{
    ChangeDetector, DEFAULT_WALLET_RPC_URL, HttpWalletConfig, HttpWalletProvider, WatcherConfig,
    spawn_event_watcher,
};

//! Infrastructure layer implementations.

pub mod names;
pub mod wallet;

pub use names::{BASENAME_REGISTRY, EnsNameResolver, namehash};
pub use wallet::{
    ChangeDetector, HttpWalletConfig, HttpWalletProvider, WatcherConfig, spawn_event_watcher,
};

//! Test doubles for the wallet capability and name service.

pub mod mocks;

pub use mocks::{MOCK_ACCOUNT, MOCK_TX_HASH, MockNameResolver, MockWallet};

//! Tipsy: send native ETH tips on Base through the user's own wallet.
//!
//! The crate has two halves: a static asset server (`api`) for the widget
//! page, and the wallet client flow (`app`) that connects to a wallet
//! capability, resolves recipients, and submits transfers.

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;
pub mod logging;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

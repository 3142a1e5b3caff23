//! Name-service resolvers.

pub mod ens;

pub use ens::{BASENAME_REGISTRY, EnsNameResolver, namehash};

//! ENS-compatible forward resolution, used for Basenames.
//!
//! Resolution is two `eth_call`s through the wallet connection:
//! `registry.resolver(node)` followed by `resolver.addr(node)`, where
//! `node` is the EIP-137 namehash of the name.

use std::env;
use std::str::FromStr;

use alloy_primitives::{Address, B256, address, hex};
use alloy_sol_types::{SolCall, sol};
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

use crate::domain::{ConfigError, NameResolver, WalletError, WalletProvider, request_as};

/// Basenames registry on Base mainnet
pub const BASENAME_REGISTRY: Address = address!("b94704422c80a251d9ba6d40ba9d2e8a7ad3f5ef");

sol! {
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }
}

/// EIP-137 namehash of the lowercased name.
#[must_use]
pub fn namehash(name: &str) -> B256 {
    alloy_ens::namehash(&name.to_lowercase())
}

/// Name resolver that queries an ENS-style registry
#[derive(Debug, Clone)]
pub struct EnsNameResolver {
    registry: Address,
}

impl Default for EnsNameResolver {
    fn default() -> Self {
        Self::new(BASENAME_REGISTRY)
    }
}

impl EnsNameResolver {
    #[must_use]
    pub fn new(registry: Address) -> Self {
        Self { registry }
    }

    /// Registry from `NAME_REGISTRY_ADDRESS`, defaulting to Basenames.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var("NAME_REGISTRY_ADDRESS").ok().filter(|v| !v.is_empty()) {
            Some(raw) => Address::from_str(&raw)
                .map(Self::new)
                .map_err(|_| ConfigError::InvalidValue {
                    name: "NAME_REGISTRY_ADDRESS".to_string(),
                    value: raw,
                }),
            None => Ok(Self::default()),
        }
    }

    pub fn registry(&self) -> Address {
        self.registry
    }

    /// `eth_call` a view function returning a single `address`.
    async fn call_address<C>(
        wallet: &dyn WalletProvider,
        contract: Address,
        call: C,
    ) -> Result<Option<Address>, WalletError>
    where
        C: SolCall<Return = Address> + Send,
    {
        let params = json!([
            {
                "to": contract.to_checksum(None),
                "data": hex::encode_prefixed(call.abi_encode()),
            },
            "latest"
        ]);
        let raw: String = request_as(wallet, "eth_call", params).await?;
        decode_address_return::<C>(&raw)
    }
}

/// Decode an `address` return value. Empty output (no contract code) and
/// the zero address both mean "nothing here".
fn decode_address_return<C>(raw: &str) -> Result<Option<Address>, WalletError>
where
    C: SolCall<Return = Address>,
{
    let bytes =
        hex::decode(raw).map_err(|e| WalletError::InvalidResponse(format!("eth_call: {e}")))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let address = C::abi_decode_returns(&bytes)
        .map_err(|e| WalletError::InvalidResponse(format!("{}: {e}", C::SIGNATURE)))?;
    Ok((!address.is_zero()).then_some(address))
}

#[async_trait]
impl NameResolver for EnsNameResolver {
    #[instrument(skip(self, wallet))]
    async fn resolve_name(
        &self,
        wallet: &dyn WalletProvider,
        name: &str,
    ) -> Result<Option<String>, WalletError> {
        let node = namehash(name);

        let registry_call = IEnsRegistry::resolverCall { node };
        let Some(resolver) = Self::call_address(wallet, self.registry, registry_call).await?
        else {
            debug!(name, "No resolver set for name");
            return Ok(None);
        };

        let addr_call = IAddrResolver::addrCall { node };
        let address = Self::call_address(wallet, resolver, addr_call).await?;
        debug!(name, resolver = %resolver, found = address.is_some(), "Name resolved");
        Ok(address.map(|a| a.to_checksum(None)))
    }
}

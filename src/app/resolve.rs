//! Recipient resolution: literal addresses pass through, names are looked up.

use tracing::{instrument, warn};

use super::session::ProviderHandle;
use crate::domain::{Recipient, ResolutionError};

/// Resolve a trimmed recipient input to a literal address.
///
/// Literal addresses are returned unchanged without checksum or existence
/// checks. A lookup error is logged and reported as a generic resolution
/// failure.
#[instrument(skip(provider))]
pub async fn resolve_recipient(
    provider: &ProviderHandle,
    input: &str,
) -> Result<String, ResolutionError> {
    match Recipient::classify(input)? {
        Recipient::Address(address) => Ok(address),
        Recipient::Name(name) => match provider.resolve_name(&name).await {
            Ok(Some(address)) => Ok(address),
            Ok(None) => Err(ResolutionError::NameNotFound),
            Err(e) => {
                warn!(name = %name, error = %e, "Name lookup failed");
                Err(ResolutionError::LookupFailed)
            }
        },
    }
}

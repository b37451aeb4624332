//! Locator errors

use thiserror::Error;

use weft_sdk::WeaveError;

/// Errors raised while resolving an interface contract.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No provider registered for the requested contract
    #[error("no provider registered for '{interface}'")]
    Unregistered {
        /// Contract type name
        interface: &'static str,
    },

    /// The provider closure produced a value of the wrong type
    #[error("provider for '{interface}' returned an unexpected type")]
    ProviderType {
        /// Contract type name
        interface: &'static str,
    },

    /// Weaving the resolved target failed
    #[error(transparent)]
    Weave(#[from] WeaveError),
}

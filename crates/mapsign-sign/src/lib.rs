#![forbid(unsafe_code)]

pub mod canonical;
pub mod sign;
pub mod verify;

pub use mapsign_core::errors::SignError;
pub use mapsign_core::secret::SigningSecret;

/// Query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";

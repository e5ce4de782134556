use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::Mac;
use mapsign_core::errors::SignError;
use mapsign_core::secret::SigningSecret;

use crate::canonical::signable_portion;
use crate::sign::mac;
use crate::SIGNATURE_PARAM;

/// Verify a URL produced by [`crate::sign::sign`].
///
/// The signature must be the last query parameter. Returns `Ok(false)` for a
/// wrong or undecodable signature; errors are reserved for input that cannot
/// be checked at all.
pub fn verify(signed_url: &str, secret: &str) -> Result<bool, SignError> {
    let secret = SigningSecret::from_base64(secret)?;
    verify_with(signed_url, &secret)
}

pub fn verify_with(signed_url: &str, secret: &SigningSecret) -> Result<bool, SignError> {
    let (url, signature) = split_signature(signed_url)?;
    let signable = signable_portion(url)?;

    let Ok(expected) = URL_SAFE_NO_PAD.decode(signature) else {
        tracing::debug!("signature is not url-safe base64");
        return Ok(false);
    };

    // Constant-time comparison.
    let valid = mac(signable.as_bytes(), secret)
        .verify_slice(&expected)
        .is_ok();
    tracing::debug!(valid, signable_len = signable.len(), "verified request url");
    Ok(valid)
}

/// Split `<url>&signature=<sig>` into its two halves.
pub fn split_signature(signed_url: &str) -> Result<(&str, &str), SignError> {
    let marker = format!("&{SIGNATURE_PARAM}=");
    let (url, signature) = signed_url
        .rsplit_once(&marker)
        .ok_or(SignError::MissingSignature)?;
    if signature.is_empty() || signature.contains(['&', '#']) {
        return Err(SignError::MissingSignature);
    }
    Ok((url, signature))
}

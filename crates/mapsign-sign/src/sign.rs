use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use mapsign_core::errors::SignError;
use mapsign_core::secret::SigningSecret;
use sha1::Sha1;

use crate::canonical::signable_portion;
use crate::SIGNATURE_PARAM;

pub(crate) type HmacSha1 = Hmac<Sha1>;

/// Sign a request URL with a base64 shared secret.
///
/// Returns `url` unchanged with `&signature=<sig>` appended, where `<sig>` is
/// the URL-safe, unpadded base64 of HMAC-SHA1 over the URL's path and query.
pub fn sign(url: &str, secret: &str) -> Result<String, SignError> {
    let secret = SigningSecret::from_base64(secret)?;
    sign_with(url, &secret)
}

/// Same as [`sign`] with an already decoded secret.
pub fn sign_with(url: &str, secret: &SigningSecret) -> Result<String, SignError> {
    let signable = signable_portion(url)?;
    let signature = signature_for(signable.as_bytes(), secret);
    tracing::debug!(
        url_len = url.len(),
        signable_len = signable.len(),
        "signed request url"
    );
    Ok(format!("{url}&{SIGNATURE_PARAM}={signature}"))
}

/// URL-safe signature over raw signable bytes.
pub fn signature_for(signable: &[u8], secret: &SigningSecret) -> String {
    URL_SAFE_NO_PAD.encode(mac(signable, secret).finalize().into_bytes())
}

pub(crate) fn mac(signable: &[u8], secret: &SigningSecret) -> HmacSha1 {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(secret.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(signable);
    mac
}

use std::fmt;
use std::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::SignError;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Standard alphabet, padding optional.
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// URL-safe alphabet, padding optional. Map providers hand out secrets in this form.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Raw HMAC key bytes decoded from a base64 shared secret.
///
/// The bytes are wiped on drop and never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Decode a base64 secret. Accepts both the standard and URL-safe
    /// alphabets, with or without `=` padding. Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self, SignError> {
        let encoded = encoded.trim();
        let bytes = STANDARD_LENIENT
            .decode(encoded)
            .or_else(|_| URL_SAFE_LENIENT.decode(encoded))
            .map_err(|e| SignError::InvalidSecretEncoding(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SignError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    /// Wrap key bytes that are already decoded.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, SignError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SignError::EmptySecret);
        }
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for SigningSecret {
    type Err = SignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base64(s)
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret(<{} bytes redacted>)", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_to_raw_bytes() {
        let secret = SigningSecret::from_base64("Zm9vYmFy").unwrap();
        assert_eq!(secret.as_bytes(), b"foobar");
    }

    #[test]
    fn accepts_url_safe_alphabet() {
        // 0xfb 0xff encodes to "-_8" in the url-safe alphabet
        let secret = SigningSecret::from_base64("-_8=").unwrap();
        assert_eq!(secret.as_bytes(), &[0xfb, 0xff]);
        let unpadded = SigningSecret::from_base64("-_8").unwrap();
        assert_eq!(unpadded, secret);
    }

    #[test]
    fn accepts_standard_alphabet() {
        let secret = SigningSecret::from_base64("+/8=").unwrap();
        assert_eq!(secret.as_bytes(), &[0xfb, 0xff]);
    }

    #[test]
    fn rejects_garbage() {
        let err = SigningSecret::from_base64("not-valid-base64!!").unwrap_err();
        assert!(matches!(err, SignError::InvalidSecretEncoding(_)));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(SigningSecret::from_base64("  "), Err(SignError::EmptySecret));
        assert_eq!(
            SigningSecret::from_bytes(Vec::new()),
            Err(SignError::EmptySecret)
        );
    }

    #[test]
    fn debug_is_redacted() {
        let secret: SigningSecret = "Zm9vYmFy".parse().unwrap();
        let shown = format!("{secret:?}");
        assert!(!shown.contains("foobar"));
        assert!(shown.contains("6 bytes"));
    }
}

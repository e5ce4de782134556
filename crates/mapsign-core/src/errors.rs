use serde::Serialize;

/// Failures while signing or verifying a request URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignError {
    #[error("signing secret is not valid base64: {0}")]
    InvalidSecretEncoding(String),
    #[error("signing secret decodes to zero bytes")]
    EmptySecret,
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("url has no query string to sign: {0}")]
    MissingQuery(String),
    #[error("url carries a fragment; signed urls cannot have one")]
    UnexpectedFragment,
    #[error("url already carries a signature parameter")]
    AlreadySigned,
    #[error("url does not end with a signature parameter")]
    MissingSignature,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StaticMapError {
    #[error("center must not be empty")]
    EmptyCenter,
    #[error("zoom {0} out of range 0..=21")]
    ZoomOutOfRange(u8),
    #[error("size {0}x{1} out of range (each side 1..=640)")]
    SizeOutOfRange(u32, u32),
    #[error("invalid size {0:?}, expected WIDTHxHEIGHT")]
    MalformedSize(String),
    #[error("scale must be 1 or 2, got {0}")]
    InvalidScale(u8),
    #[error("unknown maptype: {0}")]
    UnknownMapType(String),
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("{path}: invalid config JSON: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("{0} is not configured")]
    Missing(&'static str),
}

/// Structured result for `mapsign sign --json`.
#[derive(Debug, Clone, Serialize)]
pub struct SignReport {
    pub url: String,
    pub signature: String,
    pub signed_url: String,
}

/// Structured result for `mapsign verify --json`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub url: String,
    pub valid: bool,
}

use mapsign_core::errors::SignError;
use url::{ParseError, Url};

use crate::SIGNATURE_PARAM;

/// Origin used to resolve relative references. Never part of the signed bytes.
const PLACEHOLDER_ORIGIN: &str = "http://signing.invalid/";

/// Extract the bytes a request signature covers: `path + "?" + query`.
///
/// Scheme, host, port and userinfo are dropped so the same request signs
/// identically against any host. The returned bytes are exactly the path
/// and query text of `url`, so the signature covers what is sent. Relative
/// input is therefore used as-is: it must already be `/path?query` in
/// encoded form (`api?x=1`, `/a/../b?x=1` or a raw `Zürich` are rejected
/// rather than rewritten). The only allowance is `scheme://host?query`,
/// where the root path `/` is implied on the wire.
///
/// Rules:
/// - no ASCII whitespace or control characters anywhere
/// - a query string is required and must be non-empty
/// - fragments are rejected
/// - a query already carrying a `signature` parameter is rejected
pub fn signable_portion(url: &str) -> Result<String, SignError> {
    if url.chars().any(|c| c.is_ascii_whitespace() || c.is_ascii_control()) {
        return Err(SignError::InvalidUrl(format!(
            "{url:?}: contains whitespace or control characters"
        )));
    }

    let (parsed, relative) = parse(url)?;

    if parsed.cannot_be_a_base() {
        return Err(SignError::InvalidUrl(format!("{url}: has no path")));
    }
    if parsed.fragment().is_some() {
        return Err(SignError::UnexpectedFragment);
    }
    let query = match parsed.query() {
        Some(q) if !q.is_empty() => q,
        _ => return Err(SignError::MissingQuery(url.to_string())),
    };
    if parsed.query_pairs().any(|(k, _)| k == SIGNATURE_PARAM) {
        return Err(SignError::AlreadySigned);
    }

    let signable = format!("{}?{}", parsed.path(), query);
    let literal = raw_path_and_query(url, relative).is_some_and(|raw| {
        // `scheme://host?query`: the parser supplies the `/` path.
        raw == signable || (raw.starts_with('?') && signable.strip_prefix('/') == Some(raw))
    });
    if !literal {
        return Err(SignError::InvalidUrl(format!(
            "{url}: not in canonical form, expected path and query {signable}"
        )));
    }
    Ok(signable)
}

/// The input text after scheme and authority, untouched by the parser.
fn raw_path_and_query(url: &str, relative: bool) -> Option<&str> {
    let after_authority = if relative {
        match url.strip_prefix("//") {
            Some(rest) => rest,
            None => return url.starts_with('/').then_some(url),
        }
    } else {
        url.split_once("://")?.1
    };
    after_authority
        .find(['/', '?'])
        .map(|i| &after_authority[i..])
}

/// Parse absolute or relative input; the flag is set for relative input.
fn parse(url: &str) -> Result<(Url, bool), SignError> {
    let invalid = |e: ParseError| SignError::InvalidUrl(format!("{url}: {e}"));
    match Url::parse(url) {
        Ok(parsed) => Ok((parsed, false)),
        Err(ParseError::RelativeUrlWithoutBase) => {
            let base = Url::parse(PLACEHOLDER_ORIGIN).map_err(invalid)?;
            Ok((base.join(url).map_err(invalid)?, true))
        }
        Err(e) => Err(invalid(e)),
    }
}

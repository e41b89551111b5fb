use reqwest::header::{HeaderValue, InvalidHeaderValue};
use reqwest::StatusCode;
use url::Url;

/// A request target that does not form a valid URL.
#[derive(Debug, thiserror::Error)]
#[error("invalid URL '{input}': {source}")]
pub struct InvalidUrl {
    pub input: String,
    #[source]
    pub source: url::ParseError,
}

/// Resolves `input` as an absolute URL, or relative to `base` when given.
pub fn resolve_url(base: Option<&Url>, input: &str) -> Result<Url, InvalidUrl> {
    let parsed = match Url::parse(input) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(input),
            None => Err(url::ParseError::RelativeUrlWithoutBase),
        },
        Err(e) => Err(e),
    };
    parsed.map_err(|source| InvalidUrl {
        input: input.to_string(),
        source,
    })
}

/// The `Authorization` header value for a bearer token, marked sensitive
/// so it is never printed by header debug output.
pub fn bearer_header(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
    value.set_sensitive(true);
    Ok(value)
}

/// The server's signal that the supplied credential is missing, invalid or expired.
pub fn is_unauthorized(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}

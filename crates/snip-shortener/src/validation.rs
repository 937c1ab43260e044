use crate::error::{ValidationError, ValidationErrors};
use url::Url;

/// Checks that `raw` can be stored as an original URL.
///
/// All violated rules are reported together, so blank input yields both
/// [`ValidationError::Blank`] and [`ValidationError::InvalidFormat`].
pub fn validate_original_url(raw: &str) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    if raw.trim().is_empty() {
        errors.push(ValidationError::Blank);
    }
    if !is_http_url(raw) {
        errors.push(ValidationError::InvalidFormat);
    }

    match ValidationErrors::new(errors) {
        Some(errors) => Err(errors),
        None => Ok(()),
    }
}

/// Returns `true` for an absolute `http` or `https` URL with a host.
///
/// `Url::parse` silently strips surrounding whitespace and encodes inner
/// spaces, so whitespace and control characters are rejected up front: the
/// text is stored verbatim and must itself be a valid URI.
fn is_http_url(raw: &str) -> bool {
    if raw.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }

    let Ok(url) = Url::parse(raw) else {
        return false;
    };

    matches!(url.scheme(), "http" | "https") && url.host_str().is_some_and(|h| !h.is_empty())
}

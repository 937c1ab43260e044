use serde::{Deserialize, Serialize};
use snip_core::ShortLink;

/// Body of an encode request. A missing `url` is encoded as the empty
/// string and rejected by validation.
#[derive(Debug, Default, Deserialize)]
pub struct EncodeRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Query of a decode request; `short_url` wins when both are present.
#[derive(Debug, Default, Deserialize)]
pub struct DecodeParams {
    pub short_url: Option<String>,
    pub short_code: Option<String>,
}

impl DecodeParams {
    pub fn into_input(self) -> String {
        self.short_url.or(self.short_code).unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortLinkResponse {
    pub short_url: String,
    pub short_code: String,
    pub original_url: String,
}

impl ShortLinkResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            short_url,
            short_code: link.short_code.to_string(),
            original_url: link.original_url,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorsResponse {
    pub errors: Vec<String>,
}

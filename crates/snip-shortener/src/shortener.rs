use crate::error::{DecodeError, EncodeError};
use async_trait::async_trait;
use snip_core::ShortLink;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Returns the link for `raw_url`, creating one if the exact URL was
    /// never shortened before.
    ///
    /// An empty `raw_url` is a validation failure, not a precondition
    /// violation.
    async fn encode(&self, raw_url: &str) -> Result<ShortLink, EncodeError>;

    /// Resolves a bare short code or a full short URL to its link.
    ///
    /// Empty or unparseable input resolves to [`DecodeError::NotFound`].
    async fn decode(&self, input: &str) -> Result<ShortLink, DecodeError>;
}

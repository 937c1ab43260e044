use crate::error::Result;
use crate::link::{NewShortLink, ShortLink};
use crate::shortcode::ShortCode;
use async_trait::async_trait;

/// Result of an insert attempt.
///
/// Storage enforces uniqueness on both the short code and the original URL.
/// Losing either race is an expected outcome rather than an error, so
/// callers can regenerate a code or adopt the winning row.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    /// The row was created.
    Inserted(ShortLink),
    /// Another row already owns the short code.
    CodeCollision,
    /// Another row already owns the original URL; carries that row.
    UrlTaken(ShortLink),
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Finds the link whose original URL is exactly `url`.
    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>>;

    /// Finds the link for a given short code.
    /// Returns `None` if the code does not exist.
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortLink>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new link.
    ///
    /// Unique-constraint violations are reported through [`InsertOutcome`];
    /// `Err` is reserved for transport and availability failures.
    async fn insert(&self, link: NewShortLink) -> Result<InsertOutcome>;
}

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use snip_core::error::Result;
use snip_core::{
    InsertOutcome, LinkId, NewShortLink, ReadRepository, Repository, ShortCode, ShortLink,
};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// Links are indexed twice, by short code and by original URL, and both
/// indexes act as unique constraints. An insert holds the URL entry and then
/// the code entry while it writes, so two racing inserts can never both
/// win. The lock order is always URL then code.
#[derive(Debug)]
pub struct InMemoryRepository {
    by_code: DashMap<ShortCode, ShortLink>,
    by_url: DashMap<String, ShortLink>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self {
            by_code: DashMap::new(),
            by_url: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            by_code: DashMap::with_capacity(capacity),
            by_url: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored links.
    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>> {
        Ok(self.by_url.get(url).map(|entry| entry.clone()))
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        Ok(self.by_code.get(code).map(|entry| entry.clone()))
    }

    async fn exists_by_short_code(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.by_code.contains_key(code))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, link: NewShortLink) -> Result<InsertOutcome> {
        let url_slot = match self.by_url.entry(link.original_url) {
            Entry::Occupied(winner) => {
                trace!(code = %winner.get().short_code, "original url already stored");
                return Ok(InsertOutcome::UrlTaken(winner.get().clone()));
            }
            Entry::Vacant(slot) => slot,
        };

        let code_slot = match self.by_code.entry(link.short_code) {
            Entry::Occupied(taken) => {
                trace!(code = %taken.key(), "short code already stored");
                return Ok(InsertOutcome::CodeCollision);
            }
            Entry::Vacant(slot) => slot,
        };

        let now = Timestamp::now();
        let stored = ShortLink {
            id: LinkId::new(self.next_id.fetch_add(1, Ordering::Relaxed)),
            original_url: url_slot.key().clone(),
            short_code: code_slot.key().clone(),
            created_at: now,
            updated_at: now,
        };

        code_slot.insert(stored.clone());
        url_slot.insert(stored.clone());

        Ok(InsertOutcome::Inserted(stored))
    }
}

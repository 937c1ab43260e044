//! Test doubles shared by the unit tests of this crate.

use async_trait::async_trait;
use parking_lot::Mutex;
use snip_core::error::Result;
use snip_core::{
    InsertOutcome, NewShortLink, ReadRepository, Repository, ShortCode, ShortLink, StorageError,
};
use snip_generator::Generator;
use snip_storage::InMemoryRepository;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts how often a generator was asked for a code.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Yields the scripted codes in order, then repeats the last one forever.
#[derive(Debug)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<ShortCode>>,
    last: Mutex<Option<ShortCode>>,
    calls: CallCounter,
}

impl ScriptedGenerator {
    pub fn new<'a>(codes: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            script: Mutex::new(
                codes
                    .into_iter()
                    .map(|c| ShortCode::new(c).unwrap())
                    .collect(),
            ),
            last: Mutex::new(None),
            calls: CallCounter::default(),
        }
    }

    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl Generator for ScriptedGenerator {
    type Output = ShortCode;

    fn generate(&self) -> ShortCode {
        self.calls.bump();
        let mut last = self.last.lock();
        if let Some(next) = self.script.lock().pop_front() {
            *last = Some(next);
        }
        last.clone().expect("script must not be empty")
    }
}

/// Claims every code is free, so collisions only surface at insert time,
/// like a writer losing a race after its pre-check.
#[derive(Debug, Default)]
pub struct BlindRepository {
    pub inner: InMemoryRepository,
}

#[async_trait]
impl ReadRepository for BlindRepository {
    async fn find_by_original_url(&self, url: &str) -> Result<Option<ShortLink>> {
        self.inner.find_by_original_url(url).await
    }

    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        self.inner.find_by_short_code(code).await
    }

    async fn exists_by_short_code(&self, _code: &ShortCode) -> Result<bool> {
        Ok(false)
    }
}

#[async_trait]
impl Repository for BlindRepository {
    async fn insert(&self, link: NewShortLink) -> Result<InsertOutcome> {
        self.inner.insert(link).await
    }
}

/// Fails every call as if the database were down.
#[derive(Debug, Default)]
pub struct FailingRepository;

fn unavailable<T>() -> Result<T> {
    Err(StorageError::Unavailable("connection refused".to_string()))
}

#[async_trait]
impl ReadRepository for FailingRepository {
    async fn find_by_original_url(&self, _url: &str) -> Result<Option<ShortLink>> {
        unavailable()
    }

    async fn find_by_short_code(&self, _code: &ShortCode) -> Result<Option<ShortLink>> {
        unavailable()
    }

    async fn exists_by_short_code(&self, _code: &ShortCode) -> Result<bool> {
        unavailable()
    }
}

#[async_trait]
impl Repository for FailingRepository {
    async fn insert(&self, _link: NewShortLink) -> Result<InsertOutcome> {
        unavailable()
    }
}

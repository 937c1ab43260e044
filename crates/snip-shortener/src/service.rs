use crate::allocator::{AllocationPolicy, CodeAllocator};
use crate::error::{DecodeError, EncodeError};
use crate::normalize::extract_short_code;
use crate::shortener::Shortener;
use crate::validation::validate_original_url;
use async_trait::async_trait;
use snip_core::{InsertOutcome, NewShortLink, Repository, ShortCode, ShortLink};
use snip_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, trace};

/// The encode/decode facade over a `Repository` and a `Generator`.
///
/// This service handles:
/// - Idempotent encoding: an exact URL that was shortened before gets its
///   existing link back
/// - URL validation
/// - Bounded code allocation, including regeneration when an insert loses a
///   race for its code
/// - Decode input normalization (bare code or full short URL)
///
/// The store keeps no mutable state of its own. Concurrent requests are
/// serialized by the repository's unique constraints only.
#[derive(Debug)]
pub struct ShortLinkStore<R, G> {
    repository: Arc<R>,
    allocator: CodeAllocator<R, G>,
}

impl<R, G> Clone for ShortLinkStore<R, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            allocator: self.allocator.clone(),
        }
    }
}

impl<R: Repository, G: Generator> ShortLinkStore<R, G> {
    /// Creates a new `ShortLinkStore` with the default allocation policy.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_policy(repository, generator, AllocationPolicy::default())
    }

    /// Creates a new `ShortLinkStore` with a custom allocation policy.
    pub fn with_policy(repository: R, generator: G, policy: AllocationPolicy) -> Self {
        let repository = Arc::new(repository);
        let allocator = CodeAllocator::new(Arc::clone(&repository), Arc::new(generator), policy);
        Self {
            repository,
            allocator,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub async fn encode(&self, raw_url: &str) -> Result<ShortLink, EncodeError> {
        Shortener::encode(self, raw_url).await
    }

    pub async fn decode(&self, input: &str) -> Result<ShortLink, DecodeError> {
        Shortener::decode(self, input).await
    }

    async fn create(&self, raw_url: &str) -> Result<ShortLink, EncodeError> {
        let mut budget = self.allocator.budget();

        loop {
            let code = self.allocator.allocate_within(&mut budget).await?;

            match self
                .repository
                .insert(NewShortLink::new(raw_url, code.clone()))
                .await?
            {
                InsertOutcome::Inserted(link) => {
                    info!(code = %link.short_code, id = %link.id, "created short link");
                    return Ok(link);
                }
                InsertOutcome::UrlTaken(winner) => {
                    debug!(code = %winner.short_code, "original url was shortened concurrently");
                    return Ok(winner);
                }
                InsertOutcome::CodeCollision => {
                    debug!(
                        code = %code,
                        attempt = budget.used(),
                        "short code claimed before insert, regenerating"
                    );
                }
            }
        }
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortLinkStore<R, G> {
    async fn encode(&self, raw_url: &str) -> Result<ShortLink, EncodeError> {
        if let Some(existing) = self.repository.find_by_original_url(raw_url).await? {
            trace!(code = %existing.short_code, "original url already shortened");
            return Ok(existing);
        }

        validate_original_url(raw_url)?;

        self.create(raw_url).await
    }

    async fn decode(&self, input: &str) -> Result<ShortLink, DecodeError> {
        let Some(candidate) = extract_short_code(input) else {
            trace!("decode input holds no short code");
            return Err(DecodeError::NotFound);
        };

        // a malformed code cannot be stored, skip the round trip
        let Ok(code) = ShortCode::new(&candidate) else {
            trace!(candidate = %candidate, "decode input is not a short code");
            return Err(DecodeError::NotFound);
        };

        match self.repository.find_by_short_code(&code).await? {
            Some(link) => {
                trace!(code = %code, "resolved short code");
                Ok(link)
            }
            None => {
                trace!(code = %code, "short code not found");
                Err(DecodeError::NotFound)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::testing::{BlindRepository, FailingRepository, ScriptedGenerator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use snip_core::ReadRepository;
    use snip_generator::{RandomGenerator, ALPHABET, CODE_LENGTH};
    use snip_storage::InMemoryRepository;
    use std::collections::HashSet;

    fn test_service() -> ShortLinkStore<InMemoryRepository, RandomGenerator<StdRng>> {
        let repo = InMemoryRepository::new();
        let generator = RandomGenerator::with_rng(StdRng::seed_from_u64(0x5eed));
        ShortLinkStore::new(repo, generator)
    }

    fn scripted_service(
        codes: &[&str],
    ) -> ShortLinkStore<InMemoryRepository, ScriptedGenerator> {
        ShortLinkStore::new(
            InMemoryRepository::new(),
            ScriptedGenerator::new(codes.iter().copied()),
        )
    }

    #[tokio::test]
    async fn encode_creates_link() {
        let service = test_service();

        let link = service
            .encode("https://example.com/long/path")
            .await
            .unwrap();

        assert_eq!(link.original_url, "https://example.com/long/path");
        assert_eq!(link.short_code.as_str().len(), CODE_LENGTH);
        assert!(link
            .short_code
            .as_str()
            .bytes()
            .all(|b| ALPHABET.contains(&b)));

        let decoded = service.decode(link.short_code.as_str()).await.unwrap();
        assert_eq!(decoded.original_url, "https://example.com/long/path");
    }

    #[tokio::test]
    async fn encode_is_idempotent() {
        let service = test_service();

        let first = service.encode("https://example.com/dup").await.unwrap();
        let second = service.encode("https://example.com/dup").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn encode_matches_urls_exactly() {
        let service = test_service();

        let bare = service.encode("https://example.com").await.unwrap();
        let slash = service.encode("https://example.com/").await.unwrap();

        assert_ne!(bare.short_code, slash.short_code);
    }

    #[tokio::test]
    async fn existing_url_skips_the_generator() {
        let generator = ScriptedGenerator::new(["abc123", "def456"]);
        let calls = generator.calls();
        let service = ShortLinkStore::new(InMemoryRepository::new(), generator);

        service.encode("https://example.com").await.unwrap();
        let again = service.encode("https://example.com").await.unwrap();

        assert_eq!(again.short_code.as_str(), "abc123");
        assert_eq!(calls.get(), 1);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn round_trip() {
        let service = test_service();

        for url in [
            "http://example.com",
            "https://example.com/path?query=1&b=2",
            "https://example.com/a/b/c#frag",
        ] {
            let link = service.encode(url).await.unwrap();
            let decoded = service.decode(link.short_code.as_str()).await.unwrap();
            assert_eq!(decoded.original_url, url);
        }
    }

    #[tokio::test]
    async fn encode_rejects_empty_url() {
        let service = test_service();

        let err = service.encode("").await.unwrap_err();
        let EncodeError::Invalid(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.contains(ValidationError::Blank));
        assert!(!errors.messages().is_empty());
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn encode_rejects_invalid_url() {
        let service = test_service();

        let err = service.encode("not-a-valid-url").await.unwrap_err();
        let EncodeError::Invalid(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert_eq!(
            errors.messages(),
            vec!["Original url must be a valid HTTP or HTTPS URL".to_string()]
        );
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn encode_rejects_ftp_url() {
        let service = test_service();

        let err = service.encode("ftp://example.com/file").await.unwrap_err();
        assert!(matches!(err, EncodeError::Invalid(_)));
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn decode_accepts_full_short_url() {
        let service = scripted_service(&["abc123"]);
        let link = service.encode("https://example.com").await.unwrap();

        let by_code = service.decode("abc123").await.unwrap();
        let by_url = service.decode("http://host/abc123").await.unwrap();
        let by_relative = service.decode("host/abc123/").await.unwrap();

        assert_eq!(by_code, link);
        assert_eq!(by_url, link);
        assert_eq!(by_relative, link);
    }

    #[tokio::test]
    async fn decode_unknown_code_is_not_found() {
        let service = test_service();

        let err = service.decode("zzzzzz").await.unwrap_err();
        assert!(matches!(err, DecodeError::NotFound));
        assert_eq!(err.to_string(), "URL not found");
    }

    #[tokio::test]
    async fn decode_empty_input_is_not_found() {
        let service = test_service();

        for input in ["", "   ", "http://host/", "not a code", "abc-12", "toolong1"] {
            let err = service.decode(input).await.unwrap_err();
            assert!(matches!(err, DecodeError::NotFound), "input {input:?}");
        }
    }

    #[tokio::test]
    async fn decode_is_case_sensitive() {
        let service = scripted_service(&["abcdef"]);
        service.encode("https://example.com").await.unwrap();

        assert!(matches!(
            service.decode("ABCDEF").await,
            Err(DecodeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn precheck_collision_draws_again() {
        let service = scripted_service(&["aaaaaa", "aaaaaa", "bbbbbb"]);

        let first = service.encode("https://one.example").await.unwrap();
        let second = service.encode("https://two.example").await.unwrap();

        assert_eq!(first.short_code.as_str(), "aaaaaa");
        assert_eq!(second.short_code.as_str(), "bbbbbb");
    }

    #[tokio::test]
    async fn insert_collision_regenerates() {
        let service = ShortLinkStore::new(
            BlindRepository::default(),
            ScriptedGenerator::new(["aaaaaa", "aaaaaa", "aaaaaa", "cccccc"]),
        );

        let first = service.encode("https://one.example").await.unwrap();
        let second = service.encode("https://two.example").await.unwrap();

        assert_eq!(first.short_code.as_str(), "aaaaaa");
        assert_eq!(second.short_code.as_str(), "cccccc");
        assert_eq!(service.repository().inner.len(), 2);
    }

    #[tokio::test]
    async fn insert_collisions_share_the_attempt_budget() {
        let generator = ScriptedGenerator::new(["aaaaaa"]);
        let calls = generator.calls();
        let service = ShortLinkStore::new(BlindRepository::default(), generator);
        service.encode("https://one.example").await.unwrap();

        let err = service.encode("https://two.example").await.unwrap_err();

        assert!(matches!(
            err,
            EncodeError::GenerationExhausted { attempts: 10 }
        ));
        // one draw for the first url, ten for the second
        assert_eq!(calls.get(), 11);
        assert!(service
            .repository()
            .find_by_original_url("https://two.example")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn exhaustion_is_not_a_validation_error() {
        let service = ShortLinkStore::with_policy(
            InMemoryRepository::new(),
            ScriptedGenerator::new(["aaaaaa"]),
            AllocationPolicy::builder().max_attempts(3).build(),
        );
        service.encode("https://one.example").await.unwrap();

        let err = service.encode("https://two.example").await.unwrap_err();
        assert!(matches!(err, EncodeError::GenerationExhausted { attempts: 3 }));
    }

    #[tokio::test]
    async fn storage_errors_propagate() {
        let service = ShortLinkStore::new(FailingRepository, ScriptedGenerator::new(["abc123"]));

        assert!(matches!(
            service.encode("https://example.com").await,
            Err(EncodeError::Storage(_))
        ));
        assert!(matches!(
            service.decode("abc123").await,
            Err(DecodeError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn concurrent_distinct_urls_get_distinct_codes() {
        let service = Arc::new(ShortLinkStore::new(
            InMemoryRepository::new(),
            RandomGenerator::new(),
        ));
        let mut handles = vec![];

        for i in 0..64 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                let url = format!("https://example.com/page/{i}");
                let link = service.encode(&url).await.unwrap();
                (url, link)
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            let (url, link) = handle.await.unwrap();
            assert_eq!(link.original_url, url);
            assert!(codes.insert(link.short_code.clone()));

            let decoded = service.decode(link.short_code.as_str()).await.unwrap();
            assert_eq!(decoded.original_url, url);
        }

        assert_eq!(codes.len(), 64);
    }

    #[tokio::test]
    async fn concurrent_encodes_of_one_url_agree() {
        let service = Arc::new(ShortLinkStore::new(
            InMemoryRepository::new(),
            RandomGenerator::new(),
        ));
        let mut handles = vec![];

        for _ in 0..32 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.encode("https://example.com/hot").await.unwrap()
            }));
        }

        let mut codes = HashSet::new();
        for handle in handles {
            codes.insert(handle.await.unwrap().short_code);
        }

        assert_eq!(codes.len(), 1);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn usable_as_trait_object() {
        let service: Arc<dyn Shortener> = Arc::new(test_service());

        let link = service.encode("https://example.com").await.unwrap();
        let decoded = service.decode(link.short_code.as_str()).await.unwrap();

        assert_eq!(decoded, link);
    }
}

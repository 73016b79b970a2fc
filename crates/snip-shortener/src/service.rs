use async_trait::async_trait;
use jiff::Timestamp;
use snip_core::{
    CreateParams, LongUrl, MetadataFetcher, Repository, ShortCode, Shortener, ShortenerError,
    StorageError, UrlMapping, WebsiteMetadata,
};
use snip_core::metadata::MAX_TITLE_CHARS;
use snip_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};
use typed_builder::TypedBuilder;

type Result<T> = std::result::Result<T, ShortenerError>;

/// Generated-code attempts per `create` call unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Tunables for [`MappingService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ServiceSettings {
    /// How many generated codes to try before giving up with
    /// [`ShortenerError::Exhausted`].
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository`, a `Generator` and a `MetadataFetcher`
/// to handle:
/// - Short code selection (generated with bounded collision retry, or custom)
/// - Best-effort title/favicon capture
/// - Read, update, delete and list pass-through
///
/// The uniqueness pre-check is only an optimisation. The repository's own
/// conflict detection is what makes concurrent creates safe.
#[derive(Debug)]
pub struct MappingService<R, G, F> {
    repository: Arc<R>,
    generator: Arc<G>,
    fetcher: Arc<F>,
    settings: ServiceSettings,
}

impl<R, G, F> Clone for MappingService<R, G, F> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            generator: Arc::clone(&self.generator),
            fetcher: Arc::clone(&self.fetcher),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, G: Generator, F: MetadataFetcher> MappingService<R, G, F> {
    /// Creates a new `MappingService` with default settings.
    pub fn new(repository: R, generator: G, fetcher: F) -> Self {
        Self::with_settings(repository, generator, fetcher, ServiceSettings::default())
    }

    pub fn with_settings(
        repository: R,
        generator: G,
        fetcher: F,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            fetcher: Arc::new(fetcher),
            settings,
        }
    }

    /// Draws generated codes until one is neither reserved nor in the
    /// repository.
    ///
    /// `attempts` is shared across calls within one `create` so that retries
    /// after an insert conflict count toward the same budget.
    async fn next_free_code(&self, attempts: &mut u32) -> Result<ShortCode> {
        while *attempts < self.settings.max_attempts {
            *attempts += 1;
            let code: ShortCode = self.generator.generate().into();
            if !code.is_reserved() && !self.repository.exists(&code).await? {
                return Ok(code);
            }
            debug!(code = %code, attempt = *attempts, "generated short code already taken");
        }

        warn!(attempts = *attempts, "short code space exhausted");
        Err(ShortenerError::Exhausted {
            attempts: *attempts,
        })
    }

    async fn create_with_custom_code(
        &self,
        code: ShortCode,
        long_url: LongUrl,
    ) -> Result<UrlMapping> {
        if code.is_reserved() {
            return Err(ShortenerError::ReservedCode(code.to_string()));
        }
        if self.repository.exists(&code).await? {
            return Err(ShortenerError::AliasConflict(code.to_string()));
        }

        let metadata = self.fetcher.fetch(&long_url).await;
        let mapping = new_mapping(code, long_url, metadata);

        // A concurrent create may have taken the code since the check above;
        // the repository reports that as a conflict.
        self.repository.insert(mapping.clone()).await?;
        Ok(mapping)
    }

    async fn create_with_generated_code(&self, long_url: LongUrl) -> Result<UrlMapping> {
        let mut attempts = 0;
        let code = self.next_free_code(&mut attempts).await?;
        let metadata = self.fetcher.fetch(&long_url).await;
        let mut mapping = new_mapping(code, long_url, metadata);

        loop {
            match self.repository.insert(mapping.clone()).await {
                Ok(()) => return Ok(mapping),
                Err(StorageError::Conflict(code)) => {
                    debug!(code = %code, "lost a race for a generated short code");
                    mapping.short_code = self.next_free_code(&mut attempts).await?;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn new_mapping(short_code: ShortCode, long_url: LongUrl, metadata: WebsiteMetadata) -> UrlMapping {
    UrlMapping {
        short_code,
        long_url,
        title: Some(clamp_title(metadata.title)),
        favicon: metadata.favicon,
        created_at: Timestamp::now(),
    }
}

fn clamp_title(mut title: String) -> String {
    if let Some((cut, _)) = title.char_indices().nth(MAX_TITLE_CHARS) {
        title.truncate(cut);
    }
    title
}

#[async_trait]
impl<R: Repository, G: Generator, F: MetadataFetcher> Shortener for MappingService<R, G, F> {
    async fn create(&self, params: CreateParams) -> Result<UrlMapping> {
        let CreateParams {
            long_url,
            custom_code,
        } = params;

        let mapping = match custom_code {
            Some(code) => self.create_with_custom_code(code, long_url).await?,
            None => self.create_with_generated_code(long_url).await?,
        };

        info!(
            code = %mapping.short_code,
            url = %mapping.long_url,
            "created url mapping"
        );
        Ok(mapping)
    }

    async fn read(&self, code: &ShortCode) -> Result<Option<UrlMapping>> {
        trace!(code = %code, "reading url mapping");
        Ok(self.repository.get(code).await?)
    }

    async fn update(&self, code: &ShortCode, long_url: LongUrl) -> Result<Option<UrlMapping>> {
        let updated = self.repository.update_long_url(code, &long_url).await?;
        if updated.is_some() {
            info!(code = %code, url = %long_url, "updated url mapping");
        }
        Ok(updated)
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        let deleted = self.repository.delete(code).await?;
        if deleted {
            info!(code = %code, "deleted url mapping");
        }
        Ok(deleted)
    }

    async fn list(&self) -> Result<Vec<UrlMapping>> {
        Ok(self.repository.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snip_core::metadata::FETCH_FAILED_TITLE;
    use snip_core::ReadRepository;
    use snip_generator::{RandomGenerator, SeqGenerator};
    use snip_storage::InMemoryRepository;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the same metadata for every URL and counts calls.
    #[derive(Debug, Default)]
    struct StubFetcher {
        metadata: Option<WebsiteMetadata>,
        calls: Arc<AtomicUsize>,
    }

    impl StubFetcher {
        fn returning(title: &str, favicon: Option<&str>) -> Self {
            Self {
                metadata: Some(WebsiteMetadata {
                    title: title.to_string(),
                    favicon: favicon.map(String::from),
                }),
                calls: Arc::default(),
            }
        }

        fn failing() -> Self {
            Self::default()
        }
    }

    #[async_trait]
    impl MetadataFetcher for StubFetcher {
        async fn fetch(&self, _url: &LongUrl) -> WebsiteMetadata {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.metadata
                .clone()
                .unwrap_or_else(WebsiteMetadata::unavailable)
        }
    }

    /// Always produces the same code.
    struct FixedGenerator(&'static str);

    impl Generator for FixedGenerator {
        type Output = ShortCode;

        fn generate(&self) -> Self::Output {
            ShortCode::new_unchecked(self.0)
        }
    }

    /// Hides existing codes from `exists`, so only `insert` can notice a
    /// collision. Mimics another request inserting between check and write.
    struct BlindRepository(InMemoryRepository);

    #[async_trait]
    impl ReadRepository for BlindRepository {
        async fn get(
            &self,
            code: &ShortCode,
        ) -> snip_core::repository::Result<Option<UrlMapping>> {
            self.0.get(code).await
        }

        async fn exists(&self, _code: &ShortCode) -> snip_core::repository::Result<bool> {
            Ok(false)
        }

        async fn list(&self) -> snip_core::repository::Result<Vec<UrlMapping>> {
            self.0.list().await
        }
    }

    #[async_trait]
    impl Repository for BlindRepository {
        async fn insert(&self, mapping: UrlMapping) -> snip_core::repository::Result<()> {
            self.0.insert(mapping).await
        }

        async fn update_long_url(
            &self,
            code: &ShortCode,
            long_url: &LongUrl,
        ) -> snip_core::repository::Result<Option<UrlMapping>> {
            self.0.update_long_url(code, long_url).await
        }

        async fn delete(&self, code: &ShortCode) -> snip_core::repository::Result<bool> {
            self.0.delete(code).await
        }
    }

    fn url(s: &str) -> LongUrl {
        LongUrl::parse(s).unwrap()
    }

    fn params(long_url: &str, custom_code: Option<&str>) -> CreateParams {
        CreateParams {
            long_url: url(long_url),
            custom_code: custom_code.map(|c| ShortCode::new(c).unwrap()),
        }
    }

    fn existing(code: &str) -> UrlMapping {
        new_mapping(
            ShortCode::new_unchecked(code),
            url("https://taken.example"),
            WebsiteMetadata::unavailable(),
        )
    }

    fn test_service() -> MappingService<InMemoryRepository, RandomGenerator, StubFetcher> {
        MappingService::new(
            InMemoryRepository::new(),
            RandomGenerator::default(),
            StubFetcher::returning("Example Domain", Some("https://example.com/favicon.ico")),
        )
    }

    #[tokio::test]
    async fn create_generates_six_char_alphanumeric_code() {
        let service = test_service();

        let mapping = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        assert_eq!(mapping.short_code.as_str().len(), 6);
        assert!(mapping
            .short_code
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn create_then_read_returns_same_long_url() {
        let service = test_service();

        for long_url in [
            "https://example.com",
            "http://example.org/a/b?c=d#frag",
            "https://例え.jp/パス",
        ] {
            let created = service.create(params(long_url, None)).await.unwrap();
            let read = service.read(&created.short_code).await.unwrap().unwrap();
            assert_eq!(read.long_url, url(long_url));
            assert_eq!(read, created);
        }
    }

    #[tokio::test]
    async fn create_stores_fetched_metadata() {
        let service = test_service();

        let mapping = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        assert_eq!(mapping.title.as_deref(), Some("Example Domain"));
        assert_eq!(
            mapping.favicon.as_deref(),
            Some("https://example.com/favicon.ico")
        );
    }

    #[tokio::test]
    async fn generated_codes_are_unique() {
        let service = test_service();
        let mut seen = HashSet::new();

        for i in 0..500 {
            let mapping = service
                .create(params(&format!("https://example.com/{i}"), None))
                .await
                .unwrap();
            assert!(seen.insert(mapping.short_code));
        }

        assert_eq!(service.list().await.unwrap().len(), 500);
    }

    #[tokio::test]
    async fn create_with_custom_code() {
        let service = test_service();

        let mapping = service
            .create(params("https://example.com", Some("my-alias")))
            .await
            .unwrap();

        assert_eq!(mapping.short_code.as_str(), "my-alias");
    }

    #[tokio::test]
    async fn duplicate_custom_code_conflicts_and_creates_nothing() {
        let service = test_service();

        service
            .create(params("https://example1.com", Some("my-alias")))
            .await
            .unwrap();
        let err = service
            .create(params("https://example2.com", Some("my-alias")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AliasConflict(code) if code == "my-alias"));
        let all = service.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].long_url, url("https://example1.com"));
    }

    #[tokio::test]
    async fn conflicting_custom_code_skips_metadata_fetch() {
        let fetcher = StubFetcher::returning("t", None);
        let calls = Arc::clone(&fetcher.calls);
        let repo = InMemoryRepository::new();
        repo.insert(existing("taken")).await.unwrap();
        let service = MappingService::new(repo, RandomGenerator::default(), fetcher);

        assert!(service
            .create(params("https://example.com", Some("taken")))
            .await
            .is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn overlong_title_is_cut_to_column_width() {
        // Multi-byte characters make sure the cut lands on a char boundary.
        let long_title = "é".repeat(150) + &"a".repeat(150);
        let service = MappingService::new(
            InMemoryRepository::new(),
            RandomGenerator::default(),
            StubFetcher::returning(&long_title, None),
        );

        let mapping = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        let title = mapping.title.unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
        assert!(long_title.starts_with(&title));
    }

    #[test]
    fn short_titles_are_kept_whole() {
        assert_eq!(clamp_title("Example Domain".to_string()), "Example Domain");
        let exact = "x".repeat(MAX_TITLE_CHARS);
        assert_eq!(clamp_title(exact.clone()), exact);
    }

    #[tokio::test]
    async fn fetch_failure_still_creates_mapping() {
        let service = MappingService::new(
            InMemoryRepository::new(),
            RandomGenerator::default(),
            StubFetcher::failing(),
        );

        let mapping = service
            .create(params("https://unreachable.invalid", None))
            .await
            .unwrap();

        assert_eq!(mapping.title.as_deref(), Some(FETCH_FAILED_TITLE));
        assert_eq!(mapping.favicon, None);
        assert!(service.read(&mapping.short_code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn collision_regenerates_code() {
        let repo = InMemoryRepository::new();
        repo.insert(existing("000000")).await.unwrap();
        repo.insert(existing("000001")).await.unwrap();
        let service = MappingService::new(
            repo,
            SeqGenerator::new(6),
            StubFetcher::returning("t", None),
        );

        let mapping = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        assert_eq!(mapping.short_code.as_str(), "000002");
    }

    #[tokio::test]
    async fn exhausted_code_space_is_an_error() {
        let repo = InMemoryRepository::new();
        repo.insert(existing("dup")).await.unwrap();
        let service = MappingService::with_settings(
            repo,
            FixedGenerator("dup"),
            StubFetcher::returning("t", None),
            ServiceSettings::builder().max_attempts(3).build(),
        );

        let err = service
            .create(params("https://example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::Exhausted { attempts: 3 }));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn insert_conflict_on_generated_code_retries() {
        let inner = InMemoryRepository::new();
        inner.insert(existing("000000")).await.unwrap();
        let service = MappingService::new(
            BlindRepository(inner),
            SeqGenerator::new(6),
            StubFetcher::returning("t", None),
        );

        let mapping = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        assert_eq!(mapping.short_code.as_str(), "000001");
    }

    #[tokio::test]
    async fn insert_conflict_on_generated_code_respects_attempt_budget() {
        let inner = InMemoryRepository::new();
        inner.insert(existing("dup")).await.unwrap();
        let service = MappingService::with_settings(
            BlindRepository(inner),
            FixedGenerator("dup"),
            StubFetcher::returning("t", None),
            ServiceSettings::builder().max_attempts(2).build(),
        );

        let err = service
            .create(params("https://example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::Exhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn insert_conflict_on_custom_code_is_alias_conflict() {
        let inner = InMemoryRepository::new();
        inner.insert(existing("mine")).await.unwrap();
        let service = MappingService::new(
            BlindRepository(inner),
            RandomGenerator::default(),
            StubFetcher::returning("t", None),
        );

        let err = service
            .create(params("https://example.com", Some("mine")))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::AliasConflict(_)));
    }

    #[tokio::test]
    async fn reserved_custom_code_is_rejected_without_side_effects() {
        let fetcher = StubFetcher::returning("t", None);
        let calls = Arc::clone(&fetcher.calls);
        let service = MappingService::new(
            InMemoryRepository::new(),
            RandomGenerator::default(),
            fetcher,
        );

        for reserved in ["urls", "health"] {
            let err = service
                .create(params("https://example.com", Some(reserved)))
                .await
                .unwrap_err();
            assert!(matches!(err, ShortenerError::ReservedCode(code) if code == reserved));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reserved_generated_code_is_skipped() {
        let service = MappingService::with_settings(
            InMemoryRepository::new(),
            FixedGenerator("health"),
            StubFetcher::returning("t", None),
            ServiceSettings::builder().max_attempts(2).build(),
        );

        let err = service
            .create(params("https://example.com", None))
            .await
            .unwrap_err();

        assert!(matches!(err, ShortenerError::Exhausted { attempts: 2 }));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_nonexistent_is_none() {
        let service = test_service();

        let mapping = service
            .read(&ShortCode::new("nonexistent").unwrap())
            .await
            .unwrap();
        assert!(mapping.is_none());
    }

    #[tokio::test]
    async fn update_changes_only_long_url() {
        let fetcher = StubFetcher::returning("Original", Some("https://example.com/f.ico"));
        let calls = Arc::clone(&fetcher.calls);
        let service = MappingService::new(
            InMemoryRepository::new(),
            RandomGenerator::default(),
            fetcher,
        );
        let created = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        let updated = service
            .update(&created.short_code, url("https://example.org/elsewhere"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.long_url, url("https://example.org/elsewhere"));
        assert_eq!(updated.short_code, created.short_code);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.favicon, created.favicon);
        assert_eq!(updated.created_at, created.created_at);
        // Metadata is captured once at creation only.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            service.read(&created.short_code).await.unwrap(),
            Some(updated)
        );
    }

    #[tokio::test]
    async fn update_nonexistent_is_none() {
        let service = test_service();

        let updated = service
            .update(&ShortCode::new("missing").unwrap(), url("https://example.org"))
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn delete_then_read_is_none() {
        let service = test_service();
        let created = service
            .create(params("https://example.com", None))
            .await
            .unwrap();

        assert!(service.delete(&created.short_code).await.unwrap());
        assert!(service.read(&created.short_code).await.unwrap().is_none());
        assert!(!service.delete(&created.short_code).await.unwrap());
    }

    #[tokio::test]
    async fn delete_nonexistent_is_false() {
        let service = test_service();

        let deleted = service
            .delete(&ShortCode::new("nonexistent").unwrap())
            .await
            .unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn service_is_usable_as_trait_object() {
        let service: Arc<dyn Shortener> = Arc::new(test_service());

        let created = service
            .create(params("https://example.com", Some("dyn-ok")))
            .await
            .unwrap();
        assert_eq!(service.list().await.unwrap(), vec![created]);
    }
}

//! Session API for the rezka backend
//!
//! Combines mirror resolution with the catalog, detail and stream requests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::OnceCell;

use crate::client::{ClientConfig, HttpTransport, Transport};
use crate::error::{Result, RezkaError};
use crate::mirror::{MirrorList, MirrorResolver};
use crate::types::{
    Category, FetchOutcome, MovieSummary, StreamDescriptor, StreamRequest, backend_error,
};
use crate::url::{build_category_url, build_search_url, build_stream_url, resolve_detail_url};

/// Client session bound to one resolved mirror
///
/// The mirror is resolved lazily by the first request and then kept for the
/// lifetime of the session. Concurrent first requests share a single
/// resolution. Build a new session to pick a mirror again.
///
/// The plain methods never fail: a failed request is logged and comes back as
/// an empty list or `None`. The `try_` methods return a [`FetchOutcome`]
/// that keeps failures distinguishable from empty results.
pub struct ApiSession {
    transport: Arc<dyn Transport>,
    resolver: MirrorResolver,
    mirrors: MirrorList,
    base_url: OnceCell<String>,
}

impl ApiSession {
    /// Create a new session with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new session with custom configuration
    ///
    /// # Errors
    /// - `InvalidMirrorList` / `InvalidUrl` if the mirror list is unusable
    /// - `HttpError` if HTTP client initialization fails
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mirrors = MirrorList::new(&config.mirrors)?;
        let transport = Arc::new(HttpTransport::with_config(&config)?);
        Ok(Self::with_transport(transport, mirrors, config.probe_timeout()))
    }

    /// Create a session over an explicit transport
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        mirrors: MirrorList,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            resolver: MirrorResolver::new(transport.clone(), probe_timeout),
            transport,
            mirrors,
            base_url: OnceCell::new(),
        }
    }

    /// Resolve the mirror if that has not happened yet
    ///
    /// Idempotent. Callers that arrive while a resolution is in flight wait
    /// for it instead of probing again.
    pub async fn initialize(&self) -> &str {
        self.base_url
            .get_or_init(|| self.resolver.resolve(&self.mirrors))
            .await
    }

    /// The resolved base URL, if resolution already happened
    pub fn resolved_base_url(&self) -> Option<&str> {
        self.base_url.get().map(String::as_str)
    }

    pub fn is_resolved(&self) -> bool {
        self.base_url.initialized()
    }

    pub fn mirrors(&self) -> &MirrorList {
        &self.mirrors
    }

    /// Search the catalog
    ///
    /// Returns an empty list for a blank query or on any failure.
    pub async fn search_movies(&self, query: &str) -> Vec<MovieSummary> {
        collapse_items("Search", self.try_search_movies(query).await)
    }

    /// Search the catalog, keeping failures visible
    ///
    /// A blank query yields `Empty` without touching the network.
    pub async fn try_search_movies(&self, query: &str) -> FetchOutcome<Vec<MovieSummary>> {
        if query.trim().is_empty() {
            return FetchOutcome::Empty;
        }

        let base = self.initialize().await;
        self.fetch_movies(&build_search_url(base, query)).await
    }

    pub async fn popular_movies(&self) -> Vec<MovieSummary> {
        self.category(Category::Popular).await
    }

    pub async fn new_movies(&self) -> Vec<MovieSummary> {
        self.category(Category::New).await
    }

    pub async fn now_watching(&self) -> Vec<MovieSummary> {
        self.category(Category::NowWatching).await
    }

    /// Fetch a catalog listing, empty on failure
    pub async fn category(&self, category: Category) -> Vec<MovieSummary> {
        let context = format!("{} movies", category);
        collapse_items(&context, self.try_category(category).await)
    }

    pub async fn try_category(&self, category: Category) -> FetchOutcome<Vec<MovieSummary>> {
        let base = self.initialize().await;
        self.fetch_movies(&build_category_url(base, category)).await
    }

    /// Fetch the detail record behind a movie link
    ///
    /// The JSON is returned as the backend sent it, including payloads that
    /// carry an `error` field (see [`backend_error`]). `None` on failure.
    pub async fn movie_details(&self, url: &str) -> Option<Value> {
        collapse_option("Movie details", self.try_movie_details(url).await)
    }

    /// Absolute links are requested as given; relative ones against the
    /// resolved mirror.
    pub async fn try_movie_details(&self, url: &str) -> FetchOutcome<Value> {
        let url = url.trim();
        if url.is_empty() {
            return FetchOutcome::Empty;
        }

        let base = self.initialize().await;
        let target = resolve_detail_url(base, url);
        match self.transport.get_json(&target).await {
            Ok(value) => FetchOutcome::Fetched(value),
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Fetch stream metadata (translations, resolutions, direct URLs)
    ///
    /// `None` on failure, including a backend `error` payload.
    pub async fn movie_stream(&self, request: &StreamRequest) -> Option<StreamDescriptor> {
        collapse_option("Movie stream", self.try_movie_stream(request).await)
    }

    pub async fn try_movie_stream(&self, request: &StreamRequest) -> FetchOutcome<StreamDescriptor> {
        if request.url.trim().is_empty() {
            return FetchOutcome::Empty;
        }

        let base = self.initialize().await;
        let value = match self.transport.get_json(&build_stream_url(base, request)).await {
            Ok(value) => value,
            Err(e) => return FetchOutcome::Failed(e),
        };

        if let Some(message) = backend_error(&value) {
            return FetchOutcome::Failed(RezkaError::Backend(message.to_string()));
        }

        match serde_json::from_value(value) {
            Ok(descriptor) => FetchOutcome::Fetched(descriptor),
            Err(e) => FetchOutcome::Failed(RezkaError::Decode(e.to_string())),
        }
    }

    async fn fetch_movies(&self, url: &str) -> FetchOutcome<Vec<MovieSummary>> {
        let value = match self.transport.get_json(url).await {
            Ok(value) => value,
            Err(e) => return FetchOutcome::Failed(e),
        };

        match decode_movies(value) {
            Ok(movies) if movies.is_empty() => FetchOutcome::Empty,
            Ok(movies) => FetchOutcome::Fetched(movies),
            Err(e) => FetchOutcome::Failed(e),
        }
    }
}

/// Decode a catalog payload, dropping entries that lack `url` or `title`
fn decode_movies(value: Value) -> Result<Vec<MovieSummary>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(match backend_error(&other) {
                Some(message) => RezkaError::Backend(message.to_string()),
                None => RezkaError::Decode("expected a JSON array of movies".to_string()),
            });
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<MovieSummary>(item) {
            Ok(movie) => Some(movie),
            Err(e) => {
                tracing::debug!("Skipping catalog entry: {}", e);
                None
            }
        })
        .collect())
}

fn collapse_items<T>(context: &str, outcome: FetchOutcome<Vec<T>>) -> Vec<T> {
    if let Some(e) = outcome.error() {
        tracing::error!("{} error: {}", context, e);
    }
    outcome.into_items()
}

fn collapse_option<T>(context: &str, outcome: FetchOutcome<T>) -> Option<T> {
    if let Some(e) = outcome.error() {
        tracing::error!("{} error: {}", context, e);
    }
    outcome.into_option()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Canned, FakeTransport};
    use serde_json::json;

    const PRIMARY: &str = "https://m0.example";
    const SECONDARY: &str = "https://m1.example";

    fn session(transport: &Arc<FakeTransport>) -> ApiSession {
        let mirrors = MirrorList::new([PRIMARY, SECONDARY]).unwrap();
        ApiSession::with_transport(transport.clone(), mirrors, Duration::from_millis(50))
    }

    fn primary_up() -> FakeTransport {
        FakeTransport::reachable(["https://m0.example/"])
    }

    #[test]
    fn test_session_creation() {
        assert!(ApiSession::new().is_ok());
    }

    #[test]
    fn test_session_with_invalid_mirrors() {
        let config = ClientConfig::default().with_mirrors(Vec::<String>::new());
        assert!(matches!(
            ApiSession::with_config(config),
            Err(RezkaError::InvalidMirrorList(_))
        ));
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let transport = Arc::new(FakeTransport::reachable(["https://m1.example/"]));
        let session = session(&transport);
        assert!(!session.is_resolved());
        assert_eq!(session.resolved_base_url(), None);

        let first = session.initialize().await.to_string();
        let second = session.initialize().await.to_string();

        assert_eq!(first, SECONDARY);
        assert_eq!(second, SECONDARY);
        assert!(session.is_resolved());
        assert_eq!(session.resolved_base_url(), Some(SECONDARY));
        // m0 then m1, once
        assert_eq!(transport.probe_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_initialize_probes_once() {
        let transport = Arc::new(
            FakeTransport::reachable(["https://m1.example/"])
                .with_probe_delay(Duration::from_millis(20)),
        );
        let session = session(&transport);

        let (a, b, c) = tokio::join!(
            session.initialize(),
            session.initialize(),
            session.initialize()
        );

        assert_eq!((a, b, c), (SECONDARY, SECONDARY, SECONDARY));
        assert_eq!(
            transport.probed(),
            vec!["https://m0.example/", "https://m1.example/"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_resolution() {
        let transport = Arc::new(
            primary_up()
                .with_probe_delay(Duration::from_millis(20))
                .respond("https://m0.example/popular/", Canned::Json(json!([])))
                .respond("https://m0.example/new/", Canned::Json(json!([]))),
        );
        let session = session(&transport);

        tokio::join!(session.popular_movies(), session.new_movies());

        assert_eq!(transport.probe_count(), 1);
        assert_eq!(transport.requested().len(), 2);
    }

    #[tokio::test]
    async fn test_all_mirrors_down_fails_open() {
        let transport = Arc::new(
            FakeTransport::reachable(Vec::<String>::new())
                .respond("https://m0.example/watching/", Canned::Json(json!([
                    {"url": "/m/7", "title": "Heat"}
                ]))),
        );
        let session = session(&transport);

        let movies = session.now_watching().await;

        assert_eq!(session.resolved_base_url(), Some(PRIMARY));
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].title, "Heat");
    }

    #[tokio::test]
    async fn test_search_returns_exact_record() {
        let raw = json!([{"url": "/m/1", "title": "Die Hard", "year": 1988}]);
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/search?do=search&subaction=search&q=die%20hard",
            Canned::Json(raw.clone()),
        ));
        let session = session(&transport);

        let movies = session.search_movies("die hard").await;

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].url, "/m/1");
        assert_eq!(movies[0].title, "Die Hard");
        assert_eq!(serde_json::to_value(&movies).unwrap(), raw);
    }

    #[tokio::test]
    async fn test_search_sends_query_as_given() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/search?do=search&subaction=search&q=%20die%20hard%20",
            Canned::Json(json!([{"url": "/m/1", "title": "Die Hard"}])),
        ));
        let session = session(&transport);

        let movies = session.search_movies(" die hard ").await;

        assert_eq!(movies.len(), 1);
        assert_eq!(
            transport.requested(),
            vec!["https://m0.example/search?do=search&subaction=search&q=%20die%20hard%20"]
        );
    }

    #[tokio::test]
    async fn test_search_blank_query_skips_network() {
        let transport = Arc::new(primary_up());
        let session = session(&transport);

        assert!(session.try_search_movies("   ").await.is_empty());
        assert!(session.search_movies("").await.is_empty());
        assert_eq!(transport.probe_count(), 0);
        assert!(transport.requested().is_empty());
    }

    #[tokio::test]
    async fn test_category_failures_collapse_to_empty() {
        let transport = Arc::new(
            primary_up()
                .respond("https://m0.example/popular/", Canned::Status(500))
                .respond("https://m0.example/new/", Canned::Malformed),
        );
        let session = session(&transport);

        // no canned response for /watching/: transport reports NotFound
        assert!(session.popular_movies().await.is_empty());
        assert!(session.new_movies().await.is_empty());
        assert!(session.now_watching().await.is_empty());

        let outcome = session.try_category(Category::Popular).await;
        assert!(matches!(
            outcome.error(),
            Some(RezkaError::Status { status: 500, .. })
        ));
        let outcome = session.try_category(Category::New).await;
        assert!(matches!(outcome.error(), Some(RezkaError::JsonError(_))));
        let outcome = session.try_category(Category::NowWatching).await;
        assert!(matches!(outcome.error(), Some(RezkaError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_category_empty_listing_is_empty_not_failed() {
        let transport = Arc::new(
            primary_up().respond("https://m0.example/new/", Canned::Json(json!([]))),
        );
        let session = session(&transport);

        let outcome = session.try_category(Category::New).await;
        assert!(outcome.is_empty());
    }

    #[tokio::test]
    async fn test_category_error_payload_is_backend_failure() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/popular/",
            Canned::Json(json!({"error": "upstream down", "status": "error"})),
        ));
        let session = session(&transport);

        let outcome = session.try_category(Category::Popular).await;
        assert!(matches!(
            outcome.error(),
            Some(RezkaError::Backend(m)) if m == "upstream down"
        ));
    }

    #[tokio::test]
    async fn test_category_drops_incomplete_entries() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/popular/",
            Canned::Json(json!([
                {"url": "/m/1", "title": "Alien", "rating": "8.5"},
                {"url": "/m/2"},
                "garbage",
                {"url": "/m/3", "title": "Aliens", "quality": "HD"}
            ])),
        ));
        let session = session(&transport);

        let titles: Vec<String> = session
            .popular_movies()
            .await
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Alien", "Aliens"]);
    }

    #[tokio::test]
    async fn test_movie_details_passes_error_payload_through() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/m/1",
            Canned::Json(json!({"error": "not found"})),
        ));
        let session = session(&transport);

        let details = session.movie_details("/m/1").await;
        assert_eq!(details, Some(json!({"error": "not found"})));
    }

    #[tokio::test]
    async fn test_movie_details_absolute_link_untouched() {
        let link = "https://elsewhere.example/films/1.html";
        let transport = Arc::new(
            primary_up().respond(link, Canned::Json(json!({"title": "Alien"}))),
        );
        let session = session(&transport);

        let details = session.movie_details(link).await;

        assert_eq!(details, Some(json!({"title": "Alien"})));
        assert!(session.is_resolved());
        assert_eq!(transport.requested(), vec![link]);
    }

    #[tokio::test]
    async fn test_movie_details_failures_are_none() {
        let transport = Arc::new(
            primary_up()
                .respond("https://m0.example/m/500", Canned::Status(500))
                .respond("https://m0.example/m/bad", Canned::Malformed),
        );
        let session = session(&transport);

        assert_eq!(session.movie_details("/m/500").await, None);
        assert_eq!(session.movie_details("/m/bad").await, None);
        assert_eq!(session.movie_details("/m/missing").await, None);
        assert!(session.try_movie_details("/m/500").await.is_failed());
        assert!(session.try_movie_details("  ").await.is_empty());
    }

    #[tokio::test]
    async fn test_movie_stream_decodes_descriptor() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/movie/stream?url=%2Ffilms%2F1.html&quality=720p",
            Canned::Json(json!({
                "stream": {"720p": "https://cdn.example/720.mp4", "480p": "https://cdn.example/480.mp4"},
                "translations": {"Дубляж": "56"},
                "available_resolutions": ["480p", "720p"],
                "current_translation": "Дубляж",
                "current_resolution": "720p",
                "url": "/films/1.html",
                "is_series": false
            })),
        ));
        let session = session(&transport);

        let descriptor = session
            .movie_stream(&StreamRequest::new("/films/1.html").quality("720p"))
            .await
            .expect("descriptor");

        assert_eq!(descriptor.current_stream_url(), Some("https://cdn.example/720.mp4"));
        assert_eq!(descriptor.sorted_resolutions(), vec!["720p", "480p"]);
        assert_eq!(descriptor.current_translation_id(), Some("56".to_string()));
    }

    #[tokio::test]
    async fn test_movie_stream_error_payload_is_none() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/movie/stream?url=%2Ffilms%2F1.html",
            Canned::Json(json!({"error": "Не удалось получить список переводов"})),
        ));
        let session = session(&transport);
        let request = StreamRequest::new("/films/1.html");

        assert_eq!(session.movie_stream(&request).await, None);
        assert!(matches!(
            session.try_movie_stream(&request).await.error(),
            Some(RezkaError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_movie_stream_shape_mismatch_is_decode_failure() {
        let transport = Arc::new(primary_up().respond(
            "https://m0.example/movie/stream?url=%2Ffilms%2F1.html",
            Canned::Json(json!({"stream": "nope"})),
        ));
        let session = session(&transport);

        let outcome = session.try_movie_stream(&StreamRequest::new("/films/1.html")).await;
        assert!(matches!(outcome.error(), Some(RezkaError::Decode(_))));
    }

    #[tokio::test]
    async fn test_movie_stream_blank_url_is_empty() {
        let transport = Arc::new(primary_up());
        let session = session(&transport);

        assert!(session.try_movie_stream(&StreamRequest::new("")).await.is_empty());
        assert_eq!(transport.probe_count(), 0);
    }
}

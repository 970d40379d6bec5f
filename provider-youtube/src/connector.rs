//! YouTube Data API v3 connector
//!
//! Implements the `PlaylistApi` trait over the `HttpClient` seam. Read
//! calls that accept API keys (`videos.list`) rotate through the session's
//! key pool on quota exhaustion and re-issue the same call; everything else
//! runs on the authenticated session and consults the session tripwire
//! before touching the network.

use async_trait::async_trait;
use bridge_traits::error::{ApiError, ApiResult};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::playlist::{PlaylistApi, PlaylistItemRecord};
use core_quota::{classify_response, error_message, execute_with_retry, Disposition, QuotaSession};
use core_quota::{ApiKeyPool, RetryPolicy};
use core_runtime::config::CoreConfig;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::types::{
    InsertedPlaylistItem, PlaylistItemInsertRequest, PlaylistItemsListResponse,
    PlaylistListResponse, VideoListResponse,
};

/// YouTube Data API base URL
const DATA_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Which credential a call runs on; decides which quota signal a 403 means.
#[derive(Debug, Clone, Copy)]
enum AuthKind {
    Session,
    Key,
}

/// YouTube Data API v3 connector
///
/// # Example
///
/// ```ignore
/// use provider_youtube::YouTubeConnector;
/// use bridge_traits::playlist::PlaylistApi;
///
/// let connector = YouTubeConnector::new(http_client, session, access_token);
/// connector.verify_playlist("PLxxxx").await?;
/// ```
pub struct YouTubeConnector {
    http: Arc<dyn HttpClient>,
    session: Arc<QuotaSession>,

    /// OAuth 2.0 access token for the authenticated session
    access_token: String,

    retry: RetryPolicy,
    request_timeout: Duration,
    mutation_delay: Duration,
    batch_size: usize,
}

impl YouTubeConnector {
    pub fn new(
        http: Arc<dyn HttpClient>,
        session: Arc<QuotaSession>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            session,
            access_token: access_token.into(),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            mutation_delay: Duration::from_secs(1),
            batch_size: 50,
        }
    }

    /// Build a connector wired to the engine configuration.
    pub fn from_config(
        http: Arc<dyn HttpClient>,
        session: Arc<QuotaSession>,
        access_token: impl Into<String>,
        config: &CoreConfig,
    ) -> Self {
        Self::new(http, session, access_token)
            .with_retry(RetryPolicy {
                max_attempts: config.max_retries,
                backoff_base: config.backoff_base,
            })
            .with_request_timeout(config.request_timeout)
            .with_mutation_delay(config.mutation_delay)
            .with_batch_size(config.batch_size)
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_mutation_delay(mut self, delay: Duration) -> Self {
        self.mutation_delay = delay;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, 50);
        self
    }

    fn session_get(&self, url: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, url)
            .bearer_token(&self.access_token)
            .header("Accept", "application/json")
            .timeout(self.request_timeout)
    }

    fn keyed_get(&self, url: &str, key: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Get,
            format!("{}&key={}", url, urlencoding::encode(key)),
        )
        .header("Accept", "application/json")
        .timeout(self.request_timeout)
    }

    /// Execute one request and translate the response into the call
    /// taxonomy. A quota signal trips the session tripwire when the call
    /// ran on session credentials; keyed quota is left to the rotation
    /// loop.
    async fn dispatch(&self, request: HttpRequest, auth: AuthKind) -> ApiResult<HttpResponse> {
        let response = self.http.execute(request).await?;

        match classify_response(response.status, &response.body) {
            Disposition::Success => Ok(response),
            Disposition::Transient => Err(ApiError::Transient {
                status: response.status,
                message: error_message(&response.body),
            }),
            Disposition::QuotaExhausted => match auth {
                AuthKind::Session => {
                    self.session.trip_session();
                    Err(ApiError::SessionQuotaExhausted)
                }
                AuthKind::Key => Err(ApiError::KeyQuotaExhausted),
            },
            Disposition::AuthInvalid => Err(ApiError::AuthInvalid(error_message(&response.body))),
            Disposition::Failed => Err(ApiError::Api {
                status: response.status,
                message: error_message(&response.body),
            }),
        }
    }

    /// Retried call on the authenticated session, tripwire first.
    async fn session_call(
        &self,
        name: &str,
        build: impl Fn() -> ApiResult<HttpRequest>,
    ) -> ApiResult<HttpResponse> {
        self.session.check_session()?;

        execute_with_retry(&self.retry, name, || {
            let request = build();
            async move { self.dispatch(request?, AuthKind::Session).await }
        })
        .await
    }

    /// Retried keyed call: quota exhaustion on the active key rotates and
    /// re-issues the same call; running the pool dry trips the key
    /// tripwire and surfaces the terminal signal.
    async fn keyed_call(
        &self,
        name: &str,
        pool: &ApiKeyPool,
        build: impl Fn(&str) -> HttpRequest,
    ) -> ApiResult<HttpResponse> {
        loop {
            self.session.check_keys()?;
            let key = pool.current_key()?;

            let result = execute_with_retry(&self.retry, name, || {
                let request = build(&key);
                async move { self.dispatch(request, AuthKind::Key).await }
            })
            .await;

            match result {
                Err(ApiError::KeyQuotaExhausted) => {
                    warn!(operation = name, "Active API key out of quota; rotating");
                    if pool.rotate().is_err() {
                        self.session.trip_keys();
                        return Err(ApiError::KeyQuotaExhausted);
                    }
                }
                other => return other,
            }
        }
    }

    async fn politeness_pause(&self) {
        if !self.mutation_delay.is_zero() {
            tokio::time::sleep(self.mutation_delay).await;
        }
    }

    fn parse<T: serde::de::DeserializeOwned>(
        response: &HttpResponse,
        what: &str,
    ) -> ApiResult<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| ApiError::Parse(format!("{}: {}", what, e)))
    }
}

#[async_trait]
impl PlaylistApi for YouTubeConnector {
    #[instrument(skip(self), fields(playlist_id = %playlist_id))]
    async fn verify_playlist(&self, playlist_id: &str) -> ApiResult<()> {
        let url = format!(
            "{}/playlists?part=snippet&maxResults=1&id={}",
            DATA_API_BASE,
            urlencoding::encode(playlist_id)
        );

        let response = self
            .session_call("playlists.list", || Ok(self.session_get(&url)))
            .await?;

        let parsed: PlaylistListResponse = Self::parse(&response, "playlists.list response")?;
        if parsed.items.is_empty() {
            return Err(ApiError::Api {
                status: 404,
                message: format!("playlist {} not found or not accessible", playlist_id),
            });
        }

        debug!("Playlist access verified");
        Ok(())
    }

    #[instrument(skip(self, page_token), fields(playlist_id = %playlist_id))]
    async fn list_items_page(
        &self,
        playlist_id: &str,
        page_token: Option<String>,
    ) -> ApiResult<(Vec<PlaylistItemRecord>, Option<String>)> {
        let mut url = format!(
            "{}/playlistItems?part=contentDetails,snippet&maxResults={}&playlistId={}",
            DATA_API_BASE,
            self.batch_size,
            urlencoding::encode(playlist_id)
        );
        if let Some(token) = &page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        let response = self
            .session_call("playlistItems.list", || Ok(self.session_get(&url)))
            .await?;

        let parsed: PlaylistItemsListResponse =
            Self::parse(&response, "playlistItems.list response")?;

        let records = parsed
            .items
            .into_iter()
            .filter_map(|item| {
                let playlist_item_id = item.id?;
                let video_id = item.content_details?.video_id?;
                Some(PlaylistItemRecord {
                    video_id,
                    playlist_item_id,
                })
            })
            .collect();

        Ok((records, parsed.next_page_token))
    }

    #[instrument(skip(self, video_ids), fields(count = video_ids.len()))]
    async fn video_definitions(&self, video_ids: &[String]) -> ApiResult<HashMap<String, String>> {
        let mut seen = HashSet::new();
        let ids: Vec<String> = video_ids
            .iter()
            .filter(|v| !v.is_empty() && seen.insert(v.as_str()))
            .cloned()
            .collect();

        let mut definitions = HashMap::new();

        for chunk in ids.chunks(self.batch_size) {
            let url = format!(
                "{}/videos?part=contentDetails&maxResults={}&id={}",
                DATA_API_BASE,
                self.batch_size,
                urlencoding::encode(&chunk.join(","))
            );

            let response = match self.session.key_pool() {
                Some(pool) => {
                    let pool = Arc::clone(pool);
                    self.keyed_call("videos.list", &pool, |key| self.keyed_get(&url, key))
                        .await?
                }
                None => {
                    self.session_call("videos.list", || Ok(self.session_get(&url)))
                        .await?
                }
            };

            let parsed: VideoListResponse = Self::parse(&response, "videos.list response")?;
            for item in parsed.items {
                if let Some(definition) = item.content_details.and_then(|cd| cd.definition) {
                    definitions.insert(item.id, definition);
                }
            }
        }

        info!(resolved = definitions.len(), "Resolved video definitions");
        Ok(definitions)
    }

    #[instrument(skip(self), fields(playlist_id = %playlist_id, video_id = %video_id))]
    async fn insert_item(&self, playlist_id: &str, video_id: &str) -> ApiResult<String> {
        let url = format!("{}/playlistItems?part=snippet", DATA_API_BASE);
        let body = PlaylistItemInsertRequest::new(playlist_id, video_id);

        let response = self
            .session_call("playlistItems.insert", || {
                HttpRequest::new(HttpMethod::Post, url.clone())
                    .bearer_token(&self.access_token)
                    .header("Accept", "application/json")
                    .timeout(self.request_timeout)
                    .json(&body)
                    .map_err(ApiError::from)
            })
            .await?;

        let inserted: InsertedPlaylistItem =
            Self::parse(&response, "playlistItems.insert response")?;

        self.politeness_pause().await;
        Ok(inserted.id)
    }

    #[instrument(skip(self), fields(playlist_item_id = %playlist_item_id))]
    async fn delete_item(&self, playlist_item_id: &str) -> ApiResult<()> {
        let url = format!(
            "{}/playlistItems?id={}",
            DATA_API_BASE,
            urlencoding::encode(playlist_item_id)
        );

        self.session_call("playlistItems.delete", || {
            Ok(HttpRequest::new(HttpMethod::Delete, url.clone())
                .bearer_token(&self.access_token)
                .timeout(self.request_timeout))
        })
        .await?;

        self.politeness_pause().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use mockall::mock;
    use mockall::predicate::function;

    mock! {
        Http {}

        #[async_trait]
        impl HttpClient for Http {
            async fn execute(
                &self,
                request: HttpRequest,
            ) -> bridge_traits::error::Result<HttpResponse>;
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.as_bytes().to_vec()),
        }
    }

    const QUOTA_BODY: &str =
        r#"{"error":{"errors":[{"reason":"quotaExceeded"}],"message":"quota"}}"#;

    fn connector(http: MockHttp, session: Arc<QuotaSession>) -> YouTubeConnector {
        YouTubeConnector::new(Arc::new(http), session, "test-token")
            .with_mutation_delay(Duration::ZERO)
            .with_retry(RetryPolicy {
                max_attempts: 3,
                backoff_base: Duration::from_millis(1),
            })
    }

    #[tokio::test]
    async fn test_list_items_page_parses_records() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| {
                req.url.contains("playlistItems")
                    && req.url.contains("playlistId=PL1")
                    && !req.url.contains("pageToken")
                    && req.headers.get("Authorization") == Some(&"Bearer test-token".to_string())
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{
                        "items": [
                            {"id": "pi-1", "contentDetails": {"videoId": "v1"}},
                            {"id": "pi-2", "contentDetails": {}}
                        ],
                        "nextPageToken": "tok-2"
                    }"#,
                ))
            });

        let connector = connector(http, Arc::new(QuotaSession::new()));
        let (records, next) = connector.list_items_page("PL1", None).await.unwrap();

        // The record without a video id is dropped
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video_id, "v1");
        assert_eq!(records[0].playlist_item_id, "pi-1");
        assert_eq!(next.as_deref(), Some("tok-2"));
    }

    #[tokio::test]
    async fn test_list_items_page_sends_page_token() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .with(function(|req: &HttpRequest| {
                req.url.contains("pageToken=tok-2")
            }))
            .times(1)
            .returning(|_| Ok(response(200, r#"{"items": []}"#)));

        let connector = connector(http, Arc::new(QuotaSession::new()));
        let (records, next) = connector
            .list_items_page("PL1", Some("tok-2".into()))
            .await
            .unwrap();

        assert!(records.is_empty());
        assert!(next.is_none());
    }

    #[tokio::test]
    async fn test_verify_playlist_missing_is_an_error() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, r#"{"items": []}"#)));

        let connector = connector(http, Arc::new(QuotaSession::new()));
        let err = connector.verify_playlist("PL-gone").await.unwrap_err();

        assert!(matches!(err, ApiError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_insert_builds_body_and_returns_item_id() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| {
                let body = req.body.as_ref().map(|b| b.to_vec()).unwrap_or_default();
                let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
                matches!(req.method, HttpMethod::Post)
                    && body["snippet"]["playlistId"] == "PL1"
                    && body["snippet"]["resourceId"]["videoId"] == "v1"
            })
            .times(1)
            .returning(|_| Ok(response(200, r#"{"id": "pi-new"}"#)));

        let connector = connector(http, Arc::new(QuotaSession::new()));
        let item_id = connector.insert_item("PL1", "v1").await.unwrap();
        assert_eq!(item_id, "pi-new");
    }

    #[tokio::test]
    async fn test_delete_accepts_no_content() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| {
                matches!(req.method, HttpMethod::Delete) && req.url.contains("id=pi-1")
            })
            .times(1)
            .returning(|_| Ok(response(204, "")));

        let connector = connector(http, Arc::new(QuotaSession::new()));
        connector.delete_item("pi-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_transient_error_is_retried_then_succeeds() {
        let mut http = MockHttp::new();
        let mut seq = mockall::Sequence::new();

        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(503, "unavailable")));
        http.expect_execute()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(200, r#"{"items": [{"id": "PL1"}]}"#)));

        let connector = connector(http, Arc::new(QuotaSession::new()));
        connector.verify_playlist("PL1").await.unwrap();
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(401, r#"{"error":{"message":"bad token"}}"#)));

        let connector = connector(http, Arc::new(QuotaSession::new()));
        let err = connector.verify_playlist("PL1").await.unwrap_err();
        assert!(matches!(err, ApiError::AuthInvalid(_)));
    }

    #[tokio::test]
    async fn test_session_quota_trips_tripwire_and_fails_fast() {
        let mut http = MockHttp::new();
        // Exactly one network attempt; the second call must not reach HTTP
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(403, QUOTA_BODY)));

        let session = Arc::new(QuotaSession::new());
        let connector = connector(http, session.clone());

        let err = connector.insert_item("PL1", "v1").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionQuotaExhausted));
        assert!(session.session_tripped());

        let err = connector.insert_item("PL1", "v2").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionQuotaExhausted));
    }

    #[tokio::test]
    async fn test_key_rotation_retries_same_call_transparently() {
        let mut http = MockHttp::new();
        let mut seq = mockall::Sequence::new();

        // First key hits its quota wall
        http.expect_execute()
            .withf(|req| req.url.contains("key=key-a"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(response(403, QUOTA_BODY)));
        // The rotated key serves the same call; caller sees only success
        http.expect_execute()
            .withf(|req| req.url.contains("key=key-b"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"items": [{"id": "v1", "contentDetails": {"definition": "hd"}}]}"#,
                ))
            });

        let pool = Arc::new(ApiKeyPool::new(vec!["key-a".into(), "key-b".into()]));
        let session = Arc::new(QuotaSession::with_key_pool(pool));
        let connector = connector(http, session.clone());

        let definitions = connector
            .video_definitions(&["v1".to_string()])
            .await
            .unwrap();

        assert_eq!(definitions.get("v1").map(String::as_str), Some("hd"));
        assert!(!session.keys_tripped());
    }

    #[tokio::test]
    async fn test_exhausting_all_keys_trips_key_tripwire() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(403, QUOTA_BODY)));

        let pool = Arc::new(ApiKeyPool::new(vec!["key-only".into()]));
        let session = Arc::new(QuotaSession::with_key_pool(pool));
        let connector = connector(http, session.clone());

        let err = connector
            .video_definitions(&["v1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::KeyQuotaExhausted));
        assert!(session.keys_tripped());

        // Fails fast now: the single expected HTTP call is already spent
        let err = connector
            .video_definitions(&["v2".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::KeyQuotaExhausted));
    }

    #[tokio::test]
    async fn test_video_definitions_dedupes_ids() {
        let mut http = MockHttp::new();
        http.expect_execute()
            .withf(|req| {
                // One call, one id: the duplicate collapsed
                req.url.contains("id=v1") && !req.url.contains("v1%2Cv1")
            })
            .times(1)
            .returning(|_| {
                Ok(response(
                    200,
                    r#"{"items": [{"id": "v1", "contentDetails": {"definition": "sd"}}]}"#,
                ))
            });

        let connector = connector(http, Arc::new(QuotaSession::new()));
        let definitions = connector
            .video_definitions(&["v1".to_string(), "v1".to_string()])
            .await
            .unwrap();

        assert_eq!(definitions.len(), 1);
    }

    #[tokio::test]
    async fn test_from_config_wires_engine_settings() {
        let config = CoreConfig::builder()
            .cache_dir("/cache")
            .max_retries(5)
            .mutation_delay(Duration::ZERO)
            .batch_size(10)
            .build()
            .unwrap();

        let mut http = MockHttp::new();
        // 5 configured attempts against a permanently transient endpoint
        http.expect_execute()
            .times(5)
            .returning(|_| Ok(response(503, "unavailable")));

        let connector = YouTubeConnector::from_config(
            Arc::new(http),
            Arc::new(QuotaSession::new()),
            "test-token",
            &config,
        )
        .with_retry(RetryPolicy {
            max_attempts: 5,
            backoff_base: Duration::from_millis(1),
        });

        let err = connector.verify_playlist("PL1").await.unwrap_err();
        assert!(matches!(err, ApiError::Transient { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_video_definitions_empty_input_is_free() {
        let http = MockHttp::new(); // no expectations: no calls allowed
        let connector = connector(http, Arc::new(QuotaSession::new()));
        let definitions = connector.video_definitions(&[]).await.unwrap();
        assert!(definitions.is_empty());
    }
}

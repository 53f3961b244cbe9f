//! Authenticated HTTP client for the Dreamhouse API
//!
//! Wraps the transport with bearer-token injection and coordinated token
//! refresh: any number of concurrent requests that hit an expired access
//! token produce exactly one refresh call, with the rest queued and replayed
//! in arrival order once it settles.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;

use crate::auth::TokenStore;

use super::error::ApiError;

/// Base URL for all Dreamhouse API endpoints.
pub const API_BASE_URL: &str = "https://api.dreamhouse05.com/api";

/// Token refresh endpoint. Calls to it go straight to the transport, so a
/// 401 on the refresh call itself can never re-enter the refresh protocol.
const REFRESH_PATH: &str = "/token/refresh/";

/// HTTP request timeout in seconds. Expiry surfaces as a network error,
/// not an authentication error.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Request as handed to the transport.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: reqwest::Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Raw response: status code plus undecoded body text.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Transport seam between the client and the network. Production uses
/// reqwest; tests inject scripted responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send one request. `Err` means no response was received at all.
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError>;
}

struct ReqwestTransport {
    http: reqwest::Client,
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = self.http.request(req.method, &req.url);
        if let Some(ref token) = req.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

/// Whether a token refresh is currently in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshState {
    Idle,
    Refreshing,
}

/// Refresh coordination state. Guarded by a sync mutex held only across the
/// check-and-set itself, never across an await.
struct AuthState {
    refresh: RefreshState,
    /// Requests parked while a refresh is in flight, in arrival order.
    /// Each waiter receives the new access token, or `None` when the
    /// refresh failed terminally.
    waiters: VecDeque<oneshot::Sender<Option<String>>>,
}

/// Authenticated API client.
/// Clone is cheap; clones share the transport, token store and refresh state.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    store: Arc<Mutex<dyn TokenStore + Send>>,
    state: Arc<Mutex<AuthState>>,
    on_expired: Arc<Mutex<Vec<Box<dyn Fn() + Send + Sync>>>>,
}

impl ApiClient {
    /// Build a client against the production API with the given token store.
    pub fn new(store: impl TokenStore + Send + 'static) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self::with_transport(
            API_BASE_URL,
            Arc::new(ReqwestTransport { http }),
            store,
        ))
    }

    /// Build a client with an explicit transport and base URL.
    pub fn with_transport(
        base_url: &str,
        transport: Arc<dyn Transport>,
        store: impl TokenStore + Send + 'static,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            store: Arc::new(Mutex::new(store)),
            state: Arc::new(Mutex::new(AuthState {
                refresh: RefreshState::Idle,
                waiters: VecDeque::new(),
            })),
            on_expired: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a callback fired when the client transitions to logged-out.
    /// Fires at most once per logout, however many requests failed together.
    pub fn on_session_expired<F: Fn() + Send + Sync + 'static>(&self, callback: F) {
        self.on_expired.lock().unwrap().push(Box::new(callback));
    }

    /// Store a freshly issued credential pair (login, registration).
    pub fn store_credentials(&self, access: &str, refresh: &str) {
        let mut store = self.store.lock().unwrap();
        store.set_access_token(access.to_string());
        store.set_refresh_token(refresh.to_string());
    }

    /// Clear credentials and notify subscribers. Idempotent: calling this
    /// when already logged out does nothing.
    pub fn logout(&self) {
        let had_credentials = {
            let mut store = self.store.lock().unwrap();
            let had = store.has_credentials();
            store.clear_tokens();
            had
        };
        if !had_credentials {
            return;
        }
        tracing::info!("Credentials cleared, session expired");
        for callback in self.on_expired.lock().unwrap().iter() {
            callback();
        }
    }

    /// Issue an authenticated request.
    ///
    /// On a 401/403 the refresh protocol runs and the request is retried
    /// once with the new token. Every other status is returned as-is,
    /// application error bodies included: this layer does not interpret
    /// business error codes.
    pub async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<HttpResponse, ApiError> {
        let token = self.access_token();
        let resp = self.send(method.clone(), path, body, token).await?;
        if !resp.is_unauthorized() {
            return Ok(resp);
        }
        if path.starts_with(REFRESH_PATH) {
            // Never refresh the refresh call.
            self.logout();
            return Err(ApiError::SessionExpired);
        }
        let fresh = self.recover_token().await?;
        let retried = self.send(method, path, body, Some(fresh)).await?;
        if retried.is_unauthorized() {
            // Already retried once: fail fast instead of looping.
            self.logout();
            return Err(ApiError::SessionExpired);
        }
        Ok(retried)
    }

    /// GET returning the decoded JSON body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode_typed(self.get_value(path).await?)
    }

    /// GET returning the raw JSON value. Empty bodies normalize to `{}`.
    pub async fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        let resp = self.request(reqwest::Method::GET, path, None).await?;
        decode(resp)
    }

    /// POST returning the decoded JSON body.
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T, ApiError> {
        decode_typed(self.post_value(path, body).await?)
    }

    /// POST returning the raw JSON value.
    pub async fn post_value(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let resp = self
            .request(reqwest::Method::POST, path, Some(body))
            .await?;
        decode(resp)
    }

    /// DELETE; the (usually empty) body normalizes to `{}`.
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let resp = self.request(reqwest::Method::DELETE, path, None).await?;
        decode(resp)
    }

    fn access_token(&self) -> Option<String> {
        self.store.lock().unwrap().get_access_token()
    }

    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&Value>,
        bearer: Option<String>,
    ) -> Result<HttpResponse, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);
        self.transport
            .send(HttpRequest {
                method,
                url,
                bearer,
                body: body.cloned(),
            })
            .await
    }

    /// Resolve a 401/403 into a fresh access token, coordinating so that
    /// any number of concurrent callers produce exactly one refresh call.
    async fn recover_token(&self) -> Result<String, ApiError> {
        // Decide under the lock, without awaiting: either this task owns
        // the refresh, or it queues behind the one already in flight.
        let waiter = {
            let mut state = self.state.lock().unwrap();
            match state.refresh {
                RefreshState::Refreshing => {
                    let (tx, rx) = oneshot::channel();
                    state.waiters.push_back(tx);
                    Some(rx)
                }
                RefreshState::Idle => {
                    state.refresh = RefreshState::Refreshing;
                    None
                }
            }
        };

        if let Some(rx) = waiter {
            return match rx.await {
                Ok(Some(token)) => Ok(token),
                // Refresh failed; the refreshing task already logged out.
                _ => Err(ApiError::SessionExpired),
            };
        }

        match self.refresh_access_token().await {
            Ok(token) => {
                self.settle(Some(token.clone()));
                Ok(token)
            }
            Err(e) => {
                tracing::warn!("Token refresh failed: {}", e);
                self.settle(None);
                self.logout();
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Exchange the stored refresh token for a new access token. Goes
    /// directly to the transport: the refresh call must not be intercepted.
    async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let refresh = self
            .store
            .lock()
            .unwrap()
            .get_refresh_token()
            .ok_or(ApiError::SessionExpired)?;

        tracing::debug!("Refreshing access token");
        let resp = self
            .transport
            .send(HttpRequest {
                method: reqwest::Method::POST,
                url: format!("{}{}", self.base_url, REFRESH_PATH),
                bearer: None,
                body: Some(json!({ "refresh": refresh })),
            })
            .await?;
        if !resp.is_success() {
            return Err(ApiError::from_status(resp.status, &resp.body));
        }

        let body = parse_body(&resp.body)?;
        let access = body
            .get("access")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ApiError::InvalidResponse("refresh response missing access token".into())
            })?
            .to_string();

        let mut store = self.store.lock().unwrap();
        store.set_access_token(access.clone());
        // Server may rotate the refresh token; keep the old one otherwise.
        if let Some(rotated) = body.get("refresh").and_then(Value::as_str) {
            store.set_refresh_token(rotated.to_string());
        }
        Ok(access)
    }

    /// Settle the in-flight refresh: flip back to idle and complete every
    /// queued waiter in enqueue order.
    fn settle(&self, token: Option<String>) {
        let waiters = {
            let mut state = self.state.lock().unwrap();
            state.refresh = RefreshState::Idle;
            std::mem::take(&mut state.waiters)
        };
        for tx in waiters {
            // A waiter whose caller went away is fine to drop.
            let _ = tx.send(token.clone());
        }
    }

    #[cfg(test)]
    fn refresh_state(&self) -> RefreshState {
        self.state.lock().unwrap().refresh
    }

    #[cfg(test)]
    fn waiter_count(&self) -> usize {
        self.state.lock().unwrap().waiters.len()
    }

    #[cfg(test)]
    fn stored_tokens(&self) -> (Option<String>, Option<String>) {
        let store = self.store.lock().unwrap();
        (store.get_access_token(), store.get_refresh_token())
    }
}

/// Check the status and decode the body of a settled response.
fn decode(resp: HttpResponse) -> Result<Value, ApiError> {
    if !resp.is_success() {
        return Err(ApiError::from_status(resp.status, &resp.body));
    }
    parse_body(&resp.body)
}

fn decode_typed<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Decode a response body, normalizing "no content" to an empty object so
/// callers never have to special-case it.
fn parse_body(body: &str) -> Result<Value, ApiError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(trimmed).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const BASE: &str = "http://api.test";
    const FRESH: &str = "new123";

    #[derive(Default)]
    struct MemStore {
        access: Option<String>,
        refresh: Option<String>,
    }

    impl MemStore {
        fn with_tokens(access: &str, refresh: &str) -> Self {
            Self {
                access: Some(access.to_string()),
                refresh: Some(refresh.to_string()),
            }
        }
    }

    impl TokenStore for MemStore {
        fn get_access_token(&self) -> Option<String> {
            self.access.clone()
        }
        fn set_access_token(&mut self, token: String) {
            self.access = Some(token);
        }
        fn get_refresh_token(&self) -> Option<String> {
            self.refresh.clone()
        }
        fn set_refresh_token(&mut self, token: String) {
            self.refresh = Some(token);
        }
        fn clear_tokens(&mut self) {
            self.access = None;
            self.refresh = None;
        }
    }

    /// Scripted transport: API paths answer 200 when the bearer matches
    /// `valid` and 401 otherwise; the refresh endpoint serves a canned
    /// response, optionally held back behind a gate.
    struct MockTransport {
        valid: Option<String>,
        refresh_status: u16,
        refresh_body: String,
        refresh_gate: Option<Arc<Notify>>,
        fail_network: bool,
        empty_success_body: bool,
        calls: Mutex<Vec<String>>,
        refresh_calls: AtomicUsize,
    }

    impl MockTransport {
        fn new(valid: &str) -> Self {
            Self {
                valid: Some(valid.to_string()),
                refresh_status: 200,
                refresh_body: format!(r#"{{"access": "{FRESH}"}}"#),
                refresh_gate: None,
                fail_network: false,
                empty_success_body: false,
                calls: Mutex::new(Vec::new()),
                refresh_calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn refresh_calls(&self) -> usize {
            self.refresh_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
            let path = req.url.trim_start_matches(BASE).to_string();
            let bearer = req.bearer.as_deref().unwrap_or("-").to_string();
            self.calls
                .lock()
                .unwrap()
                .push(format!("{} {} {}", req.method, path, bearer));

            if path == REFRESH_PATH {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                if let Some(ref gate) = self.refresh_gate {
                    gate.notified().await;
                }
                return Ok(HttpResponse {
                    status: self.refresh_status,
                    body: self.refresh_body.clone(),
                });
            }

            if self.fail_network {
                return Err(ApiError::Network("connection refused".into()));
            }

            if self.valid.as_deref() == req.bearer.as_deref() {
                let body = if self.empty_success_body {
                    String::new()
                } else {
                    format!(r#"{{"path": "{path}"}}"#)
                };
                Ok(HttpResponse { status: 200, body })
            } else {
                Ok(HttpResponse {
                    status: 401,
                    body: r#"{"detail": "Token expired"}"#.to_string(),
                })
            }
        }
    }

    fn client(transport: &Arc<MockTransport>, store: MemStore) -> ApiClient {
        ApiClient::with_transport(BASE, Arc::clone(transport) as Arc<dyn Transport>, store)
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..1000 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn test_request_passes_through_success() {
        let transport = Arc::new(MockTransport::new("tok"));
        let client = client(&transport, MemStore::with_tokens("tok", "r1"));

        let value = client.get_value("/cards/").await.unwrap();
        assert_eq!(value["path"], "/cards/");
        assert_eq!(transport.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_refreshes_once_and_retries() {
        let transport = Arc::new(MockTransport::new(FRESH));
        let client = client(&transport, MemStore::with_tokens("stale", "r1"));

        let value = client.get_value("/cards/1/").await.unwrap();
        assert_eq!(value["path"], "/cards/1/");
        assert_eq!(transport.refresh_calls(), 1);
        // New access token stored, refresh token untouched.
        let (access, refresh) = client.stored_tokens();
        assert_eq!(access.as_deref(), Some(FRESH));
        assert_eq!(refresh.as_deref(), Some("r1"));
        assert_eq!(client.refresh_state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_a_single_refresh() {
        let gate = Arc::new(Notify::new());
        let mut transport = MockTransport::new(FRESH);
        transport.refresh_gate = Some(Arc::clone(&gate));
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("stale", "r1"));

        let paths = ["/cards/", "/users/me/", "/users/referrals/"];
        let handles: Vec<_> = paths
            .iter()
            .map(|path| {
                let client = client.clone();
                let path = path.to_string();
                tokio::spawn(async move { client.get_value(&path).await })
            })
            .collect();

        // One task refreshes, the other two queue behind it.
        wait_until(|| client.waiter_count() == 2).await;
        gate.notify_one();

        for handle in futures::future::join_all(handles).await {
            handle.unwrap().unwrap();
        }
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(client.refresh_state(), RefreshState::Idle);
        assert_eq!(client.waiter_count(), 0);

        // Every retried request carried the refreshed bearer.
        let retried: Vec<_> = transport
            .calls()
            .into_iter()
            .filter(|call| call.ends_with(FRESH))
            .collect();
        assert_eq!(retried.len(), 3);
    }

    #[tokio::test]
    async fn test_queued_requests_resume_in_arrival_order() {
        let gate = Arc::new(Notify::new());
        let mut transport = MockTransport::new(FRESH);
        transport.refresh_gate = Some(Arc::clone(&gate));
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("stale", "r1"));

        // First task owns the refresh and parks on the gate.
        let first = {
            let client = client.clone();
            tokio::spawn(async move { client.get_value("/cards/0/").await })
        };
        wait_until(|| transport.refresh_calls() == 1).await;

        // Enqueue the rest one at a time so arrival order is fixed.
        let mut handles = Vec::new();
        for (i, path) in ["/cards/1/", "/cards/2/", "/cards/3/"].iter().enumerate() {
            let client_clone = client.clone();
            let path = path.to_string();
            handles.push(tokio::spawn(
                async move { client_clone.get_value(&path).await },
            ));
            wait_until(|| client.waiter_count() == i + 1).await;
        }

        gate.notify_one();
        first.await.unwrap().unwrap();
        for handle in futures::future::join_all(handles).await {
            handle.unwrap().unwrap();
        }

        let resumed: Vec<_> = transport
            .calls()
            .into_iter()
            .filter(|call| call.ends_with(FRESH) && !call.contains("/cards/0/"))
            .collect();
        assert_eq!(
            resumed,
            vec![
                format!("GET /cards/1/ {FRESH}"),
                format!("GET /cards/2/ {FRESH}"),
                format!("GET /cards/3/ {FRESH}"),
            ]
        );
    }

    #[tokio::test]
    async fn test_second_unauthorized_fails_without_second_refresh() {
        // Refresh "succeeds" but the token it hands back is still rejected.
        let mut transport = MockTransport::new("never-valid");
        transport.refresh_body = format!(r#"{{"access": "{FRESH}"}}"#);
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("stale", "r1"));

        let err = client.get_value("/cards/").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(transport.refresh_calls(), 1);
        // Original send plus exactly one retry.
        let sends = transport
            .calls()
            .iter()
            .filter(|call| call.contains("/cards/"))
            .count();
        assert_eq!(sends, 2);
        let (access, refresh) = client.stored_tokens();
        assert!(access.is_none() && refresh.is_none());
    }

    #[tokio::test]
    async fn test_terminal_refresh_failure_clears_state_and_notifies_once() {
        let gate = Arc::new(Notify::new());
        let mut transport = MockTransport::new(FRESH);
        transport.refresh_status = 403;
        transport.refresh_body = r#"{"detail": "Token is blacklisted"}"#.to_string();
        transport.refresh_gate = Some(Arc::clone(&gate));
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("stale", "r1"));

        let notified = Arc::new(AtomicUsize::new(0));
        {
            let notified = Arc::clone(&notified);
            client.on_session_expired(move || {
                notified.fetch_add(1, Ordering::SeqCst);
            });
        }

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move { client.get_value(&format!("/cards/{i}/")).await })
            })
            .collect();
        wait_until(|| client.waiter_count() == 9).await;
        gate.notify_one();

        for handle in futures::future::join_all(handles).await {
            let err = handle.unwrap().unwrap_err();
            assert!(matches!(err, ApiError::SessionExpired));
        }
        assert_eq!(transport.refresh_calls(), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        let (access, refresh) = client.stored_tokens();
        assert!(access.is_none() && refresh.is_none());
        assert_eq!(client.refresh_state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_missing_refresh_token_short_circuits() {
        let transport = Arc::new(MockTransport::new(FRESH));
        let store = MemStore {
            access: Some("stale".to_string()),
            refresh: None,
        };
        let client = client(&transport, store);

        let notified = Arc::new(AtomicUsize::new(0));
        {
            let notified = Arc::clone(&notified);
            client.on_session_expired(move || {
                notified.fetch_add(1, Ordering::SeqCst);
            });
        }

        let err = client.get_value("/cards/").await.unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert_eq!(client.refresh_state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn test_network_failure_bypasses_refresh() {
        let mut transport = MockTransport::new("tok");
        transport.fail_network = true;
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("tok", "r1"));

        let err = client.get_value("/cards/").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(transport.refresh_calls(), 0);
        assert_eq!(client.refresh_state(), RefreshState::Idle);
        assert_eq!(client.waiter_count(), 0);
        // Credentials survive a connectivity failure.
        let (access, refresh) = client.stored_tokens();
        assert!(access.is_some() && refresh.is_some());
    }

    #[tokio::test]
    async fn test_unauthorized_refresh_call_is_terminal() {
        let mut transport = MockTransport::new("tok");
        transport.refresh_status = 401;
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("tok", "r1"));

        let err = client
            .request(reqwest::Method::POST, REFRESH_PATH, Some(&json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::SessionExpired));
        // The refresh endpoint was hit once and never re-refreshed.
        assert_eq!(transport.refresh_calls(), 1);
        let (access, refresh) = client.stored_tokens();
        assert!(access.is_none() && refresh.is_none());
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let mut transport = MockTransport::new(FRESH);
        transport.refresh_body = format!(r#"{{"access": "{FRESH}", "refresh": "r2"}}"#);
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("stale", "r1"));

        client.get_value("/cards/").await.unwrap();
        let (access, refresh) = client.stored_tokens();
        assert_eq!(access.as_deref(), Some(FRESH));
        assert_eq!(refresh.as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn test_empty_body_normalizes_to_object() {
        let mut transport = MockTransport::new("tok");
        transport.empty_success_body = true;
        let transport = Arc::new(transport);
        let client = client(&transport, MemStore::with_tokens("tok", "r1"));

        let value = client.get_value("/cards/7/favorite/").await.unwrap();
        assert_eq!(value, Value::Object(Map::new()));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let transport = Arc::new(MockTransport::new("tok"));
        let client = client(&transport, MemStore::with_tokens("tok", "r1"));

        let notified = Arc::new(AtomicUsize::new(0));
        {
            let notified = Arc::clone(&notified);
            client.on_session_expired(move || {
                notified.fetch_add(1, Ordering::SeqCst);
            });
        }

        client.logout();
        client.logout();
        assert_eq!(notified.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body("").unwrap(), Value::Object(Map::new()));
        assert_eq!(parse_body("  \n").unwrap(), Value::Object(Map::new()));
        assert_eq!(parse_body("null").unwrap(), Value::Object(Map::new()));
        assert_eq!(parse_body(r#"{"a": 1}"#).unwrap()["a"], 1);
        assert!(parse_body("not json").is_err());
    }

    #[test]
    fn test_application_errors_pass_through() {
        let resp = HttpResponse {
            status: 404,
            body: r#"{"detail": "Not found."}"#.to_string(),
        };
        let err = decode(resp).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 404: Not found.");
    }
}

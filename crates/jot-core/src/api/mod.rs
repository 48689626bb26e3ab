//! Authenticated HTTP transport for the memo service.
//!
//! One typed method per remote operation. Methods return the raw status and
//! decoded body; deciding what a non-2xx status means is left to the
//! repositories.

mod response;

use std::sync::{Arc, PoisonError};
use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult, Operation};
use crate::models::{
    Note, NoteDraft, NoteFilter, NoteId, NotePatch, SignInRequest, SignInResponse, User,
};
use crate::session::{SessionStore, KEY_SERVER_URL, KEY_TOKEN};
use crate::util::normalize_base_url;

pub use response::ApiResponse;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do with the stored token when the server answers 401.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthorizedPolicy {
    /// Leave the session alone; the caller decides.
    #[default]
    Keep,
    /// Drop the stored token so the client reports itself logged out.
    ClearSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// reqwest has no per-write deadline; this bounds the whole exchange.
    pub write_timeout: Duration,
    pub user_agent: String,
    pub on_unauthorized: UnauthorizedPolicy,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            user_agent: concat!("jot/", env!("CARGO_PKG_VERSION")).to_string(),
            on_unauthorized: UnauthorizedPolicy::Keep,
        }
    }
}

impl TransportOptions {
    fn build_http_client(&self) -> ApiResult<Client> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .timeout(self.write_timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .map_err(|error| {
                ApiError::Configuration(format!("Failed to construct HTTP client: {error}"))
            })
    }
}

/// HTTP client bound to the base URL it was built for.
#[derive(Clone)]
struct Binding {
    base_url: String,
    http: Client,
}

pub struct ApiClient {
    store: Arc<SessionStore>,
    options: TransportOptions,
    binding: std::sync::Mutex<Option<Binding>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("store", &self.store)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(store: Arc<SessionStore>, options: TransportOptions) -> Self {
        Self {
            store,
            options,
            binding: std::sync::Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Persist a new server URL and drop the cached client binding.
    ///
    /// Moving to a different host also drops the stored token; it was issued
    /// by the previous server and is never sent anywhere else.
    pub async fn update_base_url(&self, url: &str) -> ApiResult<String> {
        let base_url = normalize_base_url(url).map_err(ApiError::InvalidInput)?;
        let host_changed = self.store.server_url() != base_url;
        if host_changed && !self.store.token().is_empty() {
            self.store
                .set_many(&[(KEY_SERVER_URL, base_url.as_str()), (KEY_TOKEN, "")])
                .await?;
            tracing::info!(server_url = %base_url, "Server URL changed, stored token dropped");
        } else {
            self.store.set(KEY_SERVER_URL, &base_url).await?;
            tracing::info!(server_url = %base_url, "Server URL updated");
        }
        self.invalidate();
        Ok(base_url)
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> ApiResult<ApiResponse<SignInResponse>> {
        let response = self
            .send(Operation::SignIn, Method::POST, "/api/v1/auth/signin", |r| {
                r.json(request)
            })
            .await?;
        response.decode()
    }

    pub async fn sign_out(&self) -> ApiResult<ApiResponse<()>> {
        let response = self
            .send(Operation::SignOut, Method::POST, "/api/v1/auth/signout", |r| r)
            .await?;
        Ok(response.discard())
    }

    pub async fn current_user(&self) -> ApiResult<ApiResponse<User>> {
        self.send(Operation::CurrentUser, Method::GET, "/api/v1/user/me", |r| r)
            .await?
            .decode()
    }

    pub async fn list_users(&self) -> ApiResult<ApiResponse<Vec<User>>> {
        self.send(Operation::ListUsers, Method::GET, "/api/v1/users", |r| r)
            .await?
            .decode()
    }

    pub async fn list_notes(&self, filter: &NoteFilter) -> ApiResult<ApiResponse<Vec<Note>>> {
        self.send(Operation::ListNotes, Method::GET, "/api/v1/memos", |r| {
            if filter.is_empty() {
                r
            } else {
                r.query(filter)
            }
        })
        .await?
        .decode()
    }

    pub async fn create_note(&self, draft: &NoteDraft) -> ApiResult<ApiResponse<Note>> {
        self.send(Operation::CreateNote, Method::POST, "/api/v1/memos", |r| {
            r.json(draft)
        })
        .await?
        .decode()
    }

    pub async fn get_note(&self, id: NoteId) -> ApiResult<ApiResponse<Note>> {
        let path = format!("/api/v1/memos/{id}");
        self.send(Operation::GetNote, Method::GET, &path, |r| r)
            .await?
            .decode()
    }

    pub async fn update_note(&self, id: NoteId, patch: &NotePatch) -> ApiResult<ApiResponse<Note>> {
        let path = format!("/api/v1/memos/{id}");
        self.send(Operation::UpdateNote, Method::PATCH, &path, |r| r.json(patch))
            .await?
            .decode()
    }

    pub async fn delete_note(&self, id: NoteId) -> ApiResult<ApiResponse<()>> {
        let path = format!("/api/v1/memos/{id}");
        let response = self
            .send(Operation::DeleteNote, Method::DELETE, &path, |r| r)
            .await?;
        Ok(response.discard())
    }

    async fn send(
        &self,
        operation: Operation,
        method: Method,
        path: &str,
        customize: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> ApiResult<RawResponse> {
        let binding = self.binding()?;
        let url = format!("{}{}", binding.base_url, path);

        let mut request = customize(binding.http.request(method.clone(), url));
        let token = self.store.token();
        if !token.is_empty() {
            request = request.bearer_auth(token);
        }

        let started = Instant::now();
        let result = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (status, body) = match result {
            Ok(exchange) => exchange,
            Err(error) => {
                let error = ApiError::from(error);
                tracing::warn!(%method, path, elapsed_ms, "{operation} request failed: {error}");
                return Err(error);
            }
        };
        tracing::debug!(%method, path, status = status.as_u16(), elapsed_ms, "{operation}");

        if status == StatusCode::UNAUTHORIZED && operation != Operation::SignIn {
            self.handle_unauthorized(operation).await;
        }

        Ok(RawResponse {
            operation,
            status,
            body: body.to_vec(),
        })
    }

    async fn handle_unauthorized(&self, operation: Operation) {
        match self.options.on_unauthorized {
            UnauthorizedPolicy::Keep => {
                tracing::debug!("{operation} was rejected as unauthorized; keeping session");
            }
            UnauthorizedPolicy::ClearSession => {
                tracing::info!("{operation} was rejected as unauthorized; clearing stored token");
                if let Err(error) = self.store.clear(KEY_TOKEN).await {
                    tracing::warn!("Failed to clear token after 401: {error}");
                }
            }
        }
    }

    fn binding(&self) -> ApiResult<Binding> {
        let base_url = self.store.server_url();
        if base_url.is_empty() {
            return Err(ApiError::Configuration(
                "Server URL is not set. Configure a server before making requests.".to_string(),
            ));
        }

        let mut cached = self.binding.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(binding) = cached.as_ref().filter(|b| b.base_url == base_url) {
            return Ok(binding.clone());
        }

        tracing::debug!(server_url = %base_url, "Building HTTP client");
        let binding = Binding {
            base_url,
            http: self.options.build_http_client()?,
        };
        *cached = Some(binding.clone());
        Ok(binding)
    }

    fn invalidate(&self) {
        *self.binding.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Status and undecoded body of a completed exchange.
struct RawResponse {
    operation: Operation,
    status: StatusCode,
    body: Vec<u8>,
}

impl RawResponse {
    fn decode<T: DeserializeOwned>(self) -> ApiResult<ApiResponse<T>> {
        if !self.status.is_success() {
            return Ok(ApiResponse::failure(self.operation, self.status, &self.body));
        }
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(ApiResponse::success(self.operation, self.status, None));
        }
        let body = serde_json::from_slice::<T>(&self.body)?;
        Ok(ApiResponse::success(self.operation, self.status, Some(body)))
    }

    fn discard(self) -> ApiResponse<()> {
        if self.status.is_success() {
            ApiResponse::success(self.operation, self.status, Some(()))
        } else {
            ApiResponse::failure(self.operation, self.status, &self.body)
        }
    }
}

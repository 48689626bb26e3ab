//! Sign-in / sign-out orchestration over the transport and session store.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{SignInRequest, User};
use crate::session::{SessionSnapshot, SessionStore, KEY_TOKEN, KEY_USERNAME};

#[derive(Debug, Clone)]
pub struct SessionRepository {
    api: Arc<ApiClient>,
}

impl SessionRepository {
    pub const fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    fn store(&self) -> &SessionStore {
        self.api.session()
    }

    /// Authenticate and persist the token and username.
    ///
    /// The store write completes before `Ok` is returned, so the caller can
    /// issue authenticated requests immediately. Failures leave the store
    /// untouched.
    pub async fn sign_in(&self, username: &str, password: &str) -> ApiResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ApiError::InvalidInput("Username is required".to_string()));
        }
        if password.trim().is_empty() {
            return Err(ApiError::InvalidInput("Password is required".to_string()));
        }

        let request = SignInRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let session = self.api.sign_in(&request).await?.into_body()?;

        self.store()
            .set_many(&[(KEY_TOKEN, session.token.as_str()), (KEY_USERNAME, username)])
            .await?;
        tracing::info!(username, "Signed in");
        Ok(session.user)
    }

    /// Point the client at `server_url`, then sign in there.
    pub async fn sign_in_to(
        &self,
        server_url: &str,
        username: &str,
        password: &str,
    ) -> ApiResult<User> {
        self.api.update_base_url(server_url).await?;
        self.sign_in(username, password).await
    }

    /// Sign out remotely and always drop the local session.
    ///
    /// The result reflects the remote call; the local session is cleared
    /// whether it succeeded, failed, or never reached the server.
    pub async fn sign_out(&self) -> ApiResult<()> {
        let remote = match self.api.sign_out().await {
            Ok(response) => response.into_optional_body().map(|_| ()),
            Err(error) => Err(error),
        };

        if let Err(error) = self.store().clear_all().await {
            tracing::warn!("Failed to clear local session during sign-out: {error}");
        }

        match &remote {
            Ok(()) => tracing::info!("Signed out"),
            Err(error) => tracing::warn!("Remote sign-out failed, local session cleared: {error}"),
        }
        remote
    }

    pub async fn current_user(&self) -> ApiResult<User> {
        self.api.current_user().await?.into_body()
    }

    pub async fn users(&self) -> ApiResult<Vec<User>> {
        self.api.list_users().await?.into_body()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store().is_logged_in()
    }

    pub fn session_snapshot(&self) -> SessionSnapshot {
        self.store().snapshot()
    }
}

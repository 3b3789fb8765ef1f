//! The token-managing HTTP client.
//!
//! [`PortalClient`] wraps every outbound call with the credential
//! lifecycle: attach the stored access token, detect an expired-token
//! response, refresh once, and replay the original request with the new
//! token. Recovery is transparent to the caller when it works; when it
//! fails, the stored session is cleared, the session-expired hook fires,
//! and the caller gets [`ApiError::SessionExpired`].
//!
//! Per request the lifecycle is strictly ordered:
//! `sent → ok | needs-refresh → (retried → ok | fail) | refresh-failed →
//! session-cleared`. The retried-once guard is request-scoped. Across
//! requests, refreshes serialize behind an async lock; a request
//! that waited on the lock re-reads the store and adopts a token a
//! concurrent request already won, so a burst of 401s produces exactly one
//! refresh call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use bankline_core::permissions::effective_permissions;
use bankline_core::session::{CredentialPair, Session};

use crate::auth::{session_from_me_response, AuthPayload, LoginRequest, RawAuthResponse};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::store::SessionStore;

/// Side effects the host application wires into the session lifecycle.
pub trait SessionHooks: Send + Sync {
    /// Called once per terminal expiry, after stored credentials have been
    /// cleared. The portals show a "session expired" notice and navigate
    /// to the login screen here.
    fn on_session_expired(&self);
}

/// Default hooks: log and nothing else.
pub struct LogHooks;

impl SessionHooks for LogHooks {
    fn on_session_expired(&self) {
        tracing::warn!("session expired, credentials cleared");
    }
}

/// HTTP client for the banking backend, shared across a portal's views.
pub struct PortalClient {
    config: ClientConfig,
    http: reqwest::Client,
    store: Arc<dyn SessionStore>,
    hooks: Arc<dyn SessionHooks>,
    /// Serializes refresh attempts across concurrent in-flight requests.
    refresh_lock: Mutex<()>,
}

impl PortalClient {
    /// Build a client with the default (logging) hooks.
    pub fn new(config: ClientConfig, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Self::with_hooks(config, store, Arc::new(LogHooks))
    }

    /// Build a client with application-supplied session hooks.
    pub fn with_hooks(
        config: ClientConfig,
        store: Arc<dyn SessionStore>,
        hooks: Arc<dyn SessionHooks>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            config,
            http,
            store,
            hooks,
            refresh_lock: Mutex::new(()),
        })
    }

    /// The session store backing this client.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// The currently stored session, if any.
    pub fn session(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.store.session()?)
    }

    // -----------------------------------------------------------------
    // Request path
    // -----------------------------------------------------------------

    /// Issue an authorized request, refreshing the access token once if the
    /// backend rejects it.
    ///
    /// With no stored access token the request goes out without an
    /// `Authorization` header -- anonymous calls are valid and are never
    /// refresh-eligible beyond the same single attempt (there is no token
    /// to be expired, so a 401 with no stored refresh token surfaces
    /// directly).
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let sent_with = self.store.access_token()?;
        let response = self
            .issue(method.clone(), path, body.as_ref(), sent_with.as_deref())
            .await?;

        if !self.is_auth_failure(response.status()) {
            return Self::check(response).await;
        }

        tracing::debug!(path, status = %response.status(), "access rejected, attempting recovery");
        match self.recover(sent_with.as_deref()).await? {
            Some(token) => {
                // One retry, with the fresh token. A second auth failure
                // surfaces below without another refresh.
                let retry = self.issue(method, path, body.as_ref(), Some(&token)).await?;
                Self::check(retry).await
            }
            // No refresh token existed: the session was cleared and the
            // hook fired in `recover`; surface the original failure.
            None => Err(Self::classify(response).await),
        }
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None).await?;
        Ok(response.json().await?)
    }

    /// POST `body` to `path` and decode the JSON response.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        Ok(response.json().await?)
    }

    /// Build and send one physical request. No retry logic lives here.
    async fn issue(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
        bearer: Option<&str>,
    ) -> Result<Response, ApiError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.config.base_url, path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    fn is_auth_failure(&self, status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED
            || (self.config.treat_forbidden_as_expired && status == StatusCode::FORBIDDEN)
    }

    /// Pass 2xx responses through; classify everything else.
    async fn check(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::classify(response).await)
        }
    }

    async fn classify(response: Response) -> ApiError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ApiError::from_status(status, ApiError::message_from_body(&body))
    }

    // -----------------------------------------------------------------
    // Refresh path
    // -----------------------------------------------------------------

    /// Obtain a usable access token after an auth failure.
    ///
    /// Returns `Ok(Some(token))` when a retry should happen (own refresh
    /// succeeded, or a concurrent request's refresh was adopted),
    /// `Ok(None)` when recovery is impossible without another refresh
    /// attempt (no refresh token stored, or the session was already
    /// cleared while waiting on the lock; the caller surfaces the original
    /// failure), and `Err(SessionExpired)` when the refresh call itself
    /// was rejected.
    async fn recover(&self, sent_with: Option<&str>) -> Result<Option<String>, ApiError> {
        let _guard = self.refresh_lock.lock().await;

        // A concurrent request may have changed the stored state while we
        // waited for the lock.
        match self.store.access_token()? {
            // Its refresh won: adopt the newer token instead of
            // refreshing again.
            Some(current) if sent_with != Some(current.as_str()) => {
                tracing::debug!("adopting access token refreshed by a concurrent request");
                return Ok(Some(current));
            }
            // We sent a token but none is stored anymore: its refresh
            // failed terminally and the session was cleared, hook
            // included. Surface our original failure without firing the
            // hook a second time.
            None if sent_with.is_some() => return Ok(None),
            _ => {}
        }

        let Some(refresh_token) = self.store.refresh_token()? else {
            self.expire_session("no refresh token stored")?;
            return Ok(None);
        };

        match self.call_refresh(&refresh_token).await {
            Ok(payload) => {
                let credentials = CredentialPair {
                    access_token: payload.access_token,
                    // The backend only sometimes rotates the refresh token.
                    refresh_token: payload.refresh_token.unwrap_or(refresh_token),
                };
                self.store.set_credentials(&credentials)?;
                if let Some(session) = payload.session {
                    self.persist_session(&session)?;
                }
                tracing::info!("access token refreshed");
                Ok(Some(credentials.access_token))
            }
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                self.expire_session("refresh token rejected")?;
                Err(ApiError::SessionExpired(e.to_string()))
            }
        }
    }

    /// `POST /auth/refresh` with the refresh token as the bearer
    /// credential of *this* request -- backend contract, the token never
    /// goes in the body.
    async fn call_refresh(&self, refresh_token: &str) -> Result<AuthPayload, ApiError> {
        let response = self
            .issue(Method::POST, "/auth/refresh", None, Some(refresh_token))
            .await?;
        let response = Self::check(response).await?;
        let raw: RawAuthResponse = response.json().await?;
        raw.normalize()
    }

    /// Clear everything and fire the hook. Terminal.
    fn expire_session(&self, reason: &str) -> Result<(), ApiError> {
        tracing::warn!(reason, "clearing stored session");
        self.store.clear()?;
        self.hooks.on_session_expired();
        Ok(())
    }

    fn persist_session(&self, session: &Session) -> Result<(), ApiError> {
        self.store.set_session(session)?;
        let mut permissions: Vec<String> = effective_permissions(session).into_iter().collect();
        permissions.sort();
        self.store.set_permissions(&permissions)?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Auth endpoints
    // -----------------------------------------------------------------

    /// `POST /auth/login`. Persists the credential pair, session, and
    /// cached effective permissions on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })
        .expect("LoginRequest is always serialisable");
        let response = self.issue(Method::POST, "/auth/login", Some(&body), None).await?;
        let response = Self::check(response).await?;
        let raw: RawAuthResponse = response.json().await?;
        let payload = raw.normalize()?;

        let refresh_token = payload
            .refresh_token
            .ok_or_else(|| ApiError::Decode("login response carried no refresh token".into()))?;
        let session = payload
            .session
            .ok_or_else(|| ApiError::Decode("login response carried no user".into()))?;

        self.store.set_credentials(&CredentialPair {
            access_token: payload.access_token,
            refresh_token,
        })?;
        self.persist_session(&session)?;

        tracing::info!(
            user_id = session.user.id,
            expires_in = payload.expires_in,
            "logged in"
        );
        Ok(session)
    }

    /// `POST /auth/logout`. The backend call is best-effort: failure is
    /// logged, never propagated. Stored credentials are cleared
    /// unconditionally.
    pub async fn logout(&self) -> Result<(), ApiError> {
        if let Some(refresh_token) = self.store.refresh_token()? {
            match self
                .issue(Method::POST, "/auth/logout", None, Some(&refresh_token))
                .await
            {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!(status = %response.status(), "logout rejected by backend");
                }
                Err(e) => tracing::warn!(error = %e, "logout call failed"),
                Ok(_) => {}
            }
        }
        self.store.clear()?;
        tracing::info!("logged out");
        Ok(())
    }

    /// `GET /auth/me`. Re-derives and persists the session; used to
    /// revalidate a token pulled from storage.
    pub async fn me(&self) -> Result<Session, ApiError> {
        let response = self.send(Method::GET, "/auth/me", None).await?;
        let value: serde_json::Value = response.json().await?;
        let session = session_from_me_response(value)?;
        self.persist_session(&session)?;
        Ok(session)
    }

    /// Revalidate a stored credential pair on startup.
    ///
    /// Returns `Ok(None)` (with storage cleared) when there is nothing
    /// stored or the backend rejects what was stored; genuine transport
    /// failures propagate so the caller can retry rather than log the user
    /// out over a flaky network.
    pub async fn restore_session(&self) -> Result<Option<Session>, ApiError> {
        if self.store.access_token()?.is_none() && self.store.refresh_token()?.is_none() {
            return Ok(None);
        }
        match self.me().await {
            Ok(session) => Ok(Some(session)),
            Err(ApiError::Unauthorized(_)) | Err(ApiError::SessionExpired(_)) => {
                self.store.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

//! Authenticated HTTP client for the Chama API.
//!
//! Every call goes through [`ApiClient::send`]:
//!
//! 1. **Outbound:** state-changing requests to protected endpoints get an
//!    `X-CSRFToken` header (cookie first, `/csrf-token/` fetch second); any
//!    stored credential is sent as `Authorization: Token <credential>`.
//! 2. **Inbound:** a `403` on a CSRF-protected request refreshes the token and
//!    re-issues the request once. A `401` clears the session store and sends the
//!    navigator to the login route. Every failure is logged and returned.
//!
//! The client holds no per-request state; clones share the HTTP connection
//! pool, cookie jar, session store and navigator.

pub mod auth;
pub mod config;
pub mod csrf;
pub mod dashboard;
pub mod errors;
pub mod navigator;
pub mod request;
pub mod session;
pub mod types;

pub use self::config::ClientConfig;
pub use self::errors::ApiError;
pub use self::navigator::{MemoryNavigator, Navigator};
pub use self::request::{ApiRequest, ApiResponse};
pub use self::session::{FileSessionStore, MemorySessionStore, SessionStore};
pub use self::types::User;

use self::request::PendingRequest;
use reqwest::{
    Client, StatusCode,
    cookie::Jar,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use secrecy::ExposeSecret;
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    jar: Arc<Jar>,
    config: Arc<ClientConfig>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ApiClient`]. Defaults to an in-memory session store, a
/// navigator starting at `/`, and an empty cookie jar.
pub struct ApiClientBuilder {
    config: ClientConfig,
    jar: Option<Arc<Jar>>,
    session: Option<Arc<dyn SessionStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    #[must_use]
    pub fn session_store(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = Some(session);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Shares an existing cookie jar, e.g. one seeded with a `csrftoken`.
    #[must_use]
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// # Errors
    /// Returns `ApiError::Config` if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        // Fail early on an unusable base URL rather than on the first request.
        self.config.url("/")?;

        let jar = self.jar.unwrap_or_default();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(self.config.timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(ApiClient {
            http,
            jar,
            config: Arc::new(self.config),
            session: self
                .session
                .unwrap_or_else(|| Arc::new(MemorySessionStore::new())),
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(MemoryNavigator::default())),
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            jar: None,
            session: None,
            navigator: None,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Fetches a fresh CSRF token, ignoring any cookie value.
    pub async fn fetch_csrf_token(&self) -> Option<String> {
        csrf::fetch_token(&self.http, &self.config).await
    }

    /// # Errors
    /// Returns the pipeline error or `ApiError::Parse` for an unexpected body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// # Errors
    /// Returns the pipeline error or `ApiError::Parse` for an unexpected body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::post(path).json(body)?).await?.json()
    }

    /// # Errors
    /// Returns the pipeline error or `ApiError::Parse` for an unexpected body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::put(path).json(body)?).await?.json()
    }

    /// # Errors
    /// Returns the pipeline error or `ApiError::Parse` for an unexpected body.
    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(ApiRequest::patch(path).json(body)?).await?.json()
    }

    /// # Errors
    /// Returns the pipeline error or `ApiError::Parse` for an unexpected body.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(ApiRequest::delete(path)).await?.json()
    }

    /// Runs `request` through the pipeline.
    ///
    /// # Errors
    /// Returns `ApiError::Http` for any non-2xx final response (after the CSRF
    /// retry, if one applied), or a transport/config error.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut pending = PendingRequest::new(request);

        loop {
            let method = pending.request().method.clone();
            let prepared = self.prepare(&pending).await?;
            let url = prepared.url().clone();

            let span = info_span!(
                "api.request",
                http.method = %method,
                url = %url,
                retry = !pending.can_retry()
            );
            let response = match self.http.execute(prepared).instrument(span).await {
                Ok(response) => response,
                Err(err) => {
                    error!(url = %url, method = %method, "API request failed: {}", err);
                    return Err(ApiError::from_transport(&err));
                }
            };

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|err| ApiError::from_transport(&err))?;

            if status.is_success() {
                debug!("{} {} -> {}", method, url, status);
                return Ok(ApiResponse { status, body });
            }

            error!(
                status = status.as_u16(),
                body = %body,
                url = %url,
                method = %method,
                "API error"
            );

            if status == StatusCode::FORBIDDEN
                && pending.request().requires_csrf(&self.config)
                && pending.can_retry()
            {
                warn!("CSRF rejection on {} {}, refreshing token and retrying", method, url);
                let token = self.fetch_csrf_token().await;
                pending.mark_retried(token);
                continue;
            }

            if status == StatusCode::UNAUTHORIZED {
                self.expire_session();
            }

            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
    }

    /// Builds the transport request: URL, CSRF header when applicable,
    /// credential when stored, caller headers and JSON body.
    async fn prepare(&self, pending: &PendingRequest) -> Result<reqwest::Request, ApiError> {
        let request = pending.request();
        let url = self.config.url(&request.path)?;
        let mut builder = self.http.request(request.method.clone(), url.clone());

        if request.requires_csrf(&self.config) {
            let token = match pending.refreshed_csrf_token() {
                Some(token) => Some(token.to_string()),
                None => match csrf::token_from_cookies(&self.jar, &url) {
                    Some(token) => Some(token),
                    // Recovery already spent its one refresh.
                    None if !pending.can_retry() => None,
                    None => self.fetch_csrf_token().await,
                },
            };

            match token {
                Some(token) => builder = builder.header(csrf::CSRF_HEADER, token),
                None => warn!(
                    "sending {} {} without a CSRF token",
                    request.method, request.path
                ),
            }
        }

        if let Some(credential) = self.session.credential() {
            builder = builder.header(
                AUTHORIZATION,
                format!("Token {}", credential.expose_secret()),
            );
        }

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder.build().map_err(|err| ApiError::from_transport(&err))
    }

    /// Session teardown after a `401`: the store is cleared before navigating
    /// so the next screen never sees a stale credential.
    fn expire_session(&self) {
        if let Err(err) = self.session.clear() {
            error!("Failed to clear expired session: {}", err);
        }

        let current = self.navigator.current_path();
        if !self.config.is_auth_route(&current) {
            debug!("session expired, redirecting to {}", self.config.login_path);
            self.navigator.navigate(&self.config.login_path);
        }
    }
}

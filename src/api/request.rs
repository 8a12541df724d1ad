use super::{config::ClientConfig, errors::ApiError};
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Transport-independent description of one API call. The body is stored as
/// JSON so the exact request can be re-issued after a CSRF refresh.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attaches a JSON body.
    ///
    /// # Errors
    /// Returns `ApiError::Serialization` if `body` cannot be encoded.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::Serialization(format!("Failed to encode request: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Read methods and exempt endpoints go out without a CSRF token.
    pub fn requires_csrf(&self, config: &ClientConfig) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
            && !config.is_csrf_exempt(&self.path)
    }
}

/// An in-flight request plus its retry bookkeeping. Created per call to
/// `ApiClient::send` and dropped when the call settles.
#[derive(Debug)]
pub(crate) struct PendingRequest {
    request: ApiRequest,
    retried: bool,
    refreshed_csrf_token: Option<String>,
}

impl PendingRequest {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
            refreshed_csrf_token: None,
        }
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn can_retry(&self) -> bool {
        !self.retried
    }

    /// Marks the single CSRF retry as used and carries the refreshed token, if
    /// one was obtained, into the retried attempt.
    pub fn mark_retried(&mut self, token: Option<String>) {
        self.retried = true;
        self.refreshed_csrf_token = token;
    }

    pub fn refreshed_csrf_token(&self) -> Option<&str> {
        self.refreshed_csrf_token.as_deref()
    }
}

/// A successful response with its body read to completion.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decodes the body. An empty body (e.g. `204`) decodes as JSON `null`, so
    /// `()` and `Option<T>` targets work for bodiless replies.
    ///
    /// # Errors
    /// Returns `ApiError::Parse` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body)
            .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))
    }
}

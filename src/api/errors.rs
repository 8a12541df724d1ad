use reqwest::StatusCode;
use std::fmt;

/// Maximum number of error body characters rendered by `Display`.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Clone, Debug)]
pub enum ApiError {
    Config(String),
    Network(String),
    Timeout(String),
    /// Non-2xx response. `body` is the raw server body, kept verbatim so callers
    /// can surface field-level validation errors.
    Http {
        status: u16,
        body: String,
    },
    Parse(String),
    Serialization(String),
    Storage(String),
}

impl ApiError {
    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(StatusCode::FORBIDDEN.as_u16())
    }

    /// Parses the error body as JSON, returning `None` for non-JSON bodies.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        match self {
            ApiError::Http { body, .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }

    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout("Request timed out. Please try again.".to_string())
        } else if err.is_builder() {
            ApiError::Config(format!("Failed to build request: {err}"))
        } else {
            ApiError::Network(format!("Unable to reach the server: {err}"))
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(message) => write!(formatter, "Config error: {message}"),
            ApiError::Network(message) => write!(formatter, "Network error: {message}"),
            ApiError::Timeout(message) => write!(formatter, "Timeout: {message}"),
            ApiError::Http { status, body } => {
                write!(formatter, "Request failed ({status}): {}", sanitize_body(body))
            }
            ApiError::Parse(message) => write!(formatter, "Response error: {message}"),
            ApiError::Serialization(message) => write!(formatter, "Request error: {message}"),
            ApiError::Storage(message) => write!(formatter, "Session storage error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

/// Trims and truncates an error body for display.
pub(crate) fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncates_long_bodies() {
        let err = ApiError::Http {
            status: 400,
            body: "x".repeat(500),
        };
        let rendered = err.to_string();
        assert!(rendered.starts_with("Request failed (400): "));
        assert_eq!(rendered.len(), "Request failed (400): ".len() + MAX_ERROR_CHARS);
    }

    #[test]
    fn display_uses_placeholder_for_empty_body() {
        let err = ApiError::Http {
            status: 500,
            body: "   ".to_string(),
        };
        assert_eq!(err.to_string(), "Request failed (500): Request failed.");
    }

    #[test]
    fn status_helpers() {
        let unauthorized = ApiError::Http {
            status: 401,
            body: String::new(),
        };
        let forbidden = ApiError::Http {
            status: 403,
            body: String::new(),
        };
        assert!(unauthorized.is_unauthorized());
        assert!(!unauthorized.is_forbidden());
        assert!(forbidden.is_forbidden());
        assert_eq!(ApiError::Network("down".to_string()).status(), None);
    }

    #[test]
    fn body_json_parses_validation_errors() {
        let err = ApiError::Http {
            status: 400,
            body: r#"{"email": ["This field is required."]}"#.to_string(),
        };
        let body = err.body_json();
        assert_eq!(
            body.as_ref()
                .and_then(|v| v.get("email"))
                .and_then(|v| v.get(0))
                .and_then(serde_json::Value::as_str),
            Some("This field is required.")
        );
    }
}

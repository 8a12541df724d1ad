//! Client configuration: API base URL resolution, route paths used for
//! navigation side effects, and the CSRF exemption allow-list. Configuration
//! values are public; credentials never live here.

use super::{auth, errors::ApiError};
use regex::Regex;
use std::time::Duration;
use url::Url;

/// Base URL used when no override is supplied.
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";
/// Environment variable overriding the API base URL.
pub const ENV_API_BASE_URL: &str = "CHAMA_API_BASE_URL";
/// Default request timeout applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// CSRF-issuing endpoint, relative to the API base and to the root.
pub const CSRF_TOKEN_PATH: &str = "/csrf-token/";

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_REGISTER_PATH: &str = "/register";
pub const DEFAULT_LOGOUT_REDIRECT: &str = "/";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Client-side route shown after a session expires.
    pub login_path: String,
    pub register_path: String,
    /// Destination after logout when the server suggests none.
    pub logout_redirect_path: String,
    /// Endpoints the server serves without CSRF protection, stored
    /// normalised. Set through `with_csrf_exempt_paths`.
    csrf_exempt_paths: Vec<String>,
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Self {
        Self {
            api_base_url: normalize_base_url(api_base_url),
            timeout: DEFAULT_TIMEOUT,
            user_agent: crate::APP_USER_AGENT.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            register_path: DEFAULT_REGISTER_PATH.to_string(),
            logout_redirect_path: DEFAULT_LOGOUT_REDIRECT.to_string(),
            csrf_exempt_paths: default_csrf_exempt_paths(),
        }
    }

    /// Loads the base URL from `CHAMA_API_BASE_URL`, falling back to the local
    /// development server when unset or blank.
    pub fn from_env() -> Self {
        let base = std::env::var(ENV_API_BASE_URL)
            .ok()
            .and_then(|value| normalize_override(&value))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        Self::new(&base)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_csrf_exempt_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.csrf_exempt_paths = paths
            .into_iter()
            .map(|path| normalize_path(path.as_ref()))
            .collect();
        self
    }

    /// Normalised allow-list consulted by `is_csrf_exempt`.
    pub fn csrf_exempt_paths(&self) -> &[String] {
        &self.csrf_exempt_paths
    }

    /// API base with its versioned suffix (`/api/v1`, `/v2`, ...) removed.
    pub fn root_url(&self) -> String {
        Regex::new(r"(?:/api)?/v\d+$").map_or_else(
            |_| self.api_base_url.clone(),
            |re| re.replace(&self.api_base_url, "").into_owned(),
        )
    }

    /// Resolves a path relative to the API base.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if the joined URL does not parse.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        parse_url(&join(&self.api_base_url, path))
    }

    /// CSRF endpoint candidates in the order they are tried. The root fallback is
    /// omitted when the base carries no versioned suffix.
    pub fn csrf_token_urls(&self) -> Vec<String> {
        let primary = join(&self.api_base_url, CSRF_TOKEN_PATH);
        let fallback = join(&self.root_url(), CSRF_TOKEN_PATH);
        if primary == fallback {
            vec![primary]
        } else {
            vec![primary, fallback]
        }
    }

    /// True for the CSRF endpoint itself and for allow-listed endpoints.
    pub fn is_csrf_exempt(&self, path: &str) -> bool {
        let path = normalize_path(path);
        path == CSRF_TOKEN_PATH || self.csrf_exempt_paths.iter().any(|exempt| *exempt == path)
    }

    /// True when `location` is the login or register route.
    pub fn is_auth_route(&self, location: &str) -> bool {
        let location = trim_route(location);
        location == trim_route(&self.login_path) || location == trim_route(&self.register_path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

fn default_csrf_exempt_paths() -> Vec<String> {
    [
        auth::LOGIN_PATH,
        auth::REGISTER_PATH,
        auth::PASSWORD_RESET_PATH,
        auth::PASSWORD_RESET_CONFIRM_PATH,
        auth::TOKEN_EXCHANGE_PATH,
        auth::API_TOKEN_AUTH_PATH,
    ]
    .iter()
    .map(|path| normalize_path(path))
    .collect()
}

/// Trims whitespace and trailing slashes from a base URL.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn normalize_override(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Canonical form for path comparison: leading and trailing slash, no query or
/// fragment.
pub(crate) fn normalize_path(path: &str) -> String {
    let path = path.trim();
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let inner = path.trim_matches('/');
    if inner.is_empty() {
        "/".to_string()
    } else {
        format!("/{inner}/")
    }
}

fn trim_route(route: &str) -> &str {
    let trimmed = route.trim().trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

fn join(base: &str, path: &str) -> String {
    let path = path.trim();
    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn parse_url(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|err| ApiError::Config(format!("Invalid URL {raw}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_strips_trailing_slash() {
        let config = ClientConfig::new(" https://api.chama.test/api/v1/ ");
        assert_eq!(config.api_base_url, "https://api.chama.test/api/v1");
    }

    #[test]
    fn from_env_uses_override() {
        temp_env::with_var(ENV_API_BASE_URL, Some("https://api.chama.test/api/v2/"), || {
            let config = ClientConfig::from_env();
            assert_eq!(config.api_base_url, "https://api.chama.test/api/v2");
        });
    }

    #[test]
    fn from_env_defaults_when_unset_or_blank() {
        temp_env::with_var(ENV_API_BASE_URL, None::<&str>, || {
            assert_eq!(ClientConfig::from_env().api_base_url, DEFAULT_API_BASE_URL);
        });
        temp_env::with_var(ENV_API_BASE_URL, Some("   "), || {
            assert_eq!(ClientConfig::from_env().api_base_url, DEFAULT_API_BASE_URL);
        });
    }

    #[test]
    fn root_url_strips_versioned_suffix() {
        assert_eq!(
            ClientConfig::new("http://127.0.0.1:8000/api/v1").root_url(),
            "http://127.0.0.1:8000"
        );
        assert_eq!(
            ClientConfig::new("https://chama.test/v3").root_url(),
            "https://chama.test"
        );
        assert_eq!(
            ClientConfig::new("https://chama.test/backend").root_url(),
            "https://chama.test/backend"
        );
    }

    #[test]
    fn csrf_token_urls_include_root_fallback() {
        let config = ClientConfig::new("http://127.0.0.1:8000/api/v1");
        assert_eq!(
            config.csrf_token_urls(),
            vec![
                "http://127.0.0.1:8000/api/v1/csrf-token/".to_string(),
                "http://127.0.0.1:8000/csrf-token/".to_string(),
            ]
        );
    }

    #[test]
    fn csrf_token_urls_skip_duplicate_fallback() {
        let config = ClientConfig::new("http://127.0.0.1:8000");
        assert_eq!(
            config.csrf_token_urls(),
            vec!["http://127.0.0.1:8000/csrf-token/".to_string()]
        );
    }

    #[test]
    fn url_joins_path() -> anyhow::Result<()> {
        let config = ClientConfig::new("http://127.0.0.1:8000/api/v1/");
        let url = config.url("accounts/users/profile/")?;
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/api/v1/accounts/users/profile/");
        Ok(())
    }

    #[test]
    fn url_rejects_invalid_base() {
        let config = ClientConfig::new("not a url");
        assert!(matches!(config.url("/x/"), Err(ApiError::Config(_))));
    }

    #[test]
    fn csrf_exemption_is_exact() {
        let config = ClientConfig::default();
        assert!(config.is_csrf_exempt("/accounts/auth/login/"));
        assert!(config.is_csrf_exempt("accounts/auth/login"));
        assert!(config.is_csrf_exempt("/accounts/auth/login/?next=/dashboard"));
        assert!(config.is_csrf_exempt("/csrf-token/"));
        assert!(!config.is_csrf_exempt("/accounts/auth/login-history/"));
        assert!(!config.is_csrf_exempt("/meetings/login/"));
        assert!(!config.is_csrf_exempt("/accounts/auth/logout/"));
    }

    #[test]
    fn custom_exempt_paths_replace_defaults() {
        let config = ClientConfig::default().with_csrf_exempt_paths(["webhooks/mpesa"]);
        assert!(config.is_csrf_exempt("/webhooks/mpesa/"));
        assert!(!config.is_csrf_exempt("/accounts/auth/login/"));
    }

    #[test]
    fn exempt_paths_are_stored_normalised() {
        let config =
            ClientConfig::default().with_csrf_exempt_paths(["/webhooks/mpesa", " callbacks/sms/?v=2 "]);
        assert_eq!(
            config.csrf_exempt_paths(),
            ["/webhooks/mpesa/".to_string(), "/callbacks/sms/".to_string()]
        );
        assert!(config.is_csrf_exempt("/webhooks/mpesa"));
        assert!(config.is_csrf_exempt("callbacks/sms"));
    }

    #[test]
    fn auth_route_detection() {
        let config = ClientConfig::default();
        assert!(config.is_auth_route("/login"));
        assert!(config.is_auth_route("/login/"));
        assert!(config.is_auth_route("/register"));
        assert!(!config.is_auth_route("/dashboard"));
        assert!(!config.is_auth_route("/login-help"));
    }

    #[test]
    fn normalize_path_variants() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("a/b"), "/a/b/");
        assert_eq!(normalize_path(" /a/b/#frag "), "/a/b/");
    }
}

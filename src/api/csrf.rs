//! Double-submit CSRF support. The server writes its token into the
//! `csrftoken` cookie; the client echoes it in `X-CSRFToken`. When the cookie is
//! missing the token is fetched from `/csrf-token/`, first under the API base
//! and then under the application root, since deployments mount the endpoint in
//! either place.

use super::{config::ClientConfig, errors::ApiError};
use reqwest::{
    Client,
    cookie::{CookieStore, Jar},
};
use serde::Deserialize;
use tracing::{Instrument, debug, info_span, warn};
use url::Url;

pub const CSRF_COOKIE_NAME: &str = "csrftoken";
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Deserialize)]
struct CsrfTokenResponse {
    #[serde(rename = "csrfToken", default)]
    csrf_token: Option<String>,
}

/// Reads the CSRF cookie the jar would send to `url`.
pub(crate) fn token_from_cookies(jar: &Jar, url: &Url) -> Option<String> {
    let header = jar.cookies(url)?;
    let raw = header.to_str().ok()?;
    cookie_value(raw, CSRF_COOKIE_NAME)
}

/// Extracts `name` from a `Cookie` header value (`a=1; b=2`).
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}

/// Fetches a fresh token, trying each candidate endpoint once. Returns `None`
/// when every attempt fails; callers then proceed without the header and let
/// the server's rejection drive recovery.
pub(crate) async fn fetch_token(http: &Client, config: &ClientConfig) -> Option<String> {
    for url in config.csrf_token_urls() {
        match request_token(http, &url).await {
            Ok(token) => {
                debug!("CSRF token acquired from {}", url);
                return Some(token);
            }
            Err(err) => warn!("CSRF token fetch from {} failed: {}", url, err),
        }
    }

    warn!("no CSRF token available");
    None
}

async fn request_token(http: &Client, url: &str) -> Result<String, ApiError> {
    let span = info_span!("api.csrf_token", http.method = "GET", url = %url);
    let response = http
        .get(url)
        .send()
        .instrument(span)
        .await
        .map_err(|err| ApiError::from_transport(&err))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let payload: CsrfTokenResponse = response
        .json()
        .await
        .map_err(|err| ApiError::Parse(format!("Failed to decode CSRF response: {err}")))?;

    payload
        .csrf_token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::Parse("Error parsing JSON response: no csrfToken found".to_string()))
}

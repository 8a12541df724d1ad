//! # chama-client
//!
//! Authenticated API client for the ChamaNexus savings-group service.
//!
//! The server is a session + token API: every request may carry an
//! `Authorization: Token <credential>` header, and state-changing requests must
//! echo the server's `csrftoken` cookie in an `X-CSRFToken` header
//! (double-submit). [`api::ApiClient`] owns that coordination:
//!
//! - **CSRF:** tokens are read from the cookie jar, or fetched from
//!   `/csrf-token/` (falling back to the unversioned root) when the cookie is
//!   missing. A `403` on a CSRF-protected request triggers one refresh and one
//!   retry, never more.
//! - **Session:** the credential and cached profile live in a
//!   [`api::SessionStore`]. A `401` clears both and sends the navigator to the
//!   login route.
//! - **Auth flows:** register, login, logout, profile, password change/reset and
//!   two-factor setup are typed methods on the client.
//!
//! The `chama` binary in `src/bin` is a thin command-line front end over the
//! same client.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_user_agent_contains_version() {
        assert!(APP_USER_AGENT.starts_with("chama-client/"));
        assert!(APP_USER_AGENT.ends_with(env!("CARGO_PKG_VERSION")));
    }
}

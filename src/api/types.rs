//! Request and response payloads for the account endpoints. Request bodies that
//! carry passwords or tokens borrow from `SecretString`s at the call site and
//! are never `Debug`, so they cannot end up in logs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Profile snapshot returned by the server and cached in the session store.
/// Fields the client does not model are kept in `extra` so the cache
/// round-trips whatever the server sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub two_factor_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Name to greet the user with, falling back to the email address.
    pub fn display_name(&self) -> &str {
        if !self.full_name.trim().is_empty() {
            &self.full_name
        } else if !self.first_name.trim().is_empty() {
            &self.first_name
        } else {
            &self.email
        }
    }
}

/// Fields for a new account. The password pair is borrowed as secrets and only
/// exposed while the request body is serialized.
pub struct NewAccount {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub password: secrecy::SecretString,
    pub password_confirm: secrecy::SecretString,
}

#[derive(Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<&'a str>,
    pub password: &'a str,
    pub password_confirm: &'a str,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ChangePasswordBody<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct PasswordResetBody<'a> {
    pub email: &'a str,
}

#[derive(Serialize)]
pub(crate) struct PasswordResetConfirmBody<'a> {
    pub reset_token: &'a str,
    pub new_password: &'a str,
    pub confirm_password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct TwoFactorVerifyBody<'a> {
    pub token: &'a str,
}

/// Partial profile update; `None` fields are left untouched by the server.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone_number.is_none()
    }
}

/// Server reply to register, login and change-password. The `token` is
/// consumed by the client and stored; it is not returned to callers.
#[derive(Deserialize)]
pub(crate) struct TokenEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

/// Outcome of an operation that establishes or rotates a session.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AuthResponse {
    pub message: Option<String>,
    pub user: Option<User>,
}

#[derive(Deserialize)]
pub(crate) struct LogoutResponse {
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// Generic `{ "message": ... }` reply; any other fields are kept.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Enrollment material for an authenticator app.
#[derive(Clone, Serialize, Deserialize)]
pub struct TwoFactorSetup {
    /// Provisioning URI or encoded image for a QR code.
    pub qr_code: String,
    pub secret: String,
}

impl std::fmt::Debug for TwoFactorSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwoFactorSetup")
            .field("qr_code", &self.qr_code)
            .field("secret", &"***")
            .finish()
    }
}

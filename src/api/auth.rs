//! Account operations layered on the pipeline. Each one has a fixed request
//! shape and a fixed effect on the session store. Request bodies contain
//! passwords or one-time tokens and must never be logged.

use super::{
    ApiClient, ApiError, ApiRequest,
    types::{
        AuthResponse, ChangePasswordBody, LoginBody, LogoutResponse, MessageResponse, NewAccount,
        PasswordResetBody, PasswordResetConfirmBody, ProfileUpdate, RegisterBody, TokenEnvelope,
        TwoFactorSetup, TwoFactorVerifyBody, User,
    },
};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, info, warn};

pub const REGISTER_PATH: &str = "/accounts/auth/register/";
pub const LOGIN_PATH: &str = "/accounts/auth/login/";
pub const LOGOUT_PATH: &str = "/accounts/auth/logout/";
pub const PROFILE_PATH: &str = "/accounts/users/profile/";
pub const CHANGE_PASSWORD_PATH: &str = "/accounts/users/change-password/";
pub const PASSWORD_RESET_PATH: &str = "/accounts/password-reset/";
pub const PASSWORD_RESET_CONFIRM_PATH: &str = "/accounts/password-reset/confirm/";
pub const TWO_FACTOR_SETUP_PATH: &str = "/accounts/2fa/setup/";
pub const TWO_FACTOR_VERIFY_PATH: &str = "/accounts/2fa/verify/";
/// Token exchange endpoints served by the framework's built-in token view.
pub const TOKEN_EXCHANGE_PATH: &str = "/auth-token/";
pub const API_TOKEN_AUTH_PATH: &str = "/accounts/api-token-auth/";

impl ApiClient {
    /// Creates an account. When the server answers with a token the new session
    /// is stored immediately.
    ///
    /// # Errors
    /// Returns the server's validation error, a transport error, or
    /// `ApiError::Storage` if the session cannot be saved.
    pub async fn register(&self, account: &NewAccount) -> Result<AuthResponse, ApiError> {
        let body = RegisterBody {
            email: account.email.trim(),
            first_name: account.first_name.trim(),
            last_name: account.last_name.trim(),
            phone_number: account.phone_number.as_deref().map(str::trim),
            password: account.password.expose_secret(),
            password_confirm: account.password_confirm.expose_secret(),
        };
        let envelope: TokenEnvelope = self.post(REGISTER_PATH, &body).await?;

        if envelope.token.is_some() {
            self.store_session(&envelope)?;
        }

        Ok(AuthResponse {
            message: envelope.message,
            user: envelope.user,
        })
    }

    /// Signs in and stores the returned credential and profile, then acquires a
    /// fresh CSRF token since the server rotates it with the session identity.
    ///
    /// # Errors
    /// Returns the server's rejection, a transport error, `ApiError::Parse` if
    /// no token is returned, or `ApiError::Storage`.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = LoginBody {
            email: email.trim(),
            password: password.expose_secret(),
        };
        let envelope: TokenEnvelope = self.post(LOGIN_PATH, &body).await?;

        if envelope.token.is_none() {
            return Err(ApiError::Parse(
                "Error parsing JSON response: no token found".to_string(),
            ));
        }
        self.store_session(&envelope)?;

        if self.fetch_csrf_token().await.is_none() {
            warn!("logged in without a fresh CSRF token");
        }

        info!("logged in");
        Ok(AuthResponse {
            message: envelope.message,
            user: envelope.user,
        })
    }

    /// Ends the session. The server call is best effort: local state is cleared
    /// and the navigator moved whatever happens on the network. Returns the
    /// destination navigated to.
    pub async fn logout(&self) -> String {
        let destination = match self.send(ApiRequest::post(LOGOUT_PATH)).await {
            Ok(response) => response
                .json::<LogoutResponse>()
                .ok()
                .and_then(|logout| logout.redirect_url)
                .filter(|url| !url.trim().is_empty()),
            Err(err) => {
                warn!("logout request failed, clearing local session anyway: {}", err);
                None
            }
        }
        .unwrap_or_else(|| self.config.logout_redirect_path.clone());

        if let Err(err) = self.session.clear() {
            error!("Failed to clear session on logout: {}", err);
        }

        debug!("logged out, navigating to {}", destination);
        self.navigator.navigate(&destination);
        destination
    }

    /// Fetches the authoritative profile and refreshes the cached copy.
    ///
    /// # Errors
    /// Returns the pipeline error or `ApiError::Storage`.
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        let user: User = self.get(PROFILE_PATH).await?;
        self.session.set_user(&user)?;
        Ok(user)
    }

    /// Applies a partial profile update and caches the server's result.
    ///
    /// # Errors
    /// Returns `ApiError::Serialization` for an empty update, the pipeline
    /// error, or `ApiError::Storage`.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        if update.is_empty() {
            return Err(ApiError::Serialization(
                "Profile update has no fields".to_string(),
            ));
        }
        let user: User = self.put(PROFILE_PATH, update).await?;
        self.session.set_user(&user)?;
        Ok(user)
    }

    /// Changes the password. The server revokes the old credential and issues a
    /// new one, which replaces the stored credential.
    ///
    /// # Errors
    /// Returns the server's validation error, a transport error, or
    /// `ApiError::Storage`.
    pub async fn change_password(
        &self,
        old_password: &SecretString,
        new_password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let body = ChangePasswordBody {
            old_password: old_password.expose_secret(),
            new_password: new_password.expose_secret(),
            confirm_password: confirm_password.expose_secret(),
        };
        let envelope: TokenEnvelope = self.put(CHANGE_PASSWORD_PATH, &body).await?;

        if let Some(token) = envelope.token.as_deref().filter(|token| !token.is_empty()) {
            self.session
                .set_credential(SecretString::from(token.to_string()))?;
        }

        Ok(AuthResponse {
            message: envelope.message,
            user: envelope.user,
        })
    }

    /// Asks the server to email reset instructions. The reply does not reveal
    /// whether the address exists.
    ///
    /// # Errors
    /// Returns the pipeline error.
    pub async fn request_password_reset(&self, email: &str) -> Result<MessageResponse, ApiError> {
        let body = PasswordResetBody {
            email: email.trim(),
        };
        self.post(PASSWORD_RESET_PATH, &body).await
    }

    /// # Errors
    /// Returns the pipeline error, e.g. `400` for an expired reset token.
    pub async fn confirm_password_reset(
        &self,
        reset_token: &SecretString,
        new_password: &SecretString,
        confirm_password: &SecretString,
    ) -> Result<MessageResponse, ApiError> {
        let body = PasswordResetConfirmBody {
            reset_token: reset_token.expose_secret(),
            new_password: new_password.expose_secret(),
            confirm_password: confirm_password.expose_secret(),
        };
        self.post(PASSWORD_RESET_CONFIRM_PATH, &body).await
    }

    /// Starts authenticator enrollment.
    ///
    /// # Errors
    /// Returns the pipeline error.
    pub async fn two_factor_setup(&self) -> Result<TwoFactorSetup, ApiError> {
        self.get(TWO_FACTOR_SETUP_PATH).await
    }

    /// Confirms enrollment with a code from the authenticator and marks the
    /// cached profile as 2FA-enabled.
    ///
    /// # Errors
    /// Returns the pipeline error (e.g. `400` for a wrong code) or
    /// `ApiError::Storage`.
    pub async fn verify_two_factor(&self, code: &str) -> Result<MessageResponse, ApiError> {
        let body = TwoFactorVerifyBody { token: code.trim() };
        let response: MessageResponse = self.post(TWO_FACTOR_VERIFY_PATH, &body).await?;

        if let Some(mut user) = self.session.user() {
            user.two_factor_enabled = true;
            self.session.set_user(&user)?;
        }

        Ok(response)
    }

    /// True when a credential is stored. Liveness is only discovered by the
    /// server answering `401`.
    pub fn is_authenticated(&self) -> bool {
        self.session.credential().is_some()
    }

    /// Cached profile, possibly stale.
    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn credential(&self) -> Option<SecretString> {
        self.session.credential()
    }

    fn store_session(&self, envelope: &TokenEnvelope) -> Result<(), ApiError> {
        if let Some(token) = envelope.token.as_deref() {
            self.session
                .set_credential(SecretString::from(token.to_string()))?;
        }
        if let Some(user) = &envelope.user {
            self.session.set_user(user)?;
        }
        Ok(())
    }
}

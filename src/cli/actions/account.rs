use crate::api::{
    ApiClient,
    types::{NewAccount, ProfileUpdate},
};
use crate::cli::commands::account::{
    ChangePasswordOptions, LoginOptions, RegisterOptions, ResetConfirmOptions,
};
use anyhow::{Context, Result};
use serde_json::{Value, json};

/// # Errors
/// Returns an error if the server rejects the account.
pub async fn register(client: &ApiClient, options: RegisterOptions) -> Result<Value> {
    let account = NewAccount {
        email: options.email,
        first_name: options.first_name,
        last_name: options.last_name,
        phone_number: options.phone_number,
        password: options.password,
        password_confirm: options.password_confirm,
    };
    let response = client
        .register(&account)
        .await
        .context("registration failed")?;
    Ok(serde_json::to_value(response)?)
}

/// # Errors
/// Returns an error if the credentials are rejected.
pub async fn login(client: &ApiClient, options: LoginOptions) -> Result<Value> {
    let response = client
        .login(&options.email, &options.password)
        .await
        .context("login failed")?;
    Ok(serde_json::to_value(response)?)
}

/// Never fails on the network; the local session is always cleared.
///
/// # Errors
/// Does not fail; the signature matches the other actions.
#[allow(clippy::unnecessary_wraps)]
pub async fn logout(client: &ApiClient) -> Result<Value> {
    let destination = client.logout().await;
    Ok(json!({ "redirect_url": destination }))
}

/// # Errors
/// Returns an error if the profile cannot be fetched or updated.
pub async fn profile(client: &ApiClient, update: Option<ProfileUpdate>) -> Result<Value> {
    let user = match update {
        Some(update) => client
            .update_profile(&update)
            .await
            .context("profile update failed")?,
        None => client
            .get_profile()
            .await
            .context("failed to fetch profile")?,
    };
    Ok(serde_json::to_value(user)?)
}

/// # Errors
/// Returns an error if the server rejects the change.
pub async fn change_password(client: &ApiClient, options: ChangePasswordOptions) -> Result<Value> {
    let response = client
        .change_password(
            &options.old_password,
            &options.new_password,
            &options.confirm_password,
        )
        .await
        .context("password change failed")?;
    Ok(serde_json::to_value(response)?)
}

/// # Errors
/// Returns an error if the request fails.
pub async fn password_reset(client: &ApiClient, email: &str) -> Result<Value> {
    let response = client
        .request_password_reset(email)
        .await
        .context("password reset request failed")?;
    Ok(serde_json::to_value(response)?)
}

/// # Errors
/// Returns an error if the token or new password is rejected.
pub async fn password_reset_confirm(
    client: &ApiClient,
    options: ResetConfirmOptions,
) -> Result<Value> {
    let response = client
        .confirm_password_reset(
            &options.token,
            &options.new_password,
            &options.confirm_password,
        )
        .await
        .context("password reset failed")?;
    Ok(serde_json::to_value(response)?)
}

/// # Errors
/// Returns an error if enrollment cannot be started.
pub async fn two_factor_setup(client: &ApiClient) -> Result<Value> {
    let setup = client
        .two_factor_setup()
        .await
        .context("two-factor setup failed")?;
    Ok(serde_json::to_value(setup)?)
}

/// # Errors
/// Returns an error if the code is rejected.
pub async fn two_factor_verify(client: &ApiClient, code: &str) -> Result<Value> {
    let response = client
        .verify_two_factor(code)
        .await
        .context("two-factor verification failed")?;
    Ok(serde_json::to_value(response)?)
}

use crate::cli::actions::{Action, Session, account, dashboard};
use anyhow::{Context, Result};
use serde_json::Value;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let session = Session::connect(action.client_options())?;
    let client = &session.client;

    let output = match action {
        Action::Health(_) => dashboard::health(client).await,
        Action::Dashboard(_, role) => dashboard::summary(client, role).await,
        Action::Register(_, options) => account::register(client, options).await,
        Action::Login(_, options) => account::login(client, options).await,
        Action::Logout(_) => account::logout(client).await,
        Action::Profile(_, update) => account::profile(client, update).await,
        Action::ChangePassword(_, options) => account::change_password(client, options).await,
        Action::PasswordReset(_, email) => account::password_reset(client, &email).await,
        Action::PasswordResetConfirm(_, options) => {
            account::password_reset_confirm(client, options).await
        }
        Action::TwoFactorSetup(_) => account::two_factor_setup(client).await,
        Action::TwoFactorVerify(_, code) => account::two_factor_verify(client, &code).await,
    };

    // Reported even on failure: a 401 redirects to the login route.
    for target in session.redirects() {
        eprintln!("redirect: {target}");
    }

    print_json(&output?)
}

fn print_json(value: &Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

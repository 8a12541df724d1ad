//! Maps validated CLI matches to an [`Action`].

use crate::cli::actions::Action;
use crate::cli::commands::{
    account::{
        self, CMD_CHANGE_PASSWORD, CMD_LOGIN, CMD_LOGOUT, CMD_PASSWORD_RESET,
        CMD_PASSWORD_RESET_CONFIRM, CMD_PROFILE, CMD_REGISTER, CMD_TWO_FACTOR_SETUP,
        CMD_TWO_FACTOR_VERIFY,
    },
    api,
    dashboard::{self, CMD_DASHBOARD, CMD_HEALTH},
};
use anyhow::{Result, bail};

/// # Errors
/// Returns an error if required arguments are missing or the subcommand is
/// unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let client = api::Options::parse(matches)?;

    let action = match matches.subcommand() {
        Some((CMD_HEALTH, _)) => Action::Health(client),
        Some((CMD_DASHBOARD, sub)) => Action::Dashboard(client, dashboard::parse_role(sub)),
        Some((CMD_REGISTER, sub)) => {
            Action::Register(client, account::RegisterOptions::parse(sub)?)
        }
        Some((CMD_LOGIN, sub)) => Action::Login(client, account::LoginOptions::parse(sub)?),
        Some((CMD_LOGOUT, _)) => Action::Logout(client),
        Some((CMD_PROFILE, sub)) => Action::Profile(client, account::parse_profile_update(sub)),
        Some((CMD_CHANGE_PASSWORD, sub)) => {
            Action::ChangePassword(client, account::ChangePasswordOptions::parse(sub)?)
        }
        Some((CMD_PASSWORD_RESET, sub)) => {
            Action::PasswordReset(client, account::parse_email(sub)?)
        }
        Some((CMD_PASSWORD_RESET_CONFIRM, sub)) => {
            Action::PasswordResetConfirm(client, account::ResetConfirmOptions::parse(sub)?)
        }
        Some((CMD_TWO_FACTOR_SETUP, _)) => Action::TwoFactorSetup(client),
        Some((CMD_TWO_FACTOR_VERIFY, sub)) => {
            Action::TwoFactorVerify(client, account::parse_code(sub)?)
        }
        Some((name, _)) => bail!("unknown command: {name}"),
        None => bail!("missing command"),
    };

    Ok(action)
}

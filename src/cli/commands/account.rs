//! Account subcommands. Secrets may come from flags or environment variables;
//! the environment values are hidden from `--help`.

use crate::api::types::ProfileUpdate;
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGIN: &str = "login";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_PROFILE: &str = "profile";
pub const CMD_CHANGE_PASSWORD: &str = "change-password";
pub const CMD_PASSWORD_RESET: &str = "password-reset";
pub const CMD_PASSWORD_RESET_CONFIRM: &str = "password-reset-confirm";
pub const CMD_TWO_FACTOR_SETUP: &str = "2fa-setup";
pub const CMD_TWO_FACTOR_VERIFY: &str = "2fa-verify";

const ARG_EMAIL: &str = "email";
const ARG_FIRST_NAME: &str = "first-name";
const ARG_LAST_NAME: &str = "last-name";
const ARG_PHONE_NUMBER: &str = "phone-number";
const ARG_PASSWORD: &str = "password";
const ARG_PASSWORD_CONFIRM: &str = "password-confirm";
const ARG_OLD_PASSWORD: &str = "old-password";
const ARG_NEW_PASSWORD: &str = "new-password";
const ARG_CONFIRM_PASSWORD: &str = "confirm-password";
const ARG_RESET_TOKEN: &str = "token";
const ARG_CODE: &str = "code";

fn email_arg() -> Arg {
    Arg::new(ARG_EMAIL)
        .long(ARG_EMAIL)
        .help("Account email address")
        .env("CHAMA_EMAIL")
        .required(true)
}

fn secret_arg(name: &'static str, env: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .env(env)
        .hide_env_values(true)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new(CMD_REGISTER)
            .about("Create an account and store the new session")
            .arg(email_arg())
            .arg(
                Arg::new(ARG_FIRST_NAME)
                    .long(ARG_FIRST_NAME)
                    .help("Given name")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_LAST_NAME)
                    .long(ARG_LAST_NAME)
                    .help("Family name")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_PHONE_NUMBER)
                    .long(ARG_PHONE_NUMBER)
                    .help("Phone number, e.g. +254712345678"),
            )
            .arg(secret_arg(ARG_PASSWORD, "CHAMA_PASSWORD", "Account password").required(true))
            .arg(secret_arg(
                ARG_PASSWORD_CONFIRM,
                "CHAMA_PASSWORD_CONFIRM",
                "Password confirmation (default: same as --password)",
            )),
        Command::new(CMD_LOGIN)
            .about("Sign in and store the session")
            .arg(email_arg())
            .arg(secret_arg(ARG_PASSWORD, "CHAMA_PASSWORD", "Account password").required(true)),
        Command::new(CMD_LOGOUT).about("End the session and forget the stored credential"),
        Command::new(CMD_PROFILE)
            .about("Show the profile, or update it when any field is given")
            .arg(
                Arg::new(ARG_FIRST_NAME)
                    .long(ARG_FIRST_NAME)
                    .help("New given name"),
            )
            .arg(
                Arg::new(ARG_LAST_NAME)
                    .long(ARG_LAST_NAME)
                    .help("New family name"),
            )
            .arg(
                Arg::new(ARG_PHONE_NUMBER)
                    .long(ARG_PHONE_NUMBER)
                    .help("New phone number"),
            ),
        Command::new(CMD_CHANGE_PASSWORD)
            .about("Change the account password")
            .arg(
                secret_arg(ARG_OLD_PASSWORD, "CHAMA_OLD_PASSWORD", "Current password")
                    .required(true),
            )
            .arg(secret_arg(ARG_NEW_PASSWORD, "CHAMA_NEW_PASSWORD", "New password").required(true))
            .arg(secret_arg(
                ARG_CONFIRM_PASSWORD,
                "CHAMA_CONFIRM_PASSWORD",
                "New password confirmation (default: same as --new-password)",
            )),
        Command::new(CMD_PASSWORD_RESET)
            .about("Email a password reset link")
            .arg(email_arg()),
        Command::new(CMD_PASSWORD_RESET_CONFIRM)
            .about("Set a new password with a reset token")
            .arg(
                secret_arg(ARG_RESET_TOKEN, "CHAMA_RESET_TOKEN", "Token from the reset email")
                    .required(true),
            )
            .arg(secret_arg(ARG_NEW_PASSWORD, "CHAMA_NEW_PASSWORD", "New password").required(true))
            .arg(secret_arg(
                ARG_CONFIRM_PASSWORD,
                "CHAMA_CONFIRM_PASSWORD",
                "New password confirmation (default: same as --new-password)",
            )),
        Command::new(CMD_TWO_FACTOR_SETUP).about("Start authenticator app enrollment"),
        Command::new(CMD_TWO_FACTOR_VERIFY)
            .about("Finish enrollment with a code from the authenticator app")
            .arg(
                Arg::new(ARG_CODE)
                    .long(ARG_CODE)
                    .help("Six digit code")
                    .required(true),
            ),
    ]
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn required_secret(matches: &ArgMatches, name: &str) -> Result<SecretString> {
    required(matches, name).map(SecretString::from)
}

/// Confirmation falls back to the primary secret when omitted.
fn confirmation(matches: &ArgMatches, name: &str, primary: &SecretString) -> SecretString {
    matches
        .get_one::<String>(name)
        .cloned()
        .map_or_else(|| primary.clone(), SecretString::from)
}

#[derive(Debug)]
pub struct RegisterOptions {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub password: SecretString,
    pub password_confirm: SecretString,
}

impl RegisterOptions {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let password = required_secret(matches, ARG_PASSWORD)?;
        Ok(Self {
            email: required(matches, ARG_EMAIL)?,
            first_name: required(matches, ARG_FIRST_NAME)?,
            last_name: required(matches, ARG_LAST_NAME)?,
            phone_number: matches.get_one::<String>(ARG_PHONE_NUMBER).cloned(),
            password_confirm: confirmation(matches, ARG_PASSWORD_CONFIRM, &password),
            password,
        })
    }
}

#[derive(Debug)]
pub struct LoginOptions {
    pub email: String,
    pub password: SecretString,
}

impl LoginOptions {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            email: required(matches, ARG_EMAIL)?,
            password: required_secret(matches, ARG_PASSWORD)?,
        })
    }
}

/// `None` means show the profile.
#[must_use]
pub fn parse_profile_update(matches: &ArgMatches) -> Option<ProfileUpdate> {
    let update = ProfileUpdate {
        first_name: matches.get_one::<String>(ARG_FIRST_NAME).cloned(),
        last_name: matches.get_one::<String>(ARG_LAST_NAME).cloned(),
        phone_number: matches.get_one::<String>(ARG_PHONE_NUMBER).cloned(),
    };
    (!update.is_empty()).then_some(update)
}

#[derive(Debug)]
pub struct ChangePasswordOptions {
    pub old_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

impl ChangePasswordOptions {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let new_password = required_secret(matches, ARG_NEW_PASSWORD)?;
        Ok(Self {
            old_password: required_secret(matches, ARG_OLD_PASSWORD)?,
            confirm_password: confirmation(matches, ARG_CONFIRM_PASSWORD, &new_password),
            new_password,
        })
    }
}

#[derive(Debug)]
pub struct ResetConfirmOptions {
    pub token: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

impl ResetConfirmOptions {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let new_password = required_secret(matches, ARG_NEW_PASSWORD)?;
        Ok(Self {
            token: required_secret(matches, ARG_RESET_TOKEN)?,
            confirm_password: confirmation(matches, ARG_CONFIRM_PASSWORD, &new_password),
            new_password,
        })
    }
}

/// # Errors
/// Returns an error if `--email` is missing.
pub fn parse_email(matches: &ArgMatches) -> Result<String> {
    required(matches, ARG_EMAIL)
}

/// # Errors
/// Returns an error if `--code` is missing.
pub fn parse_code(matches: &ArgMatches) -> Result<String> {
    required(matches, ARG_CODE)
}

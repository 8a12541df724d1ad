//! Connection flags shared by every subcommand.

use crate::api::config::{DEFAULT_API_BASE_URL, ENV_API_BASE_URL};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::{path::PathBuf, time::Duration};

pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_TIMEOUT: &str = "timeout";
pub const ARG_SESSION_FILE: &str = "session-file";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .long(ARG_API_BASE_URL)
                .help("API base URL, including the version prefix")
                .env(ENV_API_BASE_URL)
                .default_value(DEFAULT_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long(ARG_TIMEOUT)
                .help("Request timeout in seconds")
                .env("CHAMA_TIMEOUT")
                .default_value("30")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long(ARG_SESSION_FILE)
                .help("Where the session credential and profile are kept (default: ~/.chama/session.json)")
                .env("CHAMA_SESSION_FILE")
                .global(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub api_base_url: String,
    pub timeout: Duration,
    pub session_file: PathBuf,
}

impl Options {
    /// # Errors
    /// Returns an error if the base URL is missing or no session file location
    /// can be determined.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let api_base_url = matches
            .get_one::<String>(ARG_API_BASE_URL)
            .cloned()
            .context("missing required argument: --api-base-url")?;
        let timeout = Duration::from_secs(matches.get_one::<u64>(ARG_TIMEOUT).copied().unwrap_or(30));
        let session_file = match matches.get_one::<PathBuf>(ARG_SESSION_FILE) {
            Some(path) => path.clone(),
            None => default_session_file()?,
        };

        Ok(Self {
            api_base_url,
            timeout,
            session_file,
        })
    }
}

fn default_session_file() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".chama").join("session.json"))
        .context("could not determine home directory; pass --session-file")
}

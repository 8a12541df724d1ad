pub mod account;
pub mod dashboard;

// Internal "interpreter" for `Action`.
mod run;

use crate::api::{
    ApiClient, ClientConfig, FileSessionStore, MemoryNavigator, Navigator, dashboard::DashboardRole,
    types::ProfileUpdate,
};
use crate::cli::commands::{
    account::{ChangePasswordOptions, LoginOptions, RegisterOptions, ResetConfirmOptions},
    api,
};
use anyhow::{Context, Result};
use std::sync::Arc;

#[derive(Debug)]
pub enum Action {
    Health(api::Options),
    Dashboard(api::Options, Option<DashboardRole>),
    Register(api::Options, RegisterOptions),
    Login(api::Options, LoginOptions),
    Logout(api::Options),
    Profile(api::Options, Option<ProfileUpdate>),
    ChangePassword(api::Options, ChangePasswordOptions),
    PasswordReset(api::Options, String),
    PasswordResetConfirm(api::Options, ResetConfirmOptions),
    TwoFactorSetup(api::Options),
    TwoFactorVerify(api::Options, String),
}

impl Action {
    #[must_use]
    pub fn client_options(&self) -> &api::Options {
        match self {
            Self::Health(options)
            | Self::Dashboard(options, _)
            | Self::Register(options, _)
            | Self::Login(options, _)
            | Self::Logout(options)
            | Self::Profile(options, _)
            | Self::ChangePassword(options, _)
            | Self::PasswordReset(options, _)
            | Self::PasswordResetConfirm(options, _)
            | Self::TwoFactorSetup(options)
            | Self::TwoFactorVerify(options, _) => options,
        }
    }

    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> Result<()> {
        run::execute(self).await
    }
}

/// A client backed by the on-disk session file. The navigator only records
/// redirects so they can be reported after the command runs.
pub struct Session {
    pub client: ApiClient,
    navigator: Arc<MemoryNavigator>,
}

impl Session {
    /// # Errors
    /// Returns an error if the client cannot be built from `options`.
    pub fn connect(options: &api::Options) -> Result<Self> {
        let config = ClientConfig::new(&options.api_base_url).with_timeout(options.timeout);
        let navigator = Arc::new(MemoryNavigator::default());
        let client = ApiClient::builder(config)
            .session_store(Arc::new(FileSessionStore::new(options.session_file.clone())))
            .navigator(navigator.clone())
            .build()
            .context("failed to build API client")?;

        Ok(Self { client, navigator })
    }

    /// Routes the client was sent to during this run, oldest first.
    #[must_use]
    pub fn redirects(&self) -> Vec<String> {
        self.navigator.history()
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.navigator.current_path()
    }
}

use crate::api::{ApiClient, dashboard::DashboardRole};
use anyhow::{Context, Result, bail};
use serde_json::Value;

/// # Errors
/// Returns an error if the API is unreachable or reports itself unhealthy.
pub async fn health(client: &ApiClient) -> Result<Value> {
    let status = client.health().await.context("health check failed")?;
    if !status.is_healthy() {
        bail!("API reported status {:?}", status.status);
    }
    Ok(serde_json::to_value(status)?)
}

/// Shows the dashboard for `role`, or for the stored user's role when none is
/// given. Without a stored profile the profile is fetched first.
///
/// # Errors
/// Returns an error if the profile or dashboard cannot be fetched.
pub async fn summary(client: &ApiClient, role: Option<DashboardRole>) -> Result<Value> {
    let role = match role {
        Some(role) => role,
        None => {
            let user = match client.current_user() {
                Some(user) => user,
                None => client
                    .get_profile()
                    .await
                    .context("failed to fetch profile")?,
            };
            DashboardRole::for_user(&user)
        }
    };

    let value = match role {
        DashboardRole::Member => serde_json::to_value(
            client
                .member_dashboard()
                .await
                .context("failed to fetch member dashboard")?,
        )?,
        DashboardRole::Treasurer => serde_json::to_value(
            client
                .treasurer_dashboard()
                .await
                .context("failed to fetch treasurer dashboard")?,
        )?,
    };
    Ok(value)
}

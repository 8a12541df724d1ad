//! Read-only views backing the member and treasurer dashboards plus the API
//! health probe. Amounts are in the group's currency units as sent by the
//! server.

use super::{ApiClient, ApiError, types::User};
use serde::{Deserialize, Serialize};

pub const MEMBER_DASHBOARD_PATH: &str = "/accounts/dashboard/summary/";
/// Route the web client reads. The server also returns staff figures from
/// [`MEMBER_DASHBOARD_PATH`] when the user `is_staff`.
pub const TREASURER_DASHBOARD_PATH: &str = "/dashboard/treasurer/";
pub const HEALTH_PATH: &str = "/health-check/";

/// Which dashboard a user lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DashboardRole {
    Member,
    Treasurer,
}

impl DashboardRole {
    /// Staff accounts manage the group's books; everyone else is a member.
    pub fn for_user(user: &User) -> Self {
        if user.is_staff {
            DashboardRole::Treasurer
        } else {
            DashboardRole::Member
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MemberDashboard {
    #[serde(default)]
    pub personal_balance: f64,
    #[serde(default)]
    pub group_balance: f64,
    #[serde(default)]
    pub next_meeting: Option<Meeting>,
    #[serde(default)]
    pub loan_status: Option<LoanStatus>,
    #[serde(default)]
    pub recent_transactions: Vec<Transaction>,
    #[serde(default)]
    pub contribution_summary: Option<ContributionSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub agenda: String,
    #[serde(default)]
    pub my_position: u32,
    #[serde(default)]
    pub total_positions: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanStatus {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub amount_borrowed: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub remaining_balance: f64,
    #[serde(default)]
    pub next_payment_date: Option<String>,
    #[serde(default)]
    pub next_payment_amount: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Contribution,
    LoanPayment,
    LoanDisbursement,
    Payout,
    Fine,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    /// Present on group-wide listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributionSummary {
    #[serde(default)]
    pub this_month: f64,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub last_contribution_date: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreasurerDashboard {
    pub group_summary: GroupSummary,
    #[serde(default)]
    pub defaulters: Vec<Defaulter>,
    #[serde(default)]
    pub pending_actions: Option<PendingActions>,
    #[serde(default)]
    pub recent_group_transactions: Vec<Transaction>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(default)]
    pub total_balance: f64,
    #[serde(default)]
    pub total_collected_today: f64,
    #[serde(default)]
    pub outstanding_loans: f64,
    #[serde(default)]
    pub defaulters_count: u32,
    #[serde(default)]
    pub total_members: u32,
    #[serde(default)]
    pub attendance_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Defaulter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub amount: f64,
    #[serde(default)]
    pub days_overdue: u32,
    #[serde(default)]
    pub last_contribution: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingActions {
    #[serde(default)]
    pub pending_loans: u32,
    #[serde(default)]
    pub pending_approvals: u32,
    #[serde(default)]
    pub upcoming_meetings: u32,
    #[serde(default)]
    pub overdue_fines: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub api_version: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

impl ApiClient {
    /// # Errors
    /// Returns the pipeline error.
    pub async fn member_dashboard(&self) -> Result<MemberDashboard, ApiError> {
        self.get(MEMBER_DASHBOARD_PATH).await
    }

    /// # Errors
    /// Returns the pipeline error; non-staff users get `403`.
    pub async fn treasurer_dashboard(&self) -> Result<TreasurerDashboard, ApiError> {
        self.get(TREASURER_DASHBOARD_PATH).await
    }

    /// # Errors
    /// Returns the pipeline error.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get(HEALTH_PATH).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use anyhow::Result;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[test]
    fn role_follows_staff_flag() -> Result<()> {
        let member: User = serde_json::from_value(json!({"id": "1", "email": "m@x.co"}))?;
        let treasurer: User =
            serde_json::from_value(json!({"id": "2", "email": "t@x.co", "is_staff": true}))?;
        assert_eq!(DashboardRole::for_user(&member), DashboardRole::Member);
        assert_eq!(DashboardRole::for_user(&treasurer), DashboardRole::Treasurer);
        Ok(())
    }

    #[test]
    fn unknown_transaction_kind_is_other() -> Result<()> {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "t1",
            "date": "2025-05-01",
            "type": "welfare_levy",
            "amount": 200.0
        }))?;
        assert_eq!(tx.kind, TransactionKind::Other);
        Ok(())
    }

    #[tokio::test]
    async fn member_dashboard_parses_summary() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/accounts/dashboard/summary/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "personal_balance": 12500.0,
                "group_balance": 340000.0,
                "next_meeting": {
                    "date": "2025-06-07",
                    "time": "14:00",
                    "location": "Community hall",
                    "agenda": "Loan approvals",
                    "my_position": 3,
                    "total_positions": 12
                },
                "loan_status": null,
                "recent_transactions": [{
                    "id": "t1",
                    "date": "2025-05-30",
                    "type": "contribution",
                    "amount": 1000.0,
                    "description": "May contribution",
                    "status": "completed"
                }],
                "contribution_summary": {
                    "this_month": 1000.0,
                    "total": 12000.0,
                    "last_contribution_date": "2025-05-30"
                }
            })))
            .mount(&server)
            .await;

        let client =
            ApiClient::builder(ClientConfig::new(&format!("{}/api/v1", server.uri()))).build()?;
        let dashboard = client.member_dashboard().await?;

        assert!((dashboard.personal_balance - 12500.0).abs() < f64::EPSILON);
        assert!(dashboard.loan_status.is_none());
        assert_eq!(dashboard.next_meeting.map(|m| m.my_position), Some(3));
        assert_eq!(dashboard.recent_transactions.len(), 1);
        assert_eq!(
            dashboard.recent_transactions[0].kind,
            TransactionKind::Contribution
        );
        Ok(())
    }

    #[tokio::test]
    async fn treasurer_dashboard_parses_defaulters() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/dashboard/treasurer/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "group_summary": {
                    "total_balance": 340000.0,
                    "total_collected_today": 4000.0,
                    "outstanding_loans": 85000.0,
                    "defaulters_count": 1,
                    "total_members": 20,
                    "attendance_rate": 0.9
                },
                "defaulters": [{
                    "id": "m7",
                    "name": "Baraka Mwangi",
                    "phone": "+254733000000",
                    "amount": 1500.0,
                    "days_overdue": 12,
                    "last_contribution": "2025-04-15"
                }],
                "pending_actions": {
                    "pending_loans": 2,
                    "pending_approvals": 1,
                    "upcoming_meetings": 1,
                    "overdue_fines": 0
                },
                "recent_group_transactions": []
            })))
            .mount(&server)
            .await;

        let client =
            ApiClient::builder(ClientConfig::new(&format!("{}/api/v1", server.uri()))).build()?;
        let dashboard = client.treasurer_dashboard().await?;

        assert_eq!(dashboard.group_summary.total_members, 20);
        assert_eq!(dashboard.defaulters.len(), 1);
        assert_eq!(dashboard.defaulters[0].days_overdue, 12);
        assert_eq!(dashboard.pending_actions.map(|p| p.pending_loans), Some(2));
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_status() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/health-check/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "healthy",
                "service": "ChamaNexus API",
                "timestamp": "2025-06-01T10:00:00Z",
                "debug": false,
                "api_version": "v1"
            })))
            .mount(&server)
            .await;

        let client =
            ApiClient::builder(ClientConfig::new(&format!("{}/api/v1", server.uri()))).build()?;
        let health = client.health().await?;
        assert!(health.is_healthy());
        assert_eq!(health.api_version.as_deref(), Some("v1"));
        Ok(())
    }
}

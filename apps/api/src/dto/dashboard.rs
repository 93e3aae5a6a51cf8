use leavedesk_application::{DashboardSummary, OrganisationSummary, StatusCount};
use serde::Serialize;
use ts_rs::TS;

use super::LeaveBalanceResponse;

/// Number of requests in one status.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/status-count-response.ts"
)]
pub struct StatusCountResponse {
    pub status: String,
    pub count: u64,
}

/// Organisation-wide figures, present for HR and leadership.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/organisation-summary-response.ts"
)]
pub struct OrganisationSummaryResponse {
    pub counts: Vec<StatusCountResponse>,
    pub on_leave_today: u64,
}

/// Role-specific dashboard of the signed-in user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/dashboard-response.ts"
)]
pub struct DashboardResponse {
    pub today: String,
    pub own_counts: Vec<StatusCountResponse>,
    pub balances: Vec<LeaveBalanceResponse>,
    pub queue_size: u64,
    pub organisation: Option<OrganisationSummaryResponse>,
}

impl From<StatusCount> for StatusCountResponse {
    fn from(count: StatusCount) -> Self {
        Self {
            status: count.status.as_str().to_owned(),
            count: count.count,
        }
    }
}

impl From<OrganisationSummary> for OrganisationSummaryResponse {
    fn from(summary: OrganisationSummary) -> Self {
        Self {
            counts: summary
                .counts
                .into_iter()
                .map(StatusCountResponse::from)
                .collect(),
            on_leave_today: summary.on_leave_today,
        }
    }
}

impl From<DashboardSummary> for DashboardResponse {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            today: summary.today.to_string(),
            own_counts: summary
                .own_counts
                .into_iter()
                .map(StatusCountResponse::from)
                .collect(),
            balances: summary
                .balances
                .into_iter()
                .map(LeaveBalanceResponse::from)
                .collect(),
            queue_size: summary.queue_size,
            organisation: summary.organisation.map(OrganisationSummaryResponse::from),
        }
    }
}

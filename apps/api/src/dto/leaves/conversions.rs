use leavedesk_application::{BulkActionOutcome, LeaveBalance, Page};
use leavedesk_domain::{ApprovalRecord, LeaveRequest};

use super::{
    ApprovalRecordResponse, BulkActionResponse, BulkFailureResponse, LeaveBalanceResponse,
    LeavePageResponse, LeaveRequestResponse,
};

impl From<&ApprovalRecord> for ApprovalRecordResponse {
    fn from(record: &ApprovalRecord) -> Self {
        Self {
            actor_id: record.actor_id.to_string(),
            actor_role: record.actor_role.as_str().to_owned(),
            action: record.action.as_str().to_owned(),
            from_status: record.from_status.map(|status| status.as_str().to_owned()),
            to_status: record.to_status.as_str().to_owned(),
            stage: record.stage.map(|stage| stage.as_str().to_owned()),
            comment: record.comment.clone(),
            acted_at: record.acted_at.to_rfc3339(),
        }
    }
}

impl From<LeaveRequest> for LeaveRequestResponse {
    fn from(request: LeaveRequest) -> Self {
        let range = request.range();

        Self {
            id: request.id().to_string(),
            requester_id: request.requester_id().to_string(),
            requester_name: request.requester_name().to_owned(),
            department: request.department().to_owned(),
            leave_type: request.leave_type().as_str().to_owned(),
            start_date: range.start().to_string(),
            end_date: range.end().to_string(),
            working_days: request.working_days(),
            reason: request.reason().to_owned(),
            status: request.status().as_str().to_owned(),
            current_stage: request
                .current_stage()
                .map(|stage| stage.as_str().to_owned()),
            approvals: request
                .approvals()
                .iter()
                .map(ApprovalRecordResponse::from)
                .collect(),
            created_at: request.created_at().to_rfc3339(),
            updated_at: request.updated_at().to_rfc3339(),
        }
    }
}

impl From<Page<LeaveRequest>> for LeavePageResponse {
    fn from(page: Page<LeaveRequest>) -> Self {
        Self {
            items: page
                .items
                .into_iter()
                .map(LeaveRequestResponse::from)
                .collect(),
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        }
    }
}

impl From<BulkActionOutcome> for BulkActionResponse {
    fn from(outcome: BulkActionOutcome) -> Self {
        Self {
            succeeded: outcome.succeeded.iter().map(ToString::to_string).collect(),
            failed: outcome
                .failed
                .into_iter()
                .map(|failure| BulkFailureResponse {
                    id: failure.id.to_string(),
                    message: failure.message,
                })
                .collect(),
        }
    }
}

impl From<LeaveBalance> for LeaveBalanceResponse {
    fn from(balance: LeaveBalance) -> Self {
        Self {
            leave_type: balance.leave_type.as_str().to_owned(),
            entitled: balance.entitled,
            carried: balance.carried,
            used: balance.used,
            pending: balance.pending,
            remaining: balance.remaining,
            enforced: balance.enforced,
        }
    }
}

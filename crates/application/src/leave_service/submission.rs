use chrono::Datelike;
use leavedesk_domain::{ApprovalStage, DateRange, LeaveDraft, WorkingCalendar};

use super::*;

impl LeaveService {
    /// Submits a new leave request for the actor.
    pub async fn submit(
        &self,
        actor: &UserIdentity,
        input: SubmitLeaveInput,
    ) -> AppResult<LeaveRequest> {
        let requester = self
            .authorization_service
            .require_permission(actor, Permission::LeaveSubmit)
            .await?;

        let (draft, initial_stage) = self.prepare_draft(&requester, input).await?;
        let request = LeaveRequest::submit(
            &requester.acting_user(),
            requester.name.clone(),
            draft,
            initial_stage,
            self.clock.now(),
        )?;
        self.leave_repository.create(&request).await?;

        tracing::info!(
            request_id = %request.id(),
            requester_id = %requester.id,
            leave_type = request.leave_type().as_str(),
            working_days = request.working_days(),
            stage = initial_stage.as_str(),
            "leave request submitted"
        );
        self.audit(
            actor,
            AuditAction::LeaveSubmitted,
            &request,
            format!(
                "{} leave {}..{} ({} working days)",
                request.leave_type().as_str(),
                request.range().start(),
                request.range().end(),
                request.working_days()
            ),
        )
        .await?;

        Ok(request)
    }

    /// Edits a returned request and sends it back into review.
    pub async fn resubmit(
        &self,
        actor: &UserIdentity,
        id: LeaveRequestId,
        input: SubmitLeaveInput,
    ) -> AppResult<LeaveRequest> {
        let requester = self
            .authorization_service
            .require_permission(actor, Permission::LeaveSubmit)
            .await?;
        let mut request = self.find_visible(&requester, id).await?;
        if request.requester_id() != requester.id {
            return Err(AppError::Forbidden(
                "only the requester can resubmit a leave request".to_owned(),
            ));
        }
        if request.status() != LeaveStatus::Returned {
            return Err(AppError::Conflict(format!(
                "cannot resubmit a request in status '{}'",
                request.status().as_str()
            )));
        }

        let (draft, initial_stage) = self.prepare_draft(&requester, input).await?;
        let step = request.resubmit(
            &requester.acting_user(),
            draft,
            initial_stage,
            self.clock.now(),
        )?;
        self.leave_repository.save_transition(&request, step).await?;

        self.audit(
            actor,
            AuditAction::LeaveResubmitted,
            &request,
            format!(
                "{} leave {}..{} ({} working days)",
                request.leave_type().as_str(),
                request.range().start(),
                request.range().end(),
                request.working_days()
            ),
        )
        .await?;

        Ok(request)
    }

    /// Runs every submission rule and picks the stage the request starts at.
    async fn prepare_draft(
        &self,
        requester: &UserRecord,
        input: SubmitLeaveInput,
    ) -> AppResult<(LeaveDraft, ApprovalStage)> {
        let range = DateRange::new(input.start_date, input.end_date)?;
        let holidays = self
            .holiday_repository
            .list_between(range.start(), range.end())
            .await?;
        let calendar = WorkingCalendar::new(holidays.iter().map(|holiday| holiday.date()));
        let working_days = calendar.working_days(&range);
        if working_days == 0 {
            return Err(AppError::Validation(
                "the requested dates do not contain any working day".to_owned(),
            ));
        }

        let policy = self
            .policy_repository
            .find(input.leave_type)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "no policy is configured for {} leave",
                    input.leave_type.as_str()
                ))
            })?;
        policy.check_request(&range, working_days, self.clock.today())?;

        if input.leave_type.is_balance_limited() {
            let balance = self
                .balance_of(requester, &policy, range.start().year())
                .await?;
            if i64::from(working_days) > balance.remaining {
                return Err(AppError::Validation(format!(
                    "insufficient {} balance: {} working day(s) requested, {} remaining",
                    input.leave_type.as_str(),
                    working_days,
                    balance.remaining.max(0)
                )));
            }
        }

        let overlapping = self
            .leave_repository
            .find_active_overlapping(requester.id, range)
            .await?;
        if let Some(existing) = overlapping.first() {
            return Err(AppError::Conflict(format!(
                "the requested dates overlap leave request '{}' ({}..{})",
                existing.id(),
                existing.range().start(),
                existing.range().end()
            )));
        }

        let mut initial_stage = ApprovalStage::initial_for(requester.role);
        if initial_stage == ApprovalStage::DepartmentHead
            && !self
                .user_repository
                .has_active_department_head(&requester.department)
                .await?
        {
            initial_stage = ApprovalStage::HrAdmin;
        }

        Ok((
            LeaveDraft {
                leave_type: input.leave_type,
                range,
                working_days,
                reason: input.reason,
            },
            initial_stage,
        ))
    }
}

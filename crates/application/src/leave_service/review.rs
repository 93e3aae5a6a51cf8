use std::collections::HashSet;

use super::*;

impl LeaveService {
    /// Applies one review or cancel action to a request.
    ///
    /// The write is conditional on the status and stage the transition was
    /// computed from, so two reviewers racing on the same request cannot
    /// both succeed.
    pub async fn act(
        &self,
        actor: &UserIdentity,
        id: LeaveRequestId,
        action: ApprovalAction,
        comment: Option<String>,
    ) -> AppResult<LeaveRequest> {
        let user = self.authorization_service.resolve_actor(actor).await?;
        let mut request = self.find_visible(&user, id).await?;

        let step = request.apply(
            &user.acting_user(),
            action,
            comment,
            self.clock.today(),
            self.clock.now(),
        )?;
        self.leave_repository.save_transition(&request, step).await?;

        tracing::info!(
            request_id = %request.id(),
            actor_id = %user.id,
            action = action.as_str(),
            from = step.from.as_str(),
            to = step.to.as_str(),
            next_stage = step.next_stage.map(|stage| stage.as_str()),
            "leave request transitioned"
        );

        let mut detail = format!("{} -> {}", step.from.as_str(), step.to.as_str());
        if let Some(next_stage) = step.next_stage {
            detail.push_str(&format!(" (stage {})", next_stage.as_str()));
        }
        if let Some(comment) = request
            .approvals()
            .last()
            .and_then(|record| record.comment.as_deref())
        {
            detail.push_str(&format!(": {comment}"));
        }
        // The transition is committed at this point, so an audit failure is logged, not returned.
        if let Err(error) = self
            .audit(actor, audit_action_for(action), &request, detail)
            .await
        {
            tracing::error!(
                request_id = %request.id(),
                actor_id = %user.id,
                error = %error,
                "failed to record audit event for committed transition"
            );
        }

        Ok(request)
    }

    /// Applies one review action to many requests, one at a time in order.
    ///
    /// Each id succeeds or fails on its own; there is no rollback. An id whose
    /// transition was saved counts as succeeded even if its audit row was lost.
    pub async fn bulk_act(
        &self,
        actor: &UserIdentity,
        input: BulkActionInput,
    ) -> AppResult<BulkActionOutcome> {
        if !input.action.is_review() {
            return Err(AppError::Validation(format!(
                "'{}' cannot be applied in bulk",
                input.action.as_str()
            )));
        }
        if input.ids.is_empty() {
            return Err(AppError::Validation("ids must not be empty".to_owned()));
        }
        if input.ids.len() > BULK_ACTION_MAX_IDS {
            return Err(AppError::Validation(format!(
                "at most {BULK_ACTION_MAX_IDS} requests can be processed at once"
            )));
        }

        self.authorization_service.resolve_actor(actor).await?;

        let mut seen = HashSet::new();
        let mut outcome = BulkActionOutcome::default();
        for id in input.ids {
            if !seen.insert(id) {
                continue;
            }

            match self
                .act(actor, id, input.action, input.comment.clone())
                .await
            {
                Ok(_) => outcome.succeeded.push(id),
                Err(error) => outcome.failed.push(BulkFailure {
                    id,
                    message: error.to_string(),
                }),
            }
        }

        tracing::info!(
            action = input.action.as_str(),
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "bulk leave action processed"
        );

        Ok(outcome)
    }
}

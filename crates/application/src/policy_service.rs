use std::sync::Arc;

use async_trait::async_trait;
use leavedesk_core::{AppError, AppResult, UserIdentity};
use leavedesk_domain::{AuditAction, LeaveType, Permission, PolicyConfig, PolicyConfigInput};

use crate::{AuditEvent, AuditRepository, AuthorizationService};

/// Repository port for per-type leave policies.
#[async_trait]
pub trait PolicyRepository: Send + Sync {
    /// Lists all configured policies in leave type order.
    async fn list(&self) -> AppResult<Vec<PolicyConfig>>;

    /// Finds the policy for one leave type.
    async fn find(&self, leave_type: LeaveType) -> AppResult<Option<PolicyConfig>>;

    /// Inserts or replaces the policy for its leave type.
    async fn save(&self, policy: PolicyConfig) -> AppResult<PolicyConfig>;
}

/// Application service for leave policy configuration.
#[derive(Clone)]
pub struct PolicyService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn PolicyRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PolicyService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn PolicyRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Lists all policies. Readable by every signed-in user.
    pub async fn list_policies(&self, actor: &UserIdentity) -> AppResult<Vec<PolicyConfig>> {
        self.authorization_service.resolve_actor(actor).await?;
        self.repository.list().await
    }

    /// Returns the policy for one leave type.
    pub async fn get_policy(
        &self,
        actor: &UserIdentity,
        leave_type: LeaveType,
    ) -> AppResult<PolicyConfig> {
        self.authorization_service.resolve_actor(actor).await?;
        self.repository.find(leave_type).await?.ok_or_else(|| {
            AppError::NotFound(format!(
                "no policy configured for leave type '{}'",
                leave_type.as_str()
            ))
        })
    }

    /// Validates and stores a policy, replacing any previous one for the type.
    pub async fn save_policy(
        &self,
        actor: &UserIdentity,
        input: PolicyConfigInput,
    ) -> AppResult<PolicyConfig> {
        self.authorization_service
            .require_permission(actor, Permission::PolicyManage)
            .await?;

        let policy = PolicyConfig::new(input)?;
        let saved = self.repository.save(policy).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.subject().to_owned(),
                action: AuditAction::PolicyUpdated,
                resource_type: "policy_config".to_owned(),
                resource_id: saved.leave_type().as_str().to_owned(),
                detail: Some(format!(
                    "max_days={} min_days={} notice_days={} carry_limit={}",
                    saved.max_days(),
                    saved.min_days(),
                    saved.notice_days(),
                    saved.carry_limit()
                )),
            })
            .await?;

        Ok(saved)
    }
}

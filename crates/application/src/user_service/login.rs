use super::*;

impl UserService {
    /// Authenticates a user with email and password.
    ///
    /// Unknown email, wrong password and deactivated accounts all produce
    /// `AuthOutcome::Failed` so callers cannot tell them apart.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthOutcome> {
        let normalized = email.trim().to_lowercase();
        let Some(user) = self.user_repository.find_by_email(&normalized).await? else {
            // Keep the response time close to the known-user path.
            let _ = self.password_hasher.hash_password(password);
            return Ok(AuthOutcome::Failed);
        };

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)?;

        if !password_valid {
            tracing::info!(user_id = %user.id, "login rejected: invalid password");
            return Ok(AuthOutcome::Failed);
        }
        if !user.is_active {
            tracing::info!(user_id = %user.id, "login rejected: account deactivated");
            return Ok(AuthOutcome::Failed);
        }

        Ok(AuthOutcome::Authenticated(user))
    }

    /// Creates the first super admin of an empty directory.
    ///
    /// The caller checks the bootstrap token.
    pub async fn bootstrap_super_admin(&self, input: BootstrapInput) -> AppResult<UserRecord> {
        if self.user_repository.count().await? > 0 {
            return Err(AppError::Conflict(
                "the user directory is already initialised".to_owned(),
            ));
        }

        let new_user = self.validated_new_user(
            input.name,
            input.email,
            Role::SuperAdmin,
            input.department,
            input.password.as_str(),
        )?;
        let user = self.user_repository.create(new_user).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: user.id.to_string(),
                action: AuditAction::AuthBootstrapped,
                resource_type: "user".to_owned(),
                resource_id: user.id.to_string(),
                detail: Some(format!("bootstrapped super admin '{}'", user.email)),
            })
            .await?;

        Ok(user)
    }

    /// Changes the signed-in user's password after checking the current one.
    pub async fn change_password(
        &self,
        actor: &UserIdentity,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.authorization_service.resolve_actor(actor).await?;

        let current_valid = self
            .password_hasher
            .verify_password(current_password, &user.password_hash)?;
        if !current_valid {
            return Err(AppError::Unauthorized(
                "current password is incorrect".to_owned(),
            ));
        }

        validate_password(new_password)?;
        let new_hash = self.password_hasher.hash_password(new_password)?;
        self.user_repository
            .update_password(user.id, &new_hash)
            .await
    }
}

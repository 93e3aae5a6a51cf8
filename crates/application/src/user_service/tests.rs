use std::sync::Arc;

use leavedesk_core::{AppError, UserIdentity};
use leavedesk_domain::{AuditAction, Role};

use crate::test_fakes::{
    FakeAuditRepository, FakePasswordHasher, FakeUserRepository, TEST_PASSWORD, identity_for,
    user_record,
};
use crate::{
    AuthOutcome, AuthorizationService, BootstrapInput, CreateUserInput, UpdateUserInput,
    UserQuery, UserRecord,
};

use super::UserService;

struct Fixture {
    service: UserService,
    users: Arc<FakeUserRepository>,
    audit: Arc<FakeAuditRepository>,
}

fn fixture(users: Vec<UserRecord>) -> Fixture {
    let users = Arc::new(FakeUserRepository::with_users(users));
    let audit = Arc::new(FakeAuditRepository::default());
    let service = UserService::new(
        AuthorizationService::new(users.clone()),
        users.clone(),
        Arc::new(FakePasswordHasher),
        audit.clone(),
    );

    Fixture {
        service,
        users,
        audit,
    }
}

fn hr_admin() -> UserRecord {
    user_record("Hana", "hana@example.com", Role::HrAdmin, "People")
}

fn create_input(email: &str, role: Role) -> CreateUserInput {
    CreateUserInput {
        name: "Ada Lovelace".to_owned(),
        email: email.to_owned(),
        role,
        department: "Engineering".to_owned(),
        password: "analytical engine".to_owned(),
    }
}

#[tokio::test]
async fn create_user_normalizes_email_and_audits() {
    let admin = hr_admin();
    let fixture = fixture(vec![admin.clone()]);

    let created = fixture
        .service
        .create_user(
            &identity_for(&admin),
            create_input("  Ada@Example.COM ", Role::Employee),
        )
        .await
        .unwrap_or_else(|error| panic!("create failed: {error}"));

    assert_eq!(created.email, "ada@example.com");
    assert_ne!(created.password_hash, "analytical engine");
    let events = fixture.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::UserCreated);
    assert_eq!(events[0].resource_id, created.id.to_string());
}

#[tokio::test]
async fn invalid_email_is_rejected_and_nothing_is_persisted() {
    let admin = hr_admin();
    let fixture = fixture(vec![admin.clone()]);

    let result = fixture
        .service
        .create_user(
            &identity_for(&admin),
            create_input("not-an-email", Role::Employee),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(fixture.users.users.lock().await.len(), 1);
    assert!(fixture.audit.events.lock().await.is_empty());
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let admin = hr_admin();
    let fixture = fixture(vec![admin.clone()]);

    let result = fixture
        .service
        .create_user(
            &identity_for(&admin),
            create_input("HANA@example.com", Role::Employee),
        )
        .await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn hr_admin_cannot_create_super_admin() {
    let admin = hr_admin();
    let fixture = fixture(vec![admin.clone()]);

    let result = fixture
        .service
        .create_user(
            &identity_for(&admin),
            create_input("root@example.com", Role::SuperAdmin),
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn employees_cannot_manage_users() {
    let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
    let fixture = fixture(vec![employee.clone()]);

    let result = fixture
        .service
        .list_users(
            &identity_for(&employee),
            UserQuery {
                limit: 50,
                ..UserQuery::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn update_user_changes_role_and_department() {
    let admin = hr_admin();
    let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
    let fixture = fixture(vec![admin.clone(), employee.clone()]);

    let updated = fixture
        .service
        .update_user(
            &identity_for(&admin),
            employee.id,
            UpdateUserInput {
                role: Some(Role::DepartmentHead),
                department: Some(" Research ".to_owned()),
                ..UpdateUserInput::default()
            },
        )
        .await
        .unwrap_or_else(|error| panic!("update failed: {error}"));

    assert_eq!(updated.role, Role::DepartmentHead);
    assert_eq!(updated.department, "Research");
    assert_eq!(updated.name, "Ada");
}

#[tokio::test]
async fn admins_cannot_change_their_own_role() {
    let admin = hr_admin();
    let fixture = fixture(vec![admin.clone()]);

    let result = fixture
        .service
        .update_user(
            &identity_for(&admin),
            admin.id,
            UpdateUserInput {
                role: Some(Role::Employee),
                ..UpdateUserInput::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn deactivated_user_can_no_longer_sign_in() {
    let admin = hr_admin();
    let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
    let fixture = fixture(vec![admin.clone(), employee.clone()]);

    let before = fixture
        .service
        .login("ada@example.com", TEST_PASSWORD)
        .await;
    assert!(matches!(before, Ok(AuthOutcome::Authenticated(_))));

    let deactivated = fixture
        .service
        .deactivate_user(&identity_for(&admin), employee.id)
        .await
        .unwrap_or_else(|error| panic!("deactivate failed: {error}"));
    assert!(!deactivated.is_active);

    let after = fixture
        .service
        .login("ada@example.com", TEST_PASSWORD)
        .await;
    assert!(matches!(after, Ok(AuthOutcome::Failed)));
}

#[tokio::test]
async fn admins_cannot_deactivate_themselves() {
    let admin = hr_admin();
    let fixture = fixture(vec![admin.clone()]);

    let result = fixture
        .service
        .deactivate_user(&identity_for(&admin), admin.id)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn login_fails_generically() {
    let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
    let fixture = fixture(vec![employee]);

    let unknown = fixture
        .service
        .login("nobody@example.com", TEST_PASSWORD)
        .await;
    let wrong = fixture
        .service
        .login("ADA@example.com", "wrong password")
        .await;

    assert!(matches!(unknown, Ok(AuthOutcome::Failed)));
    assert!(matches!(wrong, Ok(AuthOutcome::Failed)));
}

#[tokio::test]
async fn bootstrap_only_works_on_empty_directory() {
    let fixture = fixture(Vec::new());
    let input = BootstrapInput {
        name: "Root".to_owned(),
        email: "root@example.com".to_owned(),
        department: "Administration".to_owned(),
        password: "bootstrap secret".to_owned(),
    };

    let first = fixture.service.bootstrap_super_admin(input.clone()).await;
    let second = fixture.service.bootstrap_super_admin(input).await;

    assert_eq!(first.ok().map(|user| user.role), Some(Role::SuperAdmin));
    assert!(matches!(second, Err(AppError::Conflict(_))));
    let events = fixture.audit.events.lock().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, AuditAction::AuthBootstrapped);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let employee = user_record("Ada", "ada@example.com", Role::Employee, "Engineering");
    let fixture = fixture(vec![employee.clone()]);
    let actor: UserIdentity = identity_for(&employee);

    let wrong = fixture
        .service
        .change_password(&actor, "not my password", "a brand new secret")
        .await;
    let weak = fixture
        .service
        .change_password(&actor, TEST_PASSWORD, "short")
        .await;
    let changed = fixture
        .service
        .change_password(&actor, TEST_PASSWORD, "a brand new secret")
        .await;

    assert!(matches!(wrong, Err(AppError::Unauthorized(_))));
    assert!(matches!(weak, Err(AppError::Validation(_))));
    assert!(changed.is_ok());
    assert!(matches!(
        fixture
            .service
            .login("ada@example.com", "a brand new secret")
            .await,
        Ok(AuthOutcome::Authenticated(_))
    ));
}

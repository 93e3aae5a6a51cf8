use std::str::FromStr;

use leavedesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Organisational role carried by every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular staff member.
    Employee,
    /// Head of one department; first approval stage for its members.
    DepartmentHead,
    /// HR administrator; second approval stage.
    HrAdmin,
    /// Head of HR; final approval stage.
    HrHead,
    /// Chief executive; final approval stage.
    Ceo,
    /// System administrator managing users and policies.
    SuperAdmin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::DepartmentHead => "department_head",
            Self::HrAdmin => "hr_admin",
            Self::HrHead => "hr_head",
            Self::Ceo => "ceo",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Employee,
            Role::DepartmentHead,
            Role::HrAdmin,
            Role::HrHead,
            Role::Ceo,
            Role::SuperAdmin,
        ];

        ALL
    }

    /// Returns the static permission grants for this role.
    #[must_use]
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::{
            AuditRead, HolidayManage, LeaveReadAll, LeaveReviewDepartment, LeaveReviewFinal,
            LeaveReviewHr, LeaveSubmit, PolicyManage, UserManage,
        };

        match self {
            Self::Employee => &[LeaveSubmit],
            Self::DepartmentHead => &[LeaveSubmit, LeaveReviewDepartment],
            Self::HrAdmin => &[
                LeaveSubmit,
                LeaveReviewHr,
                LeaveReadAll,
                UserManage,
                HolidayManage,
            ],
            Self::HrHead => &[LeaveSubmit, LeaveReviewFinal, LeaveReadAll, AuditRead],
            Self::Ceo => &[LeaveSubmit, LeaveReviewFinal, LeaveReadAll],
            Self::SuperAdmin => &[
                LeaveReadAll,
                UserManage,
                PolicyManage,
                HolidayManage,
                AuditRead,
            ],
        }
    }

    /// Returns whether the role carries the permission.
    #[must_use]
    pub fn grants(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "employee" => Ok(Self::Employee),
            "department_head" => Ok(Self::DepartmentHead),
            "hr_admin" => Ok(Self::HrAdmin),
            "hr_head" => Ok(Self::HrHead),
            "ceo" => Ok(Self::Ceo),
            "super_admin" => Ok(Self::SuperAdmin),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Permissions enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows submitting own leave requests.
    LeaveSubmit,
    /// Allows reviewing requests at the department head stage.
    LeaveReviewDepartment,
    /// Allows reviewing requests at the HR admin stage.
    LeaveReviewHr,
    /// Allows final approval decisions.
    LeaveReviewFinal,
    /// Allows reading every leave request in the organisation.
    LeaveReadAll,
    /// Allows managing user accounts.
    UserManage,
    /// Allows editing leave policy configuration.
    PolicyManage,
    /// Allows maintaining the holiday calendar.
    HolidayManage,
    /// Allows reading audit log entries.
    AuditRead,
}

impl Permission {
    /// Returns a stable value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeaveSubmit => "leave.submit",
            Self::LeaveReviewDepartment => "leave.review.department",
            Self::LeaveReviewHr => "leave.review.hr",
            Self::LeaveReviewFinal => "leave.review.final",
            Self::LeaveReadAll => "leave.read.all",
            Self::UserManage => "user.manage",
            Self::PolicyManage => "policy.manage",
            Self::HolidayManage => "holiday.manage",
            Self::AuditRead => "audit.read",
        }
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// First super admin created through the bootstrap token.
    AuthBootstrapped,
    /// User account created.
    UserCreated,
    /// User profile, role or department changed.
    UserUpdated,
    /// User account deactivated.
    UserDeactivated,
    /// Leave policy created or changed.
    PolicyUpdated,
    /// Holiday added to the calendar.
    HolidayCreated,
    /// Holiday removed from the calendar.
    HolidayDeleted,
    /// Leave request submitted.
    LeaveSubmitted,
    /// Returned leave request edited and submitted again.
    LeaveResubmitted,
    /// Leave request forwarded to the next stage.
    LeaveForwarded,
    /// Leave request approved.
    LeaveApproved,
    /// Leave request rejected.
    LeaveRejected,
    /// Leave request returned to the requester.
    LeaveReturned,
    /// Leave request cancelled.
    LeaveCancelled,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthBootstrapped => "auth.bootstrapped",
            Self::UserCreated => "user.created",
            Self::UserUpdated => "user.updated",
            Self::UserDeactivated => "user.deactivated",
            Self::PolicyUpdated => "policy.updated",
            Self::HolidayCreated => "holiday.created",
            Self::HolidayDeleted => "holiday.deleted",
            Self::LeaveSubmitted => "leave.submitted",
            Self::LeaveResubmitted => "leave.resubmitted",
            Self::LeaveForwarded => "leave.forwarded",
            Self::LeaveApproved => "leave.approved",
            Self::LeaveRejected => "leave.rejected",
            Self::LeaveReturned => "leave.returned",
            Self::LeaveCancelled => "leave.cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{Permission, Role};

    #[test]
    fn role_roundtrip_storage_value() {
        for role in Role::all() {
            assert_eq!(Role::from_str(role.as_str()).ok(), Some(*role));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(Role::from_str("intern").is_err());
    }

    #[test]
    fn super_admin_cannot_submit_leave() {
        assert!(!Role::SuperAdmin.grants(Permission::LeaveSubmit));
        assert!(Role::SuperAdmin.grants(Permission::PolicyManage));
    }

    #[test]
    fn final_review_belongs_to_hr_head_and_ceo_only() {
        let holders: Vec<Role> = Role::all()
            .iter()
            .copied()
            .filter(|role| role.grants(Permission::LeaveReviewFinal))
            .collect();
        assert_eq!(holders, vec![Role::HrHead, Role::Ceo]);
    }
}

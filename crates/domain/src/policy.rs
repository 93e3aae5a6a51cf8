use chrono::NaiveDate;
use leavedesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::calendar::DateRange;
use crate::leave::LeaveType;

/// Upper bound for any day-count in a policy.
pub const POLICY_MAX_DAYS: u16 = 366;

/// Per-leave-type business rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    leave_type: LeaveType,
    max_days: u16,
    min_days: u16,
    notice_days: u16,
    carry_limit: u16,
}

/// Input payload used to construct a validated policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyConfigInput {
    /// Leave type the policy governs.
    pub leave_type: LeaveType,
    /// Annual entitlement in working days.
    pub max_days: u16,
    /// Minimum working days per request.
    pub min_days: u16,
    /// Calendar days of notice required before the start date.
    pub notice_days: u16,
    /// Maximum unused days carried into the next year.
    pub carry_limit: u16,
}

impl PolicyConfig {
    /// Creates a validated policy.
    pub fn new(input: PolicyConfigInput) -> AppResult<Self> {
        let PolicyConfigInput {
            leave_type,
            max_days,
            min_days,
            notice_days,
            carry_limit,
        } = input;

        if max_days > POLICY_MAX_DAYS {
            return Err(AppError::Validation(format!(
                "max_days must not exceed {POLICY_MAX_DAYS}"
            )));
        }
        if min_days > max_days {
            return Err(AppError::Validation(
                "min_days must not exceed max_days".to_owned(),
            ));
        }
        if carry_limit > max_days {
            return Err(AppError::Validation(
                "carry_limit must not exceed max_days".to_owned(),
            ));
        }
        if notice_days > 365 {
            return Err(AppError::Validation(
                "notice_days must not exceed 365".to_owned(),
            ));
        }

        Ok(Self {
            leave_type,
            max_days,
            min_days,
            notice_days,
            carry_limit,
        })
    }

    /// Returns the governed leave type.
    #[must_use]
    pub fn leave_type(&self) -> LeaveType {
        self.leave_type
    }

    /// Returns the annual entitlement in working days.
    #[must_use]
    pub fn max_days(&self) -> u16 {
        self.max_days
    }

    /// Returns the minimum working days per request.
    #[must_use]
    pub fn min_days(&self) -> u16 {
        self.min_days
    }

    /// Returns the required notice in calendar days.
    #[must_use]
    pub fn notice_days(&self) -> u16 {
        self.notice_days
    }

    /// Returns the carry-forward limit.
    #[must_use]
    pub fn carry_limit(&self) -> u16 {
        self.carry_limit
    }

    /// Checks a request's size and notice period against the policy.
    pub fn check_request(
        &self,
        range: &DateRange,
        working_days: u16,
        submitted_on: NaiveDate,
    ) -> AppResult<()> {
        if working_days < self.min_days {
            return Err(AppError::Validation(format!(
                "{} leave requires at least {} working day(s) per request",
                self.leave_type.as_str(),
                self.min_days
            )));
        }

        if self.leave_type.is_balance_limited() && working_days > self.max_days {
            return Err(AppError::Validation(format!(
                "{} leave allows at most {} working day(s) per year",
                self.leave_type.as_str(),
                self.max_days
            )));
        }

        let notice = (range.start() - submitted_on).num_days();
        if notice < i64::from(self.notice_days) {
            return Err(AppError::Validation(format!(
                "{} leave must be requested at least {} day(s) in advance",
                self.leave_type.as_str(),
                self.notice_days
            )));
        }

        Ok(())
    }

    /// Returns the days carried into a year given the previous year's usage.
    #[must_use]
    pub fn carried_days(&self, used_previous_year: u32) -> u32 {
        u32::from(self.max_days)
            .saturating_sub(used_previous_year)
            .min(u32::from(self.carry_limit))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{PolicyConfig, PolicyConfigInput};
    use crate::calendar::DateRange;
    use crate::leave::LeaveType;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| panic!("invalid test date"))
    }

    fn annual_policy() -> PolicyConfig {
        PolicyConfig::new(PolicyConfigInput {
            leave_type: LeaveType::Annual,
            max_days: 20,
            min_days: 1,
            notice_days: 7,
            carry_limit: 5,
        })
        .unwrap_or_else(|_| panic!("valid policy"))
    }

    #[test]
    fn min_days_above_max_days_is_rejected() {
        let result = PolicyConfig::new(PolicyConfigInput {
            leave_type: LeaveType::Casual,
            max_days: 3,
            min_days: 4,
            notice_days: 0,
            carry_limit: 0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn carry_limit_above_max_days_is_rejected() {
        let result = PolicyConfig::new(PolicyConfigInput {
            leave_type: LeaveType::Casual,
            max_days: 3,
            min_days: 0,
            notice_days: 0,
            carry_limit: 4,
        });
        assert!(result.is_err());
    }

    #[test]
    fn short_notice_is_rejected() {
        let range = DateRange::new(date(2026, 3, 9), date(2026, 3, 10))
            .unwrap_or_else(|_| panic!("valid range"));
        let result = annual_policy().check_request(&range, 2, date(2026, 3, 5));
        assert!(result.is_err());
    }

    #[test]
    fn exact_notice_is_accepted() {
        let range = DateRange::new(date(2026, 3, 9), date(2026, 3, 10))
            .unwrap_or_else(|_| panic!("valid range"));
        assert!(
            annual_policy()
                .check_request(&range, 2, date(2026, 3, 2))
                .is_ok()
        );
    }

    #[test]
    fn carried_days_are_capped_by_limit() {
        let policy = annual_policy();
        assert_eq!(policy.carried_days(0), 5);
        assert_eq!(policy.carried_days(17), 3);
        assert_eq!(policy.carried_days(40), 0);
    }
}

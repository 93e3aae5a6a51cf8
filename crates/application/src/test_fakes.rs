use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use tokio::sync::Mutex;

use leavedesk_core::{AppError, AppResult, UserIdentity};
use leavedesk_domain::{
    DateRange, Holiday, LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType, PolicyConfig, Role,
    Transition, UserId, same_department,
};

use crate::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
    Clock, HolidayRepository, LeaveQuery, LeaveRepository, LeaveUsage, NewUserRecord, Page,
    PasswordHasher, PolicyRepository, RateLimitRepository, RateWindow, ReviewQueueQuery, StatusCount,
    UserQuery, UserRecord, UserRepository,
};

pub const TEST_PASSWORD: &str = "correct horse battery";

pub fn user_record(name: &str, email: &str, role: Role, department: &str) -> UserRecord {
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 5, 9, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("valid timestamp"));
    UserRecord {
        id: UserId::new(),
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        department: department.to_owned(),
        password_hash: FakePasswordHasher::hashed(TEST_PASSWORD),
        is_active: true,
        created_at,
        updated_at: created_at,
    }
}

pub fn identity_for(user: &UserRecord) -> UserIdentity {
    UserIdentity::new(user.id.to_string(), &user.email, &user.name)
}

fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> Page<T> {
    let total = items.len() as u64;
    Page {
        items: items.into_iter().skip(offset).take(limit).collect(),
        total,
        limit,
        offset,
    }
}

#[derive(Default)]
pub struct FakeUserRepository {
    pub users: Mutex<Vec<UserRecord>>,
}

impl FakeUserRepository {
    pub fn with_users(users: Vec<UserRecord>) -> Self {
        Self {
            users: Mutex::new(users),
        }
    }
}

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.email.to_lowercase() == email.to_lowercase())
            .cloned())
    }

    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<UserRecord>> {
        Ok(self
            .users
            .lock()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn create(&self, user: NewUserRecord) -> AppResult<UserRecord> {
        let mut users = self.users.lock().await;
        if users
            .iter()
            .any(|stored| stored.email.to_lowercase() == user.email.to_lowercase())
        {
            return Err(AppError::Conflict("duplicate email".to_owned()));
        }
        let now = Utc::now();
        let record = UserRecord {
            id: UserId::new(),
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            password_hash: user.password_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn update(&self, user: &UserRecord) -> AppResult<UserRecord> {
        let mut users = self.users.lock().await;
        let Some(stored) = users.iter_mut().find(|stored| stored.id == user.id) else {
            return Err(AppError::NotFound("user not found".to_owned()));
        };
        *stored = user.clone();
        Ok(user.clone())
    }

    async fn update_password(&self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.lock().await;
        if let Some(stored) = users.iter_mut().find(|stored| stored.id == user_id) {
            stored.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn list(&self, query: UserQuery) -> AppResult<Page<UserRecord>> {
        let mut users: Vec<UserRecord> = self
            .users
            .lock()
            .await
            .iter()
            .filter(|user| query.include_inactive || user.is_active)
            .filter(|user| query.role.is_none_or(|role| user.role == role))
            .filter(|user| {
                query
                    .department
                    .as_deref()
                    .is_none_or(|department| same_department(&user.department, department))
            })
            .filter(|user| {
                query.search.as_deref().is_none_or(|search| {
                    let search = search.to_lowercase();
                    user.name.to_lowercase().contains(&search) || user.email.contains(&search)
                })
            })
            .cloned()
            .collect();
        users.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(paginate(users, query.limit, query.offset))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.lock().await.len() as u64)
    }

    async fn has_active_department_head(&self, department: &str) -> AppResult<bool> {
        Ok(self.users.lock().await.iter().any(|user| {
            user.is_active
                && user.role == Role::DepartmentHead
                && same_department(&user.department, department)
        }))
    }
}

pub struct FakePasswordHasher;

impl FakePasswordHasher {
    pub fn hashed(password: &str) -> String {
        format!("hashed:{password}")
    }
}

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(Self::hashed(password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(Self::hashed(password) == hash)
    }
}

#[derive(Default)]
pub struct FakeAuditRepository {
    pub events: Mutex<Vec<AuditEvent>>,
    pub unavailable: AtomicBool,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Internal("audit store unavailable".to_owned()));
        }
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeAuditLogRepository {
    pub last_query: Mutex<Option<AuditLogQuery>>,
}

#[async_trait]
impl AuditLogRepository for FakeAuditLogRepository {
    async fn list_recent_entries(&self, query: AuditLogQuery) -> AppResult<Vec<AuditLogEntry>> {
        *self.last_query.lock().await = Some(query);
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct FakePolicyRepository {
    pub policies: Mutex<Vec<PolicyConfig>>,
}

impl FakePolicyRepository {
    pub fn with_policies(policies: Vec<PolicyConfig>) -> Self {
        Self {
            policies: Mutex::new(policies),
        }
    }
}

#[async_trait]
impl PolicyRepository for FakePolicyRepository {
    async fn list(&self) -> AppResult<Vec<PolicyConfig>> {
        let mut policies = self.policies.lock().await.clone();
        policies.sort_by_key(PolicyConfig::leave_type);
        Ok(policies)
    }

    async fn find(&self, leave_type: LeaveType) -> AppResult<Option<PolicyConfig>> {
        Ok(self
            .policies
            .lock()
            .await
            .iter()
            .find(|policy| policy.leave_type() == leave_type)
            .copied())
    }

    async fn save(&self, policy: PolicyConfig) -> AppResult<PolicyConfig> {
        let mut policies = self.policies.lock().await;
        policies.retain(|stored| stored.leave_type() != policy.leave_type());
        policies.push(policy);
        Ok(policy)
    }
}

#[derive(Default)]
pub struct FakeHolidayRepository {
    pub holidays: Mutex<Vec<Holiday>>,
}

#[async_trait]
impl HolidayRepository for FakeHolidayRepository {
    async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Holiday>> {
        let mut holidays: Vec<Holiday> = self
            .holidays
            .lock()
            .await
            .iter()
            .filter(|holiday| holiday.date() >= start && holiday.date() <= end)
            .cloned()
            .collect();
        holidays.sort_by_key(Holiday::date);
        Ok(holidays)
    }

    async fn create(&self, holiday: Holiday) -> AppResult<Holiday> {
        let mut holidays = self.holidays.lock().await;
        if holidays.iter().any(|stored| stored.date() == holiday.date()) {
            return Err(AppError::Conflict("duplicate holiday".to_owned()));
        }
        holidays.push(holiday.clone());
        Ok(holiday)
    }

    async fn delete(&self, date: NaiveDate) -> AppResult<bool> {
        let mut holidays = self.holidays.lock().await;
        let before = holidays.len();
        holidays.retain(|stored| stored.date() != date);
        Ok(holidays.len() != before)
    }
}

#[derive(Default)]
pub struct FakeLeaveRepository {
    pub requests: Mutex<Vec<LeaveRequest>>,
}

#[async_trait]
impl LeaveRepository for FakeLeaveRepository {
    async fn create(&self, request: &LeaveRequest) -> AppResult<()> {
        self.requests.lock().await.push(request.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: LeaveRequestId) -> AppResult<Option<LeaveRequest>> {
        Ok(self
            .requests
            .lock()
            .await
            .iter()
            .find(|request| request.id() == id)
            .cloned())
    }

    async fn save_transition(&self, request: &LeaveRequest, step: Transition) -> AppResult<()> {
        let mut requests = self.requests.lock().await;
        let Some(stored) = requests.iter_mut().find(|stored| {
            stored.id() == request.id()
                && stored.status() == step.from
                && stored.current_stage() == step.stage
        }) else {
            return Err(AppError::Conflict("request changed concurrently".to_owned()));
        };
        *stored = request.clone();
        Ok(())
    }

    async fn list(&self, query: LeaveQuery) -> AppResult<Page<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self
            .requests
            .lock()
            .await
            .iter()
            .filter(|request| {
                query
                    .requester_id
                    .is_none_or(|requester_id| request.requester_id() == requester_id)
                    && query.status.is_none_or(|status| request.status() == status)
                    && query
                        .leave_type
                        .is_none_or(|leave_type| request.leave_type() == leave_type)
                    && query
                        .department
                        .as_deref()
                        .is_none_or(|department| same_department(request.department(), department))
                    && query
                        .starts_from
                        .is_none_or(|from| request.range().start() >= from)
                    && query
                        .starts_until
                        .is_none_or(|until| request.range().start() <= until)
            })
            .cloned()
            .collect();
        requests.sort_by_key(|request| std::cmp::Reverse(request.created_at()));
        Ok(paginate(requests, query.limit, query.offset))
    }

    async fn list_review_queue(&self, query: ReviewQueueQuery) -> AppResult<Page<LeaveRequest>> {
        let mut requests: Vec<LeaveRequest> = self
            .requests
            .lock()
            .await
            .iter()
            .filter(|request| {
                request.status().is_in_review()
                    && request.requester_id() != query.exclude_requester
                    && request
                        .current_stage()
                        .is_some_and(|stage| query.stages.contains(&stage))
                    && query
                        .department
                        .as_deref()
                        .is_none_or(|department| same_department(request.department(), department))
            })
            .cloned()
            .collect();
        requests.sort_by_key(LeaveRequest::created_at);
        Ok(paginate(requests, query.limit, query.offset))
    }

    async fn find_active_overlapping(
        &self,
        requester_id: UserId,
        range: DateRange,
    ) -> AppResult<Vec<LeaveRequest>> {
        Ok(self
            .requests
            .lock()
            .await
            .iter()
            .filter(|request| {
                request.requester_id() == requester_id
                    && request.status().is_active()
                    && request.range().overlaps(&range)
            })
            .cloned()
            .collect())
    }

    async fn usage_for_requester(
        &self,
        requester_id: UserId,
        year: i32,
    ) -> AppResult<Vec<LeaveUsage>> {
        let mut usage: Vec<LeaveUsage> = Vec::new();
        for request in self.requests.lock().await.iter().filter(|request| {
            request.requester_id() == requester_id
                && request.status().is_active()
                && request.range().start().year() == year
        }) {
            match usage.iter_mut().find(|entry| {
                entry.leave_type == request.leave_type() && entry.status == request.status()
            }) {
                Some(entry) => entry.working_days += u32::from(request.working_days()),
                None => usage.push(LeaveUsage {
                    leave_type: request.leave_type(),
                    status: request.status(),
                    working_days: u32::from(request.working_days()),
                }),
            }
        }
        Ok(usage)
    }

    async fn count_by_status(&self, requester_id: Option<UserId>) -> AppResult<Vec<StatusCount>> {
        let requests = self.requests.lock().await;
        Ok(LeaveStatus::all()
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: requests
                    .iter()
                    .filter(|request| {
                        request.status() == *status
                            && requester_id.is_none_or(|id| request.requester_id() == id)
                    })
                    .count() as u64,
            })
            .filter(|entry| entry.count > 0)
            .collect())
    }

    async fn count_on_leave(&self, date: NaiveDate) -> AppResult<u64> {
        let mut people: Vec<UserId> = self
            .requests
            .lock()
            .await
            .iter()
            .filter(|request| {
                request.status() == LeaveStatus::Approved && request.range().contains(date)
            })
            .map(LeaveRequest::requester_id)
            .collect();
        people.sort();
        people.dedup();
        Ok(people.len() as u64)
    }
}

#[derive(Default)]
pub struct FakeRateLimitRepository {
    hits: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl RateLimitRepository for FakeRateLimitRepository {
    async fn register_hit(&self, bucket: &str, _window: Duration) -> AppResult<RateWindow> {
        let mut hits = self.hits.lock().await;
        let count = hits.entry(bucket.to_owned()).or_default();
        *count += 1;
        Ok(RateWindow {
            hits: *count,
            opened_at: Utc::now(),
        })
    }

    async fn purge_windows_before(&self, _cutoff: DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    pub fn on(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 9, 0, 0)
                .single()
                .unwrap_or_else(|| panic!("valid timestamp")),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

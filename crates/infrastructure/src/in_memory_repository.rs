//! In-memory adapters used by API tests and local demos.
//!
//! They honour the same ordering, filtering and concurrency rules as the
//! PostgreSQL adapters.

mod audit;
mod catalog;
mod leaves;
mod rate_limits;
mod users;

pub use audit::InMemoryAuditRepository;
pub use catalog::{InMemoryHolidayRepository, InMemoryPolicyRepository};
pub use leaves::InMemoryLeaveRepository;
pub use rate_limits::InMemoryRateLimitRepository;
pub use users::InMemoryUserRepository;

use leavedesk_application::Page;

fn paginate<T>(items: Vec<T>, limit: usize, offset: usize) -> Page<T> {
    let total = items.len() as u64;

    Page {
        items: items.into_iter().skip(offset).take(limit).collect(),
        total,
        limit,
        offset,
    }
}

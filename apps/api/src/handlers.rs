use chrono::NaiveDate;
use leavedesk_core::AppError;
use serde::Deserialize;

pub mod approvals;
pub mod audit;
pub mod dashboard;
pub mod health;
pub mod holidays;
pub mod leaves;
pub mod policies;
pub mod users;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 200;
/// Deepest offset a listing can be paged to.
const MAX_PAGE_OFFSET: usize = 100_000;

/// `limit`/`offset` query parameters of paged listings.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    fn window(&self) -> Result<(usize, usize), AppError> {
        page_window(self.limit, self.offset)
    }
}

/// Returns `(limit, offset)` with the limit clamped to `1..=200`. An offset
/// past the deepest page is a validation error.
fn page_window(
    limit: Option<usize>,
    offset: Option<usize>,
) -> Result<(usize, usize), AppError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0);
    if offset > MAX_PAGE_OFFSET {
        return Err(AppError::Validation(format!(
            "offset must not exceed {MAX_PAGE_OFFSET}"
        )));
    }

    Ok((limit, offset))
}

/// Parses a `YYYY-MM-DD` date, naming the field on failure.
fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{field} must be a date formatted as YYYY-MM-DD"))
    })
}

/// Drops blank query values so `?status=` means "no filter".
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use leavedesk_core::AppError;

    use super::{PageParams, non_blank, page_window, parse_date};

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(PageParams::default().window().ok(), Some((50, 0)));
        assert_eq!(
            PageParams {
                limit: Some(0),
                offset: Some(5),
            }
            .window()
            .ok(),
            Some((1, 5))
        );
        assert_eq!(page_window(Some(10_000), None).ok(), Some((200, 0)));
    }

    #[test]
    fn offsets_beyond_the_deepest_page_are_rejected() {
        assert!(page_window(None, Some(100_000)).is_ok());
        assert!(matches!(
            page_window(None, Some(usize::MAX)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn dates_must_be_iso_formatted() {
        assert_eq!(
            parse_date("start_date", "2031-02-28").ok(),
            NaiveDate::from_ymd_opt(2031, 2, 28)
        );
        assert!(parse_date("start_date", "28/02/2031").is_err());
        assert!(parse_date("start_date", "2031-02-30").is_err());
    }

    #[test]
    fn blank_filters_are_dropped() {
        assert_eq!(non_blank(Some("  ".to_owned())), None);
        assert_eq!(non_blank(Some(" hr ".to_owned())).as_deref(), Some("hr"));
    }
}

//! Project-specific utilities live here.

use time::OffsetDateTime;

/// Current UTC timestamp, used for `created_at`.
pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Current calendar year (UTC); the upper bound for a book's `year`.
pub fn current_year() -> i32 {
    now_utc().year()
}

//! Shared query parameter helpers

/// Default page size for list endpoints
pub fn default_limit() -> i64 {
    50
}

/// Hard cap on page size
pub const MAX_LIMIT: i64 = 500;

/// Clamp client-supplied paging into a sane window
pub fn clamp_paging(limit: i64, offset: i64) -> (i64, i64) {
    (limit.clamp(1, MAX_LIMIT), offset.max(0))
}

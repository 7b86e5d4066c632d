//! Business time zone helpers
//!
//! Date strings are converted to millisecond ranges at the API layer;
//! repositories only see `i64` Unix millis and `YYYY-MM-DD` caixa dates.

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;

use super::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)).with_detail("expected", "YYYY-MM-DD"))
}

/// Parse an IANA time zone name
pub fn parse_timezone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|e| format!("Invalid time zone '{name}': {e}"))
}

/// Today's date in the business time zone
pub fn business_date(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// Today's date in the business time zone as `YYYY-MM-DD`
pub fn business_date_string(tz: Tz) -> String {
    business_date(tz).format(DATE_FORMAT).to_string()
}

/// Local start of `date` in Unix millis
///
/// When midnight falls in a DST gap the day starts at the first local time
/// that exists, scanning forward in 15 minute steps.
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    (0..=DST_GAP_STEPS)
        .find_map(|step| {
            (naive + TimeDelta::minutes(15 * step))
                .and_local_timezone(tz)
                .earliest()
        })
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Longest gap scanned: four hours
const DST_GAP_STEPS: i64 = 16;

/// Exclusive end of `date`: the next day's local midnight
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day, tz)
}

/// Resolve optional `from`/`to` query dates into a `[start, end)` millis window
pub fn millis_range(
    from: Option<&str>,
    to: Option<&str>,
    tz: Tz,
) -> AppResult<(Option<i64>, Option<i64>)> {
    let start = from.map(parse_date).transpose()?;
    let end = to.map(parse_date).transpose()?;
    if let (Some(s), Some(e)) = (start, end)
        && s > e
    {
        return Err(AppError::validation(format!("from ({s}) is after to ({e})")));
    }
    Ok((
        start.map(|d| day_start_millis(d, tz)),
        end.map(|d| day_end_millis(d, tz)),
    ))
}

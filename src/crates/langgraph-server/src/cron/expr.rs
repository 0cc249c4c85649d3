//! 5-field cron expression support (`minute hour day-of-month month
//! day-of-week`, the Unix crontab dialect). The `cron` crate parses the
//! 6/7-field dialect with a leading seconds field, so a 5-field expression
//! gets a synthetic `"0"` seconds field prepended before parsing.

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum CronExprError {
    #[error("expected 5 space-separated fields (minute hour day-of-month month day-of-week), got {0}")]
    WrongFieldCount(usize),
    #[error("{0}")]
    Parse(String),
    #[error("expression has no future occurrence")]
    NoNextRun,
}

fn to_six_field(expr: &str) -> Result<String, CronExprError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CronExprError::WrongFieldCount(fields.len()));
    }
    Ok(format!("0 {expr}"))
}

pub fn next_after(expr: &str, after: DateTime<Utc>) -> Result<DateTime<Utc>, CronExprError> {
    let six_field = to_six_field(expr)?;
    let schedule = Schedule::from_str(&six_field).map_err(|e| CronExprError::Parse(e.to_string()))?;
    schedule.after(&after).next().ok_or(CronExprError::NoNextRun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rejects_wrong_field_count() {
        let err = next_after("* * *", Utc::now()).unwrap_err();
        assert!(matches!(err, CronExprError::WrongFieldCount(3)));
    }

    #[test]
    fn computes_next_minute_boundary() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 30, 15).unwrap();
        let next = next_after("* * * * *", start).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 1, 10, 31, 0).unwrap());
    }

    #[test]
    fn computes_daily_schedule() {
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let next = next_after("0 9 * * *", start).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap());
    }
}

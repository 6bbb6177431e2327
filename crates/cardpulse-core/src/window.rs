//! Reporting windows.
//!
//! A window is one local calendar day in the configured zone, expressed as a
//! half-open UTC interval `[start_utc, end_utc)` plus a display label such as
//! `Wed Sep 17`. Boundaries are converted with the zone's offset at each
//! boundary instant, so DST days span 23 or 25 hours.

use chrono::{
    DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;

use crate::error::{DigestError, Result};

/// Label format: abbreviated weekday, abbreviated month, zero-padded day.
const LABEL_FORMAT: &str = "%a %b %d";

/// How the target day of a report is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// A caller-supplied calendar date.
    ExplicitDate,
    /// The local day before today.
    PreviousCalendarDay,
    /// The most recent Monday–Friday strictly before today.
    PreviousBusinessDay,
}

/// One local calendar day as a half-open UTC interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start_utc: DateTime<Utc>,
    pub end_utc: DateTime<Utc>,
    pub label: String,
    pub day: NaiveDate,
}

impl TimeWindow {
    /// `since` query value, e.g. `2025-09-17T06:00:00Z`.
    pub fn since_param(&self) -> String {
        self.start_utc.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `before` query value (exclusive end).
    pub fn before_param(&self) -> String {
        self.end_utc.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn span(&self) -> Duration {
        self.end_utc - self.start_utc
    }
}

/// Compute the reporting window for `mode` relative to `now_local`.
///
/// `date` is only consulted (and required) for [`WindowMode::ExplicitDate`].
pub fn compute(
    mode: WindowMode,
    date: Option<NaiveDate>,
    now_local: &DateTime<Tz>,
) -> Result<TimeWindow> {
    let today = now_local.date_naive();
    let day = match mode {
        WindowMode::ExplicitDate => date.ok_or_else(|| {
            DigestError::InvalidInput("an explicit date (YYYY-MM-DD) is required".into())
        })?,
        WindowMode::PreviousCalendarDay => days_before(today, 1)?,
        WindowMode::PreviousBusinessDay => previous_business_day(today)?,
    };
    day_window(now_local.timezone(), day)
}

/// The window covering local calendar day `day` in `tz`.
pub fn day_window(tz: Tz, day: NaiveDate) -> Result<TimeWindow> {
    let next = day
        .succ_opt()
        .ok_or_else(|| DigestError::InvalidInput(format!("{day} has no following day")))?;
    let start_utc = start_of_day(tz, day)?;
    let end_utc = start_of_day(tz, next)?;

    Ok(TimeWindow {
        start_utc,
        end_utc,
        label: day.format(LABEL_FORMAT).to_string(),
        day,
    })
}

/// Most recent business day strictly before `today`.
///
/// Monday goes back to Friday (3 days), Sunday back 2, every other day back 1;
/// Saturday's predecessor is already Friday.
pub fn previous_business_day(today: NaiveDate) -> Result<NaiveDate> {
    let back = match today.weekday() {
        Weekday::Mon => 3,
        Weekday::Sun => 2,
        _ => 1,
    };
    days_before(today, back)
}

/// Parse an explicit `YYYY-MM-DD` report date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
        DigestError::InvalidInput(format!("invalid date '{raw}': expected YYYY-MM-DD ({e})"))
    })
}

/// Local calendar date of a UTC instant.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Monday of the week containing `day`.
pub fn week_start(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
}

fn days_before(day: NaiveDate, n: u64) -> Result<NaiveDate> {
    day.checked_sub_days(Days::new(n))
        .ok_or_else(|| DigestError::InvalidInput(format!("{day} minus {n} days is out of range")))
}

/// First existing local instant of `day`, in UTC.
///
/// Midnight can fall inside a DST gap (e.g. America/Santiago); the day then
/// starts at the first wall-clock time that exists. Ambiguous times resolve
/// to the earlier instant.
fn start_of_day(tz: Tz, day: NaiveDate) -> Result<DateTime<Utc>> {
    for minutes in (0..=180u32).step_by(15) {
        let Some(time) = NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0) else {
            continue;
        };
        if let Some(instant) = tz.from_local_datetime(&day.and_time(time)).earliest() {
            return Ok(instant.with_timezone(&Utc));
        }
    }
    Err(DigestError::InvalidInput(format!(
        "{day} has no representable start in {}",
        tz.name()
    )))
}

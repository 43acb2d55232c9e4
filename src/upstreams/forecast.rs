//! # Forecast Time Window
//!
//! The mid-range forecast upstream publishes bulletins twice a day, at 06:00
//! and 18:00 local time. A request must name the latest published bulletin
//! by its reference timestamp (`tmFc`, `YYYYMMDDHHmm`).

use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

const MORNING_HOUR: u32 = 6;
const EVENING_HOUR: u32 = 18;

/// The bulletin that applies at a given local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastWindow {
    reference: NaiveDateTime,
}

impl ForecastWindow {
    /// Resolves the most recent bulletin at local time `now`.
    ///
    /// Before 06:00 this is yesterday's 18:00 bulletin, computed with
    /// calendar arithmetic so month and year boundaries roll back correctly.
    pub fn resolve(now: NaiveDateTime) -> Self {
        let today = now.date();
        let (date, hour) = match now.hour() {
            h if h < MORNING_HOUR => (previous_day(today), EVENING_HOUR),
            h if h < EVENING_HOUR => (today, MORNING_HOUR),
            _ => (today, EVENING_HOUR),
        };

        // hour is always 6 or 18, so the fallback is unreachable
        let reference = date.and_hms_opt(hour, 0, 0).unwrap_or(now);
        Self { reference }
    }

    /// Resolves against the wall clock in `tz`.
    pub fn current(tz: Tz) -> Self {
        Self::resolve(local_now(tz))
    }

    pub fn reference(&self) -> NaiveDateTime {
        self.reference
    }

    /// The `tmFc` value, formatted `YYYYMMDDHHmm`.
    pub fn reference_timestamp(&self) -> String {
        self.reference.format("%Y%m%d%H%M").to_string()
    }
}

/// Current wall-clock time in `tz`, without offset.
pub fn local_now(tz: Tz) -> NaiveDateTime {
    Utc::now().with_timezone(&tz).naive_local()
}

// NaiveDate::MIN has no predecessor; it stays put.
fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

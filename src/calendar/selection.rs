use std::{fmt, sync::Arc};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::dates::{parse_time_str, time_to_minutes};

/// Structured payload emitted when a date is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateSelectionDetail {
    pub day: u32,
    /// One-based month.
    pub month: u32,
    pub year: i32,
    /// `YYYY-MM-DD`
    pub iso: String,
}

impl From<NaiveDate> for DateSelectionDetail {
    fn from(date: NaiveDate) -> Self {
        Self {
            day: date.day(),
            month: date.month(),
            year: date.year(),
            iso: date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HourFormat {
    #[serde(rename = "12h")]
    H12,
    #[default]
    #[serde(rename = "24h")]
    H24,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    AM,
    PM,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::AM => write!(f, "AM"),
            Period::PM => write!(f, "PM"),
        }
    }
}

/// Structured payload emitted when a time is picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSelectionDetail {
    pub hours24: u32,
    pub hours12: u32,
    pub minutes: u32,
    pub period: Period,
    pub formatted: String,
}

impl TimeSelectionDetail {
    pub fn new(time: NaiveTime, format: HourFormat) -> Self {
        let hours24 = time.hour();
        Self {
            hours24,
            hours12: twelve_hour(hours24),
            minutes: time.minute(),
            period: period_of(hours24),
            formatted: format_time(time, format),
        }
    }
}

/// `14:05` in 24h mode, `2:05 PM` in 12h mode.
pub fn format_time(time: NaiveTime, format: HourFormat) -> String {
    let hours = time.hour();
    match format {
        HourFormat::H24 => format!("{hours:02}:{:02}", time.minute()),
        HourFormat::H12 => format!(
            "{}:{:02} {}",
            twelve_hour(hours),
            time.minute(),
            period_of(hours)
        ),
    }
}

fn twelve_hour(hours24: u32) -> u32 {
    match hours24 % 12 {
        0 => 12,
        other => other,
    }
}

fn period_of(hours24: u32) -> Period {
    if hours24 >= 12 { Period::PM } else { Period::AM }
}

type TimePredicate = Arc<dyn Fn(u32, u32) -> bool + Send + Sync>;

/// Inclusive `HH:MM` window plus an optional per-slot predicate.
#[derive(Clone, Default)]
pub struct TimeBounds {
    min_minutes: Option<u32>,
    max_minutes: Option<u32>,
    disabled: Option<TimePredicate>,
}

impl TimeBounds {
    /// Unparseable bounds are ignored.
    pub fn new(min: Option<&str>, max: Option<&str>) -> Self {
        Self::default().with_range(min, max)
    }

    /// Replace the `HH:MM` window, keeping any predicate.
    pub fn with_range(mut self, min: Option<&str>, max: Option<&str>) -> Self {
        let to_minutes = |raw: &str| parse_time_str(raw).map(|(h, m)| time_to_minutes(h, m));
        self.min_minutes = min.and_then(to_minutes);
        self.max_minutes = max.and_then(to_minutes);
        self
    }

    pub fn with_disabled<F>(mut self, predicate: F) -> Self
    where
        F: Fn(u32, u32) -> bool + Send + Sync + 'static,
    {
        self.disabled = Some(Arc::new(predicate));
        self
    }

    pub fn is_disabled(&self, time: NaiveTime) -> bool {
        let (hours, minutes) = (time.hour(), time.minute());
        if self
            .disabled
            .as_ref()
            .is_some_and(|predicate| predicate(hours, minutes))
        {
            return true;
        }
        let total = time_to_minutes(hours, minutes);
        self.min_minutes.is_some_and(|min| total < min)
            || self.max_minutes.is_some_and(|max| total > max)
    }
}

impl fmt::Debug for TimeBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeBounds")
            .field("min_minutes", &self.min_minutes)
            .field("max_minutes", &self.max_minutes)
            .field("disabled", &self.disabled.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn formats_both_clocks() {
        assert_eq!(format_time(at(0, 5), HourFormat::H24), "00:05");
        assert_eq!(format_time(at(0, 5), HourFormat::H12), "12:05 AM");
        assert_eq!(format_time(at(12, 30), HourFormat::H12), "12:30 PM");
        assert_eq!(format_time(at(23, 59), HourFormat::H12), "11:59 PM");
    }

    #[test]
    fn time_detail_splits_clock() {
        let detail = TimeSelectionDetail::new(at(15, 45), HourFormat::H12);
        assert_eq!(detail.hours24, 15);
        assert_eq!(detail.hours12, 3);
        assert_eq!(detail.minutes, 45);
        assert_eq!(detail.period, Period::PM);
        assert_eq!(detail.formatted, "3:45 PM");
    }

    #[test]
    fn date_detail_is_one_based() {
        let detail = DateSelectionDetail::from(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert_eq!((detail.day, detail.month, detail.year), (9, 1, 2024));
        assert_eq!(detail.iso, "2024-01-09");
    }

    #[test]
    fn bounds_are_inclusive() {
        let bounds = TimeBounds::new(Some("09:00"), Some("17:30"));
        assert!(bounds.is_disabled(at(8, 55)));
        assert!(!bounds.is_disabled(at(9, 0)));
        assert!(!bounds.is_disabled(at(17, 30)));
        assert!(bounds.is_disabled(at(17, 35)));
    }
}

use std::{fmt, sync::Arc};

use chrono::{Days, NaiveDate};

/// Shift `date` by `delta` days, saturating at the calendar limits.
pub fn add_days(date: NaiveDate, delta: i64) -> NaiveDate {
    let days = Days::new(delta.unsigned_abs());
    let shifted = if delta >= 0 {
        date.checked_add_days(days)
    } else {
        date.checked_sub_days(days)
    };
    shifted.unwrap_or(if delta >= 0 {
        NaiveDate::MAX
    } else {
        NaiveDate::MIN
    })
}

pub fn clamp_date(date: NaiveDate, min: Option<NaiveDate>, max: Option<NaiveDate>) -> NaiveDate {
    if let Some(min) = min
        && date < min
    {
        return min;
    }
    if let Some(max) = max
        && date > max
    {
        return max;
    }
    date
}

/// Parse `H:MM` / `HH:MM` into (hours, minutes). Range is not checked.
pub fn parse_time_str(raw: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = raw.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.chars().chain(minutes.chars()).all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    Some((hours.parse().ok()?, minutes.parse().ok()?))
}

pub fn time_to_minutes(hours: u32, minutes: u32) -> u32 {
    hours * 60 + minutes
}

type DatePredicate = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>;

/// Which days a date picker refuses to select.
#[derive(Clone, Default)]
pub struct DateBounds {
    pub min: Option<NaiveDate>,
    pub max: Option<NaiveDate>,
    disabled: Option<DatePredicate>,
}

impl DateBounds {
    pub fn with_min(mut self, min: NaiveDate) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_max(mut self, max: NaiveDate) -> Self {
        self.max = Some(max);
        self
    }

    pub fn with_disabled<F>(mut self, predicate: F) -> Self
    where
        F: Fn(NaiveDate) -> bool + Send + Sync + 'static,
    {
        self.disabled = Some(Arc::new(predicate));
        self
    }

    pub fn is_disabled(&self, date: NaiveDate) -> bool {
        if self.min.is_some_and(|min| date < min) {
            return true;
        }
        if self.max.is_some_and(|max| date > max) {
            return true;
        }
        self.disabled
            .as_ref()
            .is_some_and(|predicate| predicate(date))
    }
}

impl fmt::Debug for DateBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateBounds")
            .field("min", &self.min)
            .field("max", &self.max)
            .field("disabled", &self.disabled.is_some())
            .finish()
    }
}

//! Month grids for the date picker.
//!
//! [`build_month_matrix`] always yields six weeks of seven days so the panel
//! keeps a stable height; days spilling over from the neighbouring months are
//! real dates flagged with `in_month == false`.

mod dates;
mod selection;

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

pub use dates::{DateBounds, add_days, clamp_date, parse_time_str, time_to_minutes};
pub use selection::{
    DateSelectionDetail, HourFormat, Period, TimeBounds, TimeSelectionDetail, format_time,
};

pub const WEEKS_PER_MATRIX: usize = 6;
pub const DAYS_PER_WEEK: usize = 7;

const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("first day of week must be within 0..=6, got {0}")]
    FirstDayOfWeek(u32),
    #[error("month must be zero-based within 0..=11, got {0}")]
    Month(u32),
    #[error("year {0} is outside the supported calendar range")]
    Year(i32),
}

/// One day of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_disabled: bool,
}

/// A 6×7 grid of consecutive days covering one displayed month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthMatrix {
    year: i32,
    month: u32,
    first_day_of_week: u32,
    weeks: [[DateCell; DAYS_PER_WEEK]; WEEKS_PER_MATRIX],
}

impl MonthMatrix {
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Zero-based month this grid was built for.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day_of_week(&self) -> u32 {
        self.first_day_of_week
    }

    pub fn weeks(&self) -> &[[DateCell; DAYS_PER_WEEK]; WEEKS_PER_MATRIX] {
        &self.weeks
    }

    pub fn cells(&self) -> impl Iterator<Item = &DateCell> {
        self.weeks.iter().flat_map(|week| week.iter())
    }

    pub fn first(&self) -> &DateCell {
        &self.weeks[0][0]
    }

    pub fn last(&self) -> &DateCell {
        &self.weeks[WEEKS_PER_MATRIX - 1][DAYS_PER_WEEK - 1]
    }

    pub fn position_of(&self, date: NaiveDate) -> Option<(usize, usize)> {
        let offset = date.signed_duration_since(self.first().date).num_days();
        if !(0..(WEEKS_PER_MATRIX * DAYS_PER_WEEK) as i64).contains(&offset) {
            return None;
        }
        let offset = offset as usize;
        Some((offset / DAYS_PER_WEEK, offset % DAYS_PER_WEEK))
    }

    /// Fill the today/selected/disabled flags for display.
    pub fn decorate(&mut self, today: NaiveDate, selected: Option<NaiveDate>, bounds: &DateBounds) {
        for cell in self.weeks.iter_mut().flat_map(|week| week.iter_mut()) {
            cell.is_today = cell.date == today;
            cell.is_selected = selected.is_some_and(|value| value == cell.date);
            cell.is_disabled = bounds.is_disabled(cell.date);
        }
    }
}

/// Build the grid for `month` (zero-based) of `year`, starting weeks on
/// `first_day_of_week` (0 = Sunday).
pub fn build_month_matrix(
    year: i32,
    month: u32,
    first_day_of_week: u32,
) -> Result<MonthMatrix, CalendarError> {
    if first_day_of_week > 6 {
        return Err(CalendarError::FirstDayOfWeek(first_day_of_week));
    }
    if month > 11 {
        return Err(CalendarError::Month(month));
    }
    let first_of_month =
        NaiveDate::from_ymd_opt(year, month + 1, 1).ok_or(CalendarError::Year(year))?;
    let weekday = first_of_month.weekday().num_days_from_sunday();
    let offset = (weekday + 7 - first_day_of_week) % 7;
    let start = first_of_month
        .checked_sub_days(Days::new(u64::from(offset)))
        .ok_or(CalendarError::Year(year))?;

    let placeholder = DateCell {
        date: start,
        in_month: false,
        is_today: false,
        is_selected: false,
        is_disabled: false,
    };
    let mut weeks = [[placeholder; DAYS_PER_WEEK]; WEEKS_PER_MATRIX];
    let mut current = start;
    for week in weeks.iter_mut() {
        for cell in week.iter_mut() {
            cell.date = current;
            cell.in_month = current.month0() == month && current.year() == year;
            current = current.succ_opt().ok_or(CalendarError::Year(year))?;
        }
    }

    Ok(MonthMatrix {
        year,
        month,
        first_day_of_week,
        weeks,
    })
}

/// Short weekday names rotated so the first entry is `first_day_of_week`.
pub fn weekday_labels(first_day_of_week: u32) -> [&'static str; 7] {
    let mut labels = [""; 7];
    for (idx, label) in labels.iter_mut().enumerate() {
        *label = WEEKDAY_NAMES[(first_day_of_week as usize + idx) % 7];
    }
    labels
}

/// `"March 2024"` style header for a zero-based month.
pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTH_NAMES.get(month as usize).copied().unwrap_or("?");
    format!("{name} {year}")
}

/// Step a (year, zero-based month) pair by `delta` months.
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let absolute = year * 12 + month as i32 + delta;
    (absolute.div_euclid(12), absolute.rem_euclid(12) as u32)
}

//! Weekly mileage aggregation.
//!
//! Weeks run Monday through Sunday. Records are bucketed by the weekday of
//! their calendar date; time-of-day and offsets in the date string are
//! ignored so a run never slides into a neighbouring day.

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Calendar years accepted from date strings.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// One dated distance entry as received from a backend.
///
/// Both fields are kept as raw JSON so a malformed entry degrades to a
/// skipped or zero-distance record instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Value>,
}

impl ActivityRecord {
    pub fn new(date: NaiveDate, distance: f64) -> Self {
        Self {
            date: Some(Value::String(date_key(date))),
            distance: Some(Value::from(distance)),
        }
    }

    /// The calendar date of the record, if present and parseable.
    pub fn date(&self) -> Option<NaiveDate> {
        match self.date.as_ref()? {
            Value::String(raw) => parse_calendar_date(raw),
            _ => None,
        }
    }

    /// Distance coerced to a number; anything unusable counts as zero.
    pub fn distance(&self) -> f64 {
        let value = match self.distance.as_ref() {
            Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(Value::String(raw)) => raw.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        };
        if value.is_finite() && value > 0.0 { value } else { 0.0 }
    }
}

/// Records plus goal for one athlete, owned by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MileageContext {
    pub records: Vec<ActivityRecord>,
    pub goal: Option<f64>,
}

impl MileageContext {
    pub fn new(records: Vec<ActivityRecord>, goal: Option<f64>) -> Self {
        Self { records, goal }
    }

    pub fn summarize(&self, week_start: NaiveDate) -> WeeklySummary {
        aggregate(&self.records, self.goal.unwrap_or(0.0), week_start)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeekWindow {
    /// The end saturates at the last representable date.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: start
                .checked_add_signed(Duration::days(6))
                .unwrap_or(NaiveDate::MAX),
        }
    }

    /// Inclusive at both ends, whole days.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..7)
            .filter_map(move |offset| self.start.checked_add_signed(Duration::days(offset)))
            .filter(move |date| *date <= self.end)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DailyMileage {
    pub monday: f64,
    pub tuesday: f64,
    pub wednesday: f64,
    pub thursday: f64,
    pub friday: f64,
    pub saturday: f64,
    pub sunday: f64,
}

impl DailyMileage {
    pub fn get(&self, day: Weekday) -> f64 {
        match day {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    fn slot(&mut self, day: Weekday) -> &mut f64 {
        match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    pub fn add(&mut self, day: Weekday, distance: f64) {
        *self.slot(day) += distance;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Weekday, f64)> + '_ {
        WEEKDAYS.into_iter().map(move |day| (day, self.get(day)))
    }

    pub fn sum(&self) -> f64 {
        self.iter().map(|(_, distance)| distance).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub goal: f64,
    pub daily_mileage: DailyMileage,
    pub total: f64,
    pub remaining: f64,
}

/// Monday of the week containing `date`. Sundays belong to the week that
/// started six days earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
        .unwrap_or(NaiveDate::MIN)
}

pub fn compute_week_start(reference: Option<NaiveDate>) -> NaiveDate {
    compute_week_start_at(reference, Local::now().date_naive())
}

pub fn compute_week_start_at(reference: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    week_start(reference.unwrap_or(today))
}

pub fn aggregate(records: &[ActivityRecord], goal: f64, week_start: NaiveDate) -> WeeklySummary {
    let goal = if goal.is_finite() { goal.max(0.0) } else { 0.0 };
    let window = WeekWindow::starting(week_start);
    let mut daily_mileage = DailyMileage::default();

    for record in records {
        let Some(date) = record.date() else {
            continue;
        };
        if !window.contains(date) {
            continue;
        }
        daily_mileage.add(date.weekday(), record.distance());
    }

    let total = daily_mileage.sum();
    WeeklySummary {
        goal,
        daily_mileage,
        total,
        remaining: (goal - total).max(0.0),
    }
}

/// Parses the `YYYY-MM-DD` prefix of a date or timestamp string. Signed or
/// out-of-range years are rejected.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    if day.starts_with(['+', '-']) {
        return None;
    }
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .filter(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()))
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn date_label(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

use crate::summary::{date_key, date_label, week_start};
use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub const PREVIOUS_WEEKS: i64 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekOption {
    pub value: String,
    pub label: String,
    pub start_date: String,
}

pub fn week_options() -> Vec<WeekOption> {
    week_options_at(Local::now().date_naive())
}

/// The current week followed by the previous weeks, newest first.
pub fn week_options_at(today: NaiveDate) -> Vec<WeekOption> {
    let current = week_start(today);
    let mut options = Vec::with_capacity(PREVIOUS_WEEKS as usize + 1);
    options.push(WeekOption {
        value: "current".to_string(),
        label: "Current week".to_string(),
        start_date: date_key(current),
    });

    for offset in 1..=PREVIOUS_WEEKS {
        let start = current - Duration::weeks(offset);
        options.push(WeekOption {
            value: date_key(start),
            label: format!("Week of {}", date_label(start)),
            start_date: date_key(start),
        });
    }

    options
}

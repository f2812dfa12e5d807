use crate::summary::parse_calendar_date;
use chrono::NaiveDate;
use serde::Deserialize;

pub const MILES_PER_METRE: f64 = 0.000621371;

/// The subset of a Strava activity the tracker keeps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StravaActivity {
    #[serde(default)]
    pub name: Option<String>,
    /// Metres.
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub start_date_local: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportedActivity {
    pub date: NaiveDate,
    pub distance: f64,
    pub title: Option<String>,
}

pub fn transform_strava_activity(activity: &StravaActivity, today: NaiveDate) -> ImportedActivity {
    let date = activity
        .start_date_local
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .or(activity.start_date.as_deref())
        .and_then(parse_calendar_date)
        .unwrap_or(today);

    let metres = activity
        .distance
        .filter(|metres| metres.is_finite() && *metres > 0.0)
        .unwrap_or(0.0);

    ImportedActivity {
        date,
        distance: round_hundredths(metres * MILES_PER_METRE),
        title: activity.name.clone(),
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

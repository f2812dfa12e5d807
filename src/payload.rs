//! Backend response shapes and their reduction to a [`MileageContext`].
//!
//! Two shapes are in circulation: a roster list where each athlete carries a
//! `mileage` array, and a single activities object tagged by `athlete_id`.
//! Both are accepted; neither is treated as canonical.

use crate::models::Athlete;
use crate::summary::{ActivityRecord, MileageContext};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub athlete_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub mileage: Vec<ActivityRecord>,
    #[serde(default)]
    pub mileage_goal: Option<f64>,
    #[serde(default)]
    pub long_run_goal: Option<f64>,
}

impl From<&Athlete> for RosterEntry {
    fn from(athlete: &Athlete) -> Self {
        Self {
            athlete_id: Some(athlete.id),
            first_name: Some(athlete.first_name.clone()),
            last_name: Some(athlete.last_name.clone()),
            mileage: athlete
                .activities
                .iter()
                .map(|activity| ActivityRecord::new(activity.date, activity.distance))
                .collect(),
            mileage_goal: Some(athlete.mileage_goal),
            long_run_goal: Some(athlete.long_run_goal),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AthleteActivity {
    #[serde(flatten)]
    pub record: ActivityRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub athlete_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitiesPayload {
    pub activities: Vec<AthleteActivity>,
    #[serde(default)]
    pub mileage_goal: Option<f64>,
    #[serde(default)]
    pub long_run_goal: Option<f64>,
}

impl From<&Athlete> for ActivitiesPayload {
    fn from(athlete: &Athlete) -> Self {
        Self {
            activities: athlete
                .activities
                .iter()
                .map(|activity| AthleteActivity {
                    record: ActivityRecord::new(activity.date, activity.distance),
                    athlete_id: Some(athlete.id),
                })
                .collect(),
            mileage_goal: Some(athlete.mileage_goal),
            long_run_goal: Some(athlete.long_run_goal),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MileagePayload {
    Roster(Vec<RosterEntry>),
    Activities(ActivitiesPayload),
}

impl MileagePayload {
    /// Reduces the payload to one athlete's records and goal.
    ///
    /// With no athlete id the most recently added roster entry is used. An id
    /// that matches nothing yields an empty context.
    pub fn into_context(self, athlete: Option<u64>) -> MileageContext {
        match self {
            MileagePayload::Roster(entries) => {
                let entry = match athlete {
                    Some(id) => entries.into_iter().find(|entry| entry.athlete_id == Some(id)),
                    None => entries.into_iter().last(),
                };
                entry
                    .map(|entry| MileageContext::new(entry.mileage, entry.mileage_goal))
                    .unwrap_or_default()
            }
            MileagePayload::Activities(payload) => {
                let records = payload
                    .activities
                    .into_iter()
                    .filter(|activity| match (athlete, activity.athlete_id) {
                        (Some(wanted), Some(owner)) => wanted == owner,
                        _ => true,
                    })
                    .map(|activity| activity.record)
                    .collect();
                MileageContext::new(records, payload.mileage_goal)
            }
        }
    }
}

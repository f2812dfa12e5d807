use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "" | "O" => Some(Self::Other),
            "M" => Some(Self::Male),
            "F" => Some(Self::Female),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Activity {
    pub id: u64,
    pub date: NaiveDate,
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Athlete {
    pub id: u64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub gender: Gender,
    pub mileage_goal: f64,
    pub long_run_goal: f64,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

impl Athlete {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// The persisted roster document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppData {
    #[serde(default = "first_id")]
    pub next_athlete_id: u64,
    #[serde(default = "first_id")]
    pub next_activity_id: u64,
    #[serde(default)]
    pub athletes: Vec<Athlete>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            next_athlete_id: first_id(),
            next_activity_id: first_id(),
            athletes: Vec::new(),
        }
    }
}

fn first_id() -> u64 {
    1
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub mileage_goal: String,
    #[serde(default)]
    pub long_run_goal: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalUpdate {
    pub mileage_goal: Option<f64>,
    pub long_run_goal: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GoalsResponse {
    pub athlete_id: u64,
    pub mileage_goal: f64,
    pub long_run_goal: f64,
}

#[derive(Debug, Deserialize)]
pub struct NewActivity {
    pub date: NaiveDate,
    pub distance: f64,
    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub latest_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WeekQuery {
    pub athlete: Option<u64>,
    pub start: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub athlete: Option<u64>,
}

use crate::errors::AppError;
use crate::import::{StravaActivity, transform_strava_activity};
use crate::models::{Activity, AppData, Athlete, Gender, RegisterForm};
use crate::summary::{ActivityRecord, MileageContext};
use chrono::{Duration, NaiveDate};

const EXAMPLE_DISTANCES: [f64; 14] = [
    6.2, 3.1, 8.4, 5.0, 4.75, 10.0, 3.6, 7.25, 5.5, 4.1, 9.3, 3.0, 6.8, 5.9,
];

impl AppData {
    pub fn find(&self, id: u64) -> Option<&Athlete> {
        self.athletes.iter().find(|athlete| athlete.id == id)
    }

    fn find_mut(&mut self, id: u64) -> Result<&mut Athlete, AppError> {
        self.athletes
            .iter_mut()
            .find(|athlete| athlete.id == id)
            .ok_or_else(|| AppError::not_found(format!("athlete {id} not found")))
    }

    /// Most recently registered athlete.
    pub fn latest(&self) -> Option<&Athlete> {
        self.athletes.last()
    }

    pub fn select(&self, id: Option<u64>) -> Option<&Athlete> {
        match id {
            Some(id) => self.find(id),
            None => self.latest(),
        }
    }

    /// Records and goal for the selected athlete; empty when there is none.
    pub fn context_for(&self, id: Option<u64>) -> MileageContext {
        match self.select(id) {
            Some(athlete) => MileageContext::new(
                athlete
                    .activities
                    .iter()
                    .map(|activity| ActivityRecord::new(activity.date, activity.distance))
                    .collect(),
                Some(athlete.mileage_goal),
            ),
            None => MileageContext::default(),
        }
    }

    pub fn register(&mut self, form: RegisterForm) -> Result<&Athlete, AppError> {
        let username = form.username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("username is required"));
        }
        if self
            .athletes
            .iter()
            .any(|athlete| athlete.username.eq_ignore_ascii_case(username))
        {
            return Err(AppError::conflict("User already exists"));
        }

        let gender = Gender::parse(&form.gender)
            .ok_or_else(|| AppError::bad_request("gender must be 'M', 'F' or 'O'"))?;
        let mileage_goal = parse_goal("mileage_goal", &form.mileage_goal)?;
        let long_run_goal = parse_goal("long_run_goal", &form.long_run_goal)?;

        let id = self.next_athlete_id;
        self.next_athlete_id += 1;
        self.athletes.push(Athlete {
            id,
            username: username.to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            gender,
            mileage_goal,
            long_run_goal,
            activities: Vec::new(),
        });

        Ok(&self.athletes[self.athletes.len() - 1])
    }

    pub fn set_goals(
        &mut self,
        id: u64,
        mileage_goal: Option<f64>,
        long_run_goal: Option<f64>,
    ) -> Result<&Athlete, AppError> {
        if let Some(goal) = mileage_goal {
            check_non_negative("mileage_goal", goal)?;
        }
        if let Some(goal) = long_run_goal {
            check_non_negative("long_run_goal", goal)?;
        }

        let athlete = self.find_mut(id)?;
        if let Some(goal) = mileage_goal {
            athlete.mileage_goal = goal;
        }
        if let Some(goal) = long_run_goal {
            athlete.long_run_goal = goal;
        }
        Ok(&*athlete)
    }

    pub fn add_activity(
        &mut self,
        id: u64,
        date: NaiveDate,
        distance: f64,
        title: Option<String>,
    ) -> Result<Activity, AppError> {
        check_non_negative("distance", distance)?;
        let activity_id = self.next_activity_id;
        let athlete = self.find_mut(id)?;
        let activity = Activity {
            id: activity_id,
            date,
            distance,
            title: title.filter(|title| !title.trim().is_empty()),
        };
        athlete.activities.push(activity.clone());
        self.next_activity_id += 1;
        Ok(activity)
    }

    pub fn import_activities(
        &mut self,
        id: u64,
        activities: &[StravaActivity],
        today: NaiveDate,
    ) -> Result<usize, AppError> {
        self.find_mut(id)?;
        for activity in activities {
            let imported = transform_strava_activity(activity, today);
            self.add_activity(id, imported.date, imported.distance, imported.title)?;
        }
        Ok(activities.len())
    }

    pub fn latest_activity_date(&self, id: u64) -> Option<NaiveDate> {
        self.find(id)?
            .activities
            .iter()
            .map(|activity| activity.date)
            .max()
    }

    /// Adds an example athlete with two weeks of runs ending `today`.
    /// Returns false and leaves the roster alone when it already has athletes.
    pub fn seed_example(&mut self, today: NaiveDate) -> Result<bool, AppError> {
        if !self.athletes.is_empty() {
            return Ok(false);
        }

        let form = RegisterForm {
            username: "jsmith".into(),
            first_name: "John".into(),
            last_name: "Smith".into(),
            gender: "M".into(),
            mileage_goal: "30".into(),
            long_run_goal: "8".into(),
        };
        let id = self.register(form)?.id;
        for (offset, distance) in EXAMPLE_DISTANCES.iter().enumerate() {
            let date = today - Duration::days(offset as i64);
            self.add_activity(id, date, *distance, None)?;
        }
        Ok(true)
    }
}

fn parse_goal(field: &str, raw: &str) -> Result<f64, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let value = raw
        .parse::<f64>()
        .map_err(|_| AppError::bad_request(format!("{field} must be a number")))?;
    check_non_negative(field, value)?;
    Ok(value)
}

fn check_non_negative(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::bad_request(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

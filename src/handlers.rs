use crate::errors::AppError;
use crate::import::StravaActivity;
use crate::models::{
    Activity, AppData, DashboardQuery, GoalUpdate, GoalsResponse, ImportResponse, NewActivity,
    RegisterForm, WeekQuery,
};
use crate::payload::{ActivitiesPayload, RosterEntry};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::summary::{
    MileageContext, WeekWindow, WeeklySummary, compute_week_start, date_key, parse_calendar_date,
};
use crate::ui::{render_dashboard, render_register};
use crate::weeks::{WeekOption, week_options};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::{Html, Redirect},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize, Deserialize)]
pub struct WeekResponse {
    pub athlete_id: Option<u64>,
    pub start_date: String,
    pub end_date: String,
    /// `YYYY-MM-DD` for Monday through Sunday.
    pub dates: Vec<String>,
    #[serde(flatten)]
    pub summary: WeeklySummary,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Html<String> {
    let data = state.data.lock().await;
    let athlete = data.select(query.athlete);
    Html(render_dashboard(athlete))
}

pub async fn register_page() -> Html<String> {
    Html(render_register())
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    let (id, username) = commit(&state, |data| {
        let athlete = data.register(form)?;
        Ok((athlete.id, athlete.username.clone()))
    })
    .await?;

    info!(athlete_id = id, %username, "registered athlete");
    Ok(Redirect::to(&format!("/?athlete={id}")))
}

pub async fn get_data(State(state): State<AppState>) -> Json<Vec<RosterEntry>> {
    let data = state.data.lock().await;
    Json(data.athletes.iter().map(RosterEntry::from).collect())
}

pub async fn get_athlete_activities(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ActivitiesPayload>, AppError> {
    let data = state.data.lock().await;
    let athlete = data
        .find(id)
        .ok_or_else(|| AppError::not_found(format!("athlete {id} not found")))?;
    Ok(Json(ActivitiesPayload::from(athlete)))
}

pub async fn add_activity(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<NewActivity>,
) -> Result<Json<Activity>, AppError> {
    let activity = commit(&state, |data| {
        data.add_activity(id, payload.date, payload.distance, payload.title)
    })
    .await?;
    Ok(Json(activity))
}

pub async fn import_activities(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(activities): Json<Vec<StravaActivity>>,
) -> Result<Json<ImportResponse>, AppError> {
    let today = Local::now().date_naive();
    let response = commit(&state, |data| {
        let imported = data.import_activities(id, &activities, today)?;
        Ok(ImportResponse {
            imported,
            latest_date: data.latest_activity_date(id),
        })
    })
    .await?;

    info!(athlete_id = id, imported = response.imported, "imported activities");
    Ok(Json(response))
}

pub async fn update_goals(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(update): Json<GoalUpdate>,
) -> Result<Json<GoalsResponse>, AppError> {
    let response = commit(&state, |data| {
        let athlete = data.set_goals(id, update.mileage_goal, update.long_run_goal)?;
        Ok(GoalsResponse {
            athlete_id: athlete.id,
            mileage_goal: athlete.mileage_goal,
            long_run_goal: athlete.long_run_goal,
        })
    })
    .await?;
    Ok(Json(response))
}

/// Applies `change` to a copy of the roster and swaps it in only once the
/// copy is on disk.
async fn commit<T>(
    state: &AppState,
    change: impl FnOnce(&mut AppData) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let mut draft = data.clone();
    let outcome = change(&mut draft)?;
    persist_data(&state.data_path, &draft).await?;
    *data = draft;
    Ok(outcome)
}

pub async fn get_weeks() -> Json<Vec<WeekOption>> {
    Json(week_options())
}

pub async fn get_week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, AppError> {
    let reference = match query.start.as_deref().map(str::trim) {
        None | Some("") | Some("current") => None,
        Some(raw) => Some(
            parse_calendar_date(raw)
                .ok_or_else(|| AppError::bad_request(format!("invalid start date '{raw}'")))?,
        ),
    };
    let window = WeekWindow::starting(compute_week_start(reference));

    let context = load_context(&state, query.athlete).await?;
    let summary = context.summarize(window.start);

    Ok(Json(WeekResponse {
        athlete_id: query.athlete,
        start_date: date_key(window.start),
        end_date: date_key(window.end),
        dates: window.days().map(date_key).collect(),
        summary,
    }))
}

async fn load_context(state: &AppState, athlete: Option<u64>) -> Result<MileageContext, AppError> {
    match &state.upstream {
        Some(upstream) => upstream.fetch_context(athlete).await,
        None => Ok(state.data.lock().await.context_for(athlete)),
    }
}

use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/register", get(handlers::register_page).post(handlers::register))
        .route("/data", get(handlers::get_data))
        .route(
            "/api/athletes/:id/activities",
            get(handlers::get_athlete_activities).post(handlers::add_activity),
        )
        .route("/api/athletes/:id/import", post(handlers::import_activities))
        .route("/api/athletes/:id/goals", put(handlers::update_goals))
        .route("/api/weeks", get(handlers::get_weeks))
        .route("/api/week", get(handlers::get_week))
        .with_state(state)
}

pub mod app;
pub mod athletes;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod import;
pub mod models;
pub mod payload;
pub mod state;
pub mod storage;
pub mod summary;
pub mod ui;
pub mod upstream;
pub mod weeks;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::{load_data, persist_data, resolve_data_path};
pub use summary::{ActivityRecord, MileageContext, WeeklySummary, aggregate, compute_week_start};

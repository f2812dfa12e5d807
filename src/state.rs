use crate::models::AppData;
use crate::upstream::UpstreamClient;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub upstream: Option<UpstreamClient>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: AppData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            upstream: None,
        }
    }

    pub fn with_upstream(mut self, upstream: UpstreamClient) -> Self {
        self.upstream = Some(upstream);
        self
    }
}

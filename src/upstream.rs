use crate::errors::AppError;
use crate::payload::MileagePayload;
use crate::summary::MileageContext;
use tracing::warn;

/// Reads mileage from another tracker backend's `/data` endpoint.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    base_url: String,
    http: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn fetch_payload(&self) -> Result<MileagePayload, AppError> {
        let url = format!("{}/data", self.base_url);
        let response = self.http.get(&url).send().await.map_err(|err| {
            warn!(%url, "upstream request failed: {err}");
            AppError::bad_gateway("upstream request failed")
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "upstream returned an error status");
            return Err(AppError::bad_gateway(format!(
                "upstream request failed with status {status}"
            )));
        }

        response.json::<MileagePayload>().await.map_err(|err| {
            warn!(%url, "upstream payload did not parse: {err}");
            AppError::bad_gateway("upstream returned malformed payload")
        })
    }

    pub async fn fetch_context(&self, athlete: Option<u64>) -> Result<MileageContext, AppError> {
        Ok(self.fetch_payload().await?.into_context(athlete))
    }
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};

use crate::domain::payload::UploadPayload;
use crate::error::{AppError, AppResult};
use crate::services::UploadService;

/// HTTP client for the Docstring integration endpoint. The endpoint URL and
/// timeout are injected so tests and dev mode never touch process
/// environment from here.
pub struct DocstringClient {
    http: Client,
    endpoint: String,
    api_key: String,
}

impl DocstringClient {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Upload(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            endpoint,
            api_key,
        })
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

#[async_trait]
impl UploadService for DocstringClient {
    async fn upload(&self, payload: &UploadPayload) -> AppResult<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.auth_header())
            .header(CONTENT_TYPE, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    AppError::Upload(format!("request to {} timed out", self.endpoint))
                } else {
                    AppError::Upload(format!("failed to call {}: {err}", self.endpoint))
                }
            })?;

        // The service acknowledges a delivery with 200 and nothing else;
        // any other status is treated as a failed upload.
        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Upload(format!(
                "server responded with {status}: {body}"
            )));
        }

        Ok(())
    }
}

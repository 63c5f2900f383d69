//! HTTP client for the inventory service.

use async_trait::async_trait;
use serde::Deserialize;

use super::{SubmissionError, TransferSubmissionClient};
use crate::config::HttpClientConfig;
use crate::request::TransferRequest;
use crate::result::TransferResult;

const TRANSFERS_PATH: &str = "/inventory/transfers";

/// Creates transfers with `POST {api_url}/inventory/transfers`.
#[derive(Debug, Clone)]
pub struct HttpTransferClient {
    http: reqwest::Client,
    config: HttpClientConfig,
}

/// Error body returned by the API: `{ "error": code, "message": text }`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpTransferClient {
    pub fn new(config: HttpClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Reuse an existing connection pool.
    pub fn with_http_client(http: reqwest::Client, config: HttpClientConfig) -> Self {
        Self { http, config }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.config.api_url.trim_end_matches('/'), TRANSFERS_PATH)
    }
}

/// Pick the most useful text out of an error response body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ApiErrorBody {
            error: Some(code), ..
        }) => code,
        _ if body.trim().is_empty() => "no response body".to_string(),
        _ => body.trim().to_string(),
    }
}

#[async_trait]
impl TransferSubmissionClient for HttpTransferClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn create(&self, request: TransferRequest) -> Result<TransferResult, SubmissionError> {
        let mut req = self.http.post(self.endpoint()).json(&request);

        if let Some(token) = &self.config.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SubmissionError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        resp.json::<TransferResult>()
            .await
            .map_err(|e| SubmissionError::Parse(e.to_string()))
    }
}

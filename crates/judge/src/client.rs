use async_trait::async_trait;
use reqwest::{Response, header};
use serde::Deserialize;
use storage::{
    dto::result::{RecordResultRequest, RecordResultResponse},
    models::StartListEntry,
};
use uuid::Uuid;

use crate::error::{JudgeError, Result};
use crate::sink::ResultSink;

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

pub struct ApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(JudgeError::ValidationError(
                "judge API key is empty".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.trim().to_string(),
            client: reqwest::Client::builder()
                .user_agent(concat!("zawody-judge/", env!("CARGO_PKG_VERSION")))
                .timeout(std::time::Duration::from_secs(15))
                .build()?,
        })
    }

    pub async fn start_list(&self, competition_id: Uuid) -> Result<Vec<StartListEntry>> {
        let url = format!(
            "{}/api/competitions/{}/start-list",
            self.base_url, competition_id
        );

        let response = self.client.get(&url).send().await?;
        let entries = parse(response).await?;

        Ok(entries)
    }
}

#[async_trait]
impl ResultSink for ApiClient {
    async fn submit(&self, request: &RecordResultRequest) -> Result<RecordResultResponse> {
        let url = format!("{}/api/results", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        parse(response).await
    }
}

async fn parse<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }

    let message = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(err) if err.details.is_empty() => err.error,
        Ok(err) => {
            let details: Vec<String> = err
                .details
                .iter()
                .map(|d| match d.as_str() {
                    Some(s) => s.to_string(),
                    None => d.to_string(),
                })
                .collect();
            format!("{} ({})", err.error, details.join("; "))
        }
        Err(_) if body.is_empty() => status.to_string(),
        Err(_) => body,
    };

    Err(JudgeError::ApiError {
        status: status.as_u16(),
        message,
    })
}

use crate::error::{CredentialError, CredentialResult};
use crate::types::is_http_url;
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// One validation round-trip against an endpoint's model listing.
#[async_trait]
pub trait ModelProbe: Send + Sync {
    async fn probe(&self, base_url: &str, api_key: &str) -> CredentialResult<Vec<String>>;
}

#[derive(Clone)]
pub struct HttpProbe {
    http: Client,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpProbe {
    pub fn new() -> Self {
        let http = Client::builder()
            .user_agent(concat!("keygate/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ModelProbe for HttpProbe {
    async fn probe(&self, base_url: &str, api_key: &str) -> CredentialResult<Vec<String>> {
        if !is_http_url(base_url) {
            return Err(CredentialError::InvalidUrl);
        }

        let url = models_url(base_url);
        let mut request = self.http.get(&url);
        if !api_key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", api_key));
        }

        debug!("Probing {}", url);
        let response = request.send().await?;

        if !response.status().is_success() {
            debug!("Probe rejected: {}", response.status());
            return Err(CredentialError::AuthOrUrl);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|_| CredentialError::MalformedResponse)?;
        let models = parse_model_list(&body)?;
        info!("Endpoint reported {} models", models.len());
        Ok(models)
    }
}

fn models_url(base_url: &str) -> String {
    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    format!("{}/models", base)
}

/// Extracts model ids from a `{"data": [...]}` listing. Entries may be plain
/// strings or objects with an `id`; empty ids are dropped.
pub fn parse_model_list(body: &Value) -> CredentialResult<Vec<String>> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or(CredentialError::MalformedResponse)?;

    Ok(data
        .iter()
        .map(|model| match model {
            Value::String(id) => id.as_str(),
            other => other.get("id").and_then(Value::as_str).unwrap_or(""),
        })
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect())
}

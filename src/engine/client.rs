// HTTP text-generation engine client
// Author: kelexine (https://github.com/kelexine)

use super::{GenerationParams, InferenceEngine};
use crate::config::EngineConfig;
use crate::error::{InferenceError, Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for a text-generation-inference style `POST /generate` endpoint.
pub struct HttpEngine {
    http_client: Client,
    url: String,
    echoes_prompt: bool,
    max_new_tokens_cap: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    inputs: &'a str,
    parameters: GenerateParameters,
}

#[derive(Debug, Serialize)]
struct GenerateParameters {
    max_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    do_sample: bool,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

/// Servers answer with either a single object or a one-element batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GenerateResponse {
    Single(GeneratedText),
    Batch(Vec<GeneratedText>),
}

impl HttpEngine {
    /// Create a new engine client. Does not contact the server.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .use_rustls_tls()
            .build()
            .map_err(|e| ServiceError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let url = format!("{}/generate", config.endpoint.trim_end_matches('/'));
        debug!("Inference engine endpoint: {}", url);

        Ok(Self {
            http_client,
            url,
            echoes_prompt: config.echoes_prompt,
            max_new_tokens_cap: config.max_new_tokens_cap,
        })
    }

    fn parameters(&self, params: &GenerationParams) -> GenerateParameters {
        let sample = params.temperature > 0.0;
        GenerateParameters {
            max_new_tokens: params.max_length.min(self.max_new_tokens_cap).max(1),
            temperature: sample.then_some(params.temperature),
            do_sample: sample,
            return_full_text: self.echoes_prompt,
        }
    }
}

#[async_trait]
impl InferenceEngine for HttpEngine {
    fn name(&self) -> &str {
        &self.url
    }

    fn echoes_prompt(&self) -> bool {
        self.echoes_prompt
    }

    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> std::result::Result<String, InferenceError> {
        let request = GenerateRequest {
            inputs: prompt,
            parameters: self.parameters(params),
        };

        let response = self.http_client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Inference engine returned HTTP {}", status.as_u16());
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| InferenceError::Decode(e.to_string()))?;
        match parsed {
            GenerateResponse::Single(generated) => Ok(generated.generated_text),
            GenerateResponse::Batch(batch) => batch
                .into_iter()
                .next()
                .map(|generated| generated.generated_text)
                .ok_or_else(|| InferenceError::Decode("empty generation batch".to_string())),
        }
    }
}

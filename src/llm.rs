//! Answer-generation client (Ollama-compatible)
//!
//! Generation is the only stage in the pipeline that performs network I/O at
//! answer time. Failures surface as `Err` here; the pipeline converts them to
//! an error-describing answer string so callers always get a complete response.

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::LlmConfig;
use crate::errors::Result;
use crate::errors::VisaRagError;

/// Client for the external answer-generation service
pub struct LlmService {
    endpoint: String,
    model: String,
    temperature: f32,
    top_p: f32,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service from configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VisaRagError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_p: config.top_p,
            client,
        })
    }

    /// Generate a completion for the given prompt.
    ///
    /// # Errors
    /// - Network failures and timeouts
    /// - Non-2xx API responses (returned with status and body text)
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct GenerateOptions {
            temperature: f32,
            top_p: f32,
        }

        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: GenerateOptions,
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling generation API: {}", url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
                top_p: self.top_p,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| VisaRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(VisaRagError::Llm(format!(
                "Generation API error ({status}): {error_text}"
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| VisaRagError::Llm(format!("Failed to parse response: {e}")))?;

        Ok(result.response)
    }
}

//! Gemini REST adapter for content synthesis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SynthError, SynthResult};
use crate::traits::{SynthesisRequest, Synthesizer};

/// Immutable synthesizer configuration, built once at startup.
///
/// The API key is read from the environment by the CLI; this crate never
/// touches the environment itself.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub max_retries: u32,
    pub endpoint: String,
}

impl SynthConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: "gemini-3.0-pro".to_string(),
            temperature: 0.2,
            max_output_tokens: 8192,
            max_retries: 3,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

/// Synthesizer backed by the Gemini `generateContent` REST API.
pub struct GeminiSynthesizer {
    config: SynthConfig,
    client: reqwest::Client,
}

impl GeminiSynthesizer {
    pub fn new(config: SynthConfig) -> SynthResult<Self> {
        if config.api_key.is_empty() {
            return Err(SynthError::NotConfigured);
        }
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, request: &SynthesisRequest) -> SynthResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("Context: {}\n\nTask: {}", request.kind, request.prompt),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
            },
        };

        // Retry transient failures (5xx, rate limits, network errors) with
        // exponential backoff: 1s, 2s, 4s.
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay = std::time::Duration::from_secs(1 << attempt);
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.post(&url).json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("Gemini request failed (attempt {}): {}", attempt + 1, e);
                    last_error = Some(SynthError::Backend(format!("network error: {}", e)));
                    continue;
                }
            };

            let status = response.status();

            if status.is_server_error() || status.as_u16() == 429 {
                let text = response.text().await.unwrap_or_default();
                last_error = Some(SynthError::Backend(format!(
                    "Gemini API error {} (attempt {}/{}): {}",
                    status,
                    attempt + 1,
                    self.config.max_retries,
                    text
                )));
                continue;
            }

            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                return Err(SynthError::Backend(format!(
                    "Gemini API error {}: {}",
                    status, text
                )));
            }

            let result: GenerateResponse = response
                .json()
                .await
                .map_err(|e| SynthError::Backend(format!("failed to parse response: {}", e)))?;

            let text = result
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text)
                .ok_or_else(|| SynthError::Backend("empty response from Gemini".to_string()))?;

            debug!("Synthesized {} chars for {}", text.len(), request.kind);
            return Ok(text);
        }

        Err(last_error.unwrap_or_else(|| SynthError::Backend("max retries exceeded".to_string())))
    }
}

#[async_trait]
impl Synthesizer for GeminiSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> SynthResult<String> {
        self.generate(request).await
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_not_configured() {
        let result = GeminiSynthesizer::new(SynthConfig::new(""));
        assert!(matches!(result, Err(SynthError::NotConfigured)));
    }

    #[test]
    fn test_default_model() {
        let synth = GeminiSynthesizer::new(SynthConfig::new("key")).unwrap();
        assert_eq!(synth.model(), "gemini-3.0-pro");
    }

    #[test]
    fn test_custom_model() {
        let config = SynthConfig::new("key").model("gemini-1.5-flash");
        let synth = GeminiSynthesizer::new(config).unwrap();
        assert_eq!(synth.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"resource {}"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "resource {}");
    }

    #[test]
    fn test_empty_candidates_default() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }
}

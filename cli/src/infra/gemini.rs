//! Gemini `generateContent` REST client: implements `CompletionClient`.
//!
//! The request asks for a JSON MIME type so the model answers with a bare
//! object; the classifier still tolerates prose around it.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::application::ports::CompletionClient;
use crate::domain::IntentError;
use crate::domain::config::GeminiConfig;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Client for one Gemini model.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(config: &GeminiConfig, api_key: &str) -> Self {
        let url = format!(
            "{}/models/{}:generateContent",
            config.endpoint.trim_end_matches('/'),
            config.model
        );
        Self {
            http: reqwest::Client::new(),
            url,
            api_key: api_key.to_string(),
            model: config.model.clone(),
        }
    }
}

impl CompletionClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };
        tracing::debug!(model = %self.model, "gemini request");

        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            // Strip the URL; it carries the API key.
            .map_err(|e| IntentError::Unreachable(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(IntentError::Unreachable(format!(
                "HTTP {status}: {}",
                truncate(detail.trim(), 300)
            ))
            .into());
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| IntentError::Malformed(e.without_url().to_string()))?;
        first_text(parsed)
            .ok_or_else(|| IntentError::Malformed("response contained no text".to_string()).into())
    }
}

fn first_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

//! Optional brand summary via an OpenAI-compatible chat-completions endpoint.

use std::time::Duration;

use serde_json::{json, Value};

/// Summaries shorter than this are treated as a refusal or an empty answer.
const MIN_SUMMARY_LEN: usize = 40;
const MAX_INPUT_CHARS: usize = 6_000;

#[derive(Clone)]
pub struct TextApiSettings {
    pub api_key: String,
    /// Base URL without a trailing slash, e.g. `https://api.openai.com`.
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for TextApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextApiSettings")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct TextApiClient {
    client: reqwest::Client,
    settings: TextApiSettings,
}

impl TextApiClient {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn new(settings: TextApiSettings) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    /// One-paragraph summary of a brand from its about text.
    ///
    /// Returns `None` on any transport, status, or decoding failure; the
    /// summary is decoration and never fails an analysis.
    pub async fn summarize_brand(&self, store_name: Option<&str>, about_text: &str) -> Option<String> {
        let excerpt: String = about_text.chars().take(MAX_INPUT_CHARS).collect();
        let brand = store_name.unwrap_or("this brand");
        let req_body = json!({
            "model": self.settings.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You write neutral, factual one-paragraph summaries of consumer brands for market research."
                },
                {
                    "role": "user",
                    "content": format!(
                        "Summarize {brand} in at most three sentences: what it sells, who it sells to, and what sets it apart. Use only the text below.\n\n{excerpt}"
                    )
                }
            ],
            "temperature": 0.2
        });

        let url = format!("{}/v1/chat/completions", self.settings.base_url);
        let response = match self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&req_body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "brand summary request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "brand summary request rejected");
            return None;
        }

        let body: Value = response.json().await.ok()?;
        parse_summary(&body)
    }
}

fn parse_summary(body: &Value) -> Option<String> {
    let content = body
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(Value::as_str)?;
    let summary = content.split_whitespace().collect::<Vec<_>>().join(" ");
    (summary.len() >= MIN_SUMMARY_LEN).then_some(summary)
}

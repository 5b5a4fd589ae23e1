//! OpenAI-compatible chat-completions transport.
//!
//! `ChatClient` calls any `/v1/chat/completions` endpoint (OpenAI, Groq,
//! LM Studio, vLLM, Ollama in OpenAI mode).  All connection details come
//! from [`LlmConfig`]; nothing is hardcoded.

use thiserror::Error;

use crate::config::LlmConfig;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the LLM endpoint.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The endpoint answered with a non-success status.
    #[error("LLM endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The HTTP response or the model's reply could not be parsed.
    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    /// The LLM returned a response with no usable text content.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// ChatClient
// ---------------------------------------------------------------------------

/// Thin JSON-mode client for `/v1/chat/completions`.
#[derive(Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    temperature: f32,
}

impl ChatClient {
    /// Build a client from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is used if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            temperature: config.temperature,
        }
    }

    /// Full URL of the chat-completions endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Send `messages` to `model` asking for a JSON object, and return the
    /// reply text with any Markdown code fence removed.
    ///
    /// The `Authorization: Bearer …` header is attached only when an API key
    /// is configured.
    pub async fn complete_json(
        &self,
        model: &str,
        messages: Vec<serde_json::Value>,
    ) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model":           model,
            "messages":        messages,
            "stream":          false,
            "temperature":     self.temperature,
            "response_format": { "type": "json_object" }
        });

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(key) = self.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        log::debug!("llm: POST {} model={model}", self.endpoint());
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status {
                status: status.as_u16(),
                body: truncate(&body, 300),
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?;

        let content = strip_code_fence(content);
        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(content.to_string())
    }
}

/// Remove a surrounding ```` ``` ```` / ```` ```json ```` fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:1234/".into(),
            ..LlmConfig::default()
        };
        let client = ChatClient::from_config(&config);
        assert_eq!(client.endpoint(), "http://localhost:1234/v1/chat/completions");
    }

    #[test]
    fn configured_api_key_is_sent() {
        let config = LlmConfig {
            api_key: Some("sk-x".into()),
            ..LlmConfig::default()
        };
        assert_eq!(ChatClient::from_config(&config).api_key.as_deref(), Some("sk-x"));
    }

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[test]
    fn plain_text_is_only_trimmed() {
        assert_eq!(strip_code_fence("  {\"a\":1} \n"), "{\"a\":1}");
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}

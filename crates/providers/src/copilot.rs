//! Client for the enterprise "copilot" chat gateway.
//!
//! The gateway takes a list of messages and answers with `{"data": {"text": ...}}`.
//! Authentication is carried in static headers (typically `Authorization`).

use crate::{check_status, http_client, CompletionResponse, LlmProvider, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

#[derive(Clone)]
pub struct CopilotConfig {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub timeout: Duration,
}

#[derive(Clone)]
pub struct CopilotProvider {
    client: Client,
    cfg: CopilotConfig,
}

impl CopilotProvider {
    pub fn new(cfg: CopilotConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(cfg.timeout)?,
            cfg,
        })
    }
}

#[derive(Serialize)]
struct Message<'a> {
    content: &'a str,
    role: &'static str,
}

#[derive(Serialize)]
struct CopilotRequest<'a> {
    messages: [Message<'a>; 1],
}

#[derive(Deserialize)]
struct CopilotResponse {
    data: CopilotData,
}

#[derive(Deserialize)]
struct CopilotData {
    text: String,
}

#[async_trait::async_trait]
impl LlmProvider for CopilotProvider {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let body = CopilotRequest {
            messages: [Message {
                content: prompt,
                role: "User",
            }],
        };
        let mut builder = self.client.post(&self.cfg.url).json(&body);
        for (name, value) in &self.cfg.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        tracing::debug!(url = %self.cfg.url, "sending prompt to copilot");
        let resp = builder.send().await?;
        let parsed: CopilotResponse = check_status(resp).await?.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("copilot response missing data.text: {e}"))
        })?;
        Ok(CompletionResponse {
            text: parsed.data.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_single_user_message() {
        let body = CopilotRequest {
            messages: [Message {
                content: "定义",
                role: "User",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"messages": [{"content": "定义", "role": "User"}]})
        );
    }

    #[test]
    fn response_text_is_read_from_data() {
        let parsed: CopilotResponse =
            serde_json::from_str(r#"{"code": 0, "data": {"text": "名称：血糖"}}"#).unwrap();
        assert_eq!(parsed.data.text, "名称：血糖");
    }
}

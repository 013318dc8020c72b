use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tally_suggest::{Oracle, OracleError};
use tracing::debug;

use crate::auth;
use crate::config::{OracleSection, Provider};

const CLASSIFIER_SYSTEM: &str =
    "You are a careful bank-transaction classifier. Follow the user's rules exactly.";

/// Oracle backed by a hosted LLM HTTP API.
#[derive(Clone)]
pub struct HttpOracle {
    client: reqwest::Client,
    provider: Provider,
    model: String,
    base_url: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
}

impl fmt::Debug for HttpOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpOracle")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl HttpOracle {
    /// Build from config; the API key comes from env or auth.json.
    pub fn from_config(section: &OracleSection) -> Result<Self> {
        let provider = section.provider()?;
        let api_key = require_key(provider, auth::api_key(provider)?).with_context(|| {
            format!(
                "set {} or run: tally auth paste-key --provider {}",
                provider.api_key_env(),
                provider.name()
            )
        })?;
        let timeout_secs = section.request_timeout_secs.max(1);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("build http client")?;

        Ok(Self {
            client,
            provider,
            model: section.model.clone(),
            base_url: section.base_url()?,
            api_key,
            temperature: section.temperature,
            max_tokens: section.max_tokens,
            timeout_secs,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    fn map_send_err(&self, e: reqwest::Error) -> OracleError {
        if e.is_timeout() {
            OracleError::Timeout(self.timeout_secs)
        } else {
            OracleError::Http(e)
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, OracleError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(OracleError::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn openai(&self, prompt: &str) -> Result<String, OracleError> {
        let body = OpenAiReq {
            model: self.model.strip_prefix("openai/").unwrap_or(&self.model).to_string(),
            messages: vec![
                Msg::new("system", CLASSIFIER_SYSTEM),
                Msg::new("user", prompt),
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;

        let out: OpenAiResp = Self::check(resp).await?.json().await?;
        out.text()
    }

    async fn anthropic(&self, prompt: &str) -> Result<String, OracleError> {
        let body = AnthropicReq {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: CLASSIFIER_SYSTEM.to_string(),
            messages: vec![Msg::new("user", prompt)],
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| OracleError::InvalidResponse(format!("bad api key header: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;

        let out: AnthropicResp = Self::check(resp).await?.json().await?;
        out.text()
    }

    async fn gemini(&self, prompt: &str) -> Result<String, OracleError> {
        let body = GeminiReq {
            system_instruction: GeminiContent::text(CLASSIFIER_SYSTEM),
            contents: vec![GeminiContent::text(prompt)],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let resp = self
            .client
            .post(format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;

        let out: GeminiResp = Self::check(resp).await?.json().await?;
        out.text()
    }
}

#[async_trait]
impl Oracle for HttpOracle {
    async fn classify(&self, prompt: &str) -> Result<String, OracleError> {
        debug!(provider = self.provider.name(), model = %self.model, "calling oracle");
        match self.provider {
            Provider::OpenAI => self.openai(prompt).await,
            Provider::Anthropic => self.anthropic(prompt).await,
            Provider::Gemini => self.gemini(prompt).await,
        }
    }
}

fn require_key(provider: Provider, key: Option<String>) -> Result<String, OracleError> {
    key.filter(|k| !k.trim().is_empty())
        .ok_or_else(|| OracleError::MissingApiKey(provider.name().to_string()))
}

fn non_empty(s: String, provider: &str) -> Result<String, OracleError> {
    let s = s.trim().to_string();
    if s.is_empty() {
        return Err(OracleError::InvalidResponse(format!("{provider} returned no text")));
    }
    Ok(s)
}

#[derive(Debug, Serialize)]
struct Msg {
    role: String,
    content: String,
}

impl Msg {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct OpenAiReq {
    model: String,
    messages: Vec<Msg>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiResp {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMsgOut,
}

#[derive(Debug, Deserialize)]
struct OpenAiMsgOut {
    content: Option<String>,
}

impl OpenAiResp {
    fn text(self) -> Result<String, OracleError> {
        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();
        non_empty(content, "openai")
    }
}

#[derive(Debug, Serialize)]
struct AnthropicReq {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Msg>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResp {
    content: Vec<AnthropicBlock>,
}

#[derive(Debug, Deserialize)]
struct AnthropicBlock {
    #[serde(rename = "type")]
    t: String,
    text: Option<String>,
}

impl AnthropicResp {
    fn text(self) -> Result<String, OracleError> {
        let mut s = String::new();
        for b in self.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        non_empty(s, "anthropic")
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiReq {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

impl GeminiContent {
    fn text(s: &str) -> Self {
        Self {
            parts: vec![GeminiPart {
                text: Some(s.to_string()),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResp {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResp {
    fn text(self) -> Result<String, OracleError> {
        let s = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect::<String>())
            .unwrap_or_default();
        non_empty(s, "gemini")
    }
}

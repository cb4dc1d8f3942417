use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use shared::error::GatewayError;
use shared::settings::GatewaySettings;
use std::collections::VecDeque;
use std::env;
use std::fmt::Display;
use std::time::Duration;

use crate::sse::{SseEvent, SseParser};
use crate::transport::{ModelTransport, ResponseStream};

const FALLBACK_KEY_ENV: &str = "GEMINI_API_KEY";
const MAX_ERROR_BODY: usize = 800;

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single-turn request with a plain text prompt.
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::user(vec![Part::text(text)])],
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, text: impl Into<String>) -> Self {
        self.system_instruction = Some(Content {
            role: None,
            parts: vec![Part::text(text)],
        });
        self
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.generation_config = Some(config);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts,
        }
    }

    pub fn with_role(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: Some(role.to_string()),
            parts: vec![Part::text(text)],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    /// Set on reasoning summaries, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn inline(data_base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data_base64.into(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

impl GenerationConfig {
    pub fn thinking(budget: i32) -> Self {
        Self {
            thinking_config: Some(ThinkingConfig {
                thinking_budget: budget,
            }),
            ..Default::default()
        }
    }

    /// Ask for JSON conforming to `schema`.
    pub fn json(schema: serde_json::Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            ..Default::default()
        }
    }

    pub fn image(aspect_ratio: impl Into<String>) -> Self {
        Self {
            image_config: Some(ImageConfig {
                aspect_ratio: aspect_ratio.into(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Reply envelope carrying one text part. Handy for fakes.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_parts(vec![Part::text(text)])
    }

    pub fn from_parts(parts: Vec<Part>) -> Self {
        Self {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".to_string()),
                    parts,
                }),
                finish_reason: None,
            }],
        }
    }

    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or(&[])
    }

    /// Concatenated answer text of the first candidate; empty when there is none.
    pub fn text(&self) -> String {
        self.first_parts()
            .iter()
            .filter(|p| !p.thought.unwrap_or(false))
            .filter_map(|p| p.text.as_deref())
            .collect()
    }

    /// First inline binary payload of the first candidate.
    pub fn first_inline_data(&self) -> Option<&InlineData> {
        self.first_parts().iter().find_map(|p| p.inline_data.as_ref())
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTPS client for the Generative Language REST API.
pub struct GeminiClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiClient {
    /// Reads the API key from the environment now; a missing key is only
    /// reported when a request is made.
    pub fn from_settings(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        let api_key = read_key(&settings.api_key_env).or_else(|| read_key(FALLBACK_KEY_ENV));
        Self::new(settings, api_key)
    }

    pub fn new(settings: &GatewaySettings, api_key: Option<String>) -> Result<Self, GatewayError> {
        let mut builder = Client::builder().pool_max_idle_per_host(2);
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key,
            api_key_env: settings.api_key_env.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn post(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<Response, GatewayError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| GatewayError::MissingCredentials {
                env: self.api_key_env.clone(),
            })?;
        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", key)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.trim().chars().take(MAX_ERROR_BODY).collect();
            return Err(GatewayError::Status { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl ModelTransport for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GatewayError> {
        let url = self.endpoint(model, "generateContent");
        tracing::debug!(model, "generateContent");
        let resp = self.post(&url, request).await?;
        let bytes = resp.bytes().await.map_err(transport_error)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn stream(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<ResponseStream, GatewayError> {
        let url = format!("{}?alt=sse", self.endpoint(model, "streamGenerateContent"));
        tracing::debug!(model, "streamGenerateContent");
        let resp = self.post(&url, request).await?;
        Ok(sse_responses(resp.bytes_stream()))
    }
}

fn read_key(var: &str) -> Option<String> {
    env::var(var).ok().filter(|k| !k.trim().is_empty())
}

fn transport_error(err: reqwest::Error) -> GatewayError {
    GatewayError::Transport(err.to_string())
}

/// Turn an SSE body into response envelopes. The stream ends after the
/// first error.
pub fn sse_responses<S, B, E>(body: S) -> ResponseStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = (Box::pin(body.fuse()), SseParser::new(), VecDeque::<SseEvent>::new(), false);
    futures::stream::unfold(Some(state), |state| async move {
        let Some((mut body, mut parser, mut pending, mut drained)) = state else {
            return None;
        };
        loop {
            if let Some(event) = pending.pop_front() {
                return match serde_json::from_str::<GenerateContentResponse>(&event.data) {
                    Ok(resp) => Some((Ok(resp), Some((body, parser, pending, drained)))),
                    Err(e) => Some((Err(GatewayError::from(e)), None)),
                };
            }
            if drained {
                return None;
            }
            match body.next().await {
                Some(Ok(bytes)) => pending.extend(parser.feed(bytes.as_ref())),
                Some(Err(e)) => {
                    return Some((
                        Err(GatewayError::Transport(format!("stream read error: {}", e))),
                        None,
                    ))
                }
                None => {
                    pending.extend(parser.finish());
                    drained = true;
                }
            }
        }
    })
    .boxed()
}

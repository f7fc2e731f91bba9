use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chat::{ChatMessage, ChatRole, Source};
use crate::sse::SseDecoder;
use crate::{AssistantError, ChatBackend, ReplyChunk, ReplyStream};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// Streaming client for the Gemini `streamGenerateContent` endpoint with
/// Google Search grounding enabled.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, AssistantError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ChatBackend for GeminiClient {
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[ChatMessage],
    ) -> Result<ReplyStream, AssistantError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AssistantError::Config("missing API key".to_string()))?;

        let body = GenerateContentRequest::new(system_instruction, history);
        debug!(model = %self.config.model, turns = body.contents.len(), "requesting assistant reply");

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AssistantError::Api { status: status.as_u16(), message });
        }
        Ok(decode_stream(response.bytes_stream()))
    }
}

/// Turns an SSE byte stream into reply chunks, one per `data:` event.
pub fn decode_stream<S, B, E>(body: S) -> ReplyStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Into<AssistantError> + Send + 'static,
{
    let state = (Box::pin(body), SseDecoder::new(), false);
    stream::unfold(state, |(mut body, mut decoder, done)| async move {
        if done {
            return None;
        }
        let (events, done): (Vec<Result<ReplyChunk, AssistantError>>, bool) = match body.next().await {
            Some(Ok(bytes)) => (
                decoder.push(bytes.as_ref()).iter().map(|e| parse_event(e)).collect(),
                false,
            ),
            Some(Err(e)) => (vec![Err(e.into())], true),
            None => (decoder.finish().iter().map(|e| parse_event(e)).collect(), true),
        };
        Some((events, (body, decoder, done)))
    })
    .flat_map(stream::iter)
    .boxed()
}

fn parse_event(data: &str) -> Result<ReplyChunk, AssistantError> {
    let response: GenerateContentResponse = serde_json::from_str(data)?;
    if let Some(error) = response.error {
        return Err(AssistantError::Api {
            status: error.code.unwrap_or(500),
            message: error.message,
        });
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(ReplyChunk::default());
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|meta| meta.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri?;
            let title = web.title.filter(|t| !t.is_empty()).unwrap_or_else(|| "Source".to_string());
            Some(Source { title, uri })
        })
        .collect();

    Ok(ReplyChunk { text, sources })
}

// Wire types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    tools: Vec<serde_json::Value>,
}

impl GenerateContentRequest {
    fn new(system_instruction: &str, history: &[ChatMessage]) -> Self {
        Self {
            system_instruction: Content::text(None, system_instruction),
            contents: history
                .iter()
                .filter(|m| !m.text.is_empty())
                .map(|m| {
                    let role = match m.role {
                        ChatRole::User => "user",
                        ChatRole::Model => "model",
                    };
                    Content::text(Some(role), &m.text)
                })
                .collect(),
            tools: vec![serde_json::json!({ "googleSearch": {} })],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: &str) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: Some(text.to_string()), thought: false }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

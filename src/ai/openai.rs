//! Thin client for an OpenAI-compatible chat-completion API.

use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;

use crate::ai::FragmentStream;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    Unconfigured,

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed provider payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("provider response did not include message content")]
    MissingContent,
}

// Wire types. The streamed delta's content field is optional by design:
// role-only and finish chunks carry no text.

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionChunk {
    /// Text delta of the first choice, empty-defaulting when absent.
    pub(crate) fn delta_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.delta.content)
    }
}

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Single-shot completion; blocks until the full message is available.
    pub async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ProviderError> {
        let response = self
            .request(system_prompt, user_prompt, max_tokens, false)
            .await?;

        let parsed: ChatCompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ProviderError::MissingContent)
    }

    /// Streamed completion: a finite, non-restartable sequence of text
    /// fragments. Errors after the stream opened surface as stream items.
    pub async fn complete_stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
    ) -> Result<FragmentStream, ProviderError> {
        let response = self
            .request(system_prompt, user_prompt, max_tokens, true)
            .await?;

        let mut body = response.bytes_stream();

        let stream = async_stream::stream! {
            let mut parser = EventStreamParser::default();

            while let Some(chunk) = body.next().await {
                let bytes = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(ProviderError::Http(e));
                        return;
                    }
                };

                for payload in parser.push(&String::from_utf8_lossy(&bytes)) {
                    match serde_json::from_str::<ChatCompletionChunk>(&payload) {
                        Ok(chunk) => {
                            if let Some(text) = chunk.delta_content() {
                                yield Ok(text);
                            }
                        }
                        Err(e) => {
                            yield Err(ProviderError::Json(e));
                            return;
                        }
                    }
                }

                if parser.is_done() {
                    return;
                }
            }
        };

        Ok(Box::pin(stream))
    }

    async fn request(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        stream: bool,
    ) -> Result<reqwest::Response, ProviderError> {
        let api_key = self.api_key.as_ref().ok_or(ProviderError::Unconfigured)?;

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "max_tokens": max_tokens,
            "stream": stream,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

/// Incremental parser for `data: <payload>` event-stream lines. Byte chunks
/// from the transport do not align with line boundaries, so input is
/// buffered until a full line is available.
#[derive(Debug, Default)]
pub(crate) struct EventStreamParser {
    buf: String,
    done: bool,
}

impl EventStreamParser {
    /// Feeds a transport chunk, returning every completed data payload.
    pub(crate) fn push(&mut self, input: &str) -> Vec<String> {
        let mut payloads = Vec::new();

        if self.done {
            return payloads;
        }

        self.buf.push_str(input);

        while let Some(pos) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=pos).collect();
            let line = line.trim();

            if let Some(payload) = line.strip_prefix("data: ") {
                if payload == "[DONE]" {
                    self.done = true;
                    return payloads;
                }
                payloads.push(payload.to_string());
            }
        }

        payloads
    }

    pub(crate) const fn is_done(&self) -> bool {
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parser_extracts_data_payloads() {
        let mut parser = EventStreamParser::default();
        let payloads = parser.push("data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}", "{\"b\":2}"]);
        assert!(!parser.is_done());
    }

    #[test]
    fn parser_handles_lines_split_across_chunks() {
        let mut parser = EventStreamParser::default();
        assert!(parser.push("data: {\"a\"").is_empty());
        let payloads = parser.push(":1}\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}"]);
    }

    #[test]
    fn parser_stops_at_done_marker() {
        let mut parser = EventStreamParser::default();
        let payloads = parser.push("data: {\"a\":1}\n\ndata: [DONE]\n\ndata: {\"b\":2}\n\n");
        assert_eq!(payloads, vec!["{\"a\":1}"]);
        assert!(parser.is_done());
        assert!(parser.push("data: {\"c\":3}\n\n").is_empty());
    }

    #[test]
    fn chunk_delta_defaults_to_absent_content() {
        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap();
        assert_eq!(chunk.delta_content(), None);

        let chunk: ChatCompletionChunk =
            serde_json::from_str(r#"{"choices":[{"delta":{"content":"hi"}}]}"#).unwrap();
        assert_eq!(chunk.delta_content(), Some("hi".to_string()));

        let chunk: ChatCompletionChunk = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert_eq!(chunk.delta_content(), None);
    }

    #[test]
    fn completion_content_is_optional() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
                .unwrap();
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        assert_eq!(content, Some("ok".to_string()));
    }
}

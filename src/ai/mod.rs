//! Language-model gateway: summarize, improve and tag note content.
//!
//! Provider failures never escape this module as errors. Every operation
//! degrades to a well-formed fallback value so callers and the streaming
//! relay never special-case "provider unreachable".

pub mod openai;

use std::pin::Pin;
use std::time::Duration;

use futures::Stream;

use openai::{OpenAiClient, ProviderError};

/// A lazy, finite, non-restartable sequence of generated text fragments.
/// Both the real provider stream and the mock fallback stream satisfy this
/// shape, so consumers never distinguish them.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

const SUMMARIZE_SYSTEM_PROMPT: &str = "You are a helpful assistant that creates concise summaries \
     of text content. Keep summaries under 100 words.";
const IMPROVE_SYSTEM_PROMPT: &str = "You are a writing assistant that improves text clarity, \
     grammar, and style while maintaining the original meaning and tone.";
const TAGS_SYSTEM_PROMPT: &str = "Generate 3-5 relevant tags for the given content. Return only \
     the tags as a comma-separated list, no explanations.";

const SUMMARIZE_MAX_TOKENS: u32 = 150;
const IMPROVE_MAX_TOKENS: u32 = 500;
const TAGS_MAX_TOKENS: u32 = 50;

const MOCK_CHUNK_CHARS: usize = 10;
const MOCK_CHUNK_DELAY: Duration = Duration::from_millis(100);

pub struct AiGateway {
    client: OpenAiClient,
}

impl AiGateway {
    pub const fn new(client: OpenAiClient) -> Self {
        Self { client }
    }

    /// Concise summary of the content, capped around 100 words.
    pub async fn summarize(&self, content: &str) -> String {
        let prompt = format!("Please summarize this text:\n\n{content}");
        match self
            .client
            .complete(SUMMARIZE_SYSTEM_PROMPT, &prompt, SUMMARIZE_MAX_TOKENS)
            .await
        {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("summarization failed, using fallback: {e}");
                summary_fallback(content)
            }
        }
    }

    /// Streaming form of [`Self::summarize`]. A provider stream that cannot
    /// be opened is replaced by a mock replay of the fallback summary.
    pub async fn summarize_stream(&self, content: &str) -> FragmentStream {
        let prompt = format!("Please summarize this text:\n\n{content}");
        match self
            .client
            .complete_stream(SUMMARIZE_SYSTEM_PROMPT, &prompt, SUMMARIZE_MAX_TOKENS)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("summarization stream failed, using mock stream: {e}");
                mock_stream(summary_fallback(content))
            }
        }
    }

    /// Grammar/clarity rewrite preserving meaning and tone.
    pub async fn improve(&self, content: &str) -> String {
        let prompt = format!("Please improve this text:\n\n{content}");
        match self
            .client
            .complete(IMPROVE_SYSTEM_PROMPT, &prompt, IMPROVE_MAX_TOKENS)
            .await
        {
            Ok(improved) => improved,
            Err(e) => {
                tracing::warn!("content improvement failed, using fallback: {e}");
                improve_fallback(content)
            }
        }
    }

    /// Streaming form of [`Self::improve`].
    pub async fn improve_stream(&self, content: &str) -> FragmentStream {
        let prompt = format!("Please improve this text:\n\n{content}");
        match self
            .client
            .complete_stream(IMPROVE_SYSTEM_PROMPT, &prompt, IMPROVE_MAX_TOKENS)
            .await
        {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!("improvement stream failed, using mock stream: {e}");
                mock_stream(improve_fallback(content))
            }
        }
    }

    /// 3-5 tags for the content. Single-shot only; the result is structured
    /// data, not prose.
    pub async fn generate_tags(&self, content: &str) -> Vec<String> {
        match self
            .client
            .complete(TAGS_SYSTEM_PROMPT, content, TAGS_MAX_TOKENS)
            .await
        {
            Ok(tags) => tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            Err(e) => {
                tracing::warn!("tag generation failed, using fallback: {e}");
                tag_fallback(content)
            }
        }
    }
}

fn summary_fallback(content: &str) -> String {
    let prefix: String = content.chars().take(100).collect();
    format!("Summary: {prefix}... [AI summarization temporarily unavailable]")
}

fn improve_fallback(content: &str) -> String {
    format!("Improved: {content}\n\n[AI content improvement temporarily unavailable]")
}

/// Three distinct words from the input plus two constant filler tags.
fn tag_fallback(content: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in content
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
    {
        if !tags.iter().any(|t| t == word) {
            tags.push(word.to_string());
        }
        if tags.len() == 3 {
            break;
        }
    }
    tags.push("ai-demo".to_string());
    tags.push("note".to_string());
    tags
}

/// Replays a fallback string in small character chunks with artificial
/// pacing, mimicking the shape and rhythm of a real provider stream.
fn mock_stream(text: String) -> FragmentStream {
    let chunks: Vec<String> = text
        .chars()
        .collect::<Vec<_>>()
        .chunks(MOCK_CHUNK_CHARS)
        .map(|c| c.iter().collect())
        .collect();

    Box::pin(async_stream::stream! {
        for chunk in chunks {
            tokio::time::sleep(MOCK_CHUNK_DELAY).await;
            yield Ok(chunk);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn offline_gateway() -> AiGateway {
        AiGateway::new(OpenAiClient::new(None, None, None))
    }

    #[test]
    fn summary_fallback_truncates_to_prefix() {
        let content = "z".repeat(300);
        let fallback = summary_fallback(&content);
        assert!(fallback.starts_with("Summary: "));
        assert!(fallback.contains(&"z".repeat(100)));
        assert!(!fallback.contains(&"z".repeat(101)));
        assert!(fallback.ends_with("[AI summarization temporarily unavailable]"));
    }

    #[test]
    fn improve_fallback_keeps_content_verbatim() {
        let fallback = improve_fallback("keep me intact");
        assert!(fallback.starts_with("Improved: keep me intact"));
        assert!(fallback.ends_with("[AI content improvement temporarily unavailable]"));
    }

    #[test]
    fn tag_fallback_is_three_words_plus_fillers() {
        let tags = tag_fallback("alpha beta gamma delta epsilon");
        assert_eq!(tags, vec!["alpha", "beta", "gamma", "ai-demo", "note"]);
    }

    #[test]
    fn tag_fallback_deduplicates_words() {
        let tags = tag_fallback("repeat repeat repeat other words");
        assert_eq!(tags, vec!["repeat", "other", "words", "ai-demo", "note"]);
    }

    #[test]
    fn tag_fallback_with_sparse_input_still_has_fillers() {
        let tags = tag_fallback("solo");
        assert_eq!(tags, vec!["solo", "ai-demo", "note"]);
    }

    #[tokio::test(start_paused = true)]
    async fn mock_stream_reassembles_to_original_text() {
        let text = "a fallback string long enough to span several chunks".to_string();
        let fragments: Vec<String> = mock_stream(text.clone())
            .map(|f| f.expect("mock stream never errors"))
            .collect()
            .await;

        assert!(fragments.len() > 1);
        assert!(fragments.iter().all(|f| f.chars().count() <= MOCK_CHUNK_CHARS));
        assert_eq!(fragments.concat(), text);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfigured_improve_returns_fallback_not_error() {
        let improved = offline_gateway().improve("original words").await;
        assert!(improved.starts_with("Improved: original words"));
        assert!(improved.contains("temporarily unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn unconfigured_summarize_stream_falls_back_to_mock() {
        let stream = offline_gateway().summarize_stream("some note content").await;
        let fragments: Vec<String> = stream
            .map(|f| f.expect("fallback stream never errors"))
            .collect()
            .await;

        assert_eq!(fragments.concat(), summary_fallback("some note content"));
    }

    #[tokio::test(start_paused = true)]
    async fn unconfigured_tags_use_fallback_shape() {
        let tags = offline_gateway()
            .generate_tags("meeting notes about project planning")
            .await;
        assert_eq!(tags.len(), 5);
        assert_eq!(&tags[3..], &["ai-demo".to_string(), "note".to_string()]);
    }
}

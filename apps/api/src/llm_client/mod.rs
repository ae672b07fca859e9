/// LLM Client — the single point of entry for all Claude API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
/// Output cap for one analyze call. Responses that hit it arrive with stop
/// reason `max_tokens` and go through truncation repair downstream.
const MAX_TOKENS: u32 = 3000;
/// Overall guard on one streaming call, connection through last byte.
const REQUEST_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("stream error: {0}")]
    Stream(String),
}

/// Why the model stopped producing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of the response.
    EndTurn,
    /// Cut off by the output token cap — the accumulated text is a prefix.
    MaxTokens,
    Other,
}

impl StopReason {
    fn from_api(raw: &str) -> Self {
        match raw {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            _ => StopReason::Other,
        }
    }
}

/// One observation from a streaming generation call: a text increment, or the
/// terminal stop signal. `Stopped` is always the last item of a healthy stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TextEvent {
    Delta(String),
    Stopped(StopReason),
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// What one `data:` payload from the upstream SSE feed means to us.
#[derive(Debug, PartialEq)]
enum SsePayload {
    Delta(String),
    StopReason(StopReason),
    MessageStop,
    ApiError(String),
    Ignored,
}

/// The single LLM client used by all services.
/// Wraps the Anthropic Messages API in streaming mode — one pass, no retries:
/// a failed generation surfaces to the user, who resubmits.
#[derive(Clone)]
pub struct LlmClient {
    client: reqwest::Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Opens a streaming generation call and returns the sequence of text
    /// increments, ending in exactly one `Stopped` item.
    ///
    /// Request-level failures (transport, non-2xx status) are returned as an
    /// error before any item is produced; mid-stream failures terminate the
    /// sequence with an `Err` item. Dropping the stream abandons the call.
    pub async fn stream(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<impl Stream<Item = Result<TextEvent, LlmError>> + Send, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| {
                    v.get("error")
                        .and_then(|e| e.get("message"))
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("LLM stream opened (model: {MODEL})");

        let byte_stream = response.bytes_stream();

        Ok(stream! {
            tokio::pin!(byte_stream);
            let mut sse_buffer = String::new();
            let mut stop_reason = StopReason::Other;

            while let Some(chunk) = byte_stream.next().await {
                let chunk = match chunk {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        yield Err(LlmError::Http(e));
                        return;
                    }
                };
                sse_buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(newline) = sse_buffer.find('\n') {
                    let line = sse_buffer[..newline].trim().to_string();
                    sse_buffer.drain(..=newline);

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };
                    match parse_sse_payload(data) {
                        SsePayload::Delta(text) => yield Ok(TextEvent::Delta(text)),
                        SsePayload::StopReason(reason) => stop_reason = reason,
                        SsePayload::MessageStop => {
                            yield Ok(TextEvent::Stopped(stop_reason));
                            return;
                        }
                        SsePayload::ApiError(message) => {
                            yield Err(LlmError::Stream(message));
                            return;
                        }
                        SsePayload::Ignored => {}
                    }
                }
            }

            // Upstream closed without a message_stop — a transport-level cut,
            // not a model stop condition.
            yield Err(LlmError::Stream(
                "verbinding gesloten voor het einde van het antwoord".to_string(),
            ));
        })
    }
}

/// Interprets one SSE `data:` payload from the Messages API.
///
/// Only `content_block_delta` text, the `message_delta` stop reason, the
/// `message_stop` terminator, and `error` events matter here; pings and block
/// boundaries are ignored.
fn parse_sse_payload(data: &str) -> SsePayload {
    let Ok(event) = serde_json::from_str::<Value>(data) else {
        return SsePayload::Ignored;
    };
    match event.get("type").and_then(Value::as_str).unwrap_or("") {
        "content_block_delta" => {
            let text = event
                .get("delta")
                .and_then(|d| d.get("text"))
                .and_then(Value::as_str)
                .unwrap_or("");
            if text.is_empty() {
                SsePayload::Ignored
            } else {
                SsePayload::Delta(text.to_string())
            }
        }
        "message_delta" => match event
            .get("delta")
            .and_then(|d| d.get("stop_reason"))
            .and_then(Value::as_str)
        {
            Some(reason) => SsePayload::StopReason(StopReason::from_api(reason)),
            None => SsePayload::Ignored,
        },
        "message_stop" => SsePayload::MessageStop,
        "error" => {
            let message = event
                .get("error")
                .and_then(|e| e.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("onbekende streamfout");
            SsePayload::ApiError(message.to_string())
        }
        _ => SsePayload::Ignored,
    }
}

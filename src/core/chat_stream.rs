use serde_json::Value;
use tokio::sync::mpsc;

use crate::api::{ChatRequest, Conversation};
use crate::core::sse::{EventStream, SseEvent};
use crate::utils::url::construct_api_url;

/// Messages forwarded to the consumer while a reply streams in.
#[derive(Clone, Debug)]
pub enum StreamMessage {
    /// Conversation ids minted for this turn, sent before the first delta.
    Ids {
        user_conversation_id: Option<i64>,
        assistant_conversation_id: Option<i64>,
    },
    Chunk(String),
    Error(String),
    End,
}

/// What one decoded stream payload means to the chat session.
#[derive(Debug, PartialEq)]
enum StreamPayload {
    Ids {
        user_conversation_id: Option<i64>,
        assistant_conversation_id: Option<i64>,
    },
    Content(String),
    Failure(String),
}

fn classify_payload(value: &Value) -> Option<StreamPayload> {
    if let Some(content) = value.pointer("/data/content").and_then(Value::as_str) {
        return Some(StreamPayload::Content(content.to_string()));
    }
    if value.get("error").is_some() {
        return Some(StreamPayload::Failure(value.to_string()));
    }
    if value.get("type").and_then(Value::as_str) == Some("ids") {
        return Some(StreamPayload::Ids {
            user_conversation_id: value.get("user_conversation_id").and_then(Value::as_i64),
            assistant_conversation_id: value
                .get("assistant_conversation_id")
                .and_then(Value::as_i64),
        });
    }
    None
}

/// Forward one payload to the consumer. Returns true when the stream must
/// stop (the server reported a failure mid-stream).
fn handle_payload(
    value: &Value,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    match classify_payload(value) {
        Some(StreamPayload::Content(content)) => {
            let _ = tx.send((StreamMessage::Chunk(content), stream_id));
            false
        }
        Some(StreamPayload::Ids {
            user_conversation_id,
            assistant_conversation_id,
        }) => {
            let _ = tx.send((
                StreamMessage::Ids {
                    user_conversation_id,
                    assistant_conversation_id,
                },
                stream_id,
            ));
            false
        }
        Some(StreamPayload::Failure(raw)) => {
            let _ = tx.send((StreamMessage::Error(format_server_error(&raw)), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            true
        }
        None => {
            tracing::debug!(payload = %value, "ignoring unrecognized stream payload");
            false
        }
    }
}

fn error_summary(value: &Value) -> Option<String> {
    let text = value
        .pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .or_else(|| value.get("message").and_then(Value::as_str))?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Render a server-side failure for terminal display, pretty-printing JSON
/// bodies and pulling out a one-line summary when one is present.
pub fn format_server_error(raw: &str) -> String {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return "Server error:\n```\n<empty>\n```".to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let pretty =
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| trimmed.to_string());
        return match error_summary(&value) {
            Some(summary) => format!("Server error: {summary}\n```json\n{pretty}\n```"),
            None => format!("Server error:\n```json\n{pretty}\n```"),
        };
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        format!("Server error:\n```xml\n{trimmed}\n```")
    } else {
        format!("Server error:\n```\n{trimmed}\n```")
    }
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub roleplay_id: i64,
    pub conversation: Conversation,
    pub cancel_token: tokio_util::sync::CancellationToken,
    pub stream_id: u64,
}

/// Spawns streaming chat requests and fans their messages into one channel.
///
/// Messages are tagged with the stream id they belong to so a consumer that
/// restarted a conversation can drop deliveries from the superseded stream.
#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                base_url,
                roleplay_id,
                conversation,
                cancel_token,
                stream_id,
            } = params;

            let request = ChatRequest {
                roleplay_id,
                conversation,
                stream: true,
            };

            tokio::select! {
                _ = run_stream(client, base_url, request, tx, stream_id, cancel_token.clone()) => {}
                _ = cancel_token.cancelled() => {}
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn run_stream(
    client: reqwest::Client,
    base_url: String,
    request: ChatRequest,
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
    cancel_token: tokio_util::sync::CancellationToken,
) {
    let url = construct_api_url(&base_url, "api/chat/stream");
    // No request timeout here: a generation may legitimately run for minutes
    // and progress is observable per chunk.
    let response = match client
        .post(url)
        .header("Content-Type", "application/json")
        .header("Accept", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .json(&request)
        .send()
        .await
    {
        Ok(response) => response,
        Err(err) => {
            let _ = tx.send((
                StreamMessage::Error(format_server_error(&err.to_string())),
                stream_id,
            ));
            let _ = tx.send((StreamMessage::End, stream_id));
            return;
        }
    };

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        let _ = tx.send((
            StreamMessage::Error(format_server_error(&error_text)),
            stream_id,
        ));
        let _ = tx.send((StreamMessage::End, stream_id));
        return;
    }

    let mut events = EventStream::new(response.bytes_stream());
    loop {
        if cancel_token.is_cancelled() {
            return;
        }
        match events.next_event().await {
            Some(Ok(SseEvent::Data(value))) => {
                if handle_payload(&value, &tx, stream_id) {
                    return;
                }
            }
            Some(Ok(SseEvent::Done)) | None => {
                let _ = tx.send((StreamMessage::End, stream_id));
                return;
            }
            Some(Err(err)) => {
                let _ = tx.send((
                    StreamMessage::Error(format!("stream interrupted: {err}")),
                    stream_id,
                ));
                let _ = tx.send((StreamMessage::End, stream_id));
                return;
            }
        }
    }
}

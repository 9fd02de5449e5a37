//! Non-streaming chat and service health.
//!
//! The streaming path lives in [`crate::core::chat_stream`]; this module
//! covers the blocking variant that returns the whole reply at once.

use std::error::Error;

use crate::api::{ChatCompletion, ChatRequest, Conversation, HealthStatus, StageClient};

impl StageClient {
    /// Ask `roleplay_id` to answer `conversation` and wait for the full
    /// reply.
    pub async fn send_chat(
        &self,
        roleplay_id: i64,
        conversation: Conversation,
    ) -> Result<ChatCompletion, Box<dyn Error>> {
        let request = ChatRequest {
            roleplay_id,
            conversation,
            stream: false,
        };
        self.post_json("api/chat", &request, self.chat_timeout())
            .await
    }

    pub async fn health(&self) -> Result<HealthStatus, Box<dyn Error>> {
        self.get_json("api/health").await
    }
}

//! Conversation history endpoints.
//!
//! Creating or rewriting a conversation can trigger LLM work on the server,
//! so those calls use the chat timeout rather than the CRUD one.

use std::error::Error;

use crate::api::{Conversation, StageClient};

impl StageClient {
    pub async fn conversations_by_character(
        &self,
        character_id: i64,
    ) -> Result<Vec<Conversation>, Box<dyn Error>> {
        self.get_json(&format!("api/conversations/character/{character_id}"))
            .await
    }

    pub async fn conversations_by_scene(
        &self,
        sid: &str,
    ) -> Result<Vec<Conversation>, Box<dyn Error>> {
        self.get_json(&format!("api/conversations/scene/{sid}"))
            .await
    }

    pub async fn create_conversation(
        &self,
        conversation: &Conversation,
    ) -> Result<Conversation, Box<dyn Error>> {
        self.post_json("api/conversations", conversation, self.chat_timeout())
            .await
    }

    pub async fn update_conversation(
        &self,
        conversation_id: i64,
        conversation: &Conversation,
    ) -> Result<Conversation, Box<dyn Error>> {
        self.put_json(
            &format!("api/conversations/{conversation_id}"),
            conversation,
            self.chat_timeout(),
        )
        .await
    }

    /// Returns the id of the deleted conversation.
    pub async fn delete_conversation(&self, conversation_id: i64) -> Result<i64, Box<dyn Error>> {
        self.delete_json(&format!("api/conversations/{conversation_id}"))
            .await
    }
}

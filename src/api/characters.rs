//! Character roster endpoints.

use std::error::Error;

use crate::api::{
    Character, CreateCharacterByNameRequest, CreateCharacterRequest, DisconnectedScene,
    StageClient, UpdateCharacterRequest,
};

impl StageClient {
    pub async fn list_characters(&self) -> Result<Vec<Character>, Box<dyn Error>> {
        self.get_json("api/characters").await
    }

    pub async fn get_character(&self, character_id: i64) -> Result<Character, Box<dyn Error>> {
        self.get_json(&format!("api/characters/{character_id}"))
            .await
    }

    pub async fn create_character(
        &self,
        request: &CreateCharacterRequest,
    ) -> Result<Character, Box<dyn Error>> {
        self.post_json("api/characters", request, self.request_timeout())
            .await
    }

    /// Create a character from a name, letting the server pick a default
    /// prompt when the request carries none.
    pub async fn create_character_by_name(
        &self,
        request: &CreateCharacterByNameRequest,
    ) -> Result<Character, Box<dyn Error>> {
        self.post_json(
            "api/characters/by-conversation",
            request,
            self.request_timeout(),
        )
        .await
    }

    pub async fn update_character(
        &self,
        character_id: i64,
        request: &UpdateCharacterRequest,
    ) -> Result<Character, Box<dyn Error>> {
        self.put_json(
            &format!("api/characters/{character_id}"),
            request,
            self.request_timeout(),
        )
        .await
    }

    /// Returns the id of the deleted character.
    pub async fn delete_character(&self, character_id: i64) -> Result<i64, Box<dyn Error>> {
        self.delete_json(&format!("api/characters/{character_id}"))
            .await
    }

    pub async fn disconnect_character_from_scene(
        &self,
        character_id: i64,
        sid: &str,
    ) -> Result<DisconnectedScene, Box<dyn Error>> {
        self.delete_json(&format!("api/characters/{character_id}/scenes/{sid}"))
            .await
    }
}

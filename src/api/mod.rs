use serde::{Deserialize, Serialize};

/// Response envelope used by every REST endpoint of the stage server:
/// `{ code, message, data }`, where `code == 200` means success.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub character_id: i64,
    pub name: String,
    pub prompt: String,
    pub is_visible: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateCharacterRequest {
    pub name: String,
    pub prompt: String,
    pub is_visible: bool,
}

/// Create a character from a name alone; the server fills in a default
/// prompt when none is given.
#[derive(Debug, Serialize)]
pub struct CreateCharacterByNameRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub is_visible: bool,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateCharacterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub sid: String,
    pub name: String,
    pub is_main: bool,
    pub summary: String,
    pub is_root: bool,
}

/// Payload for a new scene. An empty `sid` asks the server to mint one.
#[derive(Debug, Serialize)]
pub struct CreateSceneRequest {
    pub sid: String,
    pub name: String,
    pub is_main: bool,
    pub summary: String,
    pub is_root: bool,
}

/// The server accepts one parent scene or several.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ParentScenes {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Serialize)]
pub struct CreateSceneByCurrentRequest {
    pub new_scene: CreateSceneRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_scenes_id: Option<ParentScenes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_ids: Option<Vec<i64>>,
}

#[derive(Debug, Default, Serialize)]
pub struct UpdateSceneRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_main: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_root: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct ConnectCharacterRequest {
    pub character_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visible: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneEdge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct SceneGraph {
    pub nodes: Vec<Scene>,
    pub edges: Vec<SceneEdge>,
}

/// A scene-membership row, joined with the character it links.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterSceneLink {
    pub character_id: i64,
    pub sid: String,
    pub sort_order: i64,
    pub is_visible: bool,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub character: Option<Character>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub message: String,
    pub sid: String,
    pub sender_id: i64,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub roleplay_id: i64,
    pub conversation: Conversation,
    pub stream: bool,
}

/// Data of a completed (non-streaming) chat turn.
#[derive(Debug, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub user_conversation_id: Option<i64>,
    #[serde(default)]
    pub assistant_conversation_id: Option<i64>,
    #[serde(default)]
    pub roleplay_id: Option<i64>,
    /// Unix timestamp stamped by the server.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    #[serde(default)]
    pub chat_service_available: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeletedScene {
    pub deleted_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DisconnectedScene {
    pub character_id: i64,
    pub scene_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConnectedCharacter {
    pub scene_id: String,
    pub character_id: i64,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub is_visible: Option<bool>,
}

pub mod characters;
pub mod chat;
pub mod client;
pub mod conversations;
pub mod scenes;

pub use client::StageClient;

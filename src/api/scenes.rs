//! Scene endpoints, including the scene graph and cast management.

use std::error::Error;

use crate::api::{
    CharacterSceneLink, ConnectCharacterRequest, ConnectedCharacter, CreateSceneByCurrentRequest,
    DeletedScene, Scene, SceneGraph, StageClient, UpdateSceneRequest,
};

impl StageClient {
    pub async fn list_scenes(&self) -> Result<Vec<Scene>, Box<dyn Error>> {
        self.get_json("api/scenes").await
    }

    pub async fn get_scene(&self, sid: &str) -> Result<Scene, Box<dyn Error>> {
        self.get_json(&format!("api/scenes/{sid}")).await
    }

    /// Create a scene, optionally branching off one or more parent scenes
    /// and pre-connecting characters.
    pub async fn create_scene(
        &self,
        request: &CreateSceneByCurrentRequest,
    ) -> Result<Scene, Box<dyn Error>> {
        self.post_json("api/scenes", request, self.request_timeout())
            .await
    }

    pub async fn update_scene(
        &self,
        sid: &str,
        request: &UpdateSceneRequest,
    ) -> Result<Scene, Box<dyn Error>> {
        self.put_json(
            &format!("api/scenes/{sid}"),
            request,
            self.request_timeout(),
        )
        .await
    }

    pub async fn delete_scene(&self, sid: &str) -> Result<DeletedScene, Box<dyn Error>> {
        self.delete_json(&format!("api/scenes/{sid}")).await
    }

    /// The characters connected to a scene, in cast order.
    pub async fn scene_characters(
        &self,
        sid: &str,
    ) -> Result<Vec<CharacterSceneLink>, Box<dyn Error>> {
        self.get_json(&format!("api/scenes/{sid}/characters")).await
    }

    pub async fn connect_character(
        &self,
        sid: &str,
        request: &ConnectCharacterRequest,
    ) -> Result<ConnectedCharacter, Box<dyn Error>> {
        self.post_json(
            &format!("api/scenes/{sid}/characters"),
            request,
            self.request_timeout(),
        )
        .await
    }

    pub async fn scene_graph(&self) -> Result<SceneGraph, Box<dyn Error>> {
        self.get_json("api/scenes/graph").await
    }

    /// Every chain of parent scenes leading to `sid`, outermost first.
    pub async fn scene_parents(&self, sid: &str) -> Result<Vec<Vec<Scene>>, Box<dyn Error>> {
        self.get_json(&format!("api/scenes/{sid}/parents")).await
    }
}

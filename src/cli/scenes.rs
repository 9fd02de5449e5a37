//! Scene commands

use std::error::Error;

use clap::Subcommand;

use crate::api::{
    ConnectCharacterRequest, CreateSceneByCurrentRequest, CreateSceneRequest, ParentScenes,
    StageClient,
};

#[derive(Subcommand)]
pub enum SceneCommands {
    /// List every scene on the server
    List,
    /// Show one scene
    Show { sid: String },
    /// Create a scene, optionally branching off parent scenes
    Create {
        name: String,
        /// Scene id; the server mints one when omitted
        #[arg(long, default_value = "")]
        sid: String,
        #[arg(long, default_value = "")]
        summary: String,
        /// Parent scene(s) the new scene branches from
        #[arg(long = "parent")]
        parents: Vec<String>,
        /// Character(s) to connect right away
        #[arg(long = "character")]
        characters: Vec<i64>,
        #[arg(long)]
        main: bool,
        #[arg(long)]
        root: bool,
    },
    /// Delete a scene
    Delete { sid: String },
    /// List the characters connected to a scene, in cast order
    Cast { sid: String },
    /// Connect a character to a scene
    Connect {
        sid: String,
        character_id: i64,
        #[arg(long)]
        order: Option<i64>,
        #[arg(long)]
        hidden: bool,
    },
    /// Print the whole scene graph as edges
    Graph,
    /// Print the parent chains leading to a scene
    Parents { sid: String },
}

pub async fn run(client: StageClient, command: SceneCommands) -> Result<(), Box<dyn Error>> {
    match command {
        SceneCommands::List => {
            let scenes = client.list_scenes().await?;
            if scenes.is_empty() {
                println!("No scenes yet.");
                return Ok(());
            }
            for scene in scenes {
                let mut flags = Vec::new();
                if scene.is_root {
                    flags.push("root");
                }
                if scene.is_main {
                    flags.push("main");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };
                println!("  • {} {}{}", scene.sid, scene.name, flags);
            }
        }
        SceneCommands::Show { sid } => {
            let scene = client.get_scene(&sid).await?;
            println!("{} {}", scene.sid, scene.name);
            println!("main: {}  root: {}", scene.is_main, scene.is_root);
            if !scene.summary.is_empty() {
                println!();
                println!("{}", scene.summary);
            }
        }
        SceneCommands::Create {
            name,
            sid,
            summary,
            mut parents,
            characters,
            main,
            root,
        } => {
            let current_scenes_id = if parents.len() == 1 {
                parents.pop().map(ParentScenes::One)
            } else if parents.is_empty() {
                None
            } else {
                Some(ParentScenes::Many(parents))
            };
            let request = CreateSceneByCurrentRequest {
                new_scene: CreateSceneRequest {
                    sid,
                    name,
                    is_main: main,
                    summary,
                    is_root: root,
                },
                current_scenes_id,
                character_ids: if characters.is_empty() {
                    None
                } else {
                    Some(characters)
                },
            };
            let scene = client.create_scene(&request).await?;
            println!("Created scene {} {}", scene.sid, scene.name);
        }
        SceneCommands::Delete { sid } => {
            let deleted = client.delete_scene(&sid).await?;
            println!("Deleted scene {}", deleted.deleted_id);
        }
        SceneCommands::Connect {
            sid,
            character_id,
            order,
            hidden,
        } => {
            let request = ConnectCharacterRequest {
                character_id,
                sort_order: order,
                is_visible: Some(!hidden),
            };
            let connected = client.connect_character(&sid, &request).await?;
            println!(
                "Connected character #{} to scene {}",
                connected.character_id, connected.scene_id
            );
        }
        SceneCommands::Cast { sid } => {
            let cast = client.scene_characters(&sid).await?;
            if cast.is_empty() {
                println!("Scene {sid} has no characters.");
                return Ok(());
            }
            for link in cast {
                let name = link
                    .character
                    .as_ref()
                    .map(|c| c.name.as_str())
                    .unwrap_or("(unknown)");
                let visibility = if link.is_visible { "" } else { " (hidden)" };
                println!(
                    "  {:>3}. #{} {}{}",
                    link.sort_order, link.character_id, name, visibility
                );
            }
        }
        SceneCommands::Graph => {
            let graph = client.scene_graph().await?;
            println!(
                "{} scenes, {} transitions",
                graph.nodes.len(),
                graph.edges.len()
            );
            for edge in graph.edges {
                println!("  {} -> {}", edge.source, edge.target);
            }
        }
        SceneCommands::Parents { sid } => {
            let chains = client.scene_parents(&sid).await?;
            if chains.is_empty() {
                println!("Scene {sid} has no parent scenes.");
                return Ok(());
            }
            for chain in chains {
                let path: Vec<&str> = chain.iter().map(|scene| scene.sid.as_str()).collect();
                println!("  {}", path.join(" -> "));
            }
        }
    }
    Ok(())
}

//! Character roster commands

use std::error::Error;

use clap::Subcommand;

use crate::api::{CreateCharacterByNameRequest, CreateCharacterRequest, StageClient};

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// List every character on the server
    List,
    /// Show one character, including its prompt
    Show { character_id: i64 },
    /// Create a character (server picks a default prompt if none given)
    Create {
        name: String,
        #[arg(long)]
        prompt: Option<String>,
        /// Keep the character out of scene pickers
        #[arg(long)]
        hidden: bool,
    },
    /// Delete a character
    Delete { character_id: i64 },
    /// Remove a character from a scene
    Disconnect { character_id: i64, sid: String },
}

pub async fn run(client: StageClient, command: CharacterCommands) -> Result<(), Box<dyn Error>> {
    match command {
        CharacterCommands::List => {
            let characters = client.list_characters().await?;
            if characters.is_empty() {
                println!("No characters yet.");
                println!();
                println!("💡 Create one with:");
                println!("   greenroom characters create <name>");
                return Ok(());
            }
            for character in characters {
                let visibility = if character.is_visible { "" } else { " (hidden)" };
                println!(
                    "  • #{} {}{}",
                    character.character_id, character.name, visibility
                );
            }
        }
        CharacterCommands::Show { character_id } => {
            let character = client.get_character(character_id).await?;
            println!("#{} {}", character.character_id, character.name);
            println!("visible: {}", character.is_visible);
            println!();
            println!("{}", character.prompt);
        }
        CharacterCommands::Create {
            name,
            prompt,
            hidden,
        } => {
            let character = match prompt {
                Some(prompt) => {
                    client
                        .create_character(&CreateCharacterRequest {
                            name,
                            prompt,
                            is_visible: !hidden,
                        })
                        .await?
                }
                None => {
                    client
                        .create_character_by_name(&CreateCharacterByNameRequest {
                            name,
                            prompt: None,
                            is_visible: !hidden,
                        })
                        .await?
                }
            };
            println!("Created #{} {}", character.character_id, character.name);
        }
        CharacterCommands::Delete { character_id } => {
            let deleted_id = client.delete_character(character_id).await?;
            println!("Deleted character #{deleted_id}");
        }
        CharacterCommands::Disconnect { character_id, sid } => {
            let result = client
                .disconnect_character_from_scene(character_id, &sid)
                .await?;
            println!(
                "Disconnected character #{} from scene {}",
                result.character_id, result.scene_id
            );
        }
    }
    Ok(())
}

//! Conversation history commands

use std::error::Error;

use clap::Subcommand;

use crate::api::StageClient;

#[derive(Subcommand)]
pub enum ConversationCommands {
    /// List conversations for a character or a scene
    List {
        #[arg(short = 'c', long)]
        character: Option<i64>,
        #[arg(short = 's', long)]
        scene: Option<String>,
    },
    /// Delete a conversation
    Delete { conversation_id: i64 },
}

pub async fn run(client: StageClient, command: ConversationCommands) -> Result<(), Box<dyn Error>> {
    match command {
        ConversationCommands::List { character, scene } => list(client, character, scene).await,
        ConversationCommands::Delete { conversation_id } => {
            let deleted_id = client.delete_conversation(conversation_id).await?;
            println!("Deleted conversation #{deleted_id}");
            Ok(())
        }
    }
}

async fn list(
    client: StageClient,
    character: Option<i64>,
    scene: Option<String>,
) -> Result<(), Box<dyn Error>> {
    let conversations = match (character, scene) {
        (Some(character_id), None) => client.conversations_by_character(character_id).await?,
        (None, Some(sid)) => client.conversations_by_scene(&sid).await?,
        _ => {
            eprintln!("Usage: greenroom conversations list (-c <character_id> | -s <sid>)");
            std::process::exit(1);
        }
    };

    if conversations.is_empty() {
        println!("No conversations found.");
        return Ok(());
    }
    for conversation in conversations {
        let id = conversation
            .conversation_id
            .map(|id| format!("#{id}"))
            .unwrap_or_else(|| "#?".to_string());
        println!(
            "  {id} [{}] {}: {}",
            conversation.sid, conversation.role, conversation.message
        );
    }
    Ok(())
}

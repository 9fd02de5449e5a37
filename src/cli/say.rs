//! One-shot chat command

use std::error::Error;
use std::io::{self, Write};

use tokio_util::sync::CancellationToken;

use crate::api::{Conversation, StageClient};
use crate::core::chat_stream::{ChatStreamService, StreamMessage, StreamParams};
use crate::core::config::Config;

pub async fn run_say(
    client: StageClient,
    config: &Config,
    message: Vec<String>,
    character: Option<i64>,
    scene: Option<String>,
    sender: i64,
    no_stream: bool,
) -> Result<(), Box<dyn Error>> {
    let message = message.join(" ");
    if message.is_empty() {
        eprintln!("Usage: greenroom say <message>");
        std::process::exit(1);
    }

    let Some(roleplay_id) = character.or(config.default_character) else {
        eprintln!("No character selected.");
        eprintln!();
        eprintln!("💡 Pick one with -c <id>, or set a default:");
        eprintln!("   greenroom set default-character <id>");
        std::process::exit(1);
    };
    let Some(sid) = scene.or_else(|| config.default_scene.clone()) else {
        eprintln!("No scene selected.");
        eprintln!();
        eprintln!("💡 Pick one with -s <sid>, or set a default:");
        eprintln!("   greenroom set default-scene <sid>");
        std::process::exit(1);
    };

    let conversation = Conversation {
        message,
        sid,
        sender_id: sender,
        role: "user".to_string(),
        conversation_id: None,
    };

    if no_stream {
        let completion = client.send_chat(roleplay_id, conversation).await?;
        match completion.response {
            Some(text) => println!("{text}"),
            None => eprintln!("(the server returned an empty reply)"),
        }
        if let Some(ts) = completion.timestamp {
            if let Some(when) = chrono::DateTime::from_timestamp(ts, 0) {
                let local = when.with_timezone(&chrono::Local);
                eprintln!("(answered at {})", local.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        return Ok(());
    }

    let params = StreamParams {
        client: client.http().clone(),
        base_url: client.base_url().to_string(),
        roleplay_id,
        conversation,
        cancel_token: CancellationToken::new(),
        stream_id: 1,
    };

    let (stream_service, mut rx) = ChatStreamService::new();
    stream_service.spawn_stream(params);

    loop {
        match rx.recv().await {
            Some((StreamMessage::Chunk(content), _)) => {
                print!("{content}");
                io::stdout().flush()?;
            }
            Some((StreamMessage::Ids {
                user_conversation_id,
                assistant_conversation_id,
            }, _)) => {
                tracing::debug!(
                    ?user_conversation_id,
                    ?assistant_conversation_id,
                    "conversation ids assigned"
                );
            }
            Some((StreamMessage::Error(err), _)) => {
                eprintln!("\n\n❌ Error: {err}");
                std::process::exit(1);
            }
            Some((StreamMessage::End, _)) => {
                println!();
                break;
            }
            None => break,
        }
    }

    Ok(())
}

//! Server health command

use std::error::Error;

use crate::api::StageClient;

pub async fn check(client: StageClient) -> Result<(), Box<dyn Error>> {
    match client.health().await {
        Ok(health) => {
            println!("{} is {}", health.service, health.status);
            if !health.chat_service_available {
                println!("⚠️  chat service unavailable; streaming will fail");
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ Stage server unreachable: {err}");
            std::process::exit(1);
        }
    }
}

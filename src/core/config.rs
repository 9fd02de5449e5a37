use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use crate::core::constants::{
    DEFAULT_CHAT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_URL,
};

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the stage server.
    pub server_url: Option<String>,
    /// Scene used when a command does not name one.
    pub default_scene: Option<String>,
    /// Character (by id) the LLM plays when a command does not name one.
    pub default_character: Option<i64>,
    pub request_timeout_secs: Option<u64>,
    pub chat_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Config, Box<dyn Error>> {
        let config_path = Self::get_config_path();
        Self::load_from_path(&config_path)
    }

    pub fn load_from_path(config_path: &PathBuf) -> Result<Config, Box<dyn Error>> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn Error>> {
        let config_path = Self::get_config_path();
        self.save_to_path(&config_path)
    }

    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<(), Box<dyn Error>> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    fn get_config_path() -> PathBuf {
        let proj_dirs = ProjectDirs::from("org", "greenroom", "greenroom")
            .expect("Failed to determine config directory");
        proj_dirs.config_dir().join("config.toml")
    }

    pub fn print_all(&self) {
        println!("Current configuration:");
        match &self.server_url {
            Some(url) => println!("  server-url: {url}"),
            None => println!("  server-url: (unset, using {DEFAULT_SERVER_URL})"),
        }
        match &self.default_scene {
            Some(sid) => println!("  default-scene: {sid}"),
            None => println!("  default-scene: (unset)"),
        }
        match &self.default_character {
            Some(id) => println!("  default-character: {id}"),
            None => println!("  default-character: (unset)"),
        }
        println!(
            "  request-timeout: {}s",
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
        println!(
            "  chat-timeout: {}s",
            self.chat_timeout_secs.unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS)
        );
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "server-url" => self.server_url = Some(value.to_string()),
            "default-scene" => self.default_scene = Some(value.to_string()),
            "default-character" => {
                let id: i64 = value
                    .parse()
                    .map_err(|_| format!("default-character must be a character id, got {value:?}"))?;
                self.default_character = Some(id);
            }
            "request-timeout" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("request-timeout must be seconds, got {value:?}"))?;
                self.request_timeout_secs = Some(secs);
            }
            "chat-timeout" => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("chat-timeout must be seconds, got {value:?}"))?;
                self.chat_timeout_secs = Some(secs);
            }
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), Box<dyn Error>> {
        match key {
            "server-url" => self.server_url = None,
            "default-scene" => self.default_scene = None,
            "default-character" => self.default_character = None,
            "request-timeout" => self.request_timeout_secs = None,
            "chat-timeout" => self.chat_timeout_secs = None,
            _ => return Err(format!("Unknown configuration key: {key}").into()),
        }
        Ok(())
    }
}

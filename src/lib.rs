//! Greenroom is a terminal client for roleplay stage servers.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the streaming machinery: the incremental SSE decoder,
//!   the chat stream service that drives it, and user configuration.
//! - [`api`] defines the server's data types and the thin REST wrappers
//!   for characters, scenes, conversations, and chat.
//! - [`cli`] parses arguments and implements the commands.
//! - [`utils`] holds URL normalization and the injected notifier interface.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod core;
pub mod utils;

//! Shared defaults used across the application

/// Stage server address assumed when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Timeout for ordinary CRUD requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Timeout for requests that wait on LLM generation, in seconds.
pub const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 180;

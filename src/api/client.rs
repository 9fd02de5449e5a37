//! HTTP plumbing shared by the resource wrappers.
//!
//! Every REST endpoint speaks the same envelope; this module owns the
//! request/unwrap cycle so the per-resource modules stay declarative.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::ApiEnvelope;
use crate::core::config::Config;
use crate::core::constants::{
    DEFAULT_CHAT_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_URL,
};
use crate::utils::notify::{LogNotifier, Notifier};
use crate::utils::url::{construct_api_url, normalize_base_url};

/// Client for one stage server.
///
/// Cheap to clone; carries the connection pool, timeouts, and the injected
/// [`Notifier`] that surfaces server-supplied messages.
#[derive(Clone)]
pub struct StageClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
    chat_timeout: Duration,
    notifier: Arc<dyn Notifier>,
}

impl StageClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: normalize_base_url(base_url),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            chat_timeout: Duration::from_secs(DEFAULT_CHAT_TIMEOUT_SECS),
            notifier: Arc::new(LogNotifier),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut client = Self::new(config.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL));
        client.request_timeout = Duration::from_secs(
            config
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        );
        client.chat_timeout =
            Duration::from_secs(config.chat_timeout_secs.unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS));
        client
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Timeout for LLM-bound requests, which run much longer than CRUD calls.
    pub fn chat_timeout(&self) -> Duration {
        self.chat_timeout
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        construct_api_url(&self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, Box<dyn Error>> {
        let response = self
            .http
            .get(self.endpoint(path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(describe_transport_error)?;
        self.unwrap_response(response).await
    }

    pub(crate) async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, Box<dyn Error>> {
        let response = self
            .http
            .post(self.endpoint(path))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(describe_transport_error)?;
        self.unwrap_response(response).await
    }

    pub(crate) async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, Box<dyn Error>> {
        let response = self
            .http
            .put(self.endpoint(path))
            .header("Content-Type", "application/json")
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(describe_transport_error)?;
        self.unwrap_response(response).await
    }

    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, Box<dyn Error>> {
        let response = self
            .http
            .delete(self.endpoint(path))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(describe_transport_error)?;
        self.unwrap_response(response).await
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn unwrap_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, Box<dyn Error>> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            // The server usually wraps errors in the envelope even on bad
            // status codes; prefer its message when it does.
            if let Ok(envelope) = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body) {
                self.notifier.error(&envelope.message);
                return Err(format!("request failed ({status}): {}", envelope.message).into());
            }
            return Err(format!("request failed with status {status}: {body}").into());
        }
        let envelope = response
            .json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;
        unwrap_envelope(envelope, self.notifier.as_ref())
    }
}

/// Apply the envelope contract: non-200 codes are errors (reported through
/// the notifier), success messages are surfaced, and the payload is returned.
pub(crate) fn unwrap_envelope<T>(
    envelope: ApiEnvelope<T>,
    notifier: &dyn Notifier,
) -> Result<T, Box<dyn Error>> {
    if !envelope.is_success() {
        notifier.error(&envelope.message);
        return Err(format!(
            "server rejected the request ({}): {}",
            envelope.code, envelope.message
        )
        .into());
    }
    if !envelope.message.is_empty() {
        notifier.success(&envelope.message);
    }
    envelope
        .data
        .ok_or_else(|| "response envelope carried no data".into())
}

fn describe_transport_error(err: reqwest::Error) -> Box<dyn Error> {
    if err.is_timeout() {
        "request timed out; the model may need more time to respond".into()
    } else if err.is_connect() {
        "could not reach the stage server; check the server URL and network".into()
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::RecordingNotifier;

    #[test]
    fn unwrap_envelope_returns_data_and_reports_success() {
        let notifier = RecordingNotifier::new();
        let envelope = ApiEnvelope {
            code: 200,
            message: "created".to_string(),
            data: Some(41),
        };
        let value = unwrap_envelope(envelope, &notifier).unwrap();
        assert_eq!(value, 41);
        assert_eq!(notifier.successes(), vec!["created"]);
        assert!(notifier.errors().is_empty());
    }

    #[test]
    fn unwrap_envelope_rejects_business_errors() {
        let notifier = RecordingNotifier::new();
        let envelope: ApiEnvelope<i64> = ApiEnvelope {
            code: 404,
            message: "scene missing".to_string(),
            data: None,
        };
        let err = unwrap_envelope(envelope, &notifier).unwrap_err();
        assert!(err.to_string().contains("scene missing"));
        assert_eq!(notifier.errors(), vec!["scene missing"]);
        assert!(notifier.successes().is_empty());
    }

    #[test]
    fn unwrap_envelope_requires_data_on_success() {
        let notifier = RecordingNotifier::new();
        let envelope: ApiEnvelope<i64> = ApiEnvelope {
            code: 200,
            message: String::new(),
            data: None,
        };
        assert!(unwrap_envelope(envelope, &notifier).is_err());
        // A silent envelope produces no notifications either way.
        assert!(notifier.successes().is_empty());
    }

    #[test]
    fn client_normalizes_the_base_url() {
        let client = StageClient::new("http://localhost:8000///");
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.endpoint("api/scenes"),
            "http://localhost:8000/api/scenes"
        );
    }
}

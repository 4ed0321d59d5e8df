//! One-shot answer retrieval from the remote bot backend.
//!
//! A fetch always resolves to a displayable string: transport problems and
//! unusable bodies are mapped to fixed fallback replies at this boundary.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{AnswerRequest, ResponseMessage};
use crate::core::config::Settings;

/// Shown when the backend answered but no usable reply could be found.
pub const NO_REPLY_FALLBACK: &str = "很抱歉，未能获取到回复。";
/// Shown when the request itself failed.
pub const NETWORK_ERROR_FALLBACK: &str = "网络异常，请稍后重试。";

#[async_trait]
pub trait AnswerFetcher: Send + Sync {
    /// Perform exactly one remote call. Never fails; see the fallback constants.
    async fn fetch_answer(&self, bot_id: &str, query: &str) -> String;
}

#[derive(Debug)]
enum FetchError {
    Transport(reqwest::Error),
    Status(StatusCode),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(err) => write!(f, "transport error: {err}"),
            FetchError::Status(status) => write!(f, "unexpected status {status}"),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err)
    }
}

/// Pick the first assistant answer out of a decoded response body.
///
/// Entries that lack `role`, `type` or a string `content` are skipped. Returns
/// `None` when the body has no `messages` list or no entry qualifies.
pub fn extract_answer(body: &Value) -> Option<String> {
    body.get("messages")?
        .as_array()?
        .iter()
        .filter_map(|item| serde_json::from_value::<ResponseMessage>(item.clone()).ok())
        .find(ResponseMessage::is_answer)
        .map(|message| message.content)
}

#[derive(Clone)]
pub struct HttpAnswerFetcher {
    client: Client,
    endpoint: String,
    token: String,
    user_id: String,
}

impl HttpAnswerFetcher {
    pub fn new(
        client: Client,
        endpoint: impl Into<String>,
        token: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        Self::from_settings_with(Client::builder(), settings)
    }

    /// A zero timeout in a hand-edited config file means no timeout.
    pub(crate) fn from_settings_with(
        mut builder: ClientBuilder,
        settings: &Settings,
    ) -> Result<Self, reqwest::Error> {
        if let Some(secs) = settings.request_timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::new(
            builder.build()?,
            settings.endpoint.clone(),
            settings.token.clone(),
            settings.user_id.clone(),
        ))
    }

    async fn try_fetch(&self, bot_id: &str, query: &str) -> Result<Option<String>, FetchError> {
        let request = AnswerRequest {
            bot_id: bot_id.to_string(),
            user: self.user_id.clone(),
            query: query.to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await?;
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => Ok(extract_answer(&body)),
            Err(err) => {
                debug!(error = %err, len = bytes.len(), "answer body is not JSON");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl AnswerFetcher for HttpAnswerFetcher {
    async fn fetch_answer(&self, bot_id: &str, query: &str) -> String {
        debug!(bot_id, query_len = query.len(), "fetching answer");
        match self.try_fetch(bot_id, query).await {
            Ok(Some(answer)) => answer,
            Ok(None) => {
                warn!(bot_id, "response carried no assistant answer");
                NO_REPLY_FALLBACK.to_string()
            }
            Err(err) => {
                warn!(bot_id, error = %err, "answer request failed");
                NETWORK_ERROR_FALLBACK.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests;

//! Background answer fetches for the chat loop.
//!
//! Each fetch runs on its own task and races its cancellation token. A
//! cancelled fetch reports nothing; a finished one sends its reply back
//! together with the session epoch it was started under.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::answer::AnswerFetcher;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchMessage {
    Settled(String),
}

pub struct FetchParams {
    pub fetcher: Arc<dyn AnswerFetcher>,
    pub bot_id: String,
    pub query: String,
    pub cancel_token: CancellationToken,
    pub epoch: u64,
}

/// Runs answer fetches in the background and reports their settlement,
/// tagged with the session epoch they were started under.
#[derive(Clone)]
pub struct FetchService {
    tx: mpsc::UnboundedSender<(FetchMessage, u64)>,
}

impl FetchService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(FetchMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_fetch(&self, params: FetchParams) {
        let tx_clone = self.tx.clone();
        tokio::spawn(async move {
            let FetchParams {
                fetcher,
                bot_id,
                query,
                cancel_token,
                epoch,
            } = params;

            tokio::select! {
                reply = fetcher.fetch_answer(&bot_id, &query) => {
                    let _ = tx_clone.send((FetchMessage::Settled(reply), epoch));
                }
                _ = cancel_token.cancelled() => {
                    debug!(epoch, "fetch cancelled before settling");
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: FetchMessage, epoch: u64) {
        let _ = self.tx.send((message, epoch));
    }
}

//! Conversation session state machine.
//!
//! A session is either idle or awaiting exactly one answer. `submit` moves it
//! to awaiting and hands back the request to run; `complete_fetch` moves it
//! back. Every request is tagged with the epoch it was started under so a
//! persona switch can invalidate replies that arrive afterwards.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::core::message::Message;
use crate::core::persona::{Persona, PersonaTable};

/// What to do with a reply that settles after the persona was switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleReplyPolicy {
    /// Cancel the outstanding request on switch and drop anything late.
    #[default]
    Discard,
    /// Let the request finish and append its reply to the new transcript.
    Append,
}

impl std::str::FromStr for StaleReplyPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(StaleReplyPolicy::Discard),
            "append" => Ok(StaleReplyPolicy::Append),
            other => Err(format!(
                "Unknown stale reply policy '{other}'. Expected 'discard' or 'append'"
            )),
        }
    }
}

/// A request accepted by [`Session::submit`] that the caller must run.
#[derive(Debug, Clone)]
pub struct PendingFetch {
    pub epoch: u64,
    pub bot_id: String,
    pub query: String,
    pub cancel_token: CancellationToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Appended,
    Stale,
}

pub struct Session {
    personas: PersonaTable,
    transcript: VecDeque<Message>,
    pending_input: String,
    persona: Persona,
    busy: bool,
    epoch: u64,
    in_flight: Option<CancellationToken>,
    stale_policy: StaleReplyPolicy,
}

impl Session {
    pub fn new(personas: PersonaTable, persona: Persona, stale_policy: StaleReplyPolicy) -> Self {
        let welcome = Message::assistant(personas.welcome(persona));
        Self {
            personas,
            transcript: VecDeque::from([welcome]),
            pending_input: String::new(),
            persona,
            busy: false,
            epoch: 0,
            in_flight: None,
            stale_policy,
        }
    }

    pub fn transcript(&self) -> &VecDeque<Message> {
        &self.transcript
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn personas(&self) -> &PersonaTable {
        &self.personas
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether a send control should be enabled right now.
    pub fn can_send(&self) -> bool {
        !self.busy && !self.pending_input.trim().is_empty()
    }

    pub fn update_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Flip to the other persona and start over with its welcome message.
    ///
    /// Under [`StaleReplyPolicy::Discard`] the outstanding request, if any, is
    /// detached from the session and its token handed back; the caller owns
    /// cancelling it.
    pub fn switch_persona(&mut self) -> Option<CancellationToken> {
        self.persona = self.persona.other();
        self.transcript.clear();
        self.transcript
            .push_back(Message::assistant(self.personas.welcome(self.persona)));
        self.pending_input.clear();

        match self.stale_policy {
            StaleReplyPolicy::Append => None,
            StaleReplyPolicy::Discard => {
                self.epoch += 1;
                self.busy = false;
                self.in_flight.take()
            }
        }
    }

    /// Accept the pending input as a user message if the session is idle.
    ///
    /// The query keeps the text exactly as typed; only the emptiness check
    /// looks at the trimmed form.
    pub fn submit(&mut self) -> Option<PendingFetch> {
        if !self.can_send() {
            return None;
        }

        let query = std::mem::take(&mut self.pending_input);
        self.transcript.push_back(Message::user(query.clone()));
        self.busy = true;
        self.epoch += 1;

        let cancel_token = CancellationToken::new();
        self.in_flight = Some(cancel_token.clone());

        Some(PendingFetch {
            epoch: self.epoch,
            bot_id: self.personas.bot_id(self.persona).to_string(),
            query,
            cancel_token,
        })
    }

    /// Record the settlement of the request started under `epoch`.
    pub fn complete_fetch(&mut self, epoch: u64, reply: impl Into<String>) -> Settlement {
        if !self.busy || epoch != self.epoch {
            return Settlement::Stale;
        }

        self.transcript.push_back(Message::assistant(reply));
        self.busy = false;
        self.in_flight = None;
        Settlement::Appended
    }
}

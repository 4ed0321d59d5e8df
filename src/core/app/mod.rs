//! The application object and the action/command layer around it.
//!
//! `App` ties the conversation session to its presentation state and to the
//! answer fetcher the session's requests are run with. Everything that
//! mutates it goes through [`apply_action`].

use std::sync::Arc;

use tracing::warn;

use crate::core::answer::{AnswerFetcher, HttpAnswerFetcher};
use crate::core::config::Settings;
use crate::core::message::Message;
use crate::core::persona::PersonaProfile;
use crate::core::session::Session;
use crate::ui::theme::Theme;
use crate::utils::logging::LoggingState;

pub mod actions;
pub mod ui_state;

pub use actions::{
    apply_action, apply_actions, AppAction, AppActionContext, AppActionDispatcher,
    AppActionEnvelope, AppCommand,
};
pub use ui_state::UiState;

pub struct App {
    pub session: Session,
    pub ui: UiState,
    pub settings: Settings,
    pub logging: LoggingState,
    pub fetcher: Arc<dyn AnswerFetcher>,
}

impl App {
    /// Build an app talking to the configured HTTP endpoint.
    pub fn new(settings: Settings, logging: LoggingState) -> Result<Self, reqwest::Error> {
        let fetcher: Arc<dyn AnswerFetcher> = Arc::new(HttpAnswerFetcher::from_settings(&settings)?);
        Ok(Self::with_fetcher(settings, logging, fetcher))
    }

    pub fn with_fetcher(
        settings: Settings,
        logging: LoggingState,
        fetcher: Arc<dyn AnswerFetcher>,
    ) -> Self {
        let session = Session::new(
            settings.persona_table(),
            settings.default_persona,
            settings.stale_replies,
        );
        let app = Self {
            session,
            ui: UiState::new(Theme::dark_default()),
            settings,
            logging,
            fetcher,
        };
        app.log_marker(&format!("started with {}", app.active_profile().label));
        app
    }

    pub fn active_profile(&self) -> &PersonaProfile {
        self.session.personas().get(self.session.persona())
    }

    pub fn is_busy(&self) -> bool {
        self.session.is_busy()
    }

    /// Keep the session's pending input in step with the textarea.
    pub fn apply_textarea_edit<F>(&mut self, f: F)
    where
        F: FnOnce(&mut tui_textarea::TextArea<'static>),
    {
        let text = self.ui.edit_input(f);
        self.session.update_input(text);
    }

    pub fn set_input_text(&mut self, text: &str) {
        self.ui.set_input_text(text);
        self.session.update_input(text);
    }

    pub(crate) fn log_transcript_message(&self, message: &Message) {
        if let Err(err) = self.logging.log_transcript_message(message) {
            warn!(error = %err, "failed to write transcript log");
        }
    }

    pub(crate) fn log_marker(&self, text: &str) {
        if let Err(err) = self.logging.log_marker(text) {
            warn!(error = %err, "failed to write transcript log");
        }
    }

    /// Re-enable auto-scroll so the newest message comes into view.
    pub fn scroll_to_bottom(&mut self) {
        self.ui.auto_scroll = true;
    }
}

#[cfg(test)]
mod tests;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::App;
use crate::core::fetch_service::FetchParams;
use crate::core::session::Settlement;

pub enum AppAction {
    InsertIntoInput { text: String },
    SetInput { text: String },
    SubmitInput,
    SwitchPersona,
    AnswerSettled { reply: String, epoch: u64 },
    ScrollUp { lines: u16 },
    ScrollDown { lines: u16 },
    ScrollToTop,
    ScrollToBottom,
    Quit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppActionContext {
    pub term_width: u16,
    pub term_height: u16,
}

pub struct AppActionEnvelope {
    pub action: AppAction,
    pub context: AppActionContext,
}

#[derive(Clone)]
pub struct AppActionDispatcher {
    tx: mpsc::UnboundedSender<AppActionEnvelope>,
}

impl AppActionDispatcher {
    pub fn new(tx: mpsc::UnboundedSender<AppActionEnvelope>) -> Self {
        Self { tx }
    }

    pub fn dispatch(&self, action: AppAction, ctx: AppActionContext) {
        self.dispatch_many([action], ctx);
    }

    pub fn dispatch_many<I>(&self, actions: I, ctx: AppActionContext)
    where
        I: IntoIterator<Item = AppAction>,
    {
        for action in actions.into_iter() {
            let _ = self.tx.send(AppActionEnvelope {
                action,
                context: ctx,
            });
        }
    }
}

pub enum AppCommand {
    SpawnFetch(FetchParams),
    /// Abandon the request detached by a persona switch.
    CancelFetch(CancellationToken),
}

pub fn apply_actions(
    app: &mut App,
    envelopes: impl IntoIterator<Item = AppActionEnvelope>,
) -> Vec<AppCommand> {
    let mut commands = Vec::new();
    for envelope in envelopes {
        if let Some(cmd) = apply_action(app, envelope.action, envelope.context) {
            commands.push(cmd);
        }
    }
    commands
}

pub fn apply_action(app: &mut App, action: AppAction, ctx: AppActionContext) -> Option<AppCommand> {
    match action {
        AppAction::InsertIntoInput { text } => {
            if !app.is_busy() {
                app.apply_textarea_edit(|ta| {
                    ta.insert_str(&text);
                });
            }
            None
        }
        AppAction::SetInput { text } => {
            app.set_input_text(&text);
            None
        }
        AppAction::SubmitInput => submit_input(app),
        AppAction::SwitchPersona => switch_persona(app),
        AppAction::AnswerSettled { reply, epoch } => {
            settle_answer(app, reply, epoch);
            None
        }
        AppAction::ScrollUp { lines } => {
            if app.ui.auto_scroll {
                app.ui.scroll_offset = max_scroll(app, ctx);
            }
            app.ui.auto_scroll = false;
            app.ui.scroll_offset = app.ui.scroll_offset.saturating_sub(lines);
            None
        }
        AppAction::ScrollDown { lines } => {
            if !app.ui.auto_scroll {
                let max = max_scroll(app, ctx);
                app.ui.scroll_offset = app.ui.scroll_offset.saturating_add(lines).min(max);
                if app.ui.scroll_offset >= max {
                    app.ui.auto_scroll = true;
                }
            }
            None
        }
        AppAction::ScrollToTop => {
            app.ui.auto_scroll = false;
            app.ui.scroll_offset = 0;
            None
        }
        AppAction::ScrollToBottom => {
            app.scroll_to_bottom();
            None
        }
        AppAction::Quit => {
            app.ui.exit_requested = true;
            None
        }
    }
}

fn max_scroll(app: &App, ctx: AppActionContext) -> u16 {
    crate::ui::layout::max_transcript_scroll(app, ctx.term_width, ctx.term_height)
}

fn submit_input(app: &mut App) -> Option<AppCommand> {
    let pending = app.session.submit()?;

    app.ui.clear_input();
    app.ui.restart_pulse();
    app.scroll_to_bottom();
    if let Some(message) = app.session.transcript().back() {
        app.log_transcript_message(message);
    }

    debug!(epoch = pending.epoch, persona = %app.session.persona(), "submitting query");
    Some(AppCommand::SpawnFetch(FetchParams {
        fetcher: app.fetcher.clone(),
        bot_id: pending.bot_id,
        query: pending.query,
        cancel_token: pending.cancel_token,
        epoch: pending.epoch,
    }))
}

fn switch_persona(app: &mut App) -> Option<AppCommand> {
    let detached = app.session.switch_persona();
    app.ui.clear_input();
    app.ui.scroll_offset = 0;
    app.scroll_to_bottom();

    let label = app.active_profile().label.clone();
    info!(
        persona = %app.session.persona(),
        cancelling = detached.is_some(),
        "switched persona"
    );
    app.log_marker(&format!("switched to {label}"));
    if let Some(welcome) = app.session.transcript().front() {
        app.log_transcript_message(welcome);
    }

    detached.map(AppCommand::CancelFetch)
}

fn settle_answer(app: &mut App, reply: String, epoch: u64) {
    match app.session.complete_fetch(epoch, reply) {
        Settlement::Appended => {
            app.scroll_to_bottom();
            if let Some(message) = app.session.transcript().back() {
                app.log_transcript_message(message);
            }
        }
        Settlement::Stale => {
            debug!(epoch, current = app.session.epoch(), "dropping stale reply");
        }
    }
}

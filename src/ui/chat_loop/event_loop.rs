//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal events are read on a background task and resolved into
//! [`AppAction`]s or textarea edits. Actions are applied to the shared
//! [`App`] in batches; the commands they return start or cancel answer
//! fetches, whose settlements come back through the fetch service channel
//! as further actions.

use std::{
    error::Error,
    io,
    sync::Arc,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use ratatui::prelude::Size;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::core::app::{
    apply_actions, App, AppAction, AppActionContext, AppActionDispatcher, AppActionEnvelope,
    AppCommand,
};
use crate::core::fetch_service::{FetchMessage, FetchService};
use crate::ui::layout::compute_areas;
use crate::ui::renderer::ui;

use super::keybindings::{resolve_key, KeyContext, KeyResult};
use super::lifecycle::{restore_terminal, setup_terminal, SharedTerminal};
use super::AppHandle;

const MAX_FPS: u64 = 60;

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

async fn is_exit_requested(app: &AppHandle) -> bool {
    app.read(|app| app.ui.exit_requested).await
}

async fn current_terminal_size(terminal: &SharedTerminal) -> Size {
    let terminal_guard = terminal.lock().await;
    terminal_guard.size().unwrap_or_default()
}

async fn try_draw_frame(
    app: &AppHandle,
    terminal: &SharedTerminal,
    request_redraw: &mut bool,
    last_draw: &mut Instant,
    frame_duration: Duration,
) -> io::Result<()> {
    if !*request_redraw {
        return Ok(());
    }

    let now = Instant::now();
    if now.duration_since(*last_draw) < frame_duration {
        return Ok(());
    }

    let mut terminal_guard = terminal.lock().await;
    app.read(|app| terminal_guard.draw(|f| ui(f, app)).map(|_| ()))
        .await?;
    *last_draw = now;
    *request_redraw = false;
    Ok(())
}

fn action_context(term_size: Size) -> AppActionContext {
    AppActionContext {
        term_width: term_size.width,
        term_height: term_size.height,
    }
}

/// Returns true when any event was handled.
async fn process_ui_events(
    app: &AppHandle,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    dispatcher: &AppActionDispatcher,
    term_size: Size,
) -> bool {
    let mut events_processed = false;

    while let Ok(ev) = event_rx.try_recv() {
        events_processed = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                route_keyboard_event(app, dispatcher, key, term_size).await;
            }
            UiEvent::Crossterm(Event::Paste(text)) => {
                handle_paste_event(dispatcher, term_size, text);
            }
            UiEvent::Crossterm(_) => {}
        }
    }

    events_processed
}

async fn route_keyboard_event(
    app: &AppHandle,
    dispatcher: &AppActionDispatcher,
    key: ratatui::crossterm::event::KeyEvent,
    term_size: Size,
) {
    let ctx = app
        .read(|app| {
            let areas = compute_areas(
                app,
                ratatui::layout::Rect::new(0, 0, term_size.width, term_size.height),
            );
            KeyContext {
                input_empty: app.session.pending_input().is_empty(),
                busy: app.is_busy(),
                page_size: areas.transcript.height.saturating_sub(1),
            }
        })
        .await;

    match resolve_key(&key, ctx) {
        KeyResult::Action(action) => dispatcher.dispatch(action, action_context(term_size)),
        KeyResult::Edit(edit) => {
            app.update(|app| app.apply_textarea_edit(|ta| edit.apply(ta)))
                .await;
        }
        KeyResult::Ignored => {}
    }
}

pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

pub(crate) fn handle_paste_event(dispatcher: &AppActionDispatcher, term_size: Size, text: String) {
    let sanitized_text = sanitize_pasted_text(&text);
    if sanitized_text.is_empty() {
        return;
    }

    dispatcher.dispatch(
        AppAction::InsertIntoInput {
            text: sanitized_text,
        },
        action_context(term_size),
    );
}

/// Turn fetch settlements into actions. Returns true when any arrived.
fn process_fetch_updates(
    dispatcher: &AppActionDispatcher,
    rx: &mut mpsc::UnboundedReceiver<(FetchMessage, u64)>,
    term_size: Size,
) -> bool {
    let mut actions = Vec::new();
    while let Ok((message, epoch)) = rx.try_recv() {
        match message {
            FetchMessage::Settled(reply) => {
                actions.push(AppAction::AnswerSettled { reply, epoch });
            }
        }
    }

    if actions.is_empty() {
        return false;
    }
    dispatcher.dispatch_many(actions, action_context(term_size));
    true
}

async fn drain_action_queue(
    app: &AppHandle,
    fetch_service: &FetchService,
    action_rx: &mut mpsc::UnboundedReceiver<AppActionEnvelope>,
) -> bool {
    let mut pending = Vec::new();
    while let Ok(envelope) = action_rx.try_recv() {
        pending.push(envelope);
    }

    if pending.is_empty() {
        return false;
    }

    let commands = app.update(|app| apply_actions(app, pending)).await;
    for cmd in commands {
        match cmd {
            AppCommand::SpawnFetch(params) => fetch_service.spawn_fetch(params),
            AppCommand::CancelFetch(token) => {
                token.cancel();
                debug!("in-flight fetch cancelled");
            }
        }
    }
    true
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => {
                        continue;
                    }
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Run the interactive chat screen until the user quits.
pub async fn run_chat(app: App) -> Result<(), Box<dyn Error>> {
    info!(
        persona = %app.session.persona(),
        logging = %app.logging.get_status_string(),
        "starting chat session"
    );
    let app = AppHandle::new(Arc::new(Mutex::new(app)));

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<AppActionEnvelope>();
    let action_dispatcher = AppActionDispatcher::new(action_tx);

    let terminal = setup_terminal()?;

    let (fetch_service, mut rx) = FetchService::new();

    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result: Result<(), Box<dyn Error>> = 'main_loop: loop {
        if is_exit_requested(&app).await {
            break 'main_loop Ok(());
        }

        if let Err(err) = try_draw_frame(
            &app,
            &terminal,
            &mut request_redraw,
            &mut last_draw,
            frame_duration,
        )
        .await
        {
            break 'main_loop Err(err.into());
        }

        let term_size = current_terminal_size(&terminal).await;
        let size_changed = app
            .update(|app| {
                let changed = app.ui.last_term_size != term_size;
                app.ui.last_term_size = term_size;
                changed
            })
            .await;

        let events_processed =
            process_ui_events(&app, &mut event_rx, &action_dispatcher, term_size).await;
        let received_any = process_fetch_updates(&action_dispatcher, &mut rx, term_size);
        let actions_applied = drain_action_queue(&app, &fetch_service, &mut action_rx).await;

        // Keep the loading spinner moving
        let busy = app.read(|app| app.is_busy()).await;

        if size_changed || events_processed || received_any || actions_applied || busy {
            request_redraw = true;
        }

        let idle = !events_processed && !received_any && !actions_applied;
        if idle {
            tokio::time::sleep(Duration::from_millis(16)).await;
        }
    };

    event_reader_handle.abort();
    restore_terminal(&terminal).await?;
    info!("chat session ended");

    result
}

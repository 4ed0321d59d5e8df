use super::*;
use crate::core::answer::NETWORK_ERROR_FALLBACK;
use crate::core::persona::{Persona, BASIC_WELCOME, CUTIE_WELCOME};
use crate::core::session::StaleReplyPolicy;
use crate::utils::test_utils::{create_test_app, create_test_app_with, create_test_settings};
use tempfile::TempDir;

fn ctx() -> AppActionContext {
    AppActionContext {
        term_width: 80,
        term_height: 24,
    }
}

fn type_text(app: &mut App, text: &str) {
    let _ = apply_action(
        app,
        AppAction::InsertIntoInput {
            text: text.to_string(),
        },
        ctx(),
    );
}

fn submit(app: &mut App) -> Option<AppCommand> {
    apply_action(app, AppAction::SubmitInput, ctx())
}

fn spawned(command: Option<AppCommand>) -> crate::core::fetch_service::FetchParams {
    match command {
        Some(AppCommand::SpawnFetch(params)) => params,
        _ => panic!("expected a fetch to be spawned"),
    }
}

#[test]
fn typing_keeps_session_input_in_sync() {
    let mut app = create_test_app();
    type_text(&mut app, "多少钱");
    type_text(&mut app, "做双眼皮");

    assert_eq!(app.session.pending_input(), "多少钱做双眼皮");
    assert_eq!(app.ui.input_text(), "多少钱做双眼皮");
    assert!(app.session.can_send());
}

#[test]
fn submit_spawns_fetch_for_active_persona() {
    let mut app = create_test_app();
    type_text(&mut app, "  多少钱做双眼皮 ");

    let params = spawned(submit(&mut app));
    assert_eq!(params.bot_id, "bot-basic");
    assert_eq!(params.query, "  多少钱做双眼皮 ");
    assert_eq!(params.epoch, app.session.epoch());
    assert!(app.is_busy());
    assert_eq!(app.ui.input_text(), "");
    assert_eq!(app.session.transcript().len(), 2);
}

#[test]
fn blank_input_does_not_submit() {
    let mut app = create_test_app();
    type_text(&mut app, "   \n  ");
    assert!(submit(&mut app).is_none());
    assert_eq!(app.session.transcript().len(), 1);
    assert!(!app.is_busy());
}

#[test]
fn typing_is_ignored_while_busy() {
    let mut app = create_test_app();
    type_text(&mut app, "first");
    let _ = submit(&mut app);

    type_text(&mut app, "second");
    assert_eq!(app.ui.input_text(), "");
    assert!(submit(&mut app).is_none());
}

#[test]
fn settled_answer_is_appended_and_clears_busy() {
    let mut app = create_test_app();
    type_text(&mut app, "hello");
    let params = spawned(submit(&mut app));

    let cmd = apply_action(
        &mut app,
        AppAction::AnswerSettled {
            reply: NETWORK_ERROR_FALLBACK.to_string(),
            epoch: params.epoch,
        },
        ctx(),
    );
    assert!(cmd.is_none());
    assert!(!app.is_busy());
    let last = app.session.transcript().back().expect("reply");
    assert!(last.is_assistant());
    assert_eq!(last.content, NETWORK_ERROR_FALLBACK);
}

#[test]
fn switching_persona_cancels_in_flight_fetch() {
    let mut app = create_test_app();
    type_text(&mut app, "hello");
    let params = spawned(submit(&mut app));

    let cmd = apply_action(&mut app, AppAction::SwitchPersona, ctx());
    match cmd {
        Some(AppCommand::CancelFetch(token)) => {
            assert!(!params.cancel_token.is_cancelled());
            token.cancel();
        }
        _ => panic!("expected the in-flight fetch to be handed back for cancelling"),
    }
    assert!(params.cancel_token.is_cancelled());
    assert_eq!(app.session.persona(), Persona::Cutie);
    assert_eq!(app.active_profile().label, "人性化Bot");
    assert!(!app.is_busy());

    let _ = apply_action(
        &mut app,
        AppAction::AnswerSettled {
            reply: "late".to_string(),
            epoch: params.epoch,
        },
        ctx(),
    );
    assert_eq!(app.session.transcript().len(), 1);
    assert_eq!(app.session.transcript()[0].content, CUTIE_WELCOME);
}

#[test]
fn switching_persona_while_idle_needs_no_cancel() {
    let mut app = create_test_app();
    type_text(&mut app, "draft");

    let cmd = apply_action(&mut app, AppAction::SwitchPersona, ctx());
    assert!(cmd.is_none());
    assert_eq!(app.ui.input_text(), "");
    assert_eq!(app.session.pending_input(), "");

    let _ = apply_action(&mut app, AppAction::SwitchPersona, ctx());
    assert_eq!(app.session.transcript()[0].content, BASIC_WELCOME);
}

#[test]
fn append_policy_keeps_late_reply() {
    let mut settings = create_test_settings();
    settings.stale_replies = StaleReplyPolicy::Append;
    let mut app = create_test_app_with(settings);
    type_text(&mut app, "hello");
    let params = spawned(submit(&mut app));

    let cmd = apply_action(&mut app, AppAction::SwitchPersona, ctx());
    assert!(cmd.is_none());
    assert!(!params.cancel_token.is_cancelled());
    assert!(app.is_busy());

    let _ = apply_action(
        &mut app,
        AppAction::AnswerSettled {
            reply: "late".to_string(),
            epoch: params.epoch,
        },
        ctx(),
    );
    assert_eq!(app.session.transcript().len(), 2);
    assert_eq!(app.session.transcript()[1].content, "late");
}

#[test]
fn scroll_actions_toggle_auto_scroll() {
    let mut app = create_test_app();
    for i in 0..40 {
        type_text(&mut app, &format!("question {i}"));
        let params = spawned(submit(&mut app));
        let _ = apply_action(
            &mut app,
            AppAction::AnswerSettled {
                reply: format!("answer {i}"),
                epoch: params.epoch,
            },
            ctx(),
        );
    }

    let _ = apply_action(&mut app, AppAction::ScrollToTop, ctx());
    assert!(!app.ui.auto_scroll);
    assert_eq!(app.ui.scroll_offset, 0);

    let _ = apply_action(&mut app, AppAction::ScrollDown { lines: 3 }, ctx());
    assert_eq!(app.ui.scroll_offset, 3);
    assert!(!app.ui.auto_scroll);

    let _ = apply_action(&mut app, AppAction::ScrollDown { lines: u16::MAX }, ctx());
    assert!(app.ui.auto_scroll);

    let _ = apply_action(&mut app, AppAction::ScrollUp { lines: 1 }, ctx());
    assert!(!app.ui.auto_scroll);
    assert!(app.ui.scroll_offset > 0);

    let _ = apply_action(&mut app, AppAction::ScrollToBottom, ctx());
    assert!(app.ui.auto_scroll);
}

#[test]
fn quit_sets_exit_flag() {
    let mut app = create_test_app();
    let _ = apply_action(&mut app, AppAction::Quit, ctx());
    assert!(app.ui.exit_requested);
}

#[test]
fn transcript_log_records_exchange_and_switch() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("chat.log");
    let logging =
        LoggingState::new(Some(path.to_string_lossy().to_string())).expect("logging");
    let mut app = App::with_fetcher(
        create_test_settings(),
        logging,
        std::sync::Arc::new(crate::utils::test_utils::StaticFetcher("x".into())),
    );

    type_text(&mut app, "多少钱做双眼皮");
    let params = spawned(submit(&mut app));
    let _ = apply_action(
        &mut app,
        AppAction::AnswerSettled {
            reply: "双眼皮手术价格区间为...".to_string(),
            epoch: params.epoch,
        },
        ctx(),
    );
    let _ = apply_action(&mut app, AppAction::SwitchPersona, ctx());

    let contents = std::fs::read_to_string(&path).expect("read log");
    let expected = format!(
        "## started with 常规Bot\n\nYou: 多少钱做双眼皮\n\n双眼皮手术价格区间为...\n\n## switched to 人性化Bot\n\n{CUTIE_WELCOME}\n\n"
    );
    assert_eq!(contents, expected);
}

#[test]
fn apply_actions_collects_commands_in_order() {
    let mut app = create_test_app();
    let envelopes = vec![
        AppActionEnvelope {
            action: AppAction::SetInput {
                text: "hi".to_string(),
            },
            context: ctx(),
        },
        AppActionEnvelope {
            action: AppAction::SubmitInput,
            context: ctx(),
        },
        AppActionEnvelope {
            action: AppAction::SwitchPersona,
            context: ctx(),
        },
    ];

    let commands = apply_actions(&mut app, envelopes);
    assert_eq!(commands.len(), 2);
    assert!(matches!(commands[0], AppCommand::SpawnFetch(_)));
    assert!(matches!(commands[1], AppCommand::CancelFetch(_)));
}

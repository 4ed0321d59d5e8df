use std::time::Duration;

use ratatui::{
    layout::Alignment,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::core::app::App;
use crate::ui::layout::{compute_areas, intro_lines, transcript_lines};
use crate::utils::scroll::ScrollCalculator;

pub const TITLE: &str = "医美AI客服助手";
pub const SUBTITLE: &str = "您的美容引路人";
pub const FOOTER: &str = "由PowerMatrix提供技术支持";
pub const LOADING_TEXT: &str = "正在生成回复...";
pub const SEND_LABEL: &str = "发送";
pub const SENDING_LABEL: &str = "发送中...";
const INPUT_HINT: &str = " Enter 发送 · Shift+Enter 换行 ";
const SWITCH_HINT: &str = "Ctrl+P 切换机器人";

/// Pick the spinner glyph for the given time since the request started.
pub fn pulse_symbol(elapsed: Duration) -> &'static str {
    let elapsed = elapsed.as_millis() as f32 / 1000.0;
    let pulse_phase = (elapsed * 2.0) % 2.0;
    let pulse_intensity = if pulse_phase < 1.0 {
        pulse_phase
    } else {
        2.0 - pulse_phase
    };

    if pulse_intensity < 0.33 {
        "○"
    } else if pulse_intensity < 0.66 {
        "◐"
    } else {
        "●"
    }
}

pub fn ui(f: &mut Frame, app: &App) {
    let theme = &app.ui.theme;
    let areas = compute_areas(app, f.area());

    if theme.background_color != ratatui::style::Color::Reset {
        f.render_widget(
            Block::default().style(Style::default().bg(theme.background_color)),
            f.area(),
        );
    }

    // Header: active persona, product title and subtitle
    let profile = app.active_profile();
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(format!("{} {}", profile.icon, profile.label), theme.persona_style),
            Span::raw("  "),
            Span::styled(TITLE, theme.title_style),
        ]),
        Line::from(vec![
            Span::styled(SUBTITLE, theme.subtitle_style),
            Span::raw("   "),
            Span::styled(SWITCH_HINT, theme.intro_style),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(theme.input_disabled_border_style),
    );
    f.render_widget(header, areas.header);

    f.render_widget(Paragraph::new(intro_lines(app, areas.intro.width)), areas.intro);

    // Transcript, pinned to the bottom unless the user scrolled away
    let lines = transcript_lines(app, areas.transcript.width);
    let max_offset = ScrollCalculator::max_scroll_offset(lines.len(), areas.transcript.height);
    let scroll_offset = if app.ui.auto_scroll {
        max_offset
    } else {
        app.ui.scroll_offset.min(max_offset)
    };
    f.render_widget(
        Paragraph::new(lines).scroll((scroll_offset, 0)),
        areas.transcript,
    );

    if app.is_busy() {
        let loading = Line::from(vec![
            Span::styled(
                pulse_symbol(app.ui.pulse_start.elapsed()),
                theme.streaming_indicator_style,
            ),
            Span::raw(" "),
            Span::styled(LOADING_TEXT, theme.streaming_indicator_style),
        ]);
        f.render_widget(Paragraph::new(loading), areas.loading);
    }

    // Input box; disabled while a reply is pending
    let (send_label, send_style) = if app.is_busy() {
        (SENDING_LABEL, theme.send_idle_style)
    } else if app.session.can_send() {
        (SEND_LABEL, theme.send_ready_style)
    } else {
        (SEND_LABEL, theme.send_idle_style)
    };
    let border_style = if app.is_busy() {
        theme.input_disabled_border_style
    } else {
        theme.input_border_style
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(Span::styled(INPUT_HINT, theme.input_title_style)))
        .title(
            Line::from(Span::styled(format!("[ {send_label} ]"), send_style))
                .alignment(Alignment::Right),
        );

    let mut textarea = app.ui.textarea().clone();
    textarea.set_block(block);
    if app.is_busy() {
        textarea.set_cursor_style(Style::default());
    }
    f.render_widget(&textarea, areas.input);

    f.render_widget(
        Paragraph::new(Span::styled(FOOTER, theme.footer_style)).alignment(Alignment::Center),
        areas.footer,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{apply_action, AppAction, AppActionContext};
    use crate::utils::test_utils::create_test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).expect("terminal");
        terminal.draw(|f| ui(f, app)).expect("draw");
        let buffer = terminal.backend().buffer().clone();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn compact(screen: &str) -> String {
        screen.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn pulse_cycles_through_symbols() {
        assert_eq!(pulse_symbol(Duration::from_millis(0)), "○");
        assert_eq!(pulse_symbol(Duration::from_millis(250)), "◐");
        assert_eq!(pulse_symbol(Duration::from_millis(450)), "●");
        assert_eq!(pulse_symbol(Duration::from_millis(1000)), "○");
    }

    #[test]
    fn idle_screen_shows_chrome_and_welcome() {
        let app = create_test_app();
        let screen = compact(&render(&app));
        assert!(screen.contains("常规Bot"));
        assert!(screen.contains(&compact(TITLE)));
        assert!(screen.contains(SUBTITLE));
        assert!(screen.contains(&compact(FOOTER)));
        assert!(screen.contains("您好"));
        assert!(screen.contains("[发送]"));
        assert!(!screen.contains(&compact(LOADING_TEXT)));
    }

    #[test]
    fn busy_screen_shows_loading_row_and_sending_label() {
        let mut app = create_test_app();
        let ctx = AppActionContext {
            term_width: 100,
            term_height: 30,
        };
        let _ = apply_action(
            &mut app,
            AppAction::SetInput {
                text: "多少钱做双眼皮".to_string(),
            },
            ctx,
        );
        let _ = apply_action(&mut app, AppAction::SubmitInput, ctx);

        let screen = compact(&render(&app));
        assert!(screen.contains(&compact(LOADING_TEXT)));
        assert!(screen.contains(&compact(SENDING_LABEL)));
        assert!(screen.contains("You:多少钱做双眼皮"));
    }
}

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};

use crate::core::app::App;
use crate::ui::markdown::render_message;
use crate::utils::scroll::ScrollCalculator;

pub const INTRO_TEXT: &str = "使用先进AI大模型技术 + 医美行业专业知识库 + 医美行业定制化AI Agent，构建专业化、人性化的24h在线智能客服";

const HEADER_HEIGHT: u16 = 3;
const LOADING_HEIGHT: u16 = 1;
const FOOTER_HEIGHT: u16 = 1;

/// The vertical bands the screen is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub header: Rect,
    pub intro: Rect,
    pub transcript: Rect,
    pub loading: Rect,
    pub input: Rect,
    pub footer: Rect,
}

pub fn intro_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let line = Line::from(Span::styled(INTRO_TEXT, app.ui.theme.intro_style));
    ScrollCalculator::prewrap_lines(&[line], width)
}

pub fn compute_areas(app: &App, area: Rect) -> ScreenAreas {
    let intro_height = intro_lines(app, area.width).len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(intro_height + 1),
            Constraint::Min(0),
            Constraint::Length(LOADING_HEIGHT),
            Constraint::Length(app.ui.calculate_input_area_height()),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);

    ScreenAreas {
        header: chunks[0],
        intro: chunks[1],
        transcript: chunks[2],
        loading: chunks[3],
        input: chunks[4],
        footer: chunks[5],
    }
}

/// Every transcript message rendered and wrapped to `width`.
pub fn transcript_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in app.session.transcript() {
        lines.extend(render_message(message, &app.ui.theme));
    }
    ScrollCalculator::prewrap_lines(&lines, width)
}

pub fn max_transcript_scroll(app: &App, term_width: u16, term_height: u16) -> u16 {
    let areas = compute_areas(app, Rect::new(0, 0, term_width, term_height));
    let total = transcript_lines(app, areas.transcript.width).len();
    ScrollCalculator::max_scroll_offset(total, areas.transcript.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::create_test_app;

    #[test]
    fn areas_cover_the_whole_screen_in_order() {
        let app = create_test_app();
        let areas = compute_areas(&app, Rect::new(0, 0, 80, 24));
        assert_eq!(areas.header.y, 0);
        assert_eq!(areas.footer.y + areas.footer.height, 24);
        assert!(areas.intro.y < areas.transcript.y);
        assert!(areas.transcript.y < areas.loading.y);
        assert!(areas.loading.y < areas.input.y);
        assert_eq!(areas.input.height, 3);
    }

    #[test]
    fn short_transcript_needs_no_scroll() {
        let app = create_test_app();
        assert_eq!(max_transcript_scroll(&app, 80, 24), 0);
    }

    #[test]
    fn welcome_message_is_the_first_transcript_line() {
        let app = create_test_app();
        let lines = transcript_lines(&app, 80);
        assert!(lines[0]
            .to_string()
            .starts_with("您好，我是医美AI客服助手"));
    }
}

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,

    // Chrome
    pub title_style: Style,
    pub subtitle_style: Style,
    pub persona_style: Style,
    pub intro_style: Style,
    pub footer_style: Style,
    pub streaming_indicator_style: Style,
    pub input_border_style: Style,
    pub input_disabled_border_style: Style,
    pub input_title_style: Style,
    pub send_ready_style: Style,
    pub send_idle_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,
    pub placeholder_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_code_style: Style,
    pub md_link_style: Style,
    pub md_list_marker_style: Style,
}

impl Theme {
    /// Rose and slate palette on a dark background.
    pub fn dark_default() -> Self {
        let rose = Color::Rgb(244, 143, 177);
        let lilac = Color::Rgb(206, 147, 216);
        let text = Color::Rgb(230, 230, 235);
        let muted = Color::Rgb(140, 140, 150);

        Theme {
            background_color: Color::Reset,
            user_prefix_style: Style::default().fg(rose).add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(rose),
            assistant_text_style: Style::default().fg(text),

            title_style: Style::default().fg(rose).add_modifier(Modifier::BOLD),
            subtitle_style: Style::default().fg(muted).add_modifier(Modifier::ITALIC),
            persona_style: Style::default().fg(lilac).add_modifier(Modifier::BOLD),
            intro_style: Style::default().fg(muted),
            footer_style: Style::default().fg(muted),
            streaming_indicator_style: Style::default().fg(lilac),
            input_border_style: Style::default().fg(rose),
            input_disabled_border_style: Style::default().fg(muted),
            input_title_style: Style::default().fg(muted),
            send_ready_style: Style::default().fg(rose).add_modifier(Modifier::BOLD),
            send_idle_style: Style::default().fg(muted),

            input_text_style: Style::default().fg(text),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),
            placeholder_style: Style::default().fg(muted),

            md_heading_style: Style::default().fg(lilac).add_modifier(Modifier::BOLD),
            md_code_style: Style::default().fg(Color::Rgb(255, 203, 107)),
            md_link_style: Style::default()
                .fg(Color::Rgb(130, 170, 255))
                .add_modifier(Modifier::UNDERLINED),
            md_list_marker_style: Style::default().fg(rose),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

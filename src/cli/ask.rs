//! TUI-less "ask" command

use std::error::Error;

use ratatui::crossterm::terminal;
use ratatui::text::Line;
use tracing::info;

use crate::core::answer::{AnswerFetcher, HttpAnswerFetcher};
use crate::core::config::Settings;
use crate::ui::markdown::render_markdown;
use crate::ui::theme::Theme;
use crate::utils::scroll::ScrollCalculator;

const FALLBACK_WIDTH: u16 = 80;

/// Join the words of a query, or `None` when nothing but whitespace is left.
pub fn build_query(words: &[String]) -> Option<String> {
    let query = words.join(" ");
    if query.trim().is_empty() {
        None
    } else {
        Some(query)
    }
}

/// Render a reply for plain stdout at `width` columns.
pub fn render_reply(reply: &str, width: u16) -> Vec<String> {
    let lines: Vec<Line> = render_markdown(reply, &Theme::dark_default());
    ScrollCalculator::prewrap_lines(&lines, width)
        .iter()
        .map(|line| line.to_string().trim_end().to_string())
        .collect()
}

pub async fn run_ask(settings: &Settings, words: &[String], raw: bool) -> Result<(), Box<dyn Error>> {
    let Some(query) = build_query(words) else {
        eprintln!("Usage: beautydesk ask <question>");
        std::process::exit(1);
    };

    let persona = settings.default_persona;
    let table = settings.persona_table();
    let fetcher = HttpAnswerFetcher::from_settings(settings)?;
    info!(persona = %persona, "asking single question");
    let reply = fetcher.fetch_answer(table.bot_id(persona), &query).await;

    if raw {
        println!("{reply}");
        return Ok(());
    }

    let width = terminal::size()
        .map(|(w, _)| w)
        .unwrap_or(FALLBACK_WIDTH)
        .max(20);
    for line in render_reply(&reply, width) {
        println!("{line}");
    }
    Ok(())
}

//! Conversion of transcript messages into styled terminal lines.
//!
//! Assistant replies are parsed as CommonMark with `pulldown-cmark`; user
//! text is shown verbatim. The output is unwrapped; width-aware wrapping
//! happens afterwards in [`crate::utils::scroll::ScrollCalculator`].

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::core::message::Message;
use crate::ui::theme::Theme;

const USER_PREFIX: &str = "You: ";
const USER_CONTINUATION: &str = "     ";

#[derive(Clone, Copy)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

/// Render one transcript message, followed by a blank spacer line.
pub fn render_message(message: &Message, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = if message.is_user() {
        render_user_text(&message.content, theme)
    } else {
        render_markdown(&message.content, theme)
    };
    lines.push(Line::from(""));
    lines
}

fn render_user_text(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    content
        .split('\n')
        .enumerate()
        .map(|(i, text)| {
            let prefix = if i == 0 {
                Span::styled(USER_PREFIX, theme.user_prefix_style)
            } else {
                Span::raw(USER_CONTINUATION)
            };
            Line::from(vec![prefix, Span::styled(detab(text), theme.user_text_style)])
        })
        .collect()
}

fn detab(s: &str) -> String {
    s.replace('\t', "    ")
}

struct MarkdownRenderer<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    quote_depth: usize,
    code_block: Option<Vec<String>>,
    pending_link: Option<String>,
    in_table_cell: bool,
    table_row: Vec<String>,
}

impl<'t> MarkdownRenderer<'t> {
    fn new(theme: &'t Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![theme.assistant_text_style],
            list_stack: Vec::new(),
            quote_depth: 0,
            code_block: None,
            pending_link: None,
            in_table_cell: false,
            table_row: Vec::new(),
        }
    }

    fn style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or(self.theme.assistant_text_style)
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn line_prefix(&self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        for _ in 0..self.quote_depth {
            prefix.push(Span::styled("│ ", self.theme.md_list_marker_style));
        }
        prefix
    }

    fn push_text(&mut self, text: String, style: Style) {
        if self.current.is_empty() {
            self.current = self.line_prefix();
        }
        self.current.push(Span::styled(text, style));
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    /// Separate blocks with a single blank line.
    fn end_block(&mut self) {
        self.flush_line();
        if self.list_stack.is_empty()
            && self
                .lines
                .last()
                .is_some_and(|l| !l.spans.iter().all(|s| s.content.is_empty()))
        {
            self.lines.push(Line::from(""));
        }
    }

    fn start_item(&mut self) {
        self.flush_line();
        let depth = self.list_stack.len().saturating_sub(1);
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(n)) => {
                let marker = format!("{n}. ");
                *n += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        let mut spans = self.line_prefix();
        spans.push(Span::raw("  ".repeat(depth)));
        spans.push(Span::styled(marker, self.theme.md_list_marker_style));
        self.current = spans;
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some(block) = self.code_block.as_mut() {
                    block.extend(text.lines().map(detab));
                } else if self.in_table_cell {
                    if let Some(cell) = self.table_row.last_mut() {
                        cell.push_str(&text);
                    }
                } else {
                    let style = self.style();
                    self.push_text(detab(&text), style);
                }
            }
            Event::Code(code) => {
                if self.in_table_cell {
                    if let Some(cell) = self.table_row.last_mut() {
                        cell.push_str(&code);
                    }
                } else {
                    self.push_text(code.to_string(), self.theme.md_code_style);
                }
            }
            Event::SoftBreak | Event::HardBreak => self.flush_line(),
            Event::Html(html) => {
                let style = self.style();
                for line in html.lines() {
                    self.push_text(detab(line), style);
                    self.flush_line();
                }
            }
            Event::InlineHtml(html) => {
                if self.in_table_cell {
                    if let Some(cell) = self.table_row.last_mut() {
                        cell.push_str(&html);
                    }
                } else {
                    let style = self.style();
                    self.push_text(html.to_string(), style);
                }
            }
            Event::Rule => {
                self.flush_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    self.theme.md_list_marker_style,
                )));
                self.lines.push(Line::from(""));
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.push_text(marker.to_string(), self.theme.md_list_marker_style);
            }
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::HtmlBlock => self.flush_line(),
            Tag::Heading { .. } => {
                self.flush_line();
                self.style_stack.push(self.theme.md_heading_style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => self.start_item(),
            Tag::CodeBlock(kind) => {
                self.flush_line();
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        self.lines.push(Line::from(Span::styled(
                            format!("[{lang}]"),
                            self.theme.md_list_marker_style,
                        )));
                    }
                }
                self.code_block = Some(Vec::new());
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } => {
                self.pending_link = Some(dest_url.to_string());
                self.style_stack.push(self.theme.md_link_style);
            }
            Tag::TableRow | Tag::TableHead => self.table_row.clear(),
            Tag::TableCell => {
                self.in_table_cell = true;
                self.table_row.push(String::new());
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.end_block(),
            TagEnd::Heading(_) => {
                self.pop_style();
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.end_block();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                self.end_block();
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => {
                for line in self.code_block.take().unwrap_or_default() {
                    self.lines
                        .push(Line::from(Span::styled(line, self.theme.md_code_style)));
                }
                self.lines.push(Line::from(""));
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.pending_link.take() {
                    let style = self.style();
                    self.push_text(format!(" ({url})"), style);
                }
            }
            TagEnd::TableCell => self.in_table_cell = false,
            TagEnd::TableHead | TagEnd::TableRow => {
                let row = std::mem::take(&mut self.table_row)
                    .iter()
                    .map(|c| c.trim().to_string())
                    .collect::<Vec<_>>()
                    .join(" │ ");
                let style = if matches!(tag, TagEnd::TableHead) {
                    self.theme.md_heading_style
                } else {
                    self.style()
                };
                self.lines.push(Line::from(Span::styled(row, style)));
            }
            TagEnd::Table | TagEnd::HtmlBlock => self.end_block(),
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self
            .lines
            .last()
            .is_some_and(|l| l.spans.iter().all(|s| s.content.is_empty()))
        {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render CommonMark into lines without a trailing blank line.
pub fn render_markdown(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = MarkdownRenderer::new(theme);
    for event in Parser::new_ext(content, options) {
        renderer.handle(event);
    }
    renderer.finish()
}

use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// Width-aware wrapping and scroll math for the transcript view.
///
/// Lines are wrapped here, before rendering, so the renderer and the scroll
/// handlers agree on how many rows the transcript occupies.
pub struct ScrollCalculator;

struct LineBuilder {
    width: usize,
    out: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    used: usize,
    emitted: bool,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            out: Vec::new(),
            spans: Vec::new(),
            used: 0,
            emitted: false,
        }
    }

    fn append(&mut self, text: &str, style: Style, cells: usize) {
        if text.is_empty() {
            return;
        }
        match self.spans.last_mut() {
            Some(last) if last.style == style => {
                let mut combined = last.content.to_string();
                combined.push_str(text);
                *last = Span::styled(combined, style);
            }
            _ => self.spans.push(Span::styled(text.to_string(), style)),
        }
        self.used += cells;
    }

    fn break_line(&mut self) {
        self.out.push(Line::from(std::mem::take(&mut self.spans)));
        self.used = 0;
        self.emitted = true;
    }

    fn place_word(&mut self, word: &mut Vec<(char, Style)>, word_cells: &mut usize) {
        if word.is_empty() {
            return;
        }
        if self.used > 0 && self.used + *word_cells > self.width {
            self.break_line();
        }
        if *word_cells <= self.width.saturating_sub(self.used) {
            for (ch, style) in word.iter() {
                let cells = ch.width().unwrap_or(0);
                self.append(ch.encode_utf8(&mut [0; 4]), *style, cells);
            }
        } else {
            // Longer than a whole row: hard-break between characters
            for (ch, style) in word.iter() {
                let cells = ch.width().unwrap_or(0);
                if self.used > 0 && self.used + cells > self.width {
                    self.break_line();
                }
                self.append(ch.encode_utf8(&mut [0; 4]), *style, cells);
            }
        }
        word.clear();
        *word_cells = 0;
    }

    fn place_space(&mut self, style: Style) {
        if self.used == 0 && self.emitted {
            // Continuation rows never start with a space
            return;
        }
        if self.used < self.width {
            self.append(" ", style, 1);
        } else {
            self.break_line();
        }
    }

    fn finish_source_line(&mut self) {
        if !self.spans.is_empty() || !self.emitted {
            self.out.push(Line::from(std::mem::take(&mut self.spans)));
        }
        self.used = 0;
        self.emitted = false;
    }
}

impl ScrollCalculator {
    /// Wrap styled lines to `terminal_width` cells.
    ///
    /// Latin text breaks between words; wide characters (CJK, emoji) may
    /// break anywhere, matching how such text is usually set.
    pub fn prewrap_lines(lines: &[Line], terminal_width: u16) -> Vec<Line<'static>> {
        let width = terminal_width as usize;
        if width == 0 {
            return lines
                .iter()
                .map(|line| {
                    Line::from(
                        line.spans
                            .iter()
                            .map(|s| Span::styled(s.content.to_string(), s.style))
                            .collect::<Vec<_>>(),
                    )
                })
                .collect();
        }

        let mut builder = LineBuilder::new(width);
        for line in lines {
            let mut word: Vec<(char, Style)> = Vec::new();
            let mut word_cells = 0usize;

            for span in &line.spans {
                let style = line.style.patch(span.style);
                for ch in span.content.chars() {
                    let cells = ch.width().unwrap_or(0);
                    if ch == ' ' {
                        builder.place_word(&mut word, &mut word_cells);
                        builder.place_space(style);
                    } else if cells >= 2 {
                        builder.place_word(&mut word, &mut word_cells);
                        word.push((ch, style));
                        word_cells = cells;
                        builder.place_word(&mut word, &mut word_cells);
                    } else {
                        word.push((ch, style));
                        word_cells += cells;
                    }
                }
            }
            builder.place_word(&mut word, &mut word_cells);
            builder.finish_source_line();
        }
        builder.out
    }

    /// Largest top offset that still fills the viewport.
    pub fn max_scroll_offset(total_lines: usize, available_height: u16) -> u16 {
        let total = u16::try_from(total_lines).unwrap_or(u16::MAX);
        total.saturating_sub(available_height)
    }
}

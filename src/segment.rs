use std::fmt::Display;

use anstyle::{AnsiColor, Color, RgbColor, Style as AnsiStyle};
use lazy_static::lazy_static;
use unicode_segmentation::UnicodeSegmentation;

lazy_static! {
    pub static ref BG: Option<Color> = Some(AnsiColor::Black.into());
    pub static ref RED: Option<Color> = Some(AnsiColor::Red.into());
    pub static ref YELLOW: Option<Color> = Some(AnsiColor::Yellow.into());
    pub static ref BLUE: Option<Color> = Some(AnsiColor::Blue.into());
    pub static ref GRAY: Option<Color> = Some(AnsiColor::White.into());
    pub static ref BLACK: Option<Color> = Some(RgbColor(0u8, 0u8, 0u8).into());
}

pub trait DisplayExt {
    /// Visible width: escape sequences stripped, graphemes counted.
    fn display_len(&self) -> usize;
}

impl<T: Display> DisplayExt for T {
    fn display_len(&self) -> usize {
        strip_ansi_escapes::strip_str(self.to_string())
            .graphemes(true)
            .count()
    }
}

pub struct Segment {
    content: Box<dyn Display>,
    style: AnsiStyle,

    min_content_width: usize,
    max_content_width: usize,
    padding_left: &'static str,
    padding_right: &'static str,
}

impl Segment {
    pub fn new(content: Box<dyn Display>, style: AnsiStyle) -> Self {
        Segment {
            content,
            style,

            ..Default::default()
        }
    }

    /// Clock label, highlighted when selected and marked when pinned.
    pub fn new_title(label: &str, selected: bool, pinned: bool) -> Self {
        let color = if selected { *YELLOW } else { *GRAY };
        let marker = if pinned { " 󰐃" } else { "" };
        Segment {
            content: Box::new(format!("{label}{marker}")),
            style: AnsiStyle::new().fg_color(*BLACK).bg_color(color),

            ..Default::default()
        }
        .min_width(24)
    }

    pub fn new_clock(clock: Box<dyn Display>) -> Self {
        Segment {
            content: clock,
            style: AnsiStyle::new(),

            ..Default::default()
        }
    }

    pub fn new_prompt(prompt: &str, input: &str) -> Self {
        Segment {
            content: Box::new(format!("{prompt}: {input}_")),
            style: AnsiStyle::new().fg_color(*BLACK).bg_color(*BLUE),

            ..Default::default()
        }
        .max_width(64)
    }

    pub fn new_warning(message: &str) -> Self {
        Segment {
            content: Box::new(message.to_string()),
            style: AnsiStyle::new().fg_color(*BLACK).bg_color(*RED),

            ..Default::default()
        }
        .max_width(64)
    }

    pub fn min_width(mut self, width: usize) -> Self {
        self.min_content_width = width;
        self
    }

    pub fn max_width(mut self, width: usize) -> Self {
        self.max_content_width = width;
        self
    }
}

impl Default for Segment {
    fn default() -> Self {
        Segment {
            content: Box::new(""),
            style: AnsiStyle::new().fg_color(*GRAY).bg_color(*BG),

            min_content_width: 0,
            max_content_width: 32,

            padding_left: " ",
            padding_right: " ",
        }
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut content = self.content.to_string();
        let width = content.display_len();
        if width > self.max_content_width {
            content = format!(
                "{}...",
                strip_ansi_escapes::strip_str(&content)
                    .graphemes(true)
                    .take(self.max_content_width.saturating_sub(3))
                    .collect::<String>()
            );
        }
        let fill = " ".repeat(self.min_content_width.saturating_sub(content.display_len()));

        let reset = self.style.render_reset();
        let style = self.style.render();

        write!(
            f,
            "{style}{padding_left}{content}{fill}{padding_right}{reset}",
            padding_left = self.padding_left,
            padding_right = self.padding_right,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_len_ignores_escapes() {
        let styled = format!("{}12:30{}", AnsiStyle::new().bold().render(), AnsiStyle::new().render_reset());
        assert_eq!(styled.display_len(), 5);
    }

    #[test]
    fn pads_to_min_width() {
        let segment = Segment::new(Box::new("Dublin"), AnsiStyle::new()).min_width(10);
        assert_eq!(segment.display_len(), 12);
    }

    #[test]
    fn truncates_past_max_width() {
        let segment = Segment::new(Box::new("Argentina - Buenos Aires"), AnsiStyle::new()).max_width(10);
        let plain = strip_ansi_escapes::strip_str(segment.to_string());
        assert_eq!(plain, " Argenti... ");
    }

    #[test]
    fn title_marks_pinned_clocks() {
        let plain = strip_ansi_escapes::strip_str(Segment::new_title("Tokyo", false, true).to_string());
        assert!(plain.trim_end().ends_with("Tokyo 󰐃"));
        assert_eq!(plain.graphemes(true).count(), 26);
    }
}

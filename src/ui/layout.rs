//! Screen geometry and transcript box layout.
//!
//! Both the controller (for scroll bounds) and the renderer consume these
//! helpers, so the two always agree on how many rows the transcript has and
//! how many of them fit on screen.

use ratatui::layout::Rect;

use crate::core::message::{Message, Role};
use crate::core::text_wrapping::{TextWrapper, WrapConfig};

/// Blank columns left and right of every message box.
pub const MESSAGE_MARGIN: u16 = 1;
/// Blank columns between a box border and its text.
pub const MESSAGE_PADDING: u16 = 1;
/// Rows of the input box including its border.
pub const INPUT_HEIGHT: u16 = 5;
pub const TITLE_HEIGHT: u16 = 1;
pub const NOTICE_HEIGHT: u16 = 1;

pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

/// Areas of the composing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub title: Rect,
    pub transcript: Rect,
    pub notice: Rect,
    pub input: Rect,
}

impl ScreenAreas {
    /// Split `area` top to bottom into title, transcript, notice and input.
    /// Fixed rows are granted in the order title, input, notice; the
    /// transcript takes whatever remains.
    pub fn split(area: Rect, has_notice: bool) -> Self {
        let mut remaining = area.height;
        let title_h = TITLE_HEIGHT.min(remaining);
        remaining -= title_h;
        let input_h = INPUT_HEIGHT.min(remaining);
        remaining -= input_h;
        let notice_h = if has_notice {
            NOTICE_HEIGHT.min(remaining)
        } else {
            0
        };
        remaining -= notice_h;
        let transcript_h = remaining;

        let title = Rect::new(area.x, area.y, area.width, title_h);
        let transcript = Rect::new(area.x, title.bottom(), area.width, transcript_h);
        let notice = Rect::new(area.x, transcript.bottom(), area.width, notice_h);
        let input = Rect::new(area.x, notice.bottom(), area.width, input_h);
        Self {
            title,
            transcript,
            notice,
            input,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    Top,
    /// One wrapped text line, right-padded to the box's inner width. The
    /// first `label_width` bytes hold the role label.
    Body { text: String, label_width: usize },
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptRow {
    pub message_index: usize,
    pub role: Role,
    pub kind: RowKind,
}

/// Geometry of one message box for a given terminal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxMetrics {
    /// Width between the two border columns.
    pub inner_width: usize,
    /// Width available for text (inner width minus padding).
    pub text_width: usize,
}

impl BoxMetrics {
    pub fn for_width(width: u16) -> Self {
        let outer = width.saturating_sub(2 * MESSAGE_MARGIN) as usize;
        let inner_width = outer.saturating_sub(2).max(1 + 2 * MESSAGE_PADDING as usize);
        let text_width = inner_width - 2 * MESSAGE_PADDING as usize;
        Self {
            inner_width,
            text_width,
        }
    }
}

/// Style-free rows for every message, wrapped for one terminal width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptLayout {
    width: u16,
    message_count: usize,
    rows: Vec<TranscriptRow>,
}

impl TranscriptLayout {
    pub fn build(messages: &[Message], width: u16) -> Self {
        let mut layout = Self {
            width,
            message_count: 0,
            rows: Vec::new(),
        };
        layout.extend(messages);
        layout
    }

    /// Lay out messages appended since the last call. Earlier rows stay
    /// valid because the conversation only ever grows.
    pub fn extend(&mut self, messages: &[Message]) {
        let metrics = BoxMetrics::for_width(self.width);
        for (index, message) in messages.iter().enumerate().skip(self.message_count) {
            push_message_rows(&mut self.rows, index, message, metrics);
        }
        self.message_count = self.message_count.max(messages.len());
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn rows(&self) -> &[TranscriptRow] {
        &self.rows
    }

    pub fn line_count(&self) -> usize {
        self.rows.len()
    }

    pub fn metrics(&self) -> BoxMetrics {
        BoxMetrics::for_width(self.width)
    }
}

fn push_message_rows(
    rows: &mut Vec<TranscriptRow>,
    message_index: usize,
    message: &Message,
    metrics: BoxMetrics,
) {
    let label = format!("{}: ", role_label(message.role));
    let text = format!("{label}{}", printable(&message.content));
    let wrapped = TextWrapper::wrap_lines(&text, &WrapConfig::new(metrics.text_width));

    let row = |kind| TranscriptRow {
        message_index,
        role: message.role,
        kind,
    };

    rows.push(row(RowKind::Top));
    for (line_idx, line) in wrapped.into_iter().enumerate() {
        let label_width = if line_idx == 0 {
            label.len().min(line.len())
        } else {
            0
        };
        let used = unicode_width::UnicodeWidthStr::width(line.as_str());
        let mut text = line;
        text.extend(std::iter::repeat(' ').take(metrics.text_width.saturating_sub(used)));
        rows.push(row(RowKind::Body { text, label_width }));
    }
    rows.push(row(RowKind::Bottom));
}

const TAB_WIDTH: usize = 4;

/// Expands tabs to the next stop and drops control characters other than
/// line breaks, so every cell in a row occupies exactly one column.
fn printable(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut column = 0;
    for ch in content.chars() {
        match ch {
            '\n' => {
                out.push('\n');
                column = 0;
            }
            '\t' => {
                let spaces = TAB_WIDTH - column % TAB_WIDTH;
                out.extend(std::iter::repeat(' ').take(spaces));
                column += spaces;
            }
            c if c.is_control() => {}
            c => {
                out.push(c);
                column += unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
            }
        }
    }
    out
}

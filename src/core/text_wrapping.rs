//! Word wrapping for message boxes.
//!
//! Widths are measured in terminal columns (`unicode-width`), not chars, so
//! wide glyphs never overflow a box border. Explicit newlines are kept, runs
//! of spaces inside a line are preserved, and a word longer than the line is
//! split at the column limit.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Configuration for text wrapping behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapConfig {
    /// Maximum display width of a wrapped line; clamped to at least 1.
    pub width: usize,
}

impl WrapConfig {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
        }
    }
}

pub struct TextWrapper;

impl TextWrapper {
    /// Wrap `text` into display lines no wider than `config.width`.
    pub fn wrap_lines(text: &str, config: &WrapConfig) -> Vec<String> {
        let width = config.width.max(1);
        let mut out = Vec::new();
        for paragraph in text.split('\n') {
            wrap_paragraph(paragraph.trim_end_matches('\r'), width, &mut out);
        }
        out
    }

    pub fn count_wrapped_lines(text: &str, config: &WrapConfig) -> usize {
        Self::wrap_lines(text, config).len()
    }
}

enum Segment<'a> {
    Word(&'a str),
    Spaces(&'a str),
}

fn segments(line: &str) -> Vec<Segment<'_>> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;

    for (idx, ch) in line.char_indices() {
        let is_space = ch.is_whitespace();
        match in_space {
            Some(prev) if prev != is_space => {
                result.push(make_segment(&line[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_space = Some(is_space);
    }

    if let Some(prev) = in_space {
        result.push(make_segment(&line[start..], prev));
    }
    result
}

fn make_segment(text: &str, is_space: bool) -> Segment<'_> {
    if is_space {
        Segment::Spaces(text)
    } else {
        Segment::Word(text)
    }
}

fn wrap_paragraph(paragraph: &str, width: usize, out: &mut Vec<String>) {
    let mut current = String::new();
    let mut current_width = 0usize;
    let mut pushed_any = false;

    for segment in segments(paragraph) {
        match segment {
            Segment::Spaces(spaces) => {
                // Whitespace that would cross the border ends the line instead.
                let spaces_width = UnicodeWidthStr::width(spaces);
                if current_width + spaces_width >= width {
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                        current_width = 0;
                        pushed_any = true;
                    }
                } else {
                    current.push_str(spaces);
                    current_width += spaces_width;
                }
            }
            Segment::Word(word) => {
                let word_width = UnicodeWidthStr::width(word);
                if current_width + word_width <= width {
                    current.push_str(word);
                    current_width += word_width;
                    continue;
                }

                if !current.is_empty() && word_width <= width {
                    out.push(std::mem::take(&mut current).trim_end().to_string());
                    pushed_any = true;
                    current.push_str(word);
                    current_width = word_width;
                    continue;
                }

                // Word does not fit on any line: hard split at the column limit.
                for ch in word.chars() {
                    let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                    if current_width + ch_width > width && !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                        current_width = 0;
                        pushed_any = true;
                    }
                    current.push(ch);
                    current_width += ch_width;
                }
            }
        }
    }

    if !current.is_empty() || !pushed_any {
        out.push(current);
    }
}

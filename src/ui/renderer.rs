//! Frame composition.
//!
//! [`ui`] is a pure projection of controller state: the same controller and
//! theme always draw the same frame, which is what makes redrawing after
//! every event safe.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::core::session::{Mode, NoticeKind, SessionController};
use crate::ui::layout::{RowKind, ScreenAreas, TranscriptRow, MESSAGE_MARGIN, MESSAGE_PADDING};
use crate::ui::picker::render_model_picker;
use crate::ui::theme::Theme;

const WELCOME: &str = "Welcome to chatbox. Ask anything..";
const INPUT_HINTS: &str = "Enter send • Ctrl+E models • Ctrl+S save • Ctrl+C quit";

pub fn ui(f: &mut Frame, session: &SessionController, theme: &Theme) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(theme.background_color)),
        area,
    );

    match session.mode() {
        Mode::Composing => render_conversation(f, area, session, theme),
        Mode::AwaitingModelChoice => render_model_picker(f, area, session, theme),
    }
}

fn render_conversation(f: &mut Frame, area: Rect, session: &SessionController, theme: &Theme) {
    let areas = ScreenAreas::split(area, session.notice().is_some());

    f.render_widget(Paragraph::new(title_line(session, theme)), areas.title);

    let lines: Vec<Line> = if session.conversation().is_empty() {
        vec![Line::from(Span::styled(WELCOME, theme.title_style))]
    } else {
        session
            .transcript()
            .rows()
            .iter()
            .skip(session.transcript_scroll() as usize)
            .take(areas.transcript.height as usize)
            .map(|row| transcript_line(row, session, theme))
            .collect()
    };
    f.render_widget(Paragraph::new(lines), areas.transcript);

    if let Some(notice) = session.notice() {
        let style = match notice.kind {
            NoticeKind::Info => theme.info_notice_style,
            NoticeKind::Error => theme.error_notice_style,
        };
        let text = notice.text.lines().collect::<Vec<_>>().join(" ");
        f.render_widget(
            Paragraph::new(Line::from(Span::styled(format!(" {text}"), style))),
            areas.notice,
        );
    }

    let mut input = session.input().clone();
    input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.input_border_style)
            .title(Span::styled(INPUT_HINTS, theme.input_title_style)),
    );
    input.set_style(theme.input_text_style);
    input.set_placeholder_style(theme.input_placeholder_style);
    f.render_widget(&input, areas.input);
}

fn title_line(session: &SessionController, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(
        format!(
            " chatbox v{} • {} ({})",
            env!("CARGO_PKG_VERSION"),
            session.active_model_label(),
            session.active_model()
        ),
        theme.title_style,
    )];
    if session.pending_inference() {
        spans.push(Span::styled(
            " • waiting for reply…",
            theme.pending_indicator_style,
        ));
    }
    Line::from(spans)
}

fn transcript_line(row: &TranscriptRow, session: &SessionController, theme: &Theme) -> Line<'static> {
    let style = theme.role_style(row.role);
    let inner_width = session.transcript().metrics().inner_width;
    let margin = " ".repeat(MESSAGE_MARGIN as usize);
    let padding = " ".repeat(MESSAGE_PADDING as usize);

    let spans = match &row.kind {
        RowKind::Top => vec![
            Span::raw(margin),
            Span::styled(format!("╭{}╮", "─".repeat(inner_width)), style.border),
        ],
        RowKind::Bottom => vec![
            Span::raw(margin),
            Span::styled(format!("╰{}╯", "─".repeat(inner_width)), style.border),
        ],
        RowKind::Body { text, label_width } => {
            let split = (*label_width).min(text.len());
            let (label, rest) = text.split_at(split);
            vec![
                Span::raw(margin),
                Span::styled("│", style.border),
                Span::raw(padding.clone()),
                Span::styled(label.to_string(), style.label),
                Span::styled(rest.to_string(), style.text),
                Span::raw(padding),
                Span::styled("│", style.border),
            ]
        }
    };
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::InferenceError;
    use crate::core::session::SessionEvent;
    use crate::utils::test_utils::create_test_controller_with_viewport;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn draw(session: &SessionController, theme: &Theme) -> Buffer {
        let viewport = session.viewport();
        let mut terminal = Terminal::new(TestBackend::new(viewport.width, viewport.height)).unwrap();
        terminal.draw(|f| ui(f, session, theme)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn row_text(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    fn screen_text(buffer: &Buffer) -> String {
        (0..buffer.area.height)
            .map(|y| row_text(buffer, y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn empty_session_shows_welcome_and_model() {
        let session = create_test_controller_with_viewport(60, 12);
        let text = screen_text(&draw(&session, &Theme::default()));
        assert!(text.contains("Welcome to chatbox"));
        assert!(text.contains("Llama 3.1"));
        assert!(text.contains("Ctrl+E models"));
    }

    #[test]
    fn messages_render_in_bordered_boxes_with_role_labels() {
        let mut session = create_test_controller_with_viewport(40, 16);
        session.dispatch(SessionEvent::SubmitText { text: "hi".into() });
        session.dispatch(SessionEvent::InferenceCompleted {
            ticket: 1,
            message: crate::core::message::Message::assistant("hello"),
        });

        let buffer = draw(&session, &Theme::default());
        assert_eq!(row_text(&buffer, 1), format!(" ╭{}╮ ", "─".repeat(36)));
        assert!(row_text(&buffer, 2).starts_with(" │ You: hi"));
        assert!(row_text(&buffer, 2).ends_with("│ "));
        assert!(row_text(&buffer, 5).starts_with(" │ Assistant: hello"));

        let theme = Theme::default();
        assert_eq!(buffer[(3, 2)].style().fg, theme.role_style(crate::core::message::Role::User).label.fg);
    }

    #[test]
    fn render_is_idempotent() {
        let mut session = create_test_controller_with_viewport(50, 14);
        session.dispatch(SessionEvent::SubmitText { text: "question".into() });
        let theme = Theme::default();
        assert_eq!(draw(&session, &theme), draw(&session, &theme));
    }

    #[test]
    fn pending_and_error_states_are_visible() {
        let mut session = create_test_controller_with_viewport(120, 14);
        session.dispatch(SessionEvent::SubmitText { text: "question".into() });
        let pending = screen_text(&draw(&session, &Theme::default()));
        assert!(pending.contains("waiting for reply"));

        session.dispatch(SessionEvent::InferenceFailed {
            ticket: 1,
            error: InferenceError::MalformedResponse("bad json".into()),
        });
        let failed = screen_text(&draw(&session, &Theme::default()));
        assert!(!failed.contains("waiting for reply"));
        assert!(failed.contains("Malformed response: bad json"));
    }

    #[test]
    fn transcript_follows_latest_messages() {
        let mut session = create_test_controller_with_viewport(40, 12);
        for n in 1..=4 {
            session.dispatch(SessionEvent::SubmitText {
                text: format!("question {n}"),
            });
            session.dispatch(SessionEvent::InferenceCompleted {
                ticket: n,
                message: crate::core::message::Message::assistant(format!("answer {n}")),
            });
        }
        let text = screen_text(&draw(&session, &Theme::default()));
        assert!(text.contains("answer 4"));
        assert!(!text.contains("question 1"));
    }
}

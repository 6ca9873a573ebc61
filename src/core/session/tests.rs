use super::*;
use crate::core::inference::InferenceError;
use crate::core::message::Role;
use crate::core::persistence::PersistenceError;
use crate::ui::renderer::ui;
use crate::ui::theme::Theme;
use crate::utils::test_utils::{create_test_controller, create_test_controller_with_viewport};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

fn submit(session: &mut SessionController, text: &str) -> Option<SessionCommand> {
    session.dispatch(SessionEvent::SubmitText { text: text.into() })
}

fn spawned_ticket(command: Option<SessionCommand>) -> u64 {
    match command {
        Some(SessionCommand::SpawnInference(request)) => request.ticket,
        other => panic!("expected an inference request, got {other:?}"),
    }
}

fn reply(session: &mut SessionController, ticket: u64, text: &str) {
    session.dispatch(SessionEvent::InferenceCompleted {
        ticket,
        message: Message::assistant(text),
    });
}

fn type_draft(session: &mut SessionController, text: &str) {
    for ch in text.chars() {
        session.dispatch(SessionEvent::EditInput(Input {
            key: Key::Char(ch),
            ..Input::default()
        }));
    }
}

fn draw(session: &SessionController) -> Buffer {
    let viewport = session.viewport();
    let mut terminal = Terminal::new(TestBackend::new(viewport.width, viewport.height)).unwrap();
    terminal
        .draw(|f| ui(f, session, &Theme::default()))
        .unwrap();
    terminal.backend().buffer().clone()
}

#[test]
fn new_session_starts_composing_with_default_model() {
    let session = create_test_controller();
    assert_eq!(session.mode(), Mode::Composing);
    assert!(session.conversation().is_empty());
    assert!(!session.pending_inference());
    assert!(session.input_focused());
    assert_eq!(
        session.active_model(),
        session.catalog().default_model().identifier
    );
}

#[test]
fn unknown_initial_model_falls_back_to_default() {
    let catalog = ModelCatalog::builtin();
    let session = SessionController::new(
        catalog.clone(),
        SessionOptions {
            initial_model: Some("@cf/unknown/model".into()),
            ..SessionOptions::default()
        },
    );
    assert_eq!(session.active_model(), catalog.default_model().identifier);

    let chosen = catalog.lookup(4).unwrap().identifier;
    let session = SessionController::new(
        catalog.clone(),
        SessionOptions {
            initial_model: Some(chosen.into()),
            ..SessionOptions::default()
        },
    );
    assert_eq!(session.active_model(), chosen);
    assert_eq!(session.active_model_label(), "Qwen");
}

#[test]
fn submit_appends_user_message_and_requests_inference() {
    let mut session = create_test_controller();
    type_draft(&mut session, "hello");

    let command = submit(&mut session, "hello");
    let Some(SessionCommand::SpawnInference(request)) = command else {
        panic!("expected inference request");
    };
    assert_eq!(request.model, session.active_model());
    assert_eq!(&*request.conversation, &[Message::user("hello")]);
    assert!(session.pending_inference());
    assert_eq!(session.draft(), "");
}

#[test]
fn blank_submission_is_ignored() {
    let mut session = create_test_controller();
    assert!(submit(&mut session, "   \n ").is_none());
    assert!(session.conversation().is_empty());
    assert!(!session.pending_inference());
}

#[test]
fn conversation_alternates_over_many_cycles() {
    let mut session = create_test_controller();
    for n in 0..5 {
        let ticket = spawned_ticket(submit(&mut session, &format!("q{n}")));
        reply(&mut session, ticket, &format!("a{n}"));
    }

    let messages: Vec<&Message> = session.conversation().iter().collect();
    assert_eq!(messages.len(), 10);
    for (idx, message) in messages.iter().enumerate() {
        let n = idx / 2;
        if idx % 2 == 0 {
            assert_eq!(**message, Message::user(format!("q{n}")));
        } else {
            assert_eq!(**message, Message::assistant(format!("a{n}")));
        }
    }
    assert!(!session.pending_inference());
}

#[test]
fn second_submission_while_pending_is_rejected_and_draft_kept() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "first"));

    type_draft(&mut session, "second");
    let draft = session.draft();
    assert!(submit(&mut session, &draft).is_none());
    assert_eq!(session.conversation().len(), 1);
    assert_eq!(session.draft(), "second");

    reply(&mut session, ticket, "answer");
    assert!(!session.pending_inference());
    assert_eq!(session.draft(), "second");
    assert!(submit(&mut session, &draft).is_some());
    assert_eq!(session.conversation().len(), 3);
}

#[test]
fn failure_leaves_conversation_intact_and_allows_retry() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));
    session.dispatch(SessionEvent::InferenceFailed {
        ticket,
        error: InferenceError::MalformedResponse("bad".into()),
    });

    assert_eq!(session.conversation().as_slice(), &[Message::user("hi")]);
    assert!(!session.pending_inference());
    assert_eq!(session.mode(), Mode::Composing);
    let notice = session.notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);

    let retry = spawned_ticket(submit(&mut session, "again"));
    assert_ne!(retry, ticket);
    assert!(session.notice().is_none());
    assert_eq!(session.conversation().len(), 2);
}

#[test]
fn stale_results_are_discarded() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));

    reply(&mut session, ticket + 7, "from nowhere");
    session.dispatch(SessionEvent::InferenceFailed {
        ticket: ticket + 7,
        error: InferenceError::MalformedResponse("late".into()),
    });
    assert_eq!(session.conversation().len(), 1);
    assert!(session.pending_inference());
    assert!(session.notice().is_none());

    reply(&mut session, ticket, "real");
    reply(&mut session, ticket, "duplicate");
    assert_eq!(session.conversation().len(), 2);
    assert_eq!(session.conversation().last().unwrap().content, "real");
}

#[test]
fn completion_is_always_recorded_as_assistant() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));
    session.dispatch(SessionEvent::InferenceCompleted {
        ticket,
        message: Message::user("mislabelled"),
    });
    assert_eq!(session.conversation().last().unwrap().role, Role::Assistant);
}

#[test]
fn snapshot_is_isolated_from_later_appends() {
    let mut session = create_test_controller();
    let Some(SessionCommand::SpawnInference(request)) = submit(&mut session, "one") else {
        panic!("expected inference request");
    };
    reply(&mut session, request.ticket, "two");
    submit(&mut session, "three");

    assert_eq!(request.conversation.len(), 1);
    assert_eq!(session.conversation().len(), 3);
}

#[test]
fn switching_models_leaves_conversation_untouched() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));
    reply(&mut session, ticket, "hello");
    let before: Vec<Message> = session.conversation().iter().cloned().collect();

    let target = session.catalog().lookup(3).unwrap().identifier.to_string();
    session.dispatch(SessionEvent::EnterModelPicker);
    assert_eq!(session.mode(), Mode::AwaitingModelChoice);
    assert!(!session.input_focused());

    session.dispatch(SessionEvent::ConfirmModelChoice {
        identifier: target.clone(),
    });
    assert_eq!(session.mode(), Mode::Composing);
    assert!(session.input_focused());
    assert_eq!(session.active_model(), target);
    assert_eq!(session.conversation().as_slice(), before.as_slice());
    assert!(session.notice().unwrap().text.contains("Google Gemma"));

    let Some(SessionCommand::SpawnInference(request)) = submit(&mut session, "next") else {
        panic!("expected inference request");
    };
    assert_eq!(request.model, target);
}

#[test]
fn cancelling_picker_keeps_model() {
    let mut session = create_test_controller();
    let original = session.active_model().to_string();

    session.dispatch(SessionEvent::EnterModelPicker);
    session.dispatch(SessionEvent::PickerMoveDown);
    session.dispatch(SessionEvent::CancelModelPicker);

    assert_eq!(session.mode(), Mode::Composing);
    assert_eq!(session.active_model(), original);
}

#[test]
fn unknown_model_choice_is_ignored() {
    let mut session = create_test_controller();
    let original = session.active_model().to_string();

    session.dispatch(SessionEvent::EnterModelPicker);
    session.dispatch(SessionEvent::ConfirmModelChoice {
        identifier: "@cf/not/real".into(),
    });
    assert_eq!(session.mode(), Mode::AwaitingModelChoice);
    assert_eq!(session.active_model(), original);
}

#[test]
fn confirm_outside_picker_is_ignored() {
    let mut session = create_test_controller();
    let original = session.active_model().to_string();
    session.dispatch(SessionEvent::ConfirmModelChoice {
        identifier: session.catalog().lookup(2).unwrap().identifier.into(),
    });
    assert_eq!(session.active_model(), original);
}

#[test]
fn draft_survives_a_trip_through_the_picker() {
    let mut session = create_test_controller();
    type_draft(&mut session, "half typed");

    session.dispatch(SessionEvent::EnterModelPicker);
    type_draft(&mut session, "ignored");
    session.dispatch(SessionEvent::CancelModelPicker);
    assert_eq!(session.draft(), "half typed");

    session.dispatch(SessionEvent::EnterModelPicker);
    let target = session.catalog().lookup(5).unwrap().identifier.to_string();
    session.dispatch(SessionEvent::ConfirmModelChoice { identifier: target });
    assert_eq!(session.draft(), "half typed");
}

#[test]
fn submit_is_ignored_in_picker_mode() {
    let mut session = create_test_controller();
    session.dispatch(SessionEvent::EnterModelPicker);
    assert!(submit(&mut session, "hello").is_none());
    assert!(session.conversation().is_empty());
}

#[test]
fn reply_arriving_during_picker_is_still_recorded() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));
    session.dispatch(SessionEvent::EnterModelPicker);
    reply(&mut session, ticket, "hello");

    assert_eq!(session.mode(), Mode::AwaitingModelChoice);
    assert_eq!(session.conversation().len(), 2);
    assert!(!session.pending_inference());
}

#[test]
fn picker_filter_narrows_choices() {
    let mut session = create_test_controller();
    session.dispatch(SessionEvent::EnterModelPicker);
    for ch in "gemma".chars() {
        session.dispatch(SessionEvent::PickerFilterPush(ch));
    }
    let selected = session
        .picker()
        .selected_model(session.catalog())
        .unwrap()
        .identifier;
    assert_eq!(selected, session.catalog().lookup(3).unwrap().identifier);

    session.dispatch(SessionEvent::PickerFilterPop);
    assert_eq!(session.picker().filter(), "gemm");
}

#[test]
fn input_is_capped_at_char_limit() {
    let mut session = SessionController::new(
        ModelCatalog::builtin(),
        SessionOptions {
            input_char_limit: 5,
            ..SessionOptions::default()
        },
    );
    type_draft(&mut session, "abcdefgh");
    assert_eq!(session.draft(), "abcde");

    session.dispatch(SessionEvent::EditInput(Input {
        key: Key::Backspace,
        ..Input::default()
    }));
    type_draft(&mut session, "xy");
    assert_eq!(session.draft(), "abcdx");
}

#[test]
fn line_breaks_count_toward_char_limit() {
    let mut session = SessionController::new(
        ModelCatalog::builtin(),
        SessionOptions {
            input_char_limit: 5,
            ..SessionOptions::default()
        },
    );
    let newline = || {
        SessionEvent::EditInput(Input {
            key: Key::Enter,
            ..Input::default()
        })
    };
    type_draft(&mut session, "ab");
    session.dispatch(newline());
    type_draft(&mut session, "cdef");
    assert_eq!(session.draft(), "ab\ncd");

    session.dispatch(newline());
    assert_eq!(session.draft(), "ab\ncd");
}

#[test]
fn resize_redraw_is_idempotent() {
    let mut session = create_test_controller_with_viewport(60, 20);
    let ticket = spawned_ticket(submit(&mut session, "a fairly long question that wraps"));
    reply(&mut session, ticket, "and an answer that also wraps around");

    session.dispatch(SessionEvent::Resize {
        width: 44,
        height: 18,
    });
    let first = draw(&session);
    session.dispatch(SessionEvent::Resize {
        width: 44,
        height: 18,
    });
    let second = draw(&session);
    assert_eq!(first, second);
    assert_eq!(session.viewport(), Viewport::new(44, 18));
    assert_eq!(session.transcript().width(), 44);
}

#[test]
fn resize_rewraps_transcript() {
    let mut session = create_test_controller_with_viewport(80, 24);
    let ticket = spawned_ticket(submit(&mut session, &"word ".repeat(30)));
    reply(&mut session, ticket, "ok");
    let wide = session.transcript().line_count();

    session.dispatch(SessionEvent::Resize {
        width: 30,
        height: 24,
    });
    assert!(session.transcript().line_count() > wide);
}

#[test]
fn save_disabled_sets_notice_without_command() {
    let mut session = SessionController::new(
        ModelCatalog::builtin(),
        SessionOptions {
            persistence_enabled: false,
            ..SessionOptions::default()
        },
    );
    assert!(session.dispatch(SessionEvent::SaveRequested).is_none());
    assert!(session.notice().unwrap().text.contains("disabled"));
}

#[test]
fn save_request_snapshots_conversation() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));
    reply(&mut session, ticket, "hello");

    match session.dispatch(SessionEvent::SaveRequested) {
        Some(SessionCommand::SaveSession { conversation }) => {
            assert_eq!(
                &*conversation,
                &[Message::user("hi"), Message::assistant("hello")]
            );
        }
        other => panic!("expected save command, got {other:?}"),
    }

    session.dispatch(SessionEvent::SessionSaved { session_id: 3 });
    assert_eq!(session.notice().unwrap().kind, NoticeKind::Info);
    assert!(session.notice().unwrap().text.contains("#3"));

    session.dispatch(SessionEvent::SaveFailed {
        error: PersistenceError::InvalidRow {
            detail: "broken".into(),
        },
    });
    assert_eq!(session.notice().unwrap().kind, NoticeKind::Error);
    assert_eq!(session.conversation().len(), 2);
}

#[test]
fn successful_reply_clears_error_notice() {
    let mut session = create_test_controller();
    let ticket = spawned_ticket(submit(&mut session, "hi"));
    session.dispatch(SessionEvent::SaveFailed {
        error: PersistenceError::InvalidRow {
            detail: "broken".into(),
        },
    });
    assert_eq!(session.notice().unwrap().kind, NoticeKind::Error);

    reply(&mut session, ticket, "hello");
    assert!(session.notice().is_none());
    assert_eq!(session.conversation().len(), 2);

    let ticket = spawned_ticket(submit(&mut session, "again"));
    session.dispatch(SessionEvent::SessionSaved { session_id: 7 });
    reply(&mut session, ticket, "sure");
    assert_eq!(session.notice().unwrap().kind, NoticeKind::Info);
}

#[test]
fn quit_returns_quit_command() {
    let mut session = create_test_controller();
    assert!(matches!(
        session.dispatch(SessionEvent::Quit),
        Some(SessionCommand::Quit)
    ));
}

#[test]
fn scrolling_moves_within_bounds_and_new_messages_follow() {
    let mut session = create_test_controller_with_viewport(40, 12);
    for n in 0..4 {
        let ticket = spawned_ticket(submit(&mut session, &format!("question {n}")));
        reply(&mut session, ticket, &format!("answer {n}"));
    }
    let bottom = session.transcript_scroll();
    assert!(bottom > 0);

    session.dispatch(SessionEvent::ScrollUp(2));
    assert_eq!(session.transcript_scroll(), bottom - 2);

    session.dispatch(SessionEvent::ScrollToTop);
    assert_eq!(session.transcript_scroll(), 0);
    session.dispatch(SessionEvent::ScrollUp(5));
    assert_eq!(session.transcript_scroll(), 0);

    session.dispatch(SessionEvent::ScrollDown(u16::MAX));
    assert_eq!(session.transcript_scroll(), bottom);

    session.dispatch(SessionEvent::ScrollToTop);
    let ticket = spawned_ticket(submit(&mut session, "latest"));
    reply(&mut session, ticket, "newest");
    assert!(session.transcript_scroll() > bottom);

    session.dispatch(SessionEvent::ScrollToTop);
    session.dispatch(SessionEvent::ScrollToBottom);
    assert_eq!(
        session.transcript_scroll() as usize,
        session.transcript().line_count() - session.transcript_height() as usize
    );
}

#[test]
fn dispatch_all_collects_commands_in_order() {
    let mut session = create_test_controller();
    let commands = session.dispatch_all([
        SessionEvent::SubmitText { text: "hi".into() },
        SessionEvent::SaveRequested,
        SessionEvent::Quit,
    ]);
    assert_eq!(commands.len(), 3);
    assert!(matches!(commands[0], SessionCommand::SpawnInference(_)));
    assert!(matches!(commands[1], SessionCommand::SaveSession { .. }));
    assert!(matches!(commands[2], SessionCommand::Quit));
}

use super::{Args, Commands};
use clap::Parser;
use std::path::PathBuf;

fn parse(argv: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("chatbox").chain(argv.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn no_subcommand_means_chat() {
    let args = parse(&[]);
    assert!(args.command.is_none());
    assert!(!args.no_save);
}

#[test]
fn global_flags_work_after_subcommand() {
    let args = parse(&["chat", "-m", "2", "--no-save", "--log-file", "chatbox.log"]);
    assert_eq!(args.command, Some(Commands::Chat));
    assert_eq!(args.model.as_deref(), Some("2"));
    assert!(args.no_save);
    assert_eq!(args.log_file, Some(PathBuf::from("chatbox.log")));
}

#[test]
fn set_joins_multiple_words() {
    let args = parse(&["set", "default-model", "Google", "Gemma"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "default-model".into(),
            value: vec!["Google".into(), "Gemma".into()],
        })
    );
}

#[test]
fn set_requires_a_value() {
    let result = Args::try_parse_from(["chatbox", "set", "theme"]);
    assert!(result.is_err());
}

#[test]
fn history_delete_requires_an_id() {
    assert!(Args::try_parse_from(["chatbox", "history", "--delete"]).is_err());
    let args = parse(&["history", "3", "--delete"]);
    assert_eq!(
        args.command,
        Some(Commands::History {
            id: Some(3),
            delete: true
        })
    );
}

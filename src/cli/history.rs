//! `chatbox history`: inspect conversations saved with Ctrl+S.

use std::io::{self, Write};
use std::path::Path;

use crate::core::message::Message;
use crate::core::persistence::{SessionSummary, SqliteSessionStore};
use crate::ui::layout::role_label;

pub async fn run_history(
    database: &Path,
    session_id: Option<i64>,
    delete: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !database.exists() {
        println!("No saved conversations ({} does not exist)", database.display());
        return Ok(());
    }

    let store = SqliteSessionStore::open(database).await?;
    let mut out = io::stdout();

    match (session_id, delete) {
        (None, _) => write_session_list(&mut out, &store.list_sessions().await?)?,
        (Some(id), true) => {
            if store.delete_session(id).await? {
                writeln!(out, "✅ Deleted session #{id}")?;
            } else {
                return Err(missing_session(id).into());
            }
        }
        (Some(id), false) => {
            let messages = store.load_session(id).await?;
            if messages.is_empty() && !store.list_sessions().await?.iter().any(|s| s.id == id) {
                return Err(missing_session(id).into());
            }
            write_transcript(&mut out, id, &messages)?;
        }
    }
    Ok(())
}

fn missing_session(id: i64) -> String {
    format!("No saved session #{id}")
}

pub fn write_session_list<W: Write>(out: &mut W, sessions: &[SessionSummary]) -> io::Result<()> {
    if sessions.is_empty() {
        return writeln!(out, "No saved conversations");
    }
    writeln!(out, "💬 Saved Conversations")?;
    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    for session in sessions {
        let noun = if session.message_count == 1 {
            "message"
        } else {
            "messages"
        };
        writeln!(
            out,
            "  #{:<5} {}  {} {}",
            session.id, session.created_at, session.message_count, noun
        )?;
    }
    Ok(())
}

pub fn write_transcript<W: Write>(out: &mut W, id: i64, messages: &[Message]) -> io::Result<()> {
    writeln!(out, "Session #{id}")?;
    for message in messages {
        writeln!(out)?;
        writeln!(out, "{}: {}", role_label(message.role), message.content)?;
    }
    Ok(())
}

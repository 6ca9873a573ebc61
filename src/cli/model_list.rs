//! `chatbox models`: print the selectable models.

use std::io::{self, Write};

use crate::core::catalog::ModelCatalog;

pub fn print_models(catalog: &ModelCatalog, configured_default: Option<&str>) {
    let stdout = io::stdout();
    let _ = write_models(&mut stdout.lock(), catalog, configured_default);
}

pub fn write_models<W: Write>(
    out: &mut W,
    catalog: &ModelCatalog,
    configured_default: Option<&str>,
) -> io::Result<()> {
    writeln!(out, "🤖 Available Models")?;
    writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;
    writeln!(out)?;

    let default_id = configured_default
        .and_then(|name| catalog.resolve(name))
        .unwrap_or_else(|| catalog.default_model())
        .identifier;

    for model in catalog.iter() {
        let marker = if model.identifier == default_id {
            " (default)"
        } else {
            ""
        };
        writeln!(
            out,
            "  {}. {:<14} {}{}",
            model.ordinal, model.display_alias, model.identifier, marker
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Start with a model: chatbox -m <number|name>   Save a default: chatbox set default-model <number|name>"
    )?;
    Ok(())
}

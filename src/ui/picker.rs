use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, List, ListItem, ListState},
    Frame,
};

use crate::core::session::SessionController;
use crate::ui::theme::Theme;

const PICKER_TITLE: &str = "Available Models";
const PICKER_HINTS: &str = "↑/↓ move • Enter select • Esc cancel • type to filter";

/// Centered panel: half the screen wide (never narrower than 40 columns
/// unless the screen is), tall enough for every entry plus borders.
pub fn picker_area(area: Rect, entry_count: usize) -> Rect {
    let width = (area.width / 2).max(40).min(area.width);
    let wanted = u16::try_from(entry_count).unwrap_or(u16::MAX).saturating_add(2);
    let height = wanted.max(4).min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

pub fn render_model_picker(f: &mut Frame, area: Rect, session: &SessionController, theme: &Theme) {
    let catalog = session.catalog();
    let picker = session.picker();
    let entries = picker.entries(catalog);

    let items: Vec<ListItem> = if entries.is_empty() {
        vec![ListItem::new(Line::from(Span::styled(
            "No models match the filter",
            theme.picker_detail_style,
        )))]
    } else {
        entries
            .iter()
            .map(|model| {
                let mut spans = vec![
                    Span::styled(
                        format!("{}. {}", model.ordinal, model.display_alias),
                        theme.picker_item_style,
                    ),
                    Span::styled(format!("  {}", model.identifier), theme.picker_detail_style),
                ];
                if model.identifier == session.active_model() {
                    spans.push(Span::styled(" (current)", theme.picker_detail_style));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let title = if picker.filter().is_empty() {
        PICKER_TITLE.to_string()
    } else {
        format!("{PICKER_TITLE} • Filter: {}", picker.filter())
    };

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme.picker_border_style)
        .title(Span::styled(title, theme.title_style))
        .title_bottom(Span::styled(PICKER_HINTS, theme.picker_detail_style));

    let list = List::new(items)
        .block(block)
        .highlight_style(theme.selection_highlight_style)
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    if !entries.is_empty() {
        state.select(Some(picker.selected()));
    }

    let rect = picker_area(area, entries.len().max(1));
    f.render_widget(Clear, rect);
    f.render_stateful_widget(list, rect, &mut state);
}

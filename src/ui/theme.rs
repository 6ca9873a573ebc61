use ratatui::style::{Color, Modifier, Style};

use crate::core::message::Role;

/// Styles for one conversational role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleStyle {
    pub label: Style,
    pub text: Style,
    pub border: Style,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub background_color: Color,
    // Indexed by `role_index`.
    roles: [RoleStyle; 2],

    // Chrome
    pub title_style: Style,
    pub pending_indicator_style: Style,
    pub info_notice_style: Style,
    pub error_notice_style: Style,

    // Input area
    pub input_border_style: Style,
    pub input_title_style: Style,
    pub input_text_style: Style,
    pub input_placeholder_style: Style,

    // Model picker
    pub picker_border_style: Style,
    pub picker_item_style: Style,
    pub picker_detail_style: Style,
    pub selection_highlight_style: Style,
}

fn role_index(role: Role) -> usize {
    match role {
        Role::User => 0,
        Role::Assistant => 1,
    }
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            background_color: Color::Reset,
            roles: [
                RoleStyle {
                    label: Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    text: Style::default().fg(Color::White),
                    border: Style::default().fg(Color::Gray),
                },
                RoleStyle {
                    label: Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    text: Style::default().fg(Color::Gray),
                    border: Style::default().fg(Color::DarkGray),
                },
            ],

            title_style: Style::default().fg(Color::Gray),
            pending_indicator_style: Style::default().fg(Color::Yellow),
            info_notice_style: Style::default().fg(Color::Cyan),
            error_notice_style: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),

            input_border_style: Style::default().fg(Color::Gray),
            input_title_style: Style::default().fg(Color::Gray),
            input_text_style: Style::default().fg(Color::White),
            input_placeholder_style: Style::default().fg(Color::DarkGray),

            picker_border_style: Style::default().fg(Color::Gray),
            picker_item_style: Style::default().fg(Color::White),
            picker_detail_style: Style::default().fg(Color::DarkGray),
            selection_highlight_style: Style::default()
                .fg(Color::Black)
                .bg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn light() -> Self {
        Theme {
            background_color: Color::Reset,
            roles: [
                RoleStyle {
                    label: Style::default()
                        .fg(Color::Red)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    text: Style::default().fg(Color::Black),
                    border: Style::default().fg(Color::DarkGray),
                },
                RoleStyle {
                    label: Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    text: Style::default().fg(Color::DarkGray),
                    border: Style::default().fg(Color::Gray),
                },
            ],

            title_style: Style::default().fg(Color::DarkGray),
            pending_indicator_style: Style::default().fg(Color::Magenta),
            info_notice_style: Style::default().fg(Color::Blue),
            error_notice_style: Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),

            input_border_style: Style::default().fg(Color::Black),
            input_title_style: Style::default().fg(Color::DarkGray),
            input_text_style: Style::default().fg(Color::Black),
            input_placeholder_style: Style::default().fg(Color::Gray),

            picker_border_style: Style::default().fg(Color::Black),
            picker_item_style: Style::default().fg(Color::Black),
            picker_detail_style: Style::default().fg(Color::Gray),
            selection_highlight_style: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Resolve a theme by name; returns `None` for unknown names so callers
    /// can report them.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" | "default" => Some(Self::dark_default()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn role_style(&self, role: Role) -> &RoleStyle {
        &self.roles[role_index(role)]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

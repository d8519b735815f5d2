use crate::app::state::*;
use crate::ui::theme::Theme;
use crate::views::following::Focus;
use crate::views::mobile::Page;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

fn session_label(session: &Session) -> String {
    match (session.logged_in, &session.username) {
        (Some(true), Some(name)) => format!("logged in as {}", name),
        (Some(true), None) => "logged in".to_string(),
        (Some(false), _) => "not logged in".to_string(),
        (None, _) => "checking session".to_string(),
    }
}

fn focus_hint(state: &AppState) -> &'static str {
    match state.tab {
        Tab::Home => match state.pages.page {
            Page::Index => "↑↓ Enter",
            Page::Hours => "↑↓ day  ←→ hours  Enter save  Esc back",
            Page::RightNow | Page::Left | Page::Taken => "r refresh  Esc back",
            _ => "Tab next  Enter submit  Esc back",
        },
        Tab::Calendar => "Space range  Enter select  e event  l list  f following  PgUp/PgDn month",
        Tab::List => "Tab field  ↑↓ date  Enter filter  ^R reset  ^S sort  ^O order  PgUp/PgDn page",
        Tab::Following => match state.following.focus {
            Focus::Search => "Enter follow  Tab select/next",
            _ => "↑↓ row  Enter remove/restore  Tab next",
        },
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut parts: Vec<Span> = Vec::new();

    parts.push(Span::styled(
        format!(" [{}] ", session_label(&state.session)),
        Style::default().fg(Theme::ACCENT_GREEN).bg(Theme::BG_SURFACE),
    ));

    parts.push(Span::styled(format!(" {} ", state.tab.title()), Theme::status_bar()));

    if state.in_flight > 0 {
        parts.push(Span::styled(
            " | loading… ",
            Style::default().fg(Theme::ACCENT_AMBER).bg(Theme::BG_SURFACE),
        ));
    }

    let hint = focus_hint(state);
    // Pad to fill remaining space
    let used: usize = parts.iter().map(|s| s.width()).sum();
    let hint_width = unicode_width::UnicodeWidthStr::width(hint);
    let remaining = (area.width as usize).saturating_sub(used + hint_width + 2);
    parts.push(Span::styled(" ".repeat(remaining), Theme::status_bar()));
    parts.push(Span::styled(
        format!(" {} ", hint),
        Style::default().fg(Theme::ACCENT_TEAL).bg(Theme::BG_SURFACE),
    ));

    frame.render_widget(Paragraph::new(Line::from(parts)), area);
}

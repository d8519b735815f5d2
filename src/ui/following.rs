use crate::api::models::FollowingEntry;
use crate::app::state::AppState;
use crate::ui::field;
use crate::ui::theme::Theme;
use crate::views::following::{FollowingLists, Focus};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let following = &state.following;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(field::FIELD_HEIGHT), Constraint::Min(4)])
        .split(area);
    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);

    render_table(frame, tables[0], " Following ", &following.observed, following, Focus::Observed);
    render_table(frame, tables[1], " Not following ", &following.not_observed, following, Focus::NotObserved);

    field::render(
        frame,
        chunks[0],
        "Follow someone (name or email)",
        &following.search,
        following.focus == Focus::Search,
        &[],
    );

    if following.autocomplete.open && following.focus == Focus::Search {
        render_menu(frame, chunks[0], following);
    }
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[FollowingEntry],
    following: &FollowingLists,
    focus: Focus,
) {
    let focused = following.focus == focus;
    let block = Block::default()
        .title(title.to_string())
        .title_style(if focused { Theme::title() } else { Theme::border() })
        .borders(Borders::ALL)
        .border_type(if focused { Theme::border_type_focused() } else { Theme::border_type() })
        .border_style(if focused { Theme::border_focused() } else { Theme::border() });

    if !following.loaded {
        frame.render_widget(Paragraph::new(Span::styled("Loading…", Theme::dim())).block(block), area);
        return;
    }

    let action = if focus == Focus::Observed { "remove" } else { "restore" };
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let selected = focused && i == following.selected;
            let style = if selected { Theme::selected() } else { Theme::text() };
            let mut spans = vec![Span::styled(format!(" {}", entry.name), style)];
            if !entry.reason.is_empty() {
                spans.push(Span::styled(format!("  {}", entry.reason), Theme::dim()));
            }
            if selected {
                spans.push(Span::styled(format!("  [Enter {}]", action), Theme::key_hint()));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn render_menu(frame: &mut Frame, anchor: Rect, following: &FollowingLists) {
    let suggestions = &following.autocomplete.suggestions;
    let height = (suggestions.len() as u16 + 2).min(8);
    let area = frame.area();
    let y = anchor.bottom().min(area.bottom().saturating_sub(height));
    let menu_area = Rect::new(anchor.x + 1, y, anchor.width.saturating_sub(2).min(50), height);
    frame.render_widget(Clear, menu_area);

    let items: Vec<ListItem> = suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let style = if i == following.autocomplete.active { Theme::selected() } else { Theme::text() };
            ListItem::new(Span::styled(format!(" {}", s.label), style))
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border_focused())
        .style(Style::default().bg(Theme::BG_SURFACE));
    frame.render_widget(List::new(items).block(block), menu_area);
}

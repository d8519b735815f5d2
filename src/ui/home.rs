use crate::api::models::Absence;
use crate::app::state::AppState;
use crate::ui::field;
use crate::ui::theme::Theme;
use crate::views::mobile::{MobilePages, Page, Segment, NONE_AT_THE_MOMENT};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let pages = &state.pages;
    let block = Block::default()
        .title(format!(" {} ", pages.page.title()))
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match pages.page {
        Page::Index => render_menu(frame, inner, pages),
        Page::Login | Page::Settings | Page::Notify => render_form(frame, inner, pages),
        Page::Logout => {
            let lines = vec![
                Line::from("Press Enter to log out."),
                Line::from(Span::styled("Esc returns to the menu.", Theme::dim())),
            ];
            frame.render_widget(Paragraph::new(lines), inner);
        }
        Page::RightNow => render_right_now(frame, inner, pages),
        Page::Left => {
            let lines = match &pages.left {
                Some(segments) => vec![segments_line(segments)],
                None => vec![Line::from(Span::styled("Loading…", Theme::dim()))],
            };
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }
        Page::Taken => {
            let lines: Vec<Line> = match &pages.taken {
                Some(lines) => lines.iter().map(|l| Line::from(l.as_str())).collect(),
                None => vec![Line::from(Span::styled("Loading…", Theme::dim()))],
            };
            frame.render_widget(Paragraph::new(lines), inner);
        }
        Page::Hours => render_hours(frame, inner, pages),
    }
}

fn segments_line(segments: &[Segment]) -> Line<'_> {
    Line::from(
        segments
            .iter()
            .map(|s| {
                let style = if s.strong { Theme::strong() } else { Theme::text() };
                Span::styled(s.text.as_str(), style)
            })
            .collect::<Vec<_>>(),
    )
}

fn render_menu(frame: &mut Frame, area: Rect, pages: &MobilePages) {
    let lines: Vec<Line> = Page::MENU
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let style = if i == pages.menu { Theme::selected() } else { Theme::text() };
            Line::from(Span::styled(format!("  {:<20}", page.title()), style))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_form(frame: &mut Frame, area: Rect, pages: &MobilePages) {
    let mut y = area.y;
    let mut header: Vec<Line> = Vec::new();
    if pages.page == Page::Settings {
        if let Some(info) = &pages.settings.info {
            header.push(segments_line(info));
        }
    }
    for message in pages.form_messages() {
        header.push(Line::from(Span::styled(message, Theme::error())));
    }
    if !header.is_empty() {
        let height = (header.len() as u16).min(area.height);
        frame.render_widget(Paragraph::new(header), Rect::new(area.x, y, area.width, height));
        y += height + 1;
    }

    let errors = pages.errors();
    let focus = pages.focus();
    let width = area.width.min(50);
    for (i, (name, input)) in pages.inputs().into_iter().enumerate() {
        if y >= area.bottom() {
            break;
        }
        let messages = errors.map(|e| e.field(name)).unwrap_or(&[]);
        let rect = Rect::new(area.x, y, width, area.bottom() - y);
        y += field::render(frame, rect, &label(name), input, i == focus, messages);
    }
}

fn label(name: &str) -> String {
    let mut label = name.replace('_', " ");
    if let Some(first) = label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    label
}

fn absence_lines<'a>(title: &'a str, absences: Option<&'a [Absence]>) -> Vec<Line<'a>> {
    let mut lines = vec![Line::from(Span::styled(title, Theme::title()))];
    match absences {
        None => lines.push(Line::from(Span::styled("  Loading…", Theme::dim()))),
        Some([]) => lines.push(Line::from(Span::styled(format!("  {}", NONE_AT_THE_MOMENT), Theme::dim()))),
        Some(absences) => {
            for absence in absences {
                lines.push(Line::from(Span::styled(format!("  {}", absence.name), Theme::strong())));
                for description in &absence.descriptions {
                    lines.push(Line::from(format!("      {}", description)));
                }
            }
        }
    }
    lines
}

fn render_right_now(frame: &mut Frame, area: Rect, pages: &MobilePages) {
    let mut lines = absence_lines("Now", pages.now.as_deref());
    lines.push(Line::from(""));
    lines.extend(absence_lines("Upcoming", pages.upcoming.as_deref()));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_hours(frame: &mut Frame, area: Rect, pages: &MobilePages) {
    let mut lines: Vec<Line> = pages
        .form_messages()
        .into_iter()
        .map(|m| Line::from(Span::styled(m, Theme::error())))
        .collect();
    if pages.hours.days.is_empty() {
        lines.push(Line::from(Span::styled("Loading…", Theme::dim())));
    }
    for (i, day) in pages.hours.days.iter().enumerate() {
        let legend_style = if i == pages.hours.focus { Theme::tab_active() } else { Theme::text() };
        let mut spans = vec![Span::styled(format!("{:<32}", day.legend), legend_style)];
        for (j, option) in day.options.iter().enumerate() {
            let mark = if day.checked == Some(j) { "(•)" } else { "( )" };
            let style = if day.checked == Some(j) { Theme::strong() } else { Theme::dim() };
            spans.push(Span::styled(format!(" {} {} ", mark, option.label), style));
        }
        lines.push(Line::from(spans));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Enter saves the checked hours.", Theme::dim())));
    frame.render_widget(Paragraph::new(lines), area);
}

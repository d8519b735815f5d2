use crate::app::state::AppState;
use crate::ui::layout::centered;
use crate::ui::theme::Theme;
use crate::views::calendar::{CalendarView, GRID_DAYS};
use chrono::{Datelike, Duration};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Parse `#rgb` or `#rrggbb`; anything else falls back to a named color.
pub fn parse_color(text: &str) -> Option<Color> {
    let hex = text.trim().strip_prefix('#')?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::Rgb(rgb.next()??, rgb.next()??, rgb.next()??))
        }
        6 => Some(Color::Rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        _ => None,
    }
}

fn swatch_color(text: &str) -> Color {
    parse_color(text)
        .or_else(|| text.trim().parse::<Color>().ok())
        .unwrap_or(Theme::ACCENT_TEAL)
}

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let calendar = &state.calendar;
    let today = state.today();

    let title = format!(" {} ", calendar.month.format("%B %Y"));
    let block = Block::default()
        .title(title)
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Theme::border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let legend_height = if calendar.legend.is_some() { 3 } else { 0 };
    let events_height = 4u16.min(inner.height / 3);
    let grid_height = inner.height.saturating_sub(legend_height + events_height);
    let grid_area = Rect::new(inner.x, inner.y, inner.width, grid_height);
    let events_area = Rect::new(inner.x, inner.y + grid_height, inner.width, events_height);
    let legend_area = Rect::new(inner.x, events_area.bottom(), inner.width, legend_height);

    render_grid(frame, grid_area, calendar, today);
    render_day_events(frame, events_area, calendar);
    render_legend(frame, legend_area, calendar);

    if let Some(dialog) = &calendar.dialog {
        let popup = centered(area, 50, 30, 40, 7);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(" Edit ")
            .title_style(Theme::title())
            .borders(Borders::ALL)
            .border_type(Theme::border_type_focused())
            .border_style(Theme::border_focused())
            .style(Style::default().bg(Theme::BG_SURFACE));
        let lines = vec![
            Line::from(Span::styled(dialog.title.as_str(), Theme::strong())),
            Line::from(format!("{} – {}", dialog.start.format("%-d %b %Y"), dialog.end.format("%-d %b %Y"))),
            Line::from(Span::styled(dialog.link.as_str(), Theme::dim())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Enter", Theme::key_hint()),
                Span::styled(" edit hours  ", Theme::dim()),
                Span::styled("Esc", Theme::key_hint()),
                Span::styled(" close", Theme::dim()),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), popup);
    }
}

fn render_grid(frame: &mut Frame, area: Rect, calendar: &CalendarView, today: chrono::NaiveDate) {
    if area.height < 2 || area.width < 14 {
        return;
    }
    let cell_w = (area.width / 7).max(2);
    let start = calendar.grid_start();

    let header: Vec<Span> = (0..7)
        .map(|i| {
            let name = (start + Duration::days(i)).format("%a").to_string();
            Span::styled(format!("{:<width$}", name, width = cell_w as usize), Theme::dim())
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(header)), Rect::new(area.x, area.y, area.width, 1));

    let weeks = (GRID_DAYS / 7) as u16;
    let row_h = ((area.height - 1) / weeks).max(1);
    for (index, day) in calendar.visible_days().enumerate() {
        let (week, weekday) = ((index / 7) as u16, (index % 7) as u16);
        let y = area.y + 1 + week * row_h;
        if y >= area.bottom() {
            break;
        }
        let x = area.x + weekday * cell_w;
        let height = row_h.min(area.bottom() - y);
        let cell = Rect::new(x, y, cell_w, height);

        let mut style = if day.month() != calendar.month.month() {
            Theme::outside_month()
        } else if day == today {
            Theme::today()
        } else {
            Theme::text()
        };
        if calendar.in_selection(day) {
            style = style.patch(Theme::range());
        }
        if day == calendar.cursor {
            style = Theme::selected();
        }

        let mut lines = vec![Line::from(Span::styled(
            format!("{:>2}{}", day.day(), " ".repeat(cell_w.saturating_sub(2) as usize)),
            style,
        ))];
        for event in calendar.events_on(day).into_iter().take(height.saturating_sub(1) as usize) {
            let color = event.color.as_deref().map(swatch_color).unwrap_or(Theme::ACCENT_TEAL);
            let marker = if event.mine { "★" } else { "■" };
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(color)),
                Span::styled(event.title.as_str(), Theme::dim()),
            ]));
        }
        frame.render_widget(Paragraph::new(lines), cell);
    }
}

fn render_day_events(frame: &mut Frame, area: Rect, calendar: &CalendarView) {
    if area.height == 0 {
        return;
    }
    let events = calendar.events_on(calendar.cursor);
    let mut lines = vec![Line::from(Span::styled(
        calendar.cursor.format("%A %-d %B").to_string(),
        Theme::title(),
    ))];
    if calendar.loading {
        lines.push(Line::from(Span::styled("  Loading…", Theme::dim())));
    }
    for (i, event) in events.iter().enumerate() {
        let style = if i == calendar.event_focus && event.mine {
            Theme::selected()
        } else if i == calendar.event_focus {
            Theme::strong()
        } else {
            Theme::text()
        };
        let color = event.color.as_deref().map(swatch_color).unwrap_or(Theme::ACCENT_TEAL);
        lines.push(Line::from(vec![
            Span::styled("  ■ ", Style::default().fg(color)),
            Span::styled(event.title.as_str(), style),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_legend(frame: &mut Frame, area: Rect, calendar: &CalendarView) {
    let Some(legend) = &calendar.legend else {
        return;
    };
    let mut spans = vec![Span::styled(format!("{} ", legend.title), Theme::title())];
    for swatch in &legend.swatches {
        spans.push(Span::styled(
            format!(" {} ", swatch.name),
            Style::default().fg(Theme::BG_DARK).bg(swatch_color(&swatch.color)),
        ));
        spans.push(Span::raw(" "));
    }
    let lines = vec![
        Line::from(spans),
        Line::from(vec![
            Span::styled(legend.link_text, Theme::dim()),
            Span::styled(" (f)", Theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#f00"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(parse_color("#3366cc"), Some(Color::Rgb(0x33, 0x66, 0xcc)));
        assert_eq!(parse_color("red"), None);
        assert_eq!(parse_color("#12"), None);
        assert_eq!(swatch_color("red"), Color::Red);
    }
}

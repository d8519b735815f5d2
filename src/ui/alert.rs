use crate::ui::layout::centered;
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

/// Centered popup for a blocking alert.
pub fn render(frame: &mut Frame, text: &str) {
    let popup_area = centered(frame.area(), 50, 30, 40, 7);

    // Clear background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Alert ")
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type_focused())
        .border_style(Style::default().fg(Theme::ACCENT_RED))
        .style(Style::default().bg(Theme::BG_SURFACE));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);
    if inner.height < 2 {
        return;
    }

    let body = Rect::new(inner.x, inner.y, inner.width, inner.height - 1);
    frame.render_widget(
        Paragraph::new(text).style(Theme::text()).wrap(Wrap { trim: false }),
        body,
    );

    let help_area = Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1);
    let help = Line::from(vec![
        Span::styled(" Enter", Theme::key_hint()),
        Span::styled("/", Theme::dim()),
        Span::styled("Esc", Theme::key_hint()),
        Span::styled(" OK", Theme::dim()),
    ]);
    frame.render_widget(Paragraph::new(help), help_area);
}

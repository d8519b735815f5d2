use crate::ui::theme::Theme;
use crate::views::flash::{FlashBoard, FlashKind};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Newest banners at the bottom, fading ones dimmed.
pub fn render(frame: &mut Frame, area: Rect, flashes: &FlashBoard) {
    if area.height == 0 {
        return;
    }
    let visible = flashes.items.iter().rev().take(area.height as usize).collect::<Vec<_>>();
    let lines: Vec<Line> = visible
        .into_iter()
        .rev()
        .map(|flash| {
            let style = if flash.fading_since.is_some() {
                Theme::dim()
            } else {
                match flash.kind {
                    FlashKind::Success => Theme::success(),
                    FlashKind::Error => Theme::error(),
                    FlashKind::Info => Theme::text(),
                }
            };
            Line::from(vec![
                Span::styled(format!(" {} ", flash.text), style),
                Span::styled(" ^D ✕", Theme::dim()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

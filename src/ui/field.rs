use crate::ui::theme::Theme;
use crate::views::text_field::TextField;
use ratatui::prelude::*;
use ratatui::widgets::block::Padding;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Rows a bordered field takes, errors excluded.
pub const FIELD_HEIGHT: u16 = 3;

/// Render a bordered single-line input. Returns the rows used, including
/// one row per error message above the box.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    field: &TextField,
    focused: bool,
    errors: &[String],
) -> u16 {
    let mut y = area.y;
    for error in errors {
        if y >= area.bottom() {
            return y - area.y;
        }
        let line = Line::from(Span::styled(format!(" {}", error), Theme::error()));
        frame.render_widget(Paragraph::new(line), Rect::new(area.x, y, area.width, 1));
        y += 1;
    }
    if y + FIELD_HEIGHT > area.bottom() {
        return y - area.y;
    }
    let box_area = Rect::new(area.x, y, area.width, FIELD_HEIGHT);

    let (border_style, border_type, bg) = if focused {
        (
            Theme::border_focused(),
            Theme::border_type_focused(),
            Theme::panel_bg_focused(),
        )
    } else {
        (Theme::border(), Theme::border_type(), Theme::panel_bg())
    };

    let block = Block::default()
        .title(format!(" {} ", label))
        .title_style(if focused { Theme::title() } else { Theme::border() })
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .padding(Padding::horizontal(1))
        .style(bg);

    let inner = block.inner(box_area);
    frame.render_widget(block, box_area);
    frame.render_widget(Paragraph::new(field.display()).style(Theme::text()), inner);

    if focused && inner.width > 0 {
        let cursor_x = inner.x + field.cursor_column() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right() - 1), inner.y));
    }

    y + FIELD_HEIGHT - area.y
}

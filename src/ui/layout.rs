use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub struct AppLayout {
    pub tab_bar: Rect,
    pub content: Rect,
    pub flashes: Rect,
    pub status_bar: Rect,
}

pub fn compute_layout(area: Rect, flash_count: usize) -> AppLayout {
    let flash_height = flash_count.min(3) as u16;

    // Vertical: tabs | content | flash banners | status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Tab bar
            Constraint::Min(5),               // Main content
            Constraint::Length(flash_height), // Flash banners
            Constraint::Length(1),            // Status bar
        ])
        .split(area);

    AppLayout {
        tab_bar: chunks[0],
        content: chunks[1],
        flashes: chunks[2],
        status_bar: chunks[3],
    }
}

/// Popup rectangle centered in `area`, sized as a percentage with a minimum.
pub fn centered(area: Rect, width_pct: u16, height_pct: u16, min_w: u16, min_h: u16) -> Rect {
    let popup_w = (area.width * width_pct / 100)
        .max(min_w)
        .min(area.width.saturating_sub(4));
    let popup_h = (area.height * height_pct / 100)
        .max(min_h)
        .min(area.height.saturating_sub(2));
    let popup_x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    Rect::new(popup_x, popup_y, popup_w, popup_h)
}

/// Split a content area into a form column and a main panel.
pub fn sidebar(area: Rect, width: u16) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .spacing(1)
        .constraints([Constraint::Length(width), Constraint::Min(30)])
        .split(area);
    (chunks[0], chunks[1])
}

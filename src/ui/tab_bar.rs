use crate::app::state::{AppState, Tab};
use crate::ui::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

pub fn render(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::styled(" ptoterm ", Theme::title())];
    for tab in Tab::ALL {
        let style = if tab == state.tab {
            Theme::tab_active()
        } else {
            Theme::tab_inactive()
        };
        spans.push(Span::styled(format!(" F{} ", tab.key()), Theme::key_hint()));
        spans.push(Span::styled(format!("{} ", tab.title()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

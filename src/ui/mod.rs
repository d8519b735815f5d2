mod alert;
mod calendar;
mod field;
mod flash;
mod following;
mod home;
mod layout;
mod list;
mod status_bar;
mod tab_bar;
mod theme;

use crate::app::state::{AppState, Tab};
use ratatui::prelude::*;

pub fn render(frame: &mut Frame, state: &AppState) {
    let area = frame.area();
    let app_layout = layout::compute_layout(area, state.flashes.items.len());

    tab_bar::render(frame, app_layout.tab_bar, state);
    match state.tab {
        Tab::Home => home::render(frame, app_layout.content, state),
        Tab::Calendar => calendar::render(frame, app_layout.content, state),
        Tab::List => list::render(frame, app_layout.content, state),
        Tab::Following => following::render(frame, app_layout.content, state),
    }
    flash::render(frame, app_layout.flashes, &state.flashes);
    status_bar::render(frame, app_layout.status_bar, state);

    if let Some(text) = &state.alert {
        alert::render(frame, text);
    }
}

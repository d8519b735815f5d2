use crate::api::Reply;
use crossterm::event::Event as CrosstermEvent;

#[derive(Debug)]
pub enum AppEvent {
    /// Terminal input event
    Terminal(CrosstermEvent),

    /// Reply to a request issued by one of the views
    Api(Reply),

    /// Tick for UI refresh
    Tick,
}

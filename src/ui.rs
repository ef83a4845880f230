//! Ratatui front-end: the five library views, the add/remove dialogs and the
//! terminal event loop that drives them.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

mod controller;
mod event_handler;
mod input;
mod pipeline;
mod shortcuts;
mod state;

pub use controller::View;
pub use event_handler::handle_backend_event;
pub use input::{CountTier, MAX_TEXT_CHARS};
pub use pipeline::fetch_server_info;
pub use shortcuts::{shortcut_for, Shortcut};
pub use state::{AppState, BackendEvent};

use std::rc::Rc;

use super::state::{AppState, BackendEvent};

/// Apply an event delivered to the GTK main thread.
pub fn handle_backend_event(state: &Rc<AppState>, event: BackendEvent) {
    match event {
        BackendEvent::VoicesLoaded(voices) => {
            let preferred = state.config.borrow().voice.clone();
            state.controller.view().set_voices(&voices, &preferred);
        }
        BackendEvent::ModelStatusLoaded(status) => {
            let banner = &state.controller.view().widgets().model_banner;
            if status.model_loaded {
                log::info!(
                    "Server model loaded, {} voices ({})",
                    status.voices_available,
                    status.voices.join(", ")
                );
                banner.set_revealed(false);
            } else {
                log::warn!("Server reports the speech model is not loaded");
                banner.set_revealed(true);
            }
        }
        BackendEvent::PlaybackChanged(playing) => {
            state.controller.on_playback_changed(playing);
        }
    }
}

use std::cell::RefCell;

use super::controller::Controller;
use super::pipeline::RuntimeService;
use crate::client::{ModelStatus, SpeechClient};
use crate::config::Config;
use crate::ui::view::GtkView;

/// Shown when the server rejects a request without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate speech";

/// Why a generation attempt did not produce audio. Each variant renders as
/// the message shown in the error section.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    #[error("Please enter some text to convert")]
    EmptyInput,

    #[error("Text cannot exceed 500 characters")]
    TooLong,

    #[error("{0}")]
    ServerRejected(String),

    #[error("Network error, please check your connection and try again")]
    NetworkFailure,
}

/// Events delivered to the GTK main thread: server lookups finished on the
/// tokio runtime, or the media stream changed state on its own.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    VoicesLoaded(Vec<String>),
    ModelStatusLoaded(ModelStatus),
    PlaybackChanged(bool),
}

/// Visible mode of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Success,
    Error,
}

/// Result of the last successful generation. Overwritten, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub audio_url: Option<String>,
    pub filename: Option<String>,
}

/// Controller as wired to the real window and server.
pub type AppController = Controller<GtkView, RuntimeService>;

/// Central application state. Lives on the GTK main thread inside an `Rc`.
pub struct AppState {
    pub config: RefCell<Config>,
    pub tokio_rt: tokio::runtime::Runtime,
    pub client: SpeechClient,
    pub controller: AppController,
}

impl AppState {
    pub fn new(
        config: Config,
        client: SpeechClient,
        view: GtkView,
    ) -> Result<Self, std::io::Error> {
        let tokio_rt = tokio::runtime::Runtime::new()?;
        let service = RuntimeService::new(client.clone(), tokio_rt.handle().clone());

        Ok(Self {
            config: RefCell::new(config),
            tokio_rt,
            client,
            controller: Controller::new(view, service),
        })
    }

    /// Remember `voice` as the preselected voice for the next launch.
    pub fn remember_voice(&self, voice: &str) {
        let mut config = self.config.borrow_mut();
        if voice.is_empty() || config.voice == voice {
            return;
        }
        config.voice = voice.to_string();
        if let Err(e) = config.save() {
            log::warn!("Failed to save config: {e}");
        }
    }
}

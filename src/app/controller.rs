use std::cell::{Cell, RefCell};
use std::time::Duration;

use async_trait::async_trait;

use super::input::{self, CountTier};
use super::state::{GenerateError, Session, ViewState, GENERIC_FAILURE_MESSAGE};
use crate::client::{ClientError, GenerateReply, GenerateRequest, SpeechClient};

/// How long the success toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Widgets the controller reads from and renders into.
pub trait View {
    fn text(&self) -> String;
    fn voice(&self) -> String;
    fn set_char_count(&self, count: usize, tier: CountTier);
    /// Loading indicator, generate button sensitivity and label.
    fn set_loading(&self, loading: bool);
    /// Bind the player to `audio_url` and reveal the output section.
    fn show_output(&self, audio_url: &str);
    fn hide_output(&self);
    fn show_error(&self, message: &str);
    fn hide_error(&self);
    fn show_toast(&self, message: &str, timeout: Duration);
    /// Play if paused, pause if playing. Returns true when now playing.
    fn toggle_playback(&self) -> bool;
    fn set_play_label(&self, playing: bool);
    fn open_uri(&self, uri: &str);
}

/// The speech server as seen by the controller.
#[async_trait(?Send)]
pub trait SpeechService {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, ClientError>;
    /// Absolute URL for a server-supplied audio reference.
    fn resolve(&self, reference: &str) -> String;
    fn download_url(&self, filename: &str) -> Option<String>;
}

#[async_trait(?Send)]
impl SpeechService for SpeechClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateReply, ClientError> {
        SpeechClient::generate(self, &request).await
    }

    fn resolve(&self, reference: &str) -> String {
        match SpeechClient::resolve(self, reference) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::warn!("{e}");
                reference.to_string()
            }
        }
    }

    fn download_url(&self, filename: &str) -> Option<String> {
        SpeechClient::download_url(self, filename)
            .map_err(|e| log::warn!("{e}"))
            .ok()
            .map(String::from)
    }
}

/// Hides the loading state when dropped, whichever way generation exits.
struct LoadingGuard<'a, V: View> {
    view: &'a V,
    state: &'a Cell<ViewState>,
}

impl<V: View> Drop for LoadingGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_loading(false);
        if self.state.get() == ViewState::Loading {
            self.state.set(ViewState::Idle);
        }
    }
}

/// Turns user actions into generation requests and renders their outcome.
///
/// Lives on the UI thread behind an `Rc`; every method takes `&self` and no
/// borrow is held across an `.await`, so overlapping requests are allowed and
/// the last one to complete owns the visible state.
pub struct Controller<V, S> {
    view: V,
    service: S,
    state: Cell<ViewState>,
    session: RefCell<Session>,
}

impl<V: View, S: SpeechService> Controller<V, S> {
    pub fn new(view: V, service: S) -> Self {
        Self {
            view,
            service,
            state: Cell::new(ViewState::Idle),
            session: RefCell::new(Session::default()),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> ViewState {
        self.state.get()
    }

    #[cfg(test)]
    pub fn session(&self) -> Session {
        self.session.borrow().clone()
    }

    /// Player source for the last generated clip, resolved against the server.
    pub fn audio_source(&self) -> Option<String> {
        let session = self.session.borrow();
        session.audio_url.as_deref().map(|url| self.service.resolve(url))
    }

    pub fn on_input_changed(&self, text: &str) {
        let count = input::char_count(text);
        self.view.set_char_count(count, CountTier::for_count(count));
    }

    /// Validate the current input and, if it passes, generate speech for it.
    pub async fn on_generate_clicked(&self) -> Result<(), GenerateError> {
        let raw = self.view.text();
        let voice = self.view.voice();

        let text = match input::validate(&raw) {
            Ok(text) => text,
            Err(err) => {
                log::info!("Not generating: {err}");
                self.render_error(&err);
                return Err(err);
            }
        };

        self.generate_speech(text, &voice).await
    }

    pub async fn generate_speech(&self, text: &str, voice: &str) -> Result<(), GenerateError> {
        self.view.set_loading(true);
        self.state.set(ViewState::Loading);
        let _loading = LoadingGuard {
            view: &self.view,
            state: &self.state,
        };

        self.view.hide_error();
        self.view.hide_output();

        let request = GenerateRequest {
            text: text.to_string(),
            voice: voice.to_string(),
        };

        let outcome = match self.service.generate(request).await {
            Ok(GenerateReply::Generated {
                audio_url,
                filename,
                message,
            }) => {
                log::info!("Generated {filename}");
                self.render_success(audio_url, filename, &message);
                Ok(())
            }
            Ok(GenerateReply::Rejected { status, error }) => {
                log::warn!("Server rejected generation ({status}): {error:?}");
                let message = error
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
                Err(GenerateError::ServerRejected(message))
            }
            Err(e) => {
                log::error!("Speech generation failed: {e}");
                Err(GenerateError::NetworkFailure)
            }
        };

        if let Err(ref err) = outcome {
            self.render_error(err);
        }
        outcome
    }

    /// Open the download for the last generated file. Returns false when
    /// nothing has been generated yet.
    pub fn on_download_clicked(&self) -> bool {
        let Some(filename) = self.session.borrow().filename.clone() else {
            return false;
        };
        match self.service.download_url(&filename) {
            Some(url) => {
                log::info!("Opening download {url}");
                self.view.open_uri(&url);
                true
            }
            None => false,
        }
    }

    pub fn on_play_pause_clicked(&self) {
        let playing = self.view.toggle_playback();
        self.view.set_play_label(playing);
    }

    /// The player started, paused or ended on its own (media keys, end of stream).
    pub fn on_playback_changed(&self, playing: bool) {
        self.view.set_play_label(playing);
    }

    pub fn on_escape(&self) {
        self.view.hide_error();
        if self.state.get() == ViewState::Error {
            self.state.set(ViewState::Idle);
        }
    }

    fn render_success(&self, audio_url: String, filename: String, message: &str) {
        {
            let mut session = self.session.borrow_mut();
            session.audio_url = Some(audio_url);
            session.filename = Some(filename);
        }
        if let Some(source) = self.audio_source() {
            self.view.show_output(&source);
        }
        self.view.show_toast(message, TOAST_DURATION);
        self.state.set(ViewState::Success);
    }

    fn render_error(&self, err: &GenerateError) {
        self.view.show_error(&err.to_string());
        self.state.set(ViewState::Error);
    }
}

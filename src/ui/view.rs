use std::cell::RefCell;
use std::time::Duration;

use gtk4::glib;
use gtk4::prelude::*;

use super::window::{WindowWidgets, GENERATE_LABEL, GENERATING_LABEL, PAUSE_LABEL, PLAY_LABEL};
use crate::app::{BackendEvent, CountTier, View, MAX_TEXT_CHARS};

const TIER_CLASSES: [&str; 3] = ["dim-label", "warning", "error"];

fn voice_index(voices: &[String], current: &str, preferred: &str) -> usize {
    voices
        .iter()
        .position(|v| v == current)
        .or_else(|| voices.iter().position(|v| v == preferred))
        .unwrap_or(0)
}

/// New scroll offset that brings `top..bottom` on screen, or `None` when it
/// already is. The top edge wins when the widget is taller than the page.
fn scroll_target(top: f64, bottom: f64, value: f64, page: f64) -> Option<f64> {
    if top < value || bottom - top > page {
        Some(top)
    } else if bottom > value + page {
        Some(bottom - page)
    } else {
        None
    }
}

/// [`View`] over the GTK widgets of the main window.
pub struct GtkView {
    widgets: WindowWidgets,
    media: RefCell<Option<gtk4::MediaFile>>,
    events: async_channel::Sender<BackendEvent>,
}

impl GtkView {
    /// `events` receives playback changes coming from the media stream itself.
    pub fn new(widgets: WindowWidgets, events: async_channel::Sender<BackendEvent>) -> Self {
        Self {
            widgets,
            media: RefCell::new(None),
            events,
        }
    }

    pub fn widgets(&self) -> &WindowWidgets {
        &self.widgets
    }

    /// Replace the voice list. The current selection survives when the new
    /// list still offers it; otherwise `preferred`, then the first voice.
    pub fn set_voices(&self, voices: &[String], preferred: &str) {
        if voices.is_empty() {
            return;
        }
        let current = self.voice();
        let list = &self.widgets.voices;
        let items: Vec<&str> = voices.iter().map(String::as_str).collect();
        list.splice(0, list.n_items(), &items);

        let idx = voice_index(voices, &current, preferred);
        self.widgets.voice_dropdown.set_selected(idx as u32);
    }

    /// Scroll the page so `widget`, just made visible, is on screen.
    fn scroll_into_view(&self, widget: &impl IsA<gtk4::Widget>) {
        let scrolled = self.widgets.scrolled.clone();
        let widget = widget.clone().upcast::<gtk4::Widget>();
        // Wait for the next layout pass so the adjustment knows the new size.
        glib::idle_add_local_once(move || {
            let Some(content) = widget.parent() else {
                return;
            };
            let Some(bounds) = widget.compute_bounds(&content) else {
                return;
            };
            let adj = scrolled.vadjustment();
            let top = f64::from(bounds.y());
            let bottom = f64::from(bounds.y() + bounds.height());
            if let Some(value) = scroll_target(top, bottom, adj.value(), adj.page_size()) {
                adj.set_value(value);
            }
        });
    }

    fn stop_current_media(&self) {
        if let Some(media) = self.media.borrow_mut().take() {
            media.pause();
        }
    }
}

impl View for GtkView {
    fn text(&self) -> String {
        let buffer = self.widgets.text_view.buffer();
        let (start, end) = buffer.bounds();
        buffer.text(&start, &end, false).to_string()
    }

    fn voice(&self) -> String {
        self.widgets
            .voice_dropdown
            .selected_item()
            .and_downcast::<gtk4::StringObject>()
            .map(|s| s.string().to_string())
            .unwrap_or_default()
    }

    fn set_char_count(&self, count: usize, tier: CountTier) {
        let label = &self.widgets.char_count_label;
        label.set_text(&format!("{count} / {MAX_TEXT_CHARS}"));
        for class in TIER_CLASSES {
            label.remove_css_class(class);
        }
        label.add_css_class(tier.css_class());
    }

    fn set_loading(&self, loading: bool) {
        self.widgets.loading_box.set_visible(loading);
        self.widgets.spinner.set_spinning(loading);
        self.widgets.generate_button.set_sensitive(!loading);
        self.widgets
            .generate_button
            .set_label(if loading { GENERATING_LABEL } else { GENERATE_LABEL });
    }

    fn show_output(&self, audio_url: &str) {
        self.stop_current_media();

        let media = gtk4::MediaFile::for_file(&gtk4::gio::File::for_uri(audio_url));
        let tx = self.events.clone();
        media.connect_playing_notify(move |m| {
            let _ = tx.try_send(BackendEvent::PlaybackChanged(m.is_playing()));
        });
        let tx = self.events.clone();
        media.connect_ended_notify(move |m| {
            if m.is_ended() {
                let _ = tx.try_send(BackendEvent::PlaybackChanged(false));
            }
        });

        self.widgets.media_controls.set_media_stream(Some(&media));
        *self.media.borrow_mut() = Some(media);
        self.set_play_label(false);

        self.widgets.output_box.set_visible(true);
        self.scroll_into_view(&self.widgets.output_box);
    }

    fn hide_output(&self) {
        self.widgets.output_box.set_visible(false);
    }

    fn show_error(&self, message: &str) {
        self.widgets.error_label.set_text(message);
        self.widgets.error_box.set_visible(true);
        self.scroll_into_view(&self.widgets.error_box);
    }

    fn hide_error(&self) {
        self.widgets.error_box.set_visible(false);
    }

    fn show_toast(&self, message: &str, timeout: Duration) {
        let toast = libadwaita::Toast::new(message);
        toast.set_timeout(timeout.as_secs().max(1) as u32);
        self.widgets.toast_overlay.add_toast(toast);
    }

    fn toggle_playback(&self) -> bool {
        let media = self.media.borrow();
        let Some(media) = media.as_ref() else {
            return false;
        };
        if media.is_playing() {
            media.pause();
        } else {
            media.play();
        }
        // A stream that is not prepared yet ignores play().
        media.is_playing()
    }

    fn set_play_label(&self, playing: bool) {
        self.widgets
            .play_pause_button
            .set_label(if playing { PAUSE_LABEL } else { PLAY_LABEL });
    }

    fn open_uri(&self, uri: &str) {
        let launcher = gtk4::UriLauncher::new(uri);
        let uri = uri.to_string();
        launcher.launch(
            Some(&self.widgets.window),
            gtk4::gio::Cancellable::NONE,
            move |result| {
                if let Err(e) = result {
                    log::warn!("Could not open {uri}: {e}");
                }
            },
        );
    }
}

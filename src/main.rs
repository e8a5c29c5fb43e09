mod app;
mod client;
mod config;
mod ui;

use std::rc::Rc;

use gtk4::glib;
use gtk4::prelude::*;

use app::{AppState, BackendEvent, Shortcut, View};

fn main() {
    env_logger::init();
    log::info!("TTS Studio starting");

    let application = libadwaita::Application::builder()
        .application_id("io.github.ttsstudio.TtsStudio")
        .build();

    application.connect_startup(register_actions);
    application.connect_activate(on_activate);
    application.connect_shutdown(|_| log::info!("TTS Studio shutting down"));
    application.run();
}

fn register_actions(app: &libadwaita::Application) {
    let quit = gtk4::gio::ActionEntry::builder("quit")
        .activate(|app: &libadwaita::Application, _, _| app.quit())
        .build();
    let about = gtk4::gio::ActionEntry::builder("about")
        .activate(|app: &libadwaita::Application, _, _| {
            let about = libadwaita::AboutWindow::builder()
                .application_name("TTS Studio")
                .version(env!("CARGO_PKG_VERSION"))
                .comments(env!("CARGO_PKG_DESCRIPTION"))
                .license_type(gtk4::License::MitX11)
                .modal(true)
                .build();
            if let Some(parent) = app.active_window() {
                about.set_transient_for(Some(&parent));
            }
            about.present();
        })
        .build();
    app.add_action_entries([quit, about]);
    app.set_accels_for_action("app.quit", &["<Ctrl>q"]);
}

fn on_activate(app: &libadwaita::Application) {
    // Re-activation (e.g. launching a second instance) just raises the window.
    if let Some(window) = app.active_window() {
        window.present();
        return;
    }

    let config = config::Config::load();
    let client = match client::SpeechClient::new(&config.server_url) {
        Ok(client) => client,
        Err(e) => {
            log::error!("{e}; using {}", config::DEFAULT_SERVER_URL);
            match client::SpeechClient::new(config::DEFAULT_SERVER_URL) {
                Ok(client) => client,
                Err(e) => {
                    log::error!("Cannot build HTTP client: {e}");
                    return;
                }
            }
        }
    };
    log::info!("Using speech server {}", client.base_url());

    // UI-side and runtime-side events both land on the GTK main thread.
    let (backend_tx, backend_rx) = async_channel::unbounded::<BackendEvent>();

    let widgets = ui::window::build_window(
        app,
        client.base_url().as_str(),
        config::BUILTIN_VOICES,
        &config.voice,
    );
    let view = ui::view::GtkView::new(widgets.clone(), backend_tx.clone());

    let state = match AppState::new(config, client, view) {
        Ok(state) => Rc::new(state),
        Err(e) => {
            log::error!("Failed to create tokio runtime: {e}");
            return;
        }
    };

    // Character counter
    {
        let state_clone = state.clone();
        widgets.text_view.buffer().connect_changed(move |_| {
            let text = state_clone.controller.view().text();
            state_clone.controller.on_input_changed(&text);
        });
    }

    // Generate button
    {
        let state_clone = state.clone();
        widgets
            .generate_button
            .connect_clicked(move |_| spawn_generation(&state_clone));
    }

    // Download and play/pause
    {
        let state_clone = state.clone();
        widgets.download_button.connect_clicked(move |_| {
            if !state_clone.controller.on_download_clicked() {
                log::debug!("Download clicked before any audio was generated");
            }
        });
    }
    {
        let state_clone = state.clone();
        widgets
            .play_pause_button
            .connect_clicked(move |_| state_clone.controller.on_play_pause_clicked());
    }

    // Keyboard shortcuts. Capture phase so Ctrl+Enter never reaches the text view.
    {
        let state_clone = state.clone();
        let generate_button = widgets.generate_button.clone();
        let keys = gtk4::EventControllerKey::new();
        keys.set_propagation_phase(gtk4::PropagationPhase::Capture);
        keys.connect_key_pressed(move |_, key, _, modifiers| {
            match app::shortcut_for(key, modifiers) {
                Some(Shortcut::Generate) => {
                    // Same as a click: does nothing while the button is disabled.
                    if generate_button.is_sensitive() {
                        spawn_generation(&state_clone);
                    }
                    glib::Propagation::Stop
                }
                Some(Shortcut::DismissError) => {
                    state_clone.controller.on_escape();
                    glib::Propagation::Proceed
                }
                None => glib::Propagation::Proceed,
            }
        });
        widgets.window.add_controller(keys);
    }

    // Attach backend event handler
    {
        let state_clone = state.clone();
        glib::spawn_future_local(async move {
            while let Ok(event) = backend_rx.recv().await {
                app::handle_backend_event(&state_clone, event);
            }
        });
    }

    app::fetch_server_info(&state.tokio_rt, state.client.clone(), backend_tx);

    widgets.window.present();
    log::info!("Window ready");
}

/// Run one generation attempt on the main loop. Attempts are not serialized.
fn spawn_generation(state: &Rc<AppState>) {
    let voice = state.controller.view().voice();
    state.remember_voice(&voice);

    let state = state.clone();
    glib::spawn_future_local(async move {
        if let Err(e) = state.controller.on_generate_clicked().await {
            log::debug!(
                "Generation attempt ended with: {e} (view {:?})",
                state.controller.state()
            );
        }
    });
}

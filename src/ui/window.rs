use gtk4::prelude::*;
use libadwaita::prelude::*;

use crate::app::MAX_TEXT_CHARS;

pub const GENERATE_LABEL: &str = "Generate Speech";
pub const GENERATING_LABEL: &str = "Generating\u{2026}";
pub const PLAY_LABEL: &str = "Play";
pub const PAUSE_LABEL: &str = "Pause";

/// Handles returned from building the main window.
#[derive(Clone)]
pub struct WindowWidgets {
    pub window: libadwaita::ApplicationWindow,
    pub toast_overlay: libadwaita::ToastOverlay,
    pub model_banner: libadwaita::Banner,
    pub scrolled: gtk4::ScrolledWindow,
    pub text_view: gtk4::TextView,
    pub char_count_label: gtk4::Label,
    pub voices: gtk4::StringList,
    pub voice_dropdown: gtk4::DropDown,
    pub generate_button: gtk4::Button,
    pub loading_box: gtk4::Box,
    pub spinner: gtk4::Spinner,
    pub error_box: gtk4::Box,
    pub error_label: gtk4::Label,
    pub output_box: gtk4::Box,
    pub media_controls: gtk4::MediaControls,
    pub play_pause_button: gtk4::Button,
    pub download_button: gtk4::Button,
}

/// Build the main window. `voices` seeds the selector until the server answers.
pub fn build_window(
    app: &libadwaita::Application,
    server_url: &str,
    voices: &[&str],
    initial_voice: &str,
) -> WindowWidgets {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("TTS Studio")
        .default_width(560)
        .default_height(640)
        .build();

    let toast_overlay = libadwaita::ToastOverlay::new();
    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();

    let menu_button = gtk4::MenuButton::new();
    menu_button.set_icon_name("open-menu-symbolic");
    let menu = gtk4::gio::Menu::new();
    menu.append(Some("About TTS Studio"), Some("app.about"));
    menu.append(Some("Quit"), Some("app.quit"));
    menu_button.set_menu_model(Some(&menu));
    header.pack_end(&menu_button);

    toolbar_view.add_top_bar(&header);

    let model_banner = libadwaita::Banner::new(
        "The speech model is not loaded on the server. Generation will fail until it is installed.",
    );
    model_banner.set_revealed(false);
    toolbar_view.add_top_bar(&model_banner);

    let content = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    content.set_margin_start(16);
    content.set_margin_end(16);
    content.set_margin_top(12);
    content.set_margin_bottom(12);

    // --- Text group ---
    let text_group = libadwaita::PreferencesGroup::new();
    text_group.set_title("Text");
    text_group.set_description(Some(&format!("Server: {server_url}")));

    let text_view = gtk4::TextView::builder()
        .wrap_mode(gtk4::WrapMode::WordChar)
        .top_margin(8)
        .bottom_margin(8)
        .left_margin(8)
        .right_margin(8)
        .build();
    let text_frame = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .min_content_height(160)
        .child(&text_view)
        .build();
    text_frame.add_css_class("card");
    text_group.add(&text_frame);

    let char_count_label = gtk4::Label::new(Some(&format!("0 / {MAX_TEXT_CHARS}")));
    char_count_label.add_css_class("dim-label");
    char_count_label.add_css_class("numeric");
    char_count_label.set_halign(gtk4::Align::End);
    char_count_label.set_margin_top(4);
    text_group.add(&char_count_label);

    content.append(&text_group);

    // --- Voice group ---
    let voice_group = libadwaita::PreferencesGroup::new();
    voice_group.set_title("Voice");
    voice_group.set_margin_top(12);

    let voices_model = gtk4::StringList::new(voices);
    let voice_dropdown = gtk4::DropDown::builder()
        .model(&voices_model)
        .valign(gtk4::Align::Center)
        .build();
    if let Some(idx) = voices.iter().position(|v| *v == initial_voice) {
        voice_dropdown.set_selected(idx as u32);
    }
    let voice_row = libadwaita::ActionRow::builder().title("Speaker").build();
    voice_row.add_suffix(&voice_dropdown);
    voice_group.add(&voice_row);

    content.append(&voice_group);

    let generate_button = gtk4::Button::builder()
        .label(GENERATE_LABEL)
        .halign(gtk4::Align::Center)
        .margin_top(16)
        .tooltip_text("Ctrl+Enter")
        .build();
    generate_button.add_css_class("suggested-action");
    generate_button.add_css_class("pill");
    content.append(&generate_button);

    // --- Loading ---
    let loading_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    loading_box.set_halign(gtk4::Align::Center);
    loading_box.set_margin_top(16);
    let spinner = gtk4::Spinner::new();
    let loading_label = gtk4::Label::new(Some("Synthesizing speech\u{2026}"));
    loading_label.add_css_class("dim-label");
    loading_box.append(&spinner);
    loading_box.append(&loading_label);
    loading_box.set_visible(false);
    content.append(&loading_box);

    // --- Error ---
    let error_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    error_box.set_margin_top(16);
    error_box.add_css_class("card");
    let error_icon = gtk4::Image::from_icon_name("dialog-error-symbolic");
    error_icon.add_css_class("error");
    error_icon.set_margin_start(12);
    let error_label = gtk4::Label::new(None);
    error_label.add_css_class("error");
    error_label.set_wrap(true);
    error_label.set_xalign(0.0);
    error_label.set_margin_top(12);
    error_label.set_margin_bottom(12);
    error_label.set_margin_end(12);
    error_box.append(&error_icon);
    error_box.append(&error_label);
    error_box.set_visible(false);
    content.append(&error_box);

    // --- Output ---
    let output_group = libadwaita::PreferencesGroup::new();
    output_group.set_title("Result");

    let media_controls = gtk4::MediaControls::new(None::<&gtk4::MediaStream>);
    media_controls.set_hexpand(true);
    output_group.add(&media_controls);

    let buttons = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    buttons.set_halign(gtk4::Align::Center);
    buttons.set_margin_top(8);
    let play_pause_button = gtk4::Button::with_label(PLAY_LABEL);
    let download_button = gtk4::Button::with_label("Download");
    download_button.set_tooltip_text(Some("Open the audio file in your browser"));
    buttons.append(&play_pause_button);
    buttons.append(&download_button);
    output_group.add(&buttons);

    let output_box = gtk4::Box::new(gtk4::Orientation::Vertical, 0);
    output_box.set_margin_top(16);
    output_box.append(&output_group);
    output_box.set_visible(false);
    content.append(&output_box);

    // Assemble
    let scrolled = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .child(&content)
        .build();
    toolbar_view.set_content(Some(&scrolled));
    toast_overlay.set_child(Some(&toolbar_view));
    window.set_content(Some(&toast_overlay));

    WindowWidgets {
        window,
        toast_overlay,
        model_banner,
        scrolled,
        text_view,
        char_count_label,
        voices: voices_model,
        voice_dropdown,
        generate_button,
        loading_box,
        spinner,
        error_box,
        error_label,
        output_box,
        media_controls,
        play_pause_button,
        download_button,
    }
}

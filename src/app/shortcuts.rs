use gtk4::gdk;

/// Window-wide keyboard shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Ctrl+Enter or Cmd+Enter
    Generate,
    /// Escape
    DismissError,
}

pub fn shortcut_for(key: gdk::Key, modifiers: gdk::ModifierType) -> Option<Shortcut> {
    let primary = modifiers.intersects(
        gdk::ModifierType::CONTROL_MASK
            | gdk::ModifierType::META_MASK
            | gdk::ModifierType::SUPER_MASK,
    );

    let enter = [gdk::Key::Return, gdk::Key::KP_Enter, gdk::Key::ISO_Enter].contains(&key);

    if enter && primary {
        Some(Shortcut::Generate)
    } else if key == gdk::Key::Escape {
        Some(Shortcut::DismissError)
    } else {
        None
    }
}

//! Keyboard shortcut registry.

/// Editor commands reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    Undo,
    Redo,
    Delete,
    Copy,
    Cut,
    Paste,
    Duplicate,
    SelectAll,
    Group,
    Ungroup,
}

impl ShortcutAction {
    /// Whether the action must be suppressed while text is being edited,
    /// where the key belongs to the text field.
    pub fn yields_to_text_editing(&self) -> bool {
        matches!(self, ShortcutAction::Delete)
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    fn matches(&self, key: &str, ctrl: bool, shift: bool) -> bool {
        self.ctrl == ctrl && self.shift == shift && self.key.eq_ignore_ascii_case(key)
    }
}

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ctrl: false,
            shift: false,
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            ..Self::new(key)
        }
    }

    pub fn ctrl_shift(key: impl Into<String>) -> Self {
        Self {
            ctrl: true,
            shift: true,
            ..Self::new(key)
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new("Z", true, false, Undo, "Undo"),
            Shortcut::new("Z", true, true, Redo, "Redo"),
            Shortcut::new("Y", true, false, Redo, "Redo"),
            Shortcut::new("A", true, false, SelectAll, "Select all objects"),
            Shortcut::new("C", true, false, Copy, "Copy selection"),
            Shortcut::new("X", true, false, Cut, "Cut selection"),
            Shortcut::new("V", true, false, Paste, "Paste"),
            Shortcut::new("D", true, false, Duplicate, "Duplicate selection"),
            Shortcut::new("G", true, false, Group, "Group selected objects"),
            Shortcut::new("G", true, true, Ungroup, "Ungroup selected group"),
            Shortcut::new("Delete", false, false, Delete, "Delete selected objects"),
            Shortcut::new("Backspace", false, false, Delete, "Delete selected objects"),
        ]
    }

    /// Resolve a key press to its action.
    ///
    /// `editing_text` suppresses actions that would steal keys from an active
    /// text field.
    pub fn resolve(press: &KeyPress, editing_text: bool) -> Option<ShortcutAction> {
        let action = Self::all()
            .into_iter()
            .find(|s| s.matches(&press.key, press.ctrl, press.shift))?
            .action;
        if editing_text && action.yields_to_text_editing() {
            log::debug!("Ignoring {:?} while editing text", action);
            return None;
        }
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_undo_redo() {
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::ctrl("z"), false),
            Some(ShortcutAction::Undo)
        );
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::ctrl_shift("Z"), false),
            Some(ShortcutAction::Redo)
        );
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::ctrl("y"), false),
            Some(ShortcutAction::Redo)
        );
    }

    #[test]
    fn test_delete_ignored_while_editing_text() {
        for key in ["Delete", "Backspace"] {
            assert_eq!(
                ShortcutRegistry::resolve(&KeyPress::new(key), false),
                Some(ShortcutAction::Delete)
            );
            assert_eq!(ShortcutRegistry::resolve(&KeyPress::new(key), true), None);
        }
        // Clipboard keys still work
        assert_eq!(
            ShortcutRegistry::resolve(&KeyPress::ctrl("c"), true),
            Some(ShortcutAction::Copy)
        );
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::new("z"), false), None);
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::ctrl("q"), false), None);
    }

    #[test]
    fn test_format() {
        let redo = Shortcut::new("Z", true, true, ShortcutAction::Redo, "Redo");
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
    }
}

//! Keyboard shortcut registry and documentation.

use crate::input::Modifiers;
use serde::{Deserialize, Serialize};

/// Key that switches to pan mode while held (DOM `KeyboardEvent.key` value).
pub const PAN_KEY: &str = " ";

/// High-level command recognised from the keyboard.
///
/// Viewport undo/redo are handled by the engine itself. Everything else is
/// forwarded to the host, which owns the component data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Undo,
    Redo,
    Delete,
    SelectAll,
    Group,
    Ungroup,
    Cancel,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub intent: Intent,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        intent: Intent,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            intent,
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

    /// Whether a key press matches this shortcut. Ctrl and Cmd are interchangeable.
    pub fn matches(&self, key: &str, modifiers: Modifiers) -> bool {
        self.key.eq_ignore_ascii_case(key)
            && self.ctrl == modifiers.command()
            && self.shift == modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, Intent::Undo, "Undo viewport change"),
            Shortcut::new("Y", true, false, Intent::Redo, "Redo viewport change"),
            Shortcut::new("Z", true, true, Intent::Redo, "Redo viewport change"),
            Shortcut::new("A", true, false, Intent::SelectAll, "Select all components"),
            Shortcut::new("G", true, false, Intent::Group, "Group selected components"),
            Shortcut::new("G", true, true, Intent::Ungroup, "Ungroup selected components"),
            Shortcut::new("Delete", false, false, Intent::Delete, "Delete selected components"),
            Shortcut::new("Backspace", false, false, Intent::Delete, "Delete selected components"),
            Shortcut::new("Escape", false, false, Intent::Cancel, "Cancel current gesture"),
        ]
    }

    /// Resolve a key press to an intent.
    pub fn lookup(key: &str, modifiers: Modifiers) -> Option<Intent> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, modifiers))
            .map(|shortcut| shortcut.intent)
    }

    /// Log all shortcuts at debug level.
    pub fn log_all() {
        log::debug!("Keyboard shortcuts:");
        log::debug!("  {:20} Pan while held", "Space");
        for shortcut in Self::all() {
            log::debug!("  {:20} {}", shortcut.format(), shortcut.description);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_lookup() {
        assert_eq!(ShortcutRegistry::lookup("z", Modifiers::CTRL), Some(Intent::Undo));
        assert_eq!(ShortcutRegistry::lookup("y", Modifiers::CTRL), Some(Intent::Redo));
        let ctrl_shift = Modifiers { shift: true, ..Modifiers::CTRL };
        assert_eq!(ShortcutRegistry::lookup("Z", ctrl_shift), Some(Intent::Redo));
    }

    #[test]
    fn test_meta_acts_as_ctrl() {
        let cmd = Modifiers { meta: true, ..Modifiers::NONE };
        assert_eq!(ShortcutRegistry::lookup("a", cmd), Some(Intent::SelectAll));
    }

    #[test]
    fn test_group_ungroup() {
        assert_eq!(ShortcutRegistry::lookup("g", Modifiers::CTRL), Some(Intent::Group));
        let ctrl_shift = Modifiers { shift: true, ..Modifiers::CTRL };
        assert_eq!(ShortcutRegistry::lookup("G", ctrl_shift), Some(Intent::Ungroup));
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(ShortcutRegistry::lookup("Delete", Modifiers::NONE), Some(Intent::Delete));
        assert_eq!(ShortcutRegistry::lookup("Backspace", Modifiers::NONE), Some(Intent::Delete));
        assert_eq!(ShortcutRegistry::lookup("Escape", Modifiers::NONE), Some(Intent::Cancel));
    }

    #[test]
    fn test_unbound_keys() {
        assert_eq!(ShortcutRegistry::lookup("z", Modifiers::NONE), None);
        assert_eq!(ShortcutRegistry::lookup("q", Modifiers::CTRL), None);
        assert_eq!(ShortcutRegistry::lookup("Delete", Modifiers::CTRL), None);
    }

    #[test]
    fn test_format() {
        let shortcut = Shortcut::new("G", true, true, Intent::Ungroup, "Ungroup");
        assert_eq!(shortcut.format(), "Ctrl+Shift+G");
    }
}

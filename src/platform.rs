//! Platform-specific configuration

use crossterm::event::KeyModifiers;

/// Platform-appropriate modifier for wizard shortcuts
/// - macOS: SUPER (Cmd key), Ctrl is accepted as well
/// - Linux/Windows: CONTROL (Ctrl key)
#[cfg(target_os = "macos")]
pub const COMMAND_MODIFIER: KeyModifiers = KeyModifiers::SUPER;

#[cfg(not(target_os = "macos"))]
pub const COMMAND_MODIFIER: KeyModifiers = KeyModifiers::CONTROL;

/// Whether `modifiers` hold the command modifier of this platform
pub fn is_command(modifiers: KeyModifiers) -> bool {
    modifiers.contains(COMMAND_MODIFIER) || modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(target_os = "macos")]
pub const SUBMIT_SHORTCUT: &str = "Cmd+S";
#[cfg(not(target_os = "macos"))]
pub const SUBMIT_SHORTCUT: &str = "^S";

#[cfg(target_os = "macos")]
pub const DRAFT_SHORTCUT: &str = "Cmd+D";
#[cfg(not(target_os = "macos"))]
pub const DRAFT_SHORTCUT: &str = "^D";

#[cfg(target_os = "macos")]
pub const NEXT_SHORTCUT: &str = "Cmd+N";
#[cfg(not(target_os = "macos"))]
pub const NEXT_SHORTCUT: &str = "^N";

#[cfg(target_os = "macos")]
pub const BACK_SHORTCUT: &str = "Cmd+P";
#[cfg(not(target_os = "macos"))]
pub const BACK_SHORTCUT: &str = "^P";

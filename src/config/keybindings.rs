//! Keyboard bindings configuration.

use crate::model::key_action::KeyAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Maps keyboard events to domain actions.
///
/// Provides default vim-style bindings with option to override via configuration.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyEvent, KeyAction>,
}

impl KeyBindings {
    /// Look up the action for a key event.
    ///
    /// Shifted letters are matched with or without the SHIFT modifier, since
    /// terminals disagree on whether to report it.
    pub fn get(&self, key: KeyEvent) -> Option<KeyAction> {
        let key = KeyEvent::new(key.code, key.modifiers);
        if let Some(action) = self.bindings.get(&key) {
            return Some(*action);
        }
        match key.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                let toggled = key.modifiers ^ KeyModifiers::SHIFT;
                self.bindings.get(&KeyEvent::new(key.code, toggled)).copied()
            }
            _ => None,
        }
    }

    /// Bind `key` to `action`, replacing any previous binding.
    pub fn bind(&mut self, key: KeyEvent, action: KeyAction) {
        self.bindings.insert(key, action);
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut b = Self {
            bindings: HashMap::new(),
        };
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        let shift = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);

        // Feed navigation
        b.bind(plain(KeyCode::Char('j')), KeyAction::NextItem);
        b.bind(plain(KeyCode::Down), KeyAction::NextItem);
        b.bind(plain(KeyCode::PageDown), KeyAction::NextItem);
        b.bind(plain(KeyCode::Char('k')), KeyAction::PrevItem);
        b.bind(plain(KeyCode::Up), KeyAction::PrevItem);
        b.bind(plain(KeyCode::PageUp), KeyAction::PrevItem);

        // Playback
        b.bind(plain(KeyCode::Char(' ')), KeyAction::TogglePlay);
        b.bind(plain(KeyCode::Char('h')), KeyAction::SeekBackward);
        b.bind(plain(KeyCode::Left), KeyAction::SeekBackward);
        b.bind(plain(KeyCode::Char('l')), KeyAction::SeekForward);
        b.bind(plain(KeyCode::Right), KeyAction::SeekForward);
        b.bind(plain(KeyCode::Char('+')), KeyAction::VolumeUp);
        b.bind(plain(KeyCode::Char('=')), KeyAction::VolumeUp);
        b.bind(plain(KeyCode::Char('-')), KeyAction::VolumeDown);
        b.bind(plain(KeyCode::Char('m')), KeyAction::ToggleMute);

        // Side actions
        b.bind(shift('L'), KeyAction::Like);
        b.bind(plain(KeyCode::Char('c')), KeyAction::OpenComments);
        b.bind(shift('S'), KeyAction::OpenShare);
        b.bind(plain(KeyCode::Char('a')), KeyAction::ToggleAnalysis);
        for n in 1..=4u8 {
            b.bind(
                plain(KeyCode::Char(char::from(b'0' + n))),
                KeyAction::SelectAnalysis(n as usize),
            );
        }
        b.bind(plain(KeyCode::Char('f')), KeyAction::ToggleFollow);
        b.bind(plain(KeyCode::Esc), KeyAction::CloseOverlay);

        // Screens
        b.bind(plain(KeyCode::F(1)), KeyAction::TabHome);
        b.bind(plain(KeyCode::F(2)), KeyAction::TabFriends);
        b.bind(plain(KeyCode::F(3)), KeyAction::TabInbox);
        b.bind(plain(KeyCode::F(4)), KeyAction::TabProfile);
        b.bind(plain(KeyCode::Char('/')), KeyAction::OpenSearch);
        b.bind(plain(KeyCode::Char('n')), KeyAction::OpenCreate);
        b.bind(plain(KeyCode::Tab), KeyAction::ToggleFeedTab);
        b.bind(plain(KeyCode::Char(',')), KeyAction::OpenSettings);
        b.bind(shift('K'), KeyAction::EnterApiKey);

        // Application controls
        b.bind(plain(KeyCode::Char('q')), KeyAction::Quit);
        b.bind(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            KeyAction::Quit,
        );
        b.bind(plain(KeyCode::Char('?')), KeyAction::Help);

        b
    }
}

/// Key labels shown in the help overlay, grouped by section.
pub const HELP_SECTIONS: [(&str, &[(&str, &str)]); 4] = [
    (
        "Feed",
        &[
            ("j / ↓", "Next item"),
            ("k / ↑", "Previous item"),
            ("Tab", "For You / Following"),
            ("click ×2", "Like with a heart"),
        ],
    ),
    (
        "Playback",
        &[
            ("Space", "Play / pause"),
            ("h / l", "Seek 5s"),
            ("+ / -", "Volume"),
            ("m", "Mute"),
        ],
    ),
    (
        "Actions",
        &[
            ("L", "Like"),
            ("c", "Comments"),
            ("S", "Share"),
            ("a, 1-4", "AI analysis"),
            ("f", "Follow author"),
            ("Esc", "Close"),
        ],
    ),
    (
        "App",
        &[
            ("F1-F4", "Home / Friends / Inbox / Profile"),
            ("n", "Create"),
            ("/", "Search"),
            (",", "Settings (from Profile)"),
            ("K", "Enter API key"),
            ("q", "Quit"),
        ],
    ),
];

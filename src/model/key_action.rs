//! Domain-level keyboard actions independent of key bindings.

/// Domain-level actions that can be mapped to configurable key bindings.
///
/// These represent user intent, not specific keys. The mapping from
/// crossterm::event::KeyEvent to KeyAction is handled by KeyBindings.
/// Every tap target on the feed card has a keyboard equivalent here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Feed navigation
    /// Snap to the next feed item. Default: j/↓
    NextItem,
    /// Snap to the previous feed item. Default: k/↑
    PrevItem,

    // Playback
    /// Toggle play/pause on the current item. Default: Space
    TogglePlay,
    /// Seek 5 seconds back. Default: h/←
    SeekBackward,
    /// Seek 5 seconds forward. Default: l/→
    SeekForward,
    /// Raise volume by one slider step. Default: +/=
    VolumeUp,
    /// Lower volume by one slider step. Default: -
    VolumeDown,
    /// Toggle mute. Default: m
    ToggleMute,

    // Side actions
    /// Toggle like on the current item. Default: L/Shift+l
    Like,
    /// Open the comments sheet. Default: c
    OpenComments,
    /// Open the share sheet. Default: S/Shift+s
    OpenShare,
    /// Open or close the AI analysis drawer. Default: a
    ToggleAnalysis,
    /// Pick an analysis option (1-based) while the picker is open. Default: 1-4
    SelectAnalysis(usize),
    /// Follow/unfollow the current item's author. Default: f
    ToggleFollow,
    /// Close the top-most overlay or sheet. Default: Esc
    CloseOverlay,

    // Screens
    /// Home feed. Default: F1
    TabHome,
    /// Friends screen. Default: F2
    TabFriends,
    /// Inbox screen. Default: F3
    TabInbox,
    /// Profile screen. Default: F4
    TabProfile,
    /// Search screen. Default: /
    OpenSearch,
    /// Open the create flow. Default: n
    OpenCreate,
    /// Switch the home feed between For You and Following. Default: Tab
    ToggleFeedTab,
    /// Open settings from the profile screen. Default: ,
    OpenSettings,
    /// Enter a new API credential. Default: K/Shift+k
    EnterApiKey,

    // Application
    /// Exit the application. Default: q/Ctrl+c
    Quit,
    /// Show help overlay with keyboard shortcuts. Default: ?
    Help,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn select_analysis_variants_are_distinct() {
        let set: HashSet<KeyAction> = (1..=4).map(KeyAction::SelectAnalysis).collect();
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn actions_are_copy() {
        let action = KeyAction::TogglePlay;
        let copied = action;
        assert_eq!(action, copied);
    }
}

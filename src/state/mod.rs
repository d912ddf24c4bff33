//! UI state machine (pure).
//!
//! All state transitions are pure functions of the current `Instant`,
//! testable without a terminal.

pub mod app_state;
pub mod create_flow;
pub mod feed;
pub mod feed_card;
pub mod gesture;
pub mod overlay;
pub mod scheduler;
pub mod search;
pub mod transport;
pub mod visibility;

// Re-export for convenience
pub use app_state::{
    AppDeps, AppState, CardButton, Command, InputKey, NavTab, Screen, TapTarget,
};
pub use create_flow::{CreateFlow, CreateMode, FlowState};
pub use feed::{FeedTab, FeedView, MediaFactory};
pub use feed_card::{CardConfig, FeedCard};
pub use overlay::{AnalysisPanel, Overlay, Sheet};
pub use search::{SearchPhase, SearchQuery, SearchState};

//! Application state and transitions.
//!
//! AppState is the root state type containing all UI state. Transitions are
//! driven by the shell with the current `Instant`; side effects (network jobs,
//! credential changes) are queued as [`Command`]s and drained by the shell.

use super::create_flow::{CreateFlow, CreateMode, FlowState, Generated};
use super::feed::{with_created, with_follow_toggled, with_like, FeedTab, FeedView, MediaFactory};
use super::feed_card::{CardConfig, CardEvent, FeedCard};
use super::gesture::TapRegion;
use super::overlay::Sheet;
use super::scheduler::Scheduler;
use super::search::SearchState;
use crate::capture::{CaptureConstraints, CaptureDevice};
use crate::model::catalog::{initial_feed, SELF_AUTHOR_ID};
use crate::model::{KeyAction, VideoId, VideoItem};
use crate::service::{Job, JobOutcome};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How long the splash screen stays up.
pub const SPLASH_DURATION: Duration = Duration::from_millis(2500);

/// How long a notice toast stays up.
pub const NOTICE_DURATION: Duration = Duration::from_secs(3);

/// Seek step for keyboard seeking.
pub const SEEK_STEP_SECS: f64 = 5.0;

// ===== Navigation =====

/// Bottom navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTab {
    /// Video feed.
    Home,
    /// Friends placeholder.
    Friends,
    /// Opens the create modal.
    Create,
    /// Inbox placeholder.
    Inbox,
    /// Profile grid.
    Profile,
}

impl NavTab {
    /// Entries in display order.
    pub const ALL: [NavTab; 5] = [
        NavTab::Home,
        NavTab::Friends,
        NavTab::Create,
        NavTab::Inbox,
        NavTab::Profile,
    ];

    /// Nav bar label.
    pub fn label(self) -> &'static str {
        match self {
            NavTab::Home => "Home",
            NavTab::Friends => "Friends",
            NavTab::Create => "+",
            NavTab::Inbox => "Inbox",
            NavTab::Profile => "Profile",
        }
    }
}

/// Full-screen views. Create is a modal, not a screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Screen {
    /// Brand splash on launch.
    #[default]
    Splash,
    /// Snap-scroll feed.
    Home,
    /// Friends placeholder.
    Friends,
    /// Inbox placeholder.
    Inbox,
    /// Profile grid.
    Profile,
    /// Settings, reached from the profile.
    Settings,
    /// Grounded search.
    Search,
}

impl Screen {
    /// Which nav entry is highlighted for this screen.
    pub fn nav_tab(self) -> Option<NavTab> {
        match self {
            Screen::Home | Screen::Search => Some(NavTab::Home),
            Screen::Friends => Some(NavTab::Friends),
            Screen::Inbox => Some(NavTab::Inbox),
            Screen::Profile | Screen::Settings => Some(NavTab::Profile),
            Screen::Splash => None,
        }
    }
}

/// Side-rail and transport buttons on a feed card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardButton {
    /// Toggle like.
    Like,
    /// Open the comment sheet.
    Comments,
    /// Open the share sheet.
    Share,
    /// Toggle the analysis drawer.
    Analysis,
    /// Follow the author.
    Follow,
    /// Toggle playback.
    PlayPause,
    /// Toggle mute.
    Mute,
    /// One volume step up.
    VolumeUp,
    /// One volume step down.
    VolumeDown,
}

/// Hit-tested click targets, produced by the view's layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapTarget {
    /// Bare media surface, card-relative cell.
    CardMedia {
        /// Column from the card's left edge.
        x: u16,
        /// Row from the card's top edge.
        y: u16,
    },
    /// Scrubber, at a fraction of its width.
    Scrubber {
        /// `0.0` at the left end, `1.0` at the right.
        fraction: f64,
    },
    /// Volume bar, at a fraction of its width.
    VolumeSlider {
        /// Target volume in `0.0..=1.0`.
        fraction: f64,
    },
    /// Any other transport control cell (absorbs the tap).
    Controls,
    /// A side-rail or transport button.
    Button(CardButton),
    /// Inside a sheet or drawer body (absorbs the tap).
    SheetBody,
    /// Dimmed area around an open sheet.
    SheetBackdrop(Sheet),
    /// Entry of the analysis picker (0-based).
    AnalysisOption(usize),
    /// Bottom nav entry.
    Nav(NavTab),
    /// Following / For You switch.
    FeedTab(FeedTab),
    /// Search button in the top bar.
    OpenSearch,
    /// Suggested query (0-based).
    SearchSuggestion(usize),
    /// Clear the search box and answer.
    SearchClear,
    /// Create modal tab.
    CreateMode(CreateMode),
    /// Close the create modal.
    CreateClose,
    /// Record/stop, post, or generate, depending on flow state.
    CreatePrimary,
    /// Discard the reviewed clip.
    CreateDiscard,
    /// Cycle the image size.
    CreateImageSize,
    /// Open the credential prompt.
    SettingsApiKey,
    /// Leave the current secondary screen.
    Back,
}

impl TapTarget {
    /// Whether the target lies on the current feed card.
    pub fn is_on_card(&self) -> bool {
        matches!(
            self,
            TapTarget::CardMedia { .. }
                | TapTarget::Scrubber { .. }
                | TapTarget::VolumeSlider { .. }
                | TapTarget::Controls
                | TapTarget::Button(_)
                | TapTarget::SheetBody
                | TapTarget::SheetBackdrop(_)
                | TapTarget::AnalysisOption(_)
        )
    }
}

/// Raw key input for text fields and modals, independent of the terminal backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKey {
    /// Printable character.
    Char(char),
    /// Enter.
    Enter,
    /// Backspace.
    Backspace,
    /// Escape.
    Esc,
    /// Tab.
    Tab,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Any key with no text meaning.
    Other,
}

/// Side effects for the shell to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Hand a job to the runner.
    Run(Job),
    /// Cancel the running create-flow generation.
    CancelGeneration,
    /// Rebuild the service with a new credential.
    SetApiKey(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum AppTimer {
    Splash,
    Notice,
}

// ===== AppState =====

/// Application state.
///
/// # State Machine
///
/// - **Screen**: Splash → Home ⇄ {Friends, Inbox, Profile ⇄ Settings, Search}
/// - **Create modal**: `Some(CreateFlow)` while open; input goes to the modal
/// - **Credential prompt**: modal text field above everything else
/// - **Feed**: cards are mounted only while Home is visible without a modal
pub struct AppState {
    /// Visible screen.
    pub screen: Screen,
    items: Vec<VideoItem>,
    /// Items liked this session; restored onto cards when they remount.
    liked: HashSet<VideoId>,
    /// Home feed filter.
    pub feed_tab: FeedTab,
    feed: FeedView,
    media_factory: Box<MediaFactory>,
    capture_factory: Box<dyn Fn() -> Box<dyn CaptureDevice>>,
    create: Option<CreateFlow>,
    /// Search screen state.
    pub search: SearchState,
    /// Text being typed into the credential prompt, when open.
    credential_input: Option<String>,
    has_api_key: bool,
    /// Help overlay toggle.
    pub help_visible: bool,
    notice: Option<String>,
    timers: Scheduler<AppTimer>,
    commands: Vec<Command>,
    start_tab: NavTab,
    epoch_millis: i64,
    started: Instant,
    last_id_millis: i64,
    quit: bool,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("screen", &self.screen)
            .field("items", &self.items.len())
            .field("feed_tab", &self.feed_tab)
            .field("create", &self.create)
            .field("has_api_key", &self.has_api_key)
            .field("notice", &self.notice)
            .finish_non_exhaustive()
    }
}

/// Everything `AppState::new` needs from the shell.
pub struct AppDeps {
    /// Tunables for every mounted card.
    pub card_config: CardConfig,
    /// Builds the media element for a card.
    pub media_factory: Box<MediaFactory>,
    /// Opens the capture device for the create modal.
    pub capture_factory: Box<dyn Fn() -> Box<dyn CaptureDevice>>,
    /// Whether a credential is configured.
    pub has_api_key: bool,
    /// Wall-clock milliseconds at `now`, used to mint item ids.
    pub epoch_millis: i64,
    /// Where the splash screen leads.
    pub start_tab: NavTab,
}

impl AppState {
    /// Start on the splash screen with the seeded feed.
    pub fn new(deps: AppDeps, now: Instant) -> Self {
        let mut timers = Scheduler::new();
        timers.schedule(AppTimer::Splash, now, SPLASH_DURATION);
        Self {
            screen: Screen::Splash,
            items: initial_feed(),
            liked: HashSet::new(),
            feed_tab: FeedTab::default(),
            feed: FeedView::new(deps.card_config),
            media_factory: deps.media_factory,
            capture_factory: deps.capture_factory,
            create: None,
            search: SearchState::new(),
            credential_input: None,
            has_api_key: deps.has_api_key,
            help_visible: false,
            notice: None,
            timers,
            commands: Vec::new(),
            start_tab: deps.start_tab,
            epoch_millis: deps.epoch_millis,
            started: now,
            last_id_millis: 0,
            quit: false,
        }
    }

    // ===== Accessors =====

    /// Every item, newest first.
    pub fn items(&self) -> &[VideoItem] {
        &self.items
    }

    /// Item by id.
    pub fn item(&self, id: &VideoId) -> Option<&VideoItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Items shown under the current feed tab.
    pub fn visible_items(&self) -> Vec<&VideoItem> {
        self.items
            .iter()
            .filter(|item| self.feed_tab.includes(item))
            .collect()
    }

    /// Items created by the local user this session.
    pub fn own_items(&self) -> Vec<&VideoItem> {
        self.items
            .iter()
            .filter(|item| item.author.id.as_str() == SELF_AUTHOR_ID)
            .collect()
    }

    /// Mounted feed.
    pub fn feed(&self) -> &FeedView {
        &self.feed
    }

    /// Create modal, if open.
    pub fn create(&self) -> Option<&CreateFlow> {
        self.create.as_ref()
    }

    /// Credential prompt text, if the prompt is open.
    pub fn credential_input(&self) -> Option<&str> {
        self.credential_input.as_deref()
    }

    /// Whether a credential is configured.
    pub fn has_api_key(&self) -> bool {
        self.has_api_key
    }

    /// Active toast text.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Whether the shell should exit.
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Queued side effects, oldest first.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    // ===== Feed mounting =====

    fn feed_active(&self) -> bool {
        self.screen == Screen::Home && self.create.is_none()
    }

    /// Reconcile mounted cards with the item list and current screen.
    fn sync_feed(&mut self, now: Instant) {
        if !self.feed_active() {
            if !self.feed.is_empty() {
                self.feed.unmount_all(now);
            }
            return;
        }
        let visible: Vec<&VideoItem> = self
            .items
            .iter()
            .filter(|item| self.feed_tab.includes(item))
            .collect();
        self.feed.sync(&visible, self.media_factory.as_ref(), now);
        for id in &self.liked {
            if let Some(card) = self.feed.card_mut(id) {
                card.liked = true;
            }
        }
    }

    /// Whether `id` was liked this session.
    pub fn is_liked(&self, id: &VideoId) -> bool {
        self.liked.contains(id)
    }

    /// Rows available to one feed card; set by the shell from the frame size.
    pub fn set_card_height(&mut self, height: u16, now: Instant) {
        self.feed.set_card_height(height, now);
    }

    fn current_card_mut(&mut self) -> Option<&mut FeedCard> {
        if !self.feed_active() {
            return None;
        }
        self.feed.current_card_mut()
    }

    fn apply_card_event(&mut self, id: VideoId, event: CardEvent, now: Instant) {
        if let CardEvent::LikeChanged(liked) = event {
            if liked {
                self.liked.insert(id.clone());
            } else {
                self.liked.remove(&id);
            }
            self.items = with_like(&self.items, &id, liked);
            self.sync_feed(now);
        }
    }

    // ===== Screens =====

    /// Switch screens, remounting or tearing down the feed.
    pub fn show_screen(&mut self, screen: Screen, now: Instant) {
        if self.screen == screen {
            return;
        }
        debug!(from = ?self.screen, to = ?screen, "screen change");
        self.timers.cancel(AppTimer::Splash);
        self.screen = screen;
        self.sync_feed(now);
    }

    /// Leave the splash for the configured start tab.
    pub fn dismiss_splash(&mut self, now: Instant) {
        if self.screen == Screen::Splash {
            self.show_screen(Screen::Home, now);
            self.select_nav(self.start_tab, now);
        }
    }

    /// Act on a nav entry. Create opens the modal.
    pub fn select_nav(&mut self, tab: NavTab, now: Instant) {
        match tab {
            NavTab::Home => self.show_screen(Screen::Home, now),
            NavTab::Friends => self.show_screen(Screen::Friends, now),
            NavTab::Create => self.open_create(now),
            NavTab::Inbox => self.show_screen(Screen::Inbox, now),
            NavTab::Profile => self.show_screen(Screen::Profile, now),
        }
    }

    /// Switch feed filter and remount cards.
    pub fn set_feed_tab(&mut self, tab: FeedTab, now: Instant) {
        if self.feed_tab != tab {
            self.feed_tab = tab;
            self.sync_feed(now);
        }
    }

    fn back(&mut self, now: Instant) {
        match self.screen {
            Screen::Settings => self.show_screen(Screen::Profile, now),
            Screen::Search => self.show_screen(Screen::Home, now),
            _ => {}
        }
    }

    /// Show a toast for `NOTICE_DURATION`.
    pub fn set_notice(&mut self, text: impl Into<String>, now: Instant) {
        self.notice = Some(text.into());
        self.timers.schedule(AppTimer::Notice, now, NOTICE_DURATION);
    }

    // ===== Credential prompt =====

    /// Open the credential prompt with an empty field.
    pub fn open_credential_prompt(&mut self) {
        if self.credential_input.is_none() {
            info!("credential prompt opened");
            self.credential_input = Some(String::new());
        }
    }

    fn submit_credential(&mut self, now: Instant) {
        let Some(input) = self.credential_input.take() else {
            return;
        };
        let key = input.trim().to_string();
        if key.is_empty() {
            return;
        }
        self.has_api_key = true;
        self.commands.push(Command::SetApiKey(key));
        self.set_notice("API key saved for this session", now);
    }

    // ===== Create flow =====

    /// Open the create modal, pausing the feed.
    pub fn open_create(&mut self, now: Instant) {
        if self.create.is_some() {
            return;
        }
        let device = (self.capture_factory)();
        self.create = Some(CreateFlow::open(device, CaptureConstraints::default()));
        self.sync_feed(now);
    }

    fn close_create(&mut self, now: Instant) {
        let Some(flow) = self.create.as_mut() else {
            return;
        };
        match flow.close() {
            Ok(()) => {
                self.create = None;
                self.sync_feed(now);
            }
            Err(e) => self.set_notice(e.to_string(), now),
        }
    }

    fn next_item_id(&mut self, now: Instant) -> VideoId {
        let elapsed = now.saturating_duration_since(self.started).as_millis() as i64;
        let millis = (self.epoch_millis + elapsed).max(self.last_id_millis + 1);
        self.last_id_millis = millis;
        VideoId::from_timestamp(millis)
    }

    /// Put a created item on top of the feed, close the modal and go Home.
    fn publish(&mut self, item: VideoItem, now: Instant) {
        info!(item = %item.id, "item created");
        self.items = with_created(&self.items, item);
        self.create = None;
        self.screen = Screen::Home;
        self.feed_tab = FeedTab::ForYou;
        self.feed.unmount_all(now);
        self.sync_feed(now);
    }

    fn create_primary(&mut self, now: Instant) {
        let id = self.next_item_id(now);
        let has_key = self.has_api_key;
        let Some(flow) = self.create.as_mut() else {
            return;
        };
        let result = match flow.state() {
            FlowState::CameraLive { .. } => flow.start_recording(now),
            FlowState::Recording { .. } => flow.stop_recording(now),
            FlowState::Review { .. } => match flow.post(id) {
                Ok(item) => {
                    self.publish(item, now);
                    return;
                }
                Err(e) => Err(e),
            },
            FlowState::PromptEntry { .. } => match flow.submit(has_key, now) {
                Ok(Some(request)) => {
                    let job = match request.mode {
                        CreateMode::Image => Job::Image {
                            ticket: request.ticket,
                            prompt: request.prompt,
                            size: request.image_size,
                        },
                        _ => Job::Video {
                            ticket: request.ticket,
                            prompt: request.prompt,
                        },
                    };
                    self.commands.push(Command::Run(job));
                    Ok(())
                }
                Ok(None) => {
                    if flow.take_credential_request() {
                        self.open_credential_prompt();
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
            FlowState::Generating { .. } | FlowState::Closed => Ok(()),
        };
        if let Err(e) = result {
            self.set_notice(e.to_string(), now);
        }
    }

    fn create_discard(&mut self, now: Instant) {
        let Some(flow) = self.create.as_mut() else {
            return;
        };
        if let Err(e) = flow.discard() {
            self.set_notice(e.to_string(), now);
        }
    }

    fn create_mode(&mut self, mode: CreateMode, now: Instant) {
        let Some(flow) = self.create.as_mut() else {
            return;
        };
        if let Err(e) = flow.set_mode(mode) {
            self.set_notice(e.to_string(), now);
        }
    }

    fn create_cycle_mode(&mut self, now: Instant) {
        let Some(flow) = self.create.as_ref() else {
            return;
        };
        let next = match flow.mode() {
            CreateMode::Camera => CreateMode::Video,
            CreateMode::Video => CreateMode::Image,
            CreateMode::Image => CreateMode::Camera,
        };
        self.create_mode(next, now);
    }

    /// Esc inside the modal: cancel generation, or discard-and-close.
    fn create_escape(&mut self, now: Instant) {
        let Some(flow) = self.create.as_mut() else {
            return;
        };
        match flow.state() {
            FlowState::Generating { .. } => {
                if flow.cancel_generation().is_ok() {
                    self.commands.push(Command::CancelGeneration);
                }
            }
            FlowState::Recording { .. } => {
                self.set_notice("Stop recording before closing", now);
            }
            _ => self.close_create(now),
        }
    }

    // ===== Card actions =====

    fn card_button(&mut self, button: CardButton, now: Instant) {
        let Some(card) = self.current_card_mut() else {
            return;
        };
        let id = card.item_id().clone();
        match button {
            CardButton::Like => {
                let event = card.toggle_like();
                self.apply_card_event(id, event, now);
            }
            CardButton::Comments => card.open_sheet(Sheet::Comments),
            CardButton::Share => card.open_sheet(Sheet::Share),
            CardButton::Analysis => card.toggle_analysis(),
            CardButton::Follow => {
                if let Some(author) = self.item(&id).map(|item| item.author.id.clone()) {
                    self.items = with_follow_toggled(&self.items, &author);
                    self.sync_feed(now);
                }
            }
            CardButton::PlayPause => card.toggle_play(now),
            CardButton::Mute => card.toggle_mute(now),
            CardButton::VolumeUp => card.step_volume(1, now),
            CardButton::VolumeDown => card.step_volume(-1, now),
        }
    }

    fn select_analysis(&mut self, index: usize) {
        let Some(card) = self.current_card_mut() else {
            return;
        };
        let id = card.item_id().clone();
        let Some(request) = card.select_analysis(index) else {
            return;
        };
        let Some(item) = self.item(&id) else {
            return;
        };
        let job = Job::Analyze {
            item: id,
            option_id: request.option.id,
            media_uri: item.media.display_uri(),
            prompt: request.option.prompt,
        };
        self.commands.push(Command::Run(job));
    }

    /// Mouse wheel over the feed.
    pub fn scroll_feed(&mut self, rows: i32, now: Instant) {
        if self.feed_active() {
            self.feed.scroll_rows(rows, now);
        }
    }

    // ===== Input =====

    /// Offer a raw key to whichever text field or modal owns input.
    /// Returns whether it was consumed.
    pub fn handle_input(&mut self, key: InputKey, now: Instant) -> bool {
        if self.screen == Screen::Splash {
            self.dismiss_splash(now);
            return true;
        }
        if let Some(input) = self.credential_input.as_mut() {
            match key {
                InputKey::Char(c) => input.push(c),
                InputKey::Backspace => {
                    input.pop();
                }
                InputKey::Enter => self.submit_credential(now),
                InputKey::Esc => self.credential_input = None,
                _ => {}
            }
            return true;
        }
        if self.help_visible {
            if matches!(key, InputKey::Esc | InputKey::Char('?') | InputKey::Char('q')) {
                self.help_visible = false;
            }
            return true;
        }
        if self.create.is_some() {
            self.create_input(key, now);
            return true;
        }
        if self.screen == Screen::Search {
            return self.search_input(key, now);
        }
        false
    }

    fn create_input(&mut self, key: InputKey, now: Instant) {
        let Some(flow) = self.create.as_mut() else {
            return;
        };
        let in_prompt = matches!(flow.state(), FlowState::PromptEntry { .. });
        match key {
            InputKey::Esc => self.create_escape(now),
            InputKey::Enter => self.create_primary(now),
            InputKey::Tab => self.create_cycle_mode(now),
            InputKey::Char(c) if in_prompt => flow.push_prompt_char(c),
            InputKey::Backspace if in_prompt => flow.pop_prompt_char(),
            InputKey::Up | InputKey::Down if in_prompt => flow.cycle_image_size(),
            InputKey::Char(' ') => self.create_primary(now),
            InputKey::Char('d') | InputKey::Char('x') => self.create_discard(now),
            _ => {}
        }
    }

    fn search_input(&mut self, key: InputKey, now: Instant) -> bool {
        match key {
            InputKey::Char(c) => self.search.push_char(c),
            InputKey::Backspace => self.search.pop_char(),
            InputKey::Up => self.search.move_highlight(-1),
            InputKey::Down => self.search.move_highlight(1),
            InputKey::Enter => self.submit_search(None, now),
            InputKey::Esc => {
                if self.search.input().is_empty() {
                    self.show_screen(Screen::Home, now);
                } else {
                    self.search.clear();
                }
            }
            InputKey::Tab | InputKey::Other => return false,
        }
        true
    }

    fn submit_search(&mut self, suggestion: Option<usize>, now: Instant) {
        let query = match suggestion {
            Some(index) => self.search.select_suggestion(index, now),
            None => self.search.submit(now),
        };
        if let Some(query) = query {
            self.commands.push(Command::Run(Job::Search {
                query: query.as_str().to_string(),
            }));
        }
    }

    /// Apply a bound key action.
    pub fn handle_action(&mut self, action: KeyAction, now: Instant) {
        match action {
            KeyAction::Quit => self.quit = true,
            KeyAction::Help => self.help_visible = !self.help_visible,
            KeyAction::TabHome => self.select_nav(NavTab::Home, now),
            KeyAction::TabFriends => self.select_nav(NavTab::Friends, now),
            KeyAction::TabInbox => self.select_nav(NavTab::Inbox, now),
            KeyAction::TabProfile => self.select_nav(NavTab::Profile, now),
            KeyAction::OpenCreate => self.open_create(now),
            KeyAction::OpenSearch => self.show_screen(Screen::Search, now),
            KeyAction::OpenSettings => {
                if self.screen == Screen::Profile {
                    self.show_screen(Screen::Settings, now);
                }
            }
            KeyAction::EnterApiKey => self.open_credential_prompt(),
            KeyAction::ToggleFeedTab => {
                if self.screen == Screen::Home {
                    self.set_feed_tab(self.feed_tab.toggled(), now);
                }
            }
            KeyAction::NextItem => {
                if self.feed_active() {
                    self.feed.next(now);
                }
            }
            KeyAction::PrevItem => {
                if self.feed_active() {
                    self.feed.prev(now);
                }
            }
            KeyAction::TogglePlay => self.card_button(CardButton::PlayPause, now),
            KeyAction::SeekBackward => {
                if let Some(card) = self.current_card_mut() {
                    card.seek_by(-SEEK_STEP_SECS, now);
                }
            }
            KeyAction::SeekForward => {
                if let Some(card) = self.current_card_mut() {
                    card.seek_by(SEEK_STEP_SECS, now);
                }
            }
            KeyAction::VolumeUp => self.card_button(CardButton::VolumeUp, now),
            KeyAction::VolumeDown => self.card_button(CardButton::VolumeDown, now),
            KeyAction::ToggleMute => self.card_button(CardButton::Mute, now),
            KeyAction::Like => self.card_button(CardButton::Like, now),
            KeyAction::OpenComments => self.card_button(CardButton::Comments, now),
            KeyAction::OpenShare => self.card_button(CardButton::Share, now),
            KeyAction::ToggleAnalysis => self.card_button(CardButton::Analysis, now),
            KeyAction::ToggleFollow => self.card_button(CardButton::Follow, now),
            KeyAction::SelectAnalysis(n) => self.select_analysis(n.saturating_sub(1)),
            KeyAction::CloseOverlay => {
                let closed = match self.current_card_mut() {
                    Some(card) if card.overlay.is_open() => {
                        card.overlay.close();
                        true
                    }
                    _ => false,
                };
                if !closed {
                    self.back(now);
                }
            }
        }
    }

    /// Apply a click on a hit-tested target.
    pub fn tap(&mut self, target: TapTarget, now: Instant) {
        if self.screen == Screen::Splash {
            self.dismiss_splash(now);
            return;
        }
        match target {
            TapTarget::CardMedia { x, y } => self.tap_card(x, y, TapRegion::Media, now),
            TapTarget::Controls => self.tap_card(0, 0, TapRegion::Controls, now),
            TapTarget::SheetBody => self.tap_card(0, 0, TapRegion::Sheet, now),
            TapTarget::Scrubber { fraction } => {
                if let Some(card) = self.current_card_mut() {
                    let target = card.playback.duration * fraction.clamp(0.0, 1.0);
                    card.seek(target, now);
                }
            }
            TapTarget::VolumeSlider { fraction } => {
                if let Some(card) = self.current_card_mut() {
                    card.set_volume(fraction as f32, now);
                }
            }
            TapTarget::Button(button) => {
                self.tap_card(0, 0, TapRegion::SideActions, now);
                self.card_button(button, now);
            }
            TapTarget::SheetBackdrop(sheet) => {
                if let Some(card) = self.current_card_mut() {
                    card.close_sheet(sheet);
                }
            }
            TapTarget::AnalysisOption(index) => self.select_analysis(index),
            TapTarget::Nav(tab) => self.select_nav(tab, now),
            TapTarget::FeedTab(tab) => self.set_feed_tab(tab, now),
            TapTarget::OpenSearch => self.show_screen(Screen::Search, now),
            TapTarget::SearchSuggestion(index) => self.submit_search(Some(index), now),
            TapTarget::SearchClear => self.search.clear(),
            TapTarget::CreateMode(mode) => self.create_mode(mode, now),
            TapTarget::CreateClose => self.create_escape(now),
            TapTarget::CreatePrimary => self.create_primary(now),
            TapTarget::CreateDiscard => self.create_discard(now),
            TapTarget::CreateImageSize => {
                if let Some(flow) = self.create.as_mut() {
                    flow.cycle_image_size();
                }
            }
            TapTarget::SettingsApiKey => self.open_credential_prompt(),
            TapTarget::Back => self.back(now),
        }
    }

    /// Pointer moved to `target`. Movement over a card keeps its controls up.
    pub fn pointer_moved(&mut self, target: Option<TapTarget>, now: Instant) {
        if !target.is_some_and(|t| t.is_on_card()) {
            return;
        }
        if let Some(card) = self.current_card_mut() {
            card.touch_controls(now);
        }
    }

    /// Left-button drag over `target`. Only the sliders follow a drag.
    pub fn drag(&mut self, target: TapTarget, now: Instant) {
        match target {
            TapTarget::Scrubber { .. } | TapTarget::VolumeSlider { .. } => self.tap(target, now),
            other => self.pointer_moved(Some(other), now),
        }
    }

    /// Taps in excluded regions still reach the interpreter so it can ignore them.
    fn tap_card(&mut self, x: u16, y: u16, region: TapRegion, now: Instant) {
        let Some(card) = self.current_card_mut() else {
            return;
        };
        let id = card.item_id().clone();
        let event = card.tap(now, x, y, region);
        self.apply_card_event(id, event, now);
    }

    // ===== Job outcomes =====

    /// Route a finished job to whoever asked for it. Stale results are dropped.
    pub fn apply_outcome(&mut self, outcome: JobOutcome, now: Instant) {
        match outcome {
            JobOutcome::Analysis {
                item,
                option_id,
                result,
            } => {
                let result = result.map_err(|e| {
                    warn!(error = %e, "analysis failed");
                    e.to_string()
                });
                if let Some(card) = self.feed.card_mut(&item) {
                    card.complete_analysis(option_id, result);
                }
            }
            JobOutcome::Search { query, result } => self.search.complete(&query, result),
            JobOutcome::Image { ticket, result, .. } => {
                let result = result.map(|data_uri| Generated::Image { data_uri });
                self.complete_generation(ticket, result, now);
            }
            JobOutcome::Video { ticket, result, .. } => {
                let result = result.map(|(caption, uri)| Generated::Video { caption, uri });
                self.complete_generation(ticket, result, now);
            }
        }
    }

    fn complete_generation(
        &mut self,
        ticket: u64,
        result: Result<Generated, crate::model::GenerationError>,
        now: Instant,
    ) {
        let id = self.next_item_id(now);
        let Some(flow) = self.create.as_mut() else {
            debug!(ticket, "generation finished after the modal closed");
            return;
        };
        match flow.complete_generation(ticket, result, id) {
            Some(item) => self.publish(item, now),
            None => {
                if flow.take_credential_request() {
                    self.open_credential_prompt();
                }
            }
        }
    }

    // ===== Timers =====

    /// Fire due timers across screens, feed and modal.
    pub fn tick(&mut self, now: Instant) {
        for timer in self.timers.take_due(now) {
            match timer {
                AppTimer::Splash => self.dismiss_splash(now),
                AppTimer::Notice => self.notice = None,
            }
        }
        self.feed.tick(now);
        if let Some(flow) = self.create.as_mut() {
            flow.tick(now);
        }
        self.search.tick(now);
    }

    /// Earliest pending deadline anywhere in the app.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.timers.next_deadline(),
            self.feed.next_deadline(),
            self.create.as_ref().and_then(CreateFlow::next_deadline),
            self.search.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Unmount everything before exit.
    pub fn shutdown(&mut self, now: Instant) {
        self.feed.unmount_all(now);
        if let Some(flow) = self.create.as_mut() {
            if flow.state().is_busy() {
                self.commands.push(Command::CancelGeneration);
            }
        }
        self.create = None;
    }
}

#[cfg(test)]
#[path = "app_state_tests.rs"]
mod tests;

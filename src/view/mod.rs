//! TUI rendering and terminal management (impure shell)

mod create_modal;
mod feed_pane;
mod help;
pub mod hit_map;
pub mod layout;
mod screens;
mod styles;
mod text;

pub use help::render_help_overlay;
pub use hit_map::HitMap;
pub use layout::{frame_areas, render_layout, FrameAreas};

use crate::capture::{CaptureDevice, FileCapture};
use crate::config::{KeyBindings, ResolvedConfig};
use crate::media::{AutoplayPolicy, MediaElement, PreviewPlayer, StillImage};
use crate::model::{AppError, GenerationError, KeyAction, MediaKind, VideoItem};
use crate::service::{CancelToken, GeminiClient, GenerationService, Job, JobRunner};
use crate::state::{AppDeps, AppState, Command, InputKey};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Longest wait for terminal input before the loop checks timers and jobs.
const MAX_POLL: Duration = Duration::from_millis(100);

/// Rows scrolled per mouse wheel notch.
const WHEEL_ROWS: i32 = 3;

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Builds a generation service for an API key.
pub type ServiceFactory =
    Box<dyn Fn(&str) -> Result<Arc<dyn GenerationService>, GenerationError>>;

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    app_state: AppState,
    key_bindings: KeyBindings,
    runner: JobRunner,
    service_factory: ServiceFactory,
    /// Token of the running create-flow generation, if any.
    generation: Option<CancelToken>,
    /// Click regions from the last draw.
    hits: HitMap,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(
        app_state: AppState,
        runner: JobRunner,
        service_factory: ServiceFactory,
    ) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            app_state,
            key_bindings: KeyBindings::default(),
            runner,
            service_factory,
            generation: None,
            hits: HitMap::default(),
        })
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Run the main event loop
    ///
    /// Returns when the user quits. Sleeps until the next input, timer
    /// deadline, or `MAX_POLL`, whichever comes first.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let timeout = self.poll_timeout(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key, Instant::now()),
                    Event::Mouse(mouse) => self.handle_mouse(mouse, Instant::now()),
                    Event::Resize(width, height) => {
                        debug!(width, height, "terminal resized");
                    }
                    _ => {}
                }
            }

            self.step(Instant::now());
            if self.app_state.should_quit() {
                break;
            }
            self.draw()?;
        }

        self.app_state.shutdown(Instant::now());
        self.execute_commands(Instant::now());
        self.runner.cancel_all();
        info!("event loop finished");
        Ok(())
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        match self.app_state.next_deadline() {
            Some(deadline) => deadline.saturating_duration_since(now).min(MAX_POLL),
            None => MAX_POLL,
        }
    }

    /// Advance timers, apply finished jobs, and run queued commands.
    fn step(&mut self, now: Instant) {
        self.app_state.tick(now);
        for outcome in self.runner.drain() {
            self.app_state.apply_outcome(outcome, now);
        }
        self.execute_commands(now);
    }

    fn execute_commands(&mut self, now: Instant) {
        for command in self.app_state.take_commands() {
            match command {
                Command::Run(job) => {
                    let is_generation = matches!(job, Job::Image { .. } | Job::Video { .. });
                    let token = self.runner.submit(job);
                    if is_generation {
                        self.generation = Some(token);
                    }
                }
                Command::CancelGeneration => {
                    if let Some(token) = self.generation.take() {
                        info!("cancelling generation");
                        token.cancel();
                    }
                }
                Command::SetApiKey(key) => match (self.service_factory)(&key) {
                    Ok(service) => {
                        info!("generation service configured");
                        self.runner.set_service(Some(service));
                    }
                    Err(e) => {
                        warn!(error = %e, "could not configure generation service");
                        self.app_state.set_notice(e.to_string(), now);
                    }
                },
            }
        }
    }

    /// Handle a single keyboard event.
    ///
    /// Text fields and modals see the key first; unconsumed keys go through
    /// the bindings.
    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        // Ctrl+C always quits, even while typing.
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.app_state.handle_action(KeyAction::Quit, now);
            return;
        }
        if self.app_state.handle_input(input_key(key), now) {
            return;
        }
        if let Some(action) = self.key_bindings.get(key) {
            debug!(?action, "key action");
            self.app_state.handle_action(action, now);
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent, now: Instant) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = self.hits.resolve(mouse.column, mouse.row) {
                    debug!(?target, "tap");
                    self.app_state.tap(target, now);
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(target) = self.hits.resolve(mouse.column, mouse.row) {
                    self.app_state.drag(target, now);
                }
            }
            MouseEventKind::Moved => {
                let target = self.hits.resolve(mouse.column, mouse.row);
                self.app_state.pointer_moved(target, now);
            }
            MouseEventKind::ScrollDown => self.app_state.scroll_feed(WHEEL_ROWS, now),
            MouseEventKind::ScrollUp => self.app_state.scroll_feed(-WHEEL_ROWS, now),
            _ => {}
        }
    }

    /// Render the current frame
    ///
    /// Keeps the feed's card height in step with the terminal size first.
    fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let areas = frame_areas(Rect::new(0, 0, size.width, size.height));
        self.app_state
            .set_card_height(areas.content.height, Instant::now());

        let state = &self.app_state;
        let hits = &mut self.hits;
        self.terminal
            .draw(|frame| render_layout(frame, state, hits))?;
        Ok(())
    }
}

/// Translate a terminal key into text-field input.
fn input_key(key: KeyEvent) -> InputKey {
    if key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
    {
        return InputKey::Other;
    }
    match key.code {
        KeyCode::Char(c) => InputKey::Char(c),
        KeyCode::Enter => InputKey::Enter,
        KeyCode::Backspace => InputKey::Backspace,
        KeyCode::Esc => InputKey::Esc,
        KeyCode::Tab => InputKey::Tab,
        KeyCode::Up => InputKey::Up,
        KeyCode::Down => InputKey::Down,
        _ => InputKey::Other,
    }
}

// ===== Entry point =====

/// Media element for a feed item in the terminal.
fn terminal_media(item: &VideoItem, preview_secs: f64) -> Box<dyn MediaElement> {
    match item.kind() {
        MediaKind::Video => Box::new(PreviewPlayer::new(preview_secs, AutoplayPolicy::MutedOnly)),
        MediaKind::Image => Box::new(StillImage),
    }
}

fn gemini_factory(base_url: String) -> ServiceFactory {
    Box::new(move |key: &str| {
        let client = GeminiClient::new(base_url.clone(), key)?;
        Ok(Arc::new(client) as Arc<dyn GenerationService>)
    })
}

/// Initialize and run the TUI application.
///
/// Handles terminal setup, runs the event loop, and restores the terminal on
/// exit. Logging must be initialized by the caller.
pub fn run(config: &ResolvedConfig) -> Result<(), TuiError> {
    let service_factory = gemini_factory(config.api_base_url.clone());
    let service = match config.api_key.as_deref() {
        Some(key) => Some(service_factory(key).map_err(AppError::from)?),
        None => None,
    };
    let runner = JobRunner::new(service, config.poll_policy());

    let preview_secs = config.preview_duration_secs;
    let clip = config.capture_clip.clone();
    let deps = AppDeps {
        card_config: config.card_config(),
        media_factory: Box::new(move |item: &VideoItem| terminal_media(item, preview_secs)),
        capture_factory: Box::new(move || {
            Box::new(FileCapture::new(clip.clone())) as Box<dyn CaptureDevice>
        }),
        has_api_key: config.api_key.is_some(),
        epoch_millis: chrono::Utc::now().timestamp_millis(),
        start_tab: config.start_tab,
    };
    let app_state = AppState::new(deps, Instant::now());

    let mut app = TuiApp::new(app_state, runner, service_factory)?;
    let result = app.run();

    // Always restore terminal state
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
///
/// Disables raw mode, mouse capture, and leaves alternate screen
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(DisableMouseCapture)?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "tui_tests.rs"]
mod tests;

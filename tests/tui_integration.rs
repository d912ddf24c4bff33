//! Integration tests driving `AppState` through rendered click regions.
//!
//! Each test renders with `TestBackend`, resolves a screen cell through the
//! `HitMap`, and feeds the target back into the state like the event loop does.

use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use reelfeed::capture::testing::FakeCapture;
use reelfeed::capture::CaptureDevice;
use reelfeed::media::{AutoplayPolicy, MediaElement, PreviewPlayer, StillImage};
use reelfeed::model::{MediaKind, VideoItem};
use reelfeed::state::feed::SNAP_DELAY;
use reelfeed::state::{
    AppDeps, AppState, CardButton, CardConfig, NavTab, Overlay, Screen, Sheet, TapTarget,
};
use reelfeed::view::{frame_areas, render_layout, HitMap};
use std::time::{Duration, Instant};

const WIDTH: u16 = 60;
const HEIGHT: u16 = 24;

fn terminal_media(item: &VideoItem) -> Box<dyn MediaElement> {
    match item.kind() {
        MediaKind::Video => Box::new(PreviewPlayer::new(8.0, AutoplayPolicy::MutedOnly)),
        MediaKind::Image => Box::new(StillImage),
    }
}

fn home(now: Instant) -> AppState {
    let deps = AppDeps {
        card_config: CardConfig::default(),
        media_factory: Box::new(terminal_media),
        capture_factory: Box::new(|| Box::new(FakeCapture::default()) as Box<dyn CaptureDevice>),
        has_api_key: false,
        epoch_millis: 1_700_000_000_000,
        start_tab: NavTab::Home,
    };
    let mut state = AppState::new(deps, now);
    let content = frame_areas(Rect::new(0, 0, WIDTH, HEIGHT)).content;
    state.set_card_height(content.height, now);
    state.dismiss_splash(now);
    state
}

fn render(state: &AppState) -> (Terminal<TestBackend>, HitMap) {
    let mut terminal = Terminal::new(TestBackend::new(WIDTH, HEIGHT)).unwrap();
    let mut hits = HitMap::default();
    terminal
        .draw(|frame| render_layout(frame, state, &mut hits))
        .unwrap();
    (terminal, hits)
}

fn click(state: &mut AppState, column: u16, row: u16, now: Instant) -> Option<TapTarget> {
    let (_, hits) = render(state);
    let target = hits.resolve(column, row)?;
    state.tap(target, now);
    Some(target)
}

#[test]
fn double_click_on_media_likes_and_draws_heart() {
    let now = Instant::now();
    let mut state = home(now);
    let id = state.feed().cards()[0].item_id().clone();
    assert!(!state.is_liked(&id));

    click(&mut state, 10, 10, now);
    click(&mut state, 10, 10, now + Duration::from_millis(120));

    assert!(state.is_liked(&id));
    let (terminal, _) = render(&state);
    let cell = terminal.backend().buffer().cell((10, 10)).map(|c| c.symbol().to_string());
    assert_eq!(cell.as_deref(), Some("♥"));
}

#[test]
fn slow_clicks_toggle_playback_without_liking() {
    let now = Instant::now();
    let mut state = home(now);
    let id = state.feed().cards()[0].item_id().clone();
    assert!(state.feed().cards()[0].playback.playing);

    click(&mut state, 10, 10, now);
    assert!(!state.feed().cards()[0].playback.playing);
    click(&mut state, 10, 10, now + Duration::from_millis(400));
    assert!(state.feed().cards()[0].playback.playing);

    assert!(!state.is_liked(&id));
}

#[test]
fn like_survives_switching_tabs() {
    let now = Instant::now();
    let mut state = home(now);
    let id = state.feed().cards()[0].item_id().clone();

    let target = click(&mut state, WIDTH - 7, 5, now);
    assert_eq!(target, Some(TapTarget::Button(CardButton::Like)));
    assert!(state.is_liked(&id));

    click(&mut state, WIDTH - 2, HEIGHT - 1, now);
    assert_eq!(state.screen, Screen::Profile);
    assert!(state.feed().cards().is_empty());

    click(&mut state, 2, HEIGHT - 1, now);
    assert_eq!(state.screen, Screen::Home);
    assert!(state.feed().cards()[0].liked);
}

#[test]
fn wheel_scroll_hands_playback_to_the_next_card() {
    let now = Instant::now();
    let mut state = home(now);
    let height = state.feed().card_height() as i32;

    state.scroll_feed(height / 2 - 1, now);
    assert!(!state.feed().cards()[0].is_visible());
    assert!(!state.feed().cards()[1].is_visible());

    state.scroll_feed(4, now);
    assert!(state.feed().cards()[1].is_visible());
    assert!(state.feed().cards()[1].playback.playing);
    assert!(!state.feed().cards()[0].playback.playing);

    state.tick(now + SNAP_DELAY + Duration::from_millis(10));
    assert_eq!(state.feed().offset_rows(), height as u32);
}

#[test]
fn comments_sheet_closes_on_backdrop_click() {
    let now = Instant::now();
    let mut state = home(now);

    state.tap(TapTarget::Button(CardButton::Comments), now);
    assert_eq!(
        state.feed().cards()[0].overlay,
        Overlay::Sheet(Sheet::Comments)
    );

    let target = click(&mut state, 5, 2, now);
    assert_eq!(target, Some(TapTarget::SheetBackdrop(Sheet::Comments)));
    assert_eq!(state.feed().cards()[0].overlay, Overlay::None);
}

#[test]
fn create_tab_opens_modal_and_pauses_feed() {
    let now = Instant::now();
    let mut state = home(now);

    let target = click(&mut state, WIDTH / 2, HEIGHT - 1, now);
    assert_eq!(target, Some(TapTarget::Nav(NavTab::Create)));
    assert!(state.create().is_some());
    assert!(state.feed().cards().is_empty());

    let target = click(&mut state, 2, 1, now);
    assert_eq!(target, Some(TapTarget::CreateClose));
    assert!(state.create().is_none());
    assert!(!state.feed().cards().is_empty());
}

//! Tests for AppState routing, outbox commands and outcome handling.
//!
//! These tests verify pure state transitions without any TUI dependencies.

use super::*;
use crate::capture::testing::FakeCapture;
use crate::media::testing::RecordingMedia;
use crate::media::MediaElement;
use crate::model::GenerationError;
use crate::service::{Caption, GroundedAnswer, ImageSize};
use crate::state::overlay::AnalysisPanel;
use crate::state::search::SearchPhase;

// ===== Test Helpers =====

const EPOCH: i64 = 1_700_000_000_000;

fn deps(has_api_key: bool) -> AppDeps {
    AppDeps {
        card_config: CardConfig::default(),
        media_factory: Box::new(|_item: &VideoItem| {
            Box::new(RecordingMedia::new(Some(10.0))) as Box<dyn MediaElement>
        }),
        capture_factory: Box::new(|| Box::new(FakeCapture::default()) as Box<dyn CaptureDevice>),
        has_api_key,
        epoch_millis: EPOCH,
        start_tab: NavTab::Home,
    }
}

fn home_with_key(has_api_key: bool) -> (AppState, Instant) {
    let now = Instant::now();
    let mut state = AppState::new(deps(has_api_key), now);
    state.set_card_height(20, now);
    state.dismiss_splash(now);
    (state, now)
}

fn home() -> (AppState, Instant) {
    home_with_key(true)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn type_text(state: &mut AppState, text: &str, now: Instant) {
    for c in text.chars() {
        state.handle_input(InputKey::Char(c), now);
    }
}

fn video_prompt(state: &mut AppState, prompt: &str, now: Instant) {
    state.open_create(now);
    state.tap(TapTarget::CreateMode(CreateMode::Video), now);
    type_text(state, prompt, now);
}

/// The single generation job in the outbox, with its ticket.
fn take_generation(state: &mut AppState) -> (u64, Job) {
    let mut commands = state.take_commands();
    assert_eq!(commands.len(), 1, "Expected one command, got {commands:?}");
    let job = match commands.remove(0) {
        Command::Run(job) => job,
        other => panic!("Expected a job, got {other:?}"),
    };
    let ticket = match &job {
        Job::Video { ticket, .. } | Job::Image { ticket, .. } => *ticket,
        other => panic!("Expected a generation job, got {other:?}"),
    };
    (ticket, job)
}

fn neon_video(ticket: u64) -> JobOutcome {
    JobOutcome::Video {
        ticket,
        prompt: "p".to_string(),
        result: Ok((
            Caption {
                caption: "Neon rain".to_string(),
                tags: vec!["city".to_string()],
            },
            "r1".to_string(),
        )),
    }
}

// ===== Splash =====

#[test]
fn starts_on_splash_with_no_cards_mounted() {
    let now = Instant::now();
    let state = AppState::new(deps(true), now);
    assert_eq!(state.screen, Screen::Splash);
    assert!(state.feed().is_empty());
    assert_eq!(state.next_deadline(), Some(now + SPLASH_DURATION));
}

#[test]
fn splash_dismisses_itself_after_timeout() {
    let now = Instant::now();
    let mut state = AppState::new(deps(true), now);
    state.tick(now + ms(2499));
    assert_eq!(state.screen, Screen::Splash);
    state.tick(now + SPLASH_DURATION);
    assert_eq!(state.screen, Screen::Home);
    assert_eq!(state.feed().cards().len(), 2);
}

#[test]
fn any_key_dismisses_splash() {
    let now = Instant::now();
    let mut state = AppState::new(deps(true), now);
    assert!(state.handle_input(InputKey::Other, now));
    assert_eq!(state.screen, Screen::Home);
}

#[test]
fn splash_leads_to_configured_start_tab() {
    let now = Instant::now();
    let mut state = AppState::new(
        AppDeps {
            start_tab: NavTab::Inbox,
            ..deps(true)
        },
        now,
    );
    state.dismiss_splash(now);
    assert_eq!(state.screen, Screen::Inbox);
    assert!(state.feed().is_empty());
}

#[test]
fn start_tab_create_opens_modal_over_home() {
    let now = Instant::now();
    let mut state = AppState::new(
        AppDeps {
            start_tab: NavTab::Create,
            ..deps(true)
        },
        now,
    );
    state.dismiss_splash(now);
    assert_eq!(state.screen, Screen::Home);
    assert!(state.create().is_some());
}

// ===== Feed card routing =====

#[test]
fn first_card_plays_on_home() {
    let (state, _) = home();
    let cards = state.feed().cards();
    assert!(cards[0].playback.playing);
    assert!(!cards[1].playback.playing);
}

#[test]
fn double_tap_on_media_likes_with_one_burst() {
    let (mut state, t0) = home();
    state.tap(TapTarget::CardMedia { x: 10, y: 5 }, t0);
    state.tap(TapTarget::CardMedia { x: 10, y: 5 }, t0 + ms(200));

    let v1 = state.items()[0].id.clone();
    assert!(state.is_liked(&v1));
    assert_eq!(state.items()[0].engagement.likes, 12_401);
    let card = state.feed().current_card().unwrap();
    assert!(card.liked);
    assert_eq!(card.bursts.len(), 1);
}

#[test]
fn taps_on_side_buttons_never_pair_into_double_tap() {
    let (mut state, t0) = home();
    state.tap(TapTarget::Button(CardButton::Share), t0);
    state.tap(TapTarget::CardMedia { x: 1, y: 1 }, t0 + ms(100));
    assert_eq!(state.items()[0].engagement.likes, 12_400);
    let card = state.feed().current_card().unwrap();
    assert_eq!(card.overlay.sheet(), Some(Sheet::Share));
    assert!(card.bursts.is_empty());
}

#[test]
fn like_button_toggles_counter_both_ways() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::Like, now);
    assert_eq!(state.items()[0].engagement.likes, 12_401);
    state.handle_action(KeyAction::Like, now);
    assert_eq!(state.items()[0].engagement.likes, 12_400);
    assert!(!state.is_liked(&state.items()[0].id.clone()));
}

#[test]
fn liked_state_survives_leaving_home() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::Like, now);
    state.select_nav(NavTab::Inbox, now);
    assert!(state.feed().is_empty(), "feed unmounted off Home");
    state.select_nav(NavTab::Home, now);
    assert!(state.feed().current_card().unwrap().liked);
    assert_eq!(state.items()[0].engagement.likes, 12_401);
}

#[test]
fn following_tab_shows_only_followed_authors() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::ToggleFeedTab, now);
    assert_eq!(state.feed_tab, FeedTab::Following);
    let cards = state.feed().cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].item_id().as_str(), "v2");
}

#[test]
fn follow_button_updates_following_feed() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::ToggleFollow, now);
    assert!(state.items()[0].author.following);
    state.set_feed_tab(FeedTab::Following, now);
    assert_eq!(state.visible_items().len(), 2);
}

#[test]
fn keyboard_seek_steps_five_seconds_and_clamps() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::SeekForward, now);
    let card = state.feed().current_card().unwrap();
    assert_eq!(card.playback.current_time, 5.0);
    assert!(card.playback.controls_visible);

    state.handle_action(KeyAction::SeekForward, now);
    state.handle_action(KeyAction::SeekForward, now);
    assert_eq!(state.feed().current_card().unwrap().playback.current_time, 10.0);
}

#[test]
fn scrubber_tap_seeks_to_fraction() {
    let (mut state, now) = home();
    state.tap(TapTarget::Scrubber { fraction: 0.25 }, now);
    assert_eq!(state.feed().current_card().unwrap().playback.current_time, 2.5);
}

#[test]
fn volume_slider_sets_volume_and_zero_mutes() {
    let (mut state, now) = home();
    state.tap(TapTarget::VolumeSlider { fraction: 0.4 }, now);
    let playback = &state.feed().current_card().unwrap().playback;
    assert_eq!(playback.volume, 0.4);
    assert!(!playback.muted);

    state.tap(TapTarget::VolumeSlider { fraction: 0.0 }, now);
    assert!(state.feed().current_card().unwrap().playback.muted);
}

// ===== Pointer movement =====

#[test]
fn pointer_movement_over_card_restarts_hide_timer() {
    let (mut state, t0) = home();
    assert!(!state.feed().current_card().unwrap().playback.controls_visible);

    state.pointer_moved(Some(TapTarget::CardMedia { x: 3, y: 3 }), t0);
    assert!(state.feed().current_card().unwrap().playback.controls_visible);

    state.pointer_moved(Some(TapTarget::CardMedia { x: 4, y: 3 }), t0 + ms(2000));
    state.tick(t0 + ms(4000));
    assert!(state.feed().current_card().unwrap().playback.controls_visible);

    state.tick(t0 + ms(5000));
    assert!(!state.feed().current_card().unwrap().playback.controls_visible);
}

#[test]
fn pointer_movement_off_the_card_is_ignored() {
    let (mut state, now) = home();
    state.pointer_moved(Some(TapTarget::Nav(NavTab::Inbox)), now);
    state.pointer_moved(None, now);
    assert!(!state.feed().current_card().unwrap().playback.controls_visible);
    assert_eq!(state.screen, Screen::Home);
}

#[test]
fn dragging_seeks_but_never_toggles_playback() {
    let (mut state, now) = home();
    state.drag(TapTarget::CardMedia { x: 3, y: 3 }, now);
    state.drag(TapTarget::CardMedia { x: 4, y: 3 }, now + ms(50));
    let card = state.feed().current_card().unwrap();
    assert!(card.playback.playing);
    assert!(card.playback.controls_visible);

    state.drag(TapTarget::Scrubber { fraction: 0.5 }, now + ms(100));
    state.drag(TapTarget::Scrubber { fraction: 0.75 }, now + ms(150));
    assert_eq!(state.feed().current_card().unwrap().playback.current_time, 7.5);

    state.drag(TapTarget::VolumeSlider { fraction: 0.5 }, now + ms(200));
    assert_eq!(state.feed().current_card().unwrap().playback.volume, 0.5);
}

#[test]
fn close_overlay_closes_sheet_before_navigating_back() {
    let (mut state, now) = home();
    state.show_screen(Screen::Search, now);
    state.show_screen(Screen::Home, now);
    state.handle_action(KeyAction::OpenComments, now);
    state.handle_action(KeyAction::CloseOverlay, now);
    assert!(!state.feed().current_card().unwrap().overlay.is_open());
    assert_eq!(state.screen, Screen::Home);
}

#[test]
fn sheet_backdrop_closes_only_matching_sheet() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::OpenShare, now);
    state.tap(TapTarget::SheetBackdrop(Sheet::Comments), now);
    assert_eq!(state.feed().current_card().unwrap().overlay.sheet(), Some(Sheet::Share));
    state.tap(TapTarget::SheetBackdrop(Sheet::Share), now);
    assert!(!state.feed().current_card().unwrap().overlay.is_open());
}

// ===== Analysis =====

#[test]
fn analysis_selection_queues_job_with_media_uri() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::ToggleAnalysis, now);
    state.handle_action(KeyAction::SelectAnalysis(1), now);
    let commands = state.take_commands();
    match commands.as_slice() {
        [Command::Run(Job::Analyze {
            item,
            option_id,
            media_uri,
            ..
        })] => {
            assert_eq!(item.as_str(), "v1");
            assert_eq!(*option_id, "summary");
            assert!(media_uri.starts_with("https://"));
        }
        other => panic!("Expected one analyze job, got {other:?}"),
    }
    assert!(state.take_commands().is_empty(), "outbox drained");
}

#[test]
fn analysis_outcome_lands_on_card() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::ToggleAnalysis, now);
    state.tap(TapTarget::AnalysisOption(3), now);
    let v1 = state.items()[0].id.clone();
    state.apply_outcome(
        JobOutcome::Analysis {
            item: v1,
            option_id: "tags",
            result: Ok(Some("#neon".to_string())),
        },
        now,
    );
    match state.feed().current_card().unwrap().overlay.analysis() {
        Some(AnalysisPanel::Result { text, .. }) => assert_eq!(text, "#neon"),
        other => panic!("Expected analysis result, got {other:?}"),
    }
}

#[test]
fn analysis_selection_without_picker_does_nothing() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::SelectAnalysis(2), now);
    assert!(state.take_commands().is_empty());
}

// ===== Create modal =====

#[test]
fn opening_create_unmounts_feed_and_closing_remounts() {
    let (mut state, now) = home();
    state.select_nav(NavTab::Create, now);
    assert!(state.create().is_some());
    assert!(state.feed().is_empty());
    state.handle_input(InputKey::Esc, now);
    assert!(state.create().is_none());
    assert_eq!(state.feed().cards().len(), 2);
}

#[test]
fn modal_swallows_feed_keys() {
    let (mut state, now) = home();
    state.open_create(now);
    assert!(state.handle_input(InputKey::Char('j'), now));
}

#[test]
fn record_and_post_puts_item_on_top() {
    let (mut state, t0) = home();
    state.show_screen(Screen::Profile, t0);
    state.open_create(t0);
    state.handle_input(InputKey::Char(' '), t0);
    assert_eq!(state.create().unwrap().state().name(), "recording");
    state.handle_input(InputKey::Esc, t0);
    assert!(state.create().is_some(), "cannot close while recording");
    state.handle_input(InputKey::Enter, t0 + ms(3000));
    assert_eq!(state.create().unwrap().state().name(), "review");
    state.tap(TapTarget::CreatePrimary, t0 + ms(4000));

    assert!(state.create().is_none());
    assert_eq!(state.screen, Screen::Home);
    assert_eq!(state.items().len(), 3);
    assert_eq!(state.items()[0].author.id.as_str(), "me");
    assert_eq!(state.own_items().len(), 1);
    assert_eq!(state.feed().current_index(), 0);
    assert_eq!(
        state.feed().current_card().unwrap().item_id(),
        &state.items()[0].id
    );
}

#[test]
fn created_item_ids_are_unique_and_increasing() {
    let (mut state, now) = home();
    let first = state.next_item_id(now);
    let second = state.next_item_id(now);
    assert_eq!(first.as_str(), VideoId::from_timestamp(EPOCH).as_str());
    assert_ne!(first, second);
    assert_eq!(second.as_str(), VideoId::from_timestamp(EPOCH + 1).as_str());
}

#[test]
fn tab_cycles_create_modes() {
    let (mut state, now) = home();
    state.open_create(now);
    state.handle_input(InputKey::Tab, now);
    assert_eq!(state.create().unwrap().mode(), CreateMode::Video);
    state.handle_input(InputKey::Tab, now);
    assert_eq!(state.create().unwrap().mode(), CreateMode::Image);
    state.handle_input(InputKey::Tab, now);
    assert_eq!(state.create().unwrap().mode(), CreateMode::Camera);
}

#[test]
fn generate_without_key_opens_credential_prompt() {
    let (mut state, now) = home_with_key(false);
    video_prompt(&mut state, "city at night", now);
    state.handle_input(InputKey::Enter, now);
    assert!(state.take_commands().is_empty());
    assert_eq!(state.credential_input(), Some(""));

    type_text(&mut state, "  sk-1 ", now);
    state.handle_input(InputKey::Enter, now);
    assert!(state.has_api_key());
    assert_eq!(state.credential_input(), None);
    assert_eq!(
        state.take_commands(),
        vec![Command::SetApiKey("sk-1".to_string())]
    );
    assert_eq!(state.create().unwrap().prompt(), "city at night");
}

#[test]
fn video_generation_round_trip_publishes_item() {
    let (mut state, now) = home();
    video_prompt(&mut state, "city at night", now);
    state.handle_input(InputKey::Enter, now);
    let (ticket, job) = take_generation(&mut state);
    assert_eq!(
        job,
        Job::Video {
            ticket,
            prompt: "city at night".to_string()
        }
    );

    state.apply_outcome(
        JobOutcome::Video {
            ticket,
            prompt: "city at night".to_string(),
            result: Ok((
                Caption {
                    caption: "Neon rain".to_string(),
                    tags: vec!["city".to_string()],
                },
                "r1".to_string(),
            )),
        },
        now + ms(30_000),
    );
    assert!(state.create().is_none());
    assert_eq!(state.items()[0].description, "Neon rain #city");
    assert_eq!(state.feed().cards().len(), 3);
}

#[test]
fn image_job_carries_selected_size() {
    let (mut state, now) = home();
    state.open_create(now);
    state.tap(TapTarget::CreateMode(CreateMode::Image), now);
    type_text(&mut state, "a fox", now);
    state.handle_input(InputKey::Down, now);
    state.tap(TapTarget::CreateImageSize, now);
    state.tap(TapTarget::CreatePrimary, now);
    let (ticket, job) = take_generation(&mut state);
    assert_eq!(
        job,
        Job::Image {
            ticket,
            prompt: "a fox".to_string(),
            size: ImageSize::FourK
        }
    );
}

#[test]
fn escape_while_generating_cancels_and_drops_late_result() {
    let (mut state, now) = home();
    video_prompt(&mut state, "p", now);
    state.handle_input(InputKey::Enter, now);
    let (ticket, _) = take_generation(&mut state);

    state.handle_input(InputKey::Esc, now);
    assert_eq!(state.take_commands(), vec![Command::CancelGeneration]);
    assert_eq!(state.create().unwrap().state().name(), "prompt-entry");

    state.apply_outcome(neon_video(ticket), now);
    assert_eq!(state.items().len(), 2);
    assert!(state.create().is_some());
}

#[test]
fn cancelled_job_does_not_clobber_resubmission() {
    let (mut state, now) = home();
    video_prompt(&mut state, "p", now);
    state.handle_input(InputKey::Enter, now);
    let (cancelled, _) = take_generation(&mut state);
    state.handle_input(InputKey::Esc, now);
    state.take_commands();

    state.handle_input(InputKey::Enter, now);
    let (current, _) = take_generation(&mut state);
    assert_ne!(cancelled, current);

    state.apply_outcome(
        JobOutcome::Video {
            ticket: cancelled,
            prompt: "p".to_string(),
            result: Err(GenerationError::Cancelled),
        },
        now,
    );
    assert_eq!(state.create().unwrap().state().name(), "generating");

    state.apply_outcome(neon_video(current), now);
    assert!(state.create().is_none());
    assert_eq!(state.items()[0].description, "Neon rain #city");
}

#[test]
fn cancelled_video_is_not_published_for_image_request() {
    let (mut state, now) = home();
    video_prompt(&mut state, "p", now);
    state.handle_input(InputKey::Enter, now);
    let (video_ticket, _) = take_generation(&mut state);
    state.handle_input(InputKey::Esc, now);
    state.take_commands();

    state.tap(TapTarget::CreateMode(CreateMode::Image), now);
    state.handle_input(InputKey::Enter, now);
    let (image_ticket, job) = take_generation(&mut state);
    assert!(matches!(job, Job::Image { .. }));

    state.apply_outcome(neon_video(video_ticket), now);
    assert_eq!(state.items().len(), 2);
    assert_eq!(state.create().unwrap().state().name(), "generating");

    state.apply_outcome(
        JobOutcome::Image {
            ticket: image_ticket,
            prompt: "p".to_string(),
            result: Ok(Some("data:image/png;base64,AA".to_string())),
        },
        now,
    );
    assert_eq!(state.items()[0].author.id.as_str(), "gemini_image");
    assert_eq!(state.items()[0].description, "AI Masterpiece: p");
}

#[test]
fn entity_not_found_reopens_credential_prompt() {
    let (mut state, now) = home();
    video_prompt(&mut state, "p", now);
    state.handle_input(InputKey::Enter, now);
    let (ticket, _) = take_generation(&mut state);
    state.apply_outcome(
        JobOutcome::Video {
            ticket,
            prompt: "p".to_string(),
            result: Err(GenerationError::EntityNotFound),
        },
        now,
    );
    assert_eq!(state.credential_input(), Some(""));
}

#[test]
fn outcome_after_modal_closed_is_ignored() {
    let (mut state, now) = home();
    state.apply_outcome(
        JobOutcome::Image {
            ticket: 1,
            prompt: "a fox".to_string(),
            result: Ok(Some("data:image/png;base64,AA".to_string())),
        },
        now,
    );
    assert_eq!(state.items().len(), 2);
}

// ===== Search =====

#[test]
fn search_screen_takes_text_and_queues_job() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::OpenSearch, now);
    assert!(state.feed().is_empty());
    type_text(&mut state, "veo", now);
    assert!(state.handle_input(InputKey::Enter, now));
    assert_eq!(
        state.take_commands(),
        vec![Command::Run(Job::Search {
            query: "veo".to_string()
        })]
    );

    state.apply_outcome(
        JobOutcome::Search {
            query: "veo".to_string(),
            result: Ok(GroundedAnswer {
                text: "Veo 3".to_string(),
                sources: vec![],
            }),
        },
        now,
    );
    assert!(matches!(state.search.phase(), SearchPhase::Answer { .. }));
}

#[test]
fn search_escape_clears_then_leaves() {
    let (mut state, now) = home();
    state.show_screen(Screen::Search, now);
    type_text(&mut state, "x", now);
    state.handle_input(InputKey::Esc, now);
    assert_eq!(state.search.input(), "");
    assert_eq!(state.screen, Screen::Search);
    state.handle_input(InputKey::Esc, now);
    assert_eq!(state.screen, Screen::Home);
}

#[test]
fn suggestion_tap_runs_canned_query() {
    let (mut state, now) = home();
    state.show_screen(Screen::Search, now);
    state.tap(TapTarget::SearchSuggestion(0), now);
    assert_eq!(state.take_commands().len(), 1);
    assert!(state.search.is_loading());
}

// ===== Screens and prompts =====

#[test]
fn settings_reachable_only_from_profile() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::OpenSettings, now);
    assert_eq!(state.screen, Screen::Home);
    state.handle_action(KeyAction::TabProfile, now);
    state.handle_action(KeyAction::OpenSettings, now);
    assert_eq!(state.screen, Screen::Settings);
    assert_eq!(state.screen.nav_tab(), Some(NavTab::Profile));
    state.tap(TapTarget::Back, now);
    assert_eq!(state.screen, Screen::Profile);
}

#[test]
fn blank_credential_is_not_saved() {
    let (mut state, now) = home_with_key(false);
    state.handle_action(KeyAction::EnterApiKey, now);
    type_text(&mut state, "   ", now);
    state.handle_input(InputKey::Enter, now);
    assert!(!state.has_api_key());
    assert!(state.take_commands().is_empty());
}

#[test]
fn notice_expires_after_three_seconds() {
    let (mut state, now) = home();
    state.set_notice("hello", now);
    state.tick(now + ms(2999));
    assert_eq!(state.notice(), Some("hello"));
    state.tick(now + NOTICE_DURATION);
    assert_eq!(state.notice(), None);
}

#[test]
fn help_overlay_captures_input_until_closed() {
    let (mut state, now) = home();
    state.handle_action(KeyAction::Help, now);
    assert!(state.handle_input(InputKey::Char('j'), now));
    assert!(state.help_visible);
    state.handle_input(InputKey::Esc, now);
    assert!(!state.help_visible);
    assert!(!state.handle_input(InputKey::Char('j'), now));
}

#[test]
fn quit_action_sets_flag() {
    let (mut state, now) = home();
    assert!(!state.should_quit());
    state.handle_action(KeyAction::Quit, now);
    assert!(state.should_quit());
}

#[test]
fn shutdown_unmounts_and_cancels_generation() {
    let (mut state, now) = home();
    video_prompt(&mut state, "p", now);
    state.handle_input(InputKey::Enter, now);
    state.take_commands();
    state.shutdown(now);
    assert!(state.create().is_none());
    assert_eq!(state.take_commands(), vec![Command::CancelGeneration]);
}

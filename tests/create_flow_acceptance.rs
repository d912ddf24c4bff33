//! Acceptance tests for the create flow: camera branch, generation branch,
//! and device lifetime.

use reelfeed::capture::testing::FakeCapture;
use reelfeed::capture::CaptureConstraints;
use reelfeed::model::{FlowError, GenerationError, MediaRef, VideoId};
use reelfeed::service::Caption;
use reelfeed::state::create_flow::{Generated, CAMERA_DENIED_NOTICE};
use reelfeed::state::{CreateFlow, CreateMode, FlowState};
use std::time::{Duration, Instant};

fn open(device: &FakeCapture) -> CreateFlow {
    CreateFlow::open(Box::new(device.clone()), CaptureConstraints::default())
}

fn prompt(flow: &mut CreateFlow, text: &str) {
    for c in text.chars() {
        flow.push_prompt_char(c);
    }
}

fn submitted(flow: &mut CreateFlow) -> u64 {
    flow.submit(true, Instant::now())
        .unwrap()
        .expect("generation request")
        .ticket
}

// ===== Camera branch =====

#[test]
fn denied_camera_shows_notice_and_still_allows_ai_modes() {
    let device = FakeCapture::denying();
    let mut flow = open(&device);

    assert_eq!(
        flow.state(),
        &FlowState::CameraLive {
            notice: Some(CAMERA_DENIED_NOTICE.to_string())
        }
    );
    assert!(!flow.has_stream());
    assert!(flow.start_recording(Instant::now()).is_err());

    flow.set_mode(CreateMode::Video).unwrap();
    assert_eq!(flow.state(), &FlowState::PromptEntry { error: None });
}

#[test]
fn record_review_post_produces_in_memory_item() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    let start = Instant::now();

    flow.start_recording(start).unwrap();
    assert!(matches!(flow.state(), FlowState::Recording { .. }));
    flow.stop_recording(start + Duration::from_secs(2)).unwrap();

    let FlowState::Review { clip } = flow.state() else {
        panic!("expected review, got {:?}", flow.state());
    };
    assert_eq!(clip.duration, Duration::from_secs(2));
    assert_eq!(device.counters.released(), 1, "stream released for review");

    let item = flow.post(VideoId::from_timestamp(42)).unwrap();
    assert!(matches!(item.media, MediaRef::InMemory { .. }));
    assert!(flow.is_closed());
}

#[test]
fn discard_reacquires_the_camera() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    let now = Instant::now();

    flow.start_recording(now).unwrap();
    flow.stop_recording(now).unwrap();
    flow.discard().unwrap();

    assert!(matches!(flow.state(), FlowState::CameraLive { notice: None }));
    assert_eq!(device.counters.acquired(), 2);
}

#[test]
fn closing_while_recording_is_refused() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    flow.start_recording(Instant::now()).unwrap();

    assert!(matches!(flow.close(), Err(FlowError::Busy(_))));
    assert!(matches!(
        flow.set_mode(CreateMode::Image),
        Err(FlowError::Busy(_))
    ));
}

#[test]
fn every_acquired_stream_is_released() {
    let device = FakeCapture::default();
    {
        let mut flow = open(&device);
        flow.set_mode(CreateMode::Image).unwrap();
        flow.set_mode(CreateMode::Camera).unwrap();
        flow.close().unwrap();
    }
    {
        let _flow = open(&device);
    }
    assert_eq!(device.counters.acquired(), 3);
    assert_eq!(device.counters.released(), 3);
}

// ===== Generation branch =====

#[test]
fn generation_without_credential_requests_it() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    flow.set_mode(CreateMode::Video).unwrap();
    prompt(&mut flow, "city at night");

    assert_eq!(flow.submit(false, Instant::now()).unwrap(), None);
    assert!(flow.take_credential_request());
    assert!(!flow.take_credential_request(), "request is one-shot");
    assert!(matches!(flow.state(), FlowState::PromptEntry { .. }));
}

#[test]
fn blank_prompt_is_not_submitted() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    flow.set_mode(CreateMode::Image).unwrap();
    prompt(&mut flow, "   ");

    assert_eq!(flow.submit(true, Instant::now()).unwrap(), None);
    assert!(!flow.take_credential_request());
}

#[test]
fn stale_result_after_cancel_is_dropped() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    flow.set_mode(CreateMode::Video).unwrap();
    prompt(&mut flow, "waves");
    let ticket = submitted(&mut flow);
    flow.cancel_generation().unwrap();

    let late = Generated::Video {
        caption: Caption {
            caption: "waves".to_string(),
            tags: vec![],
        },
        uri: "https://cdn.test/waves.mp4".to_string(),
    };
    let item = flow.complete_generation(ticket, Ok(late), VideoId::from_timestamp(1));

    assert!(item.is_none());
    assert_eq!(
        flow.state(),
        &FlowState::PromptEntry {
            error: Some(GenerationError::Cancelled.to_string())
        }
    );
}

#[test]
fn image_result_without_data_is_an_error() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    flow.set_mode(CreateMode::Image).unwrap();
    prompt(&mut flow, "fox");
    let ticket = submitted(&mut flow);

    let item = flow.complete_generation(
        ticket,
        Ok(Generated::Image { data_uri: None }),
        VideoId::from_timestamp(1),
    );

    assert!(item.is_none());
    assert!(matches!(
        flow.state(),
        FlowState::PromptEntry { error: Some(_) }
    ));
}

#[test]
fn generated_image_becomes_data_uri_item() {
    let device = FakeCapture::default();
    let mut flow = open(&device);
    flow.set_mode(CreateMode::Image).unwrap();
    prompt(&mut flow, "fox");
    let ticket = submitted(&mut flow);

    let item = flow
        .complete_generation(
            ticket,
            Ok(Generated::Image {
                data_uri: Some("data:image/png;base64,AAAA".to_string()),
            }),
            VideoId::from_timestamp(1),
        )
        .expect("item created");

    assert_eq!(
        item.media,
        MediaRef::DataUri("data:image/png;base64,AAAA".to_string())
    );
    assert!(item.description.contains("fox"));
    assert!(flow.is_closed());
}

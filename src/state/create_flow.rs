//! Create flow state machine.
//!
//! Camera branch: camera-live → recording → review → {discard → camera-live,
//! post → closed}. Generation branch: prompt-entry → generating → {result →
//! closed, error → prompt-entry}. The capture stream is held only while in
//! camera-live or recording; each entry into camera-live acquires it once and
//! leaving releases it once.

use super::scheduler::Scheduler;
use super::transport::format_time;
use crate::capture::{CaptureConstraints, CaptureDevice, CaptureStream, RecordedClip};
use crate::model::catalog::{Creator, IMAGE_STATUS_MESSAGES, VIDEO_STATUS_MESSAGES};
use crate::model::{Engagement, FlowError, GenerationError, MediaRef, VideoId, VideoItem};
use crate::service::{Caption, ImageSize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Status message rotation period while generating.
pub const STATUS_ROTATION: Duration = Duration::from_secs(8);

/// Recording counter resolution.
pub const RECORD_TICK: Duration = Duration::from_secs(1);

/// Notice shown when the capture device cannot be opened.
pub const CAMERA_DENIED_NOTICE: &str = "Please allow camera access to record videos.";

/// Tab of the create modal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CreateMode {
    /// Record from the capture device.
    #[default]
    Camera,
    /// Generate a captioned video.
    Video,
    /// Generate an image.
    Image,
}

impl CreateMode {
    /// Tabs in display order.
    pub const ALL: [CreateMode; 3] = [CreateMode::Camera, CreateMode::Video, CreateMode::Image];

    /// Tab label.
    pub fn label(self) -> &'static str {
        match self {
            CreateMode::Camera => "Camera",
            CreateMode::Video => "AI Video",
            CreateMode::Image => "AI Image",
        }
    }

    fn status_messages(self) -> &'static [&'static str] {
        match self {
            CreateMode::Image => &IMAGE_STATUS_MESSAGES,
            _ => &VIDEO_STATUS_MESSAGES,
        }
    }
}

/// Where the create modal is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    /// Preview of the capture device.
    CameraLive {
        /// Set when the device could not be opened.
        notice: Option<String>,
    },
    /// Recording in progress.
    Recording {
        /// Whole seconds recorded so far.
        elapsed_secs: u64,
    },
    /// Recorded clip awaiting post or retake.
    Review {
        /// The finished recording.
        clip: RecordedClip,
    },
    /// Editing a generation prompt.
    PromptEntry {
        /// Failure from the last attempt, shown under the input.
        error: Option<String>,
    },
    /// Waiting on a generation job.
    Generating {
        /// Index of the rotating status message.
        status_index: usize,
    },
    /// Modal dismissed.
    Closed,
}

impl FlowState {
    /// Short name for logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::CameraLive { .. } => "camera-live",
            FlowState::Recording { .. } => "recording",
            FlowState::Review { .. } => "review",
            FlowState::PromptEntry { .. } => "prompt-entry",
            FlowState::Generating { .. } => "generating",
            FlowState::Closed => "closed",
        }
    }

    /// Recording or generating; mode switches are refused.
    pub fn is_busy(&self) -> bool {
        matches!(self, FlowState::Recording { .. } | FlowState::Generating { .. })
    }
}

/// What a generation job produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    /// Captioned video.
    Video {
        /// Generated caption and tags.
        caption: Caption,
        /// Download URI.
        uri: String,
    },
    /// Generated image.
    Image {
        /// `None` when the service returned no image.
        data_uri: Option<String>,
    },
}

impl Generated {
    fn mode(&self) -> CreateMode {
        match self {
            Generated::Video { .. } => CreateMode::Video,
            Generated::Image { .. } => CreateMode::Image,
        }
    }
}

/// Process-wide so a reopened modal never reuses a ticket still in flight.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// A generation the shell should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Echoed back with the result; only the latest submission is applied.
    pub ticket: u64,
    /// `Video` or `Image`.
    pub mode: CreateMode,
    /// Trimmed prompt text.
    pub prompt: String,
    /// Only meaningful for `Image`.
    pub image_size: ImageSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FlowTimer {
    StatusRotation,
    RecordTick,
}

/// Create modal state machine. Owns the capture stream while open.
pub struct CreateFlow {
    mode: CreateMode,
    state: FlowState,
    prompt: String,
    image_size: ImageSize,
    device: Box<dyn CaptureDevice>,
    constraints: CaptureConstraints,
    stream: Option<Box<dyn CaptureStream>>,
    timers: Scheduler<FlowTimer>,
    pending: Option<GenerationRequest>,
    credential_requested: bool,
}

impl std::fmt::Debug for CreateFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateFlow")
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("prompt", &self.prompt)
            .field("has_stream", &self.stream.is_some())
            .finish_non_exhaustive()
    }
}

impl CreateFlow {
    /// Open in camera mode, acquiring the device.
    pub fn open(device: Box<dyn CaptureDevice>, constraints: CaptureConstraints) -> Self {
        let mut flow = Self {
            mode: CreateMode::Camera,
            state: FlowState::Closed,
            prompt: String::new(),
            image_size: ImageSize::default(),
            device,
            constraints,
            stream: None,
            timers: Scheduler::new(),
            pending: None,
            credential_requested: false,
        };
        flow.enter_camera();
        flow
    }

    /// Active tab.
    pub fn mode(&self) -> CreateMode {
        self.mode
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &FlowState {
        &self.state
    }

    /// Whether the modal has been dismissed.
    pub fn is_closed(&self) -> bool {
        self.state == FlowState::Closed
    }

    /// Prompt text as typed.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Selected image size.
    pub fn image_size(&self) -> ImageSize {
        self.image_size
    }

    /// Whether a capture stream is held.
    pub fn has_stream(&self) -> bool {
        self.stream.is_some()
    }

    /// Label of the held capture stream.
    pub fn stream_label(&self) -> Option<&str> {
        self.stream.as_deref().map(|s| s.label())
    }

    /// Mode tabs are hidden while recording, reviewing or generating.
    pub fn can_switch_mode(&self) -> bool {
        matches!(
            self.state,
            FlowState::CameraLive { .. } | FlowState::PromptEntry { .. }
        )
    }

    fn enter_camera(&mut self) {
        debug_assert!(self.stream.is_none());
        let notice = match self.device.open(&self.constraints) {
            Ok(stream) => {
                self.stream = Some(stream);
                None
            }
            Err(e) => {
                warn!(error = %e, "capture device not available");
                Some(CAMERA_DENIED_NOTICE.to_string())
            }
        };
        self.state = FlowState::CameraLive { notice };
    }

    fn release_stream(&mut self) {
        if let Some(stream) = self.stream.take() {
            stream.release();
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    /// Switch tabs. Leaving Camera releases the stream.
    pub fn set_mode(&mut self, mode: CreateMode) -> Result<(), FlowError> {
        if self.state.is_busy() {
            return Err(FlowError::Busy(self.state.name()));
        }
        if !self.can_switch_mode() {
            return Err(self.invalid("switch mode"));
        }
        if mode == self.mode {
            return Ok(());
        }
        debug!(from = ?self.mode, to = ?mode, "create mode switch");
        let leaving_camera = self.mode == CreateMode::Camera;
        self.mode = mode;
        if leaving_camera {
            self.release_stream();
        }
        match mode {
            CreateMode::Camera => self.enter_camera(),
            CreateMode::Video | CreateMode::Image => {
                self.state = FlowState::PromptEntry { error: None };
            }
        }
        Ok(())
    }

    // ===== Camera branch =====

    /// Start recording from the live preview.
    pub fn start_recording(&mut self, now: Instant) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::CameraLive { .. }) {
            return Err(self.invalid("record"));
        }
        let Some(stream) = self.stream.as_mut() else {
            return Err(self.invalid("record without a camera"));
        };
        match stream.start_recording(now) {
            Ok(()) => {
                self.state = FlowState::Recording { elapsed_secs: 0 };
                self.timers.schedule(FlowTimer::RecordTick, now, RECORD_TICK);
                info!("recording started");
            }
            Err(e) => {
                warn!(error = %e, "recording failed to start");
                self.state = FlowState::CameraLive {
                    notice: Some(e.to_string()),
                };
            }
        }
        Ok(())
    }

    /// Stop recording and move to review; the stream is released.
    pub fn stop_recording(&mut self, now: Instant) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::Recording { .. }) {
            return Err(self.invalid("stop recording"));
        }
        self.timers.cancel(FlowTimer::RecordTick);
        let result = match self.stream.as_mut() {
            Some(stream) => stream.stop_recording(now),
            None => return Err(self.invalid("stop recording without a camera")),
        };
        match result {
            Ok(clip) => {
                info!(bytes = clip.bytes.len(), "recording finished");
                self.release_stream();
                self.state = FlowState::Review { clip };
            }
            Err(e) => {
                warn!(error = %e, "recording failed");
                self.state = FlowState::CameraLive {
                    notice: Some(e.to_string()),
                };
            }
        }
        Ok(())
    }

    /// Drop the recording and return to a fresh camera.
    pub fn discard(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::Review { .. }) {
            return Err(self.invalid("discard"));
        }
        self.enter_camera();
        Ok(())
    }

    /// Publish the recording as a new item and close.
    pub fn post(&mut self, id: VideoId) -> Result<VideoItem, FlowError> {
        let FlowState::Review { clip } = &self.state else {
            return Err(self.invalid("post"));
        };
        let item = VideoItem {
            id,
            media: MediaRef::InMemory {
                mime: clip.mime.clone(),
                bytes: clip.bytes.clone(),
            },
            author: Creator::Me.author(),
            description: "Freshly recorded on reelfeed!".to_string(),
            tags: vec!["original".to_string(), "vlog".to_string()],
            engagement: Engagement::default(),
            audio_label: "Original Sound".to_string(),
        };
        self.state = FlowState::Closed;
        Ok(item)
    }

    /// `m:ss` counter while recording.
    pub fn record_label(&self) -> Option<String> {
        match self.state {
            FlowState::Recording { elapsed_secs } => Some(format_time(elapsed_secs as f64)),
            _ => None,
        }
    }

    // ===== Generation branch =====

    /// Append to the prompt while editing.
    pub fn push_prompt_char(&mut self, c: char) {
        if matches!(self.state, FlowState::PromptEntry { .. }) {
            self.prompt.push(c);
        }
    }

    /// Delete the last prompt character.
    pub fn pop_prompt_char(&mut self) {
        if matches!(self.state, FlowState::PromptEntry { .. }) {
            self.prompt.pop();
        }
    }

    /// Cycle 1K, 2K, 4K in Image mode.
    pub fn cycle_image_size(&mut self) {
        if self.mode == CreateMode::Image && matches!(self.state, FlowState::PromptEntry { .. }) {
            self.image_size = self.image_size.next();
        }
    }

    /// Submit the prompt. Returns `Ok(None)` for an empty prompt or when the
    /// credential prompt must be shown first.
    pub fn submit(
        &mut self,
        has_credential: bool,
        now: Instant,
    ) -> Result<Option<GenerationRequest>, FlowError> {
        if !matches!(self.state, FlowState::PromptEntry { .. }) {
            return Err(self.invalid("generate"));
        }
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }
        if !has_credential {
            self.credential_requested = true;
            return Ok(None);
        }
        let request = GenerationRequest {
            ticket: NEXT_TICKET.fetch_add(1, Ordering::Relaxed),
            mode: self.mode,
            prompt: prompt.to_string(),
            image_size: self.image_size,
        };
        info!(mode = ?request.mode, ticket = request.ticket, "generation started");
        self.pending = Some(request.clone());
        self.state = FlowState::Generating { status_index: 0 };
        self.timers
            .schedule(FlowTimer::StatusRotation, now, STATUS_ROTATION);
        Ok(Some(request))
    }

    /// Current rotating status message.
    pub fn status_message(&self) -> Option<&'static str> {
        match self.state {
            FlowState::Generating { status_index } => {
                self.mode.status_messages().get(status_index).copied()
            }
            _ => None,
        }
    }

    /// Apply the result of submission `ticket`.
    ///
    /// Results from a cancelled or superseded submission, or of the wrong
    /// kind for the pending mode, are dropped.
    pub fn complete_generation(
        &mut self,
        ticket: u64,
        result: Result<Generated, GenerationError>,
        id: VideoId,
    ) -> Option<VideoItem> {
        let generating = matches!(self.state, FlowState::Generating { .. });
        let Some(pending) = self.pending.take_if(|p| generating && p.ticket == ticket) else {
            debug!(ticket, "dropping stale generation result");
            return None;
        };
        if let Ok(generated) = &result {
            if generated.mode() != pending.mode {
                debug!(ticket, mode = ?pending.mode, "dropping result of the wrong kind");
                self.pending = Some(pending);
                return None;
            }
        }
        self.timers.cancel(FlowTimer::StatusRotation);

        let result = result.and_then(|generated| match generated {
            Generated::Image { data_uri: None } => Err(GenerationError::NoResult),
            other => Ok(other),
        });

        match result {
            Ok(generated) => {
                self.state = FlowState::Closed;
                Some(self.created_item(&pending.prompt, generated, id))
            }
            Err(e) => {
                warn!(error = %e, "generation failed");
                if matches!(e, GenerationError::EntityNotFound) {
                    self.credential_requested = true;
                }
                self.state = FlowState::PromptEntry {
                    error: Some(e.to_string()),
                };
                None
            }
        }
    }

    fn created_item(&self, prompt: &str, generated: Generated, id: VideoId) -> VideoItem {
        match generated {
            Generated::Video { caption, uri } => VideoItem {
                id,
                media: MediaRef::Remote(uri),
                author: Creator::VideoModel.author(),
                description: caption.description(),
                tags: caption.tags,
                engagement: Engagement::default(),
                audio_label: "Veo Original Sound - AI Gen".to_string(),
            },
            Generated::Image { data_uri } => VideoItem {
                id,
                media: MediaRef::DataUri(data_uri.unwrap_or_default()),
                author: Creator::ImageModel.author(),
                description: format!("AI Masterpiece: {prompt}"),
                tags: vec!["ai".to_string(), "art".to_string(), "gemini".to_string()],
                engagement: Engagement::default(),
                audio_label: "Atmospheric AI - Background".to_string(),
            },
        }
    }

    /// Abandon the running generation and return to prompt entry.
    pub fn cancel_generation(&mut self) -> Result<(), FlowError> {
        if !matches!(self.state, FlowState::Generating { .. }) {
            return Err(self.invalid("cancel"));
        }
        self.timers.cancel(FlowTimer::StatusRotation);
        self.pending = None;
        self.state = FlowState::PromptEntry {
            error: Some(GenerationError::Cancelled.to_string()),
        };
        Ok(())
    }

    /// One-shot: whether the credential prompt should open.
    pub fn take_credential_request(&mut self) -> bool {
        std::mem::take(&mut self.credential_requested)
    }

    // ===== Lifecycle =====

    /// Fire due timers: the recording counter and status rotation.
    pub fn tick(&mut self, now: Instant) {
        for timer in self.timers.take_due(now) {
            match (timer, &mut self.state) {
                (FlowTimer::RecordTick, FlowState::Recording { elapsed_secs }) => {
                    *elapsed_secs += 1;
                    self.timers.schedule(FlowTimer::RecordTick, now, RECORD_TICK);
                }
                (FlowTimer::StatusRotation, FlowState::Generating { status_index }) => {
                    let len = self.mode.status_messages().len();
                    *status_index = (*status_index + 1) % len;
                    self.timers
                        .schedule(FlowTimer::StatusRotation, now, STATUS_ROTATION);
                }
                _ => {}
            }
        }
    }

    /// Earliest pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Close the modal. Refused while recording or generating.
    pub fn close(&mut self) -> Result<(), FlowError> {
        if self.state.is_busy() {
            return Err(FlowError::Busy(self.state.name()));
        }
        self.release_stream();
        self.timers.clear();
        self.pending = None;
        self.state = FlowState::Closed;
        Ok(())
    }
}

impl Drop for CreateFlow {
    fn drop(&mut self) {
        self.release_stream();
    }
}

#[cfg(test)]
#[path = "create_flow_tests.rs"]
mod tests;

//! Generation service boundary.
//!
//! `GenerationService` is the one seam to the external model API. Calls are
//! blocking; the UI never calls them directly but hands them to a
//! [`worker::JobRunner`]. The bounded video poll lives in [`poll`].

pub mod gemini;
pub mod poll;
pub mod worker;

pub use gemini::GeminiClient;
pub use poll::{await_video, PollPolicy};
pub use worker::{Job, JobOutcome, JobRunner};

use crate::model::GenerationError;
use serde::Deserialize;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

/// Caption and hashtags for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Caption {
    /// One-line caption.
    pub caption: String,
    /// Hashtags, with or without a leading `#`.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Caption {
    /// `"caption #tag1 #tag2"`.
    pub fn description(&self) -> String {
        let mut out = self.caption.trim().to_string();
        for tag in &self.tags {
            let tag = tag.trim().trim_start_matches('#');
            if tag.is_empty() {
                continue;
            }
            if !out.is_empty() {
                out.push(' ');
            }
            out.push('#');
            out.push_str(tag);
        }
        out
    }
}

/// A web source cited by a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub uri: String,
}

/// Search answer with its citations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedAnswer {
    /// Answer body.
    pub text: String,
    /// Cited pages, in citation order.
    pub sources: Vec<Source>,
}

/// Output size for image generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageSize {
    /// 1K.
    #[default]
    OneK,
    /// 2K.
    TwoK,
    /// 4K.
    FourK,
}

impl ImageSize {
    /// Every size, in picker order.
    pub const ALL: [ImageSize; 3] = [ImageSize::OneK, ImageSize::TwoK, ImageSize::FourK];

    /// Label sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::OneK => "1K",
            ImageSize::TwoK => "2K",
            ImageSize::FourK => "4K",
        }
    }

    /// Cycle to the next size.
    pub fn next(self) -> Self {
        match self {
            ImageSize::OneK => ImageSize::TwoK,
            ImageSize::TwoK => ImageSize::FourK,
            ImageSize::FourK => ImageSize::OneK,
        }
    }
}

/// Frame shape for generated media.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AspectRatio {
    /// 1:1
    Square,
    /// 3:4
    ThreeFour,
    /// 4:3
    FourThree,
    /// 9:16, the feed's native shape.
    #[default]
    NineSixteen,
    /// 16:9
    SixteenNine,
}

impl AspectRatio {
    /// Ratio string sent to the API.
    pub fn as_str(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::ThreeFour => "3:4",
            AspectRatio::FourThree => "4:3",
            AspectRatio::NineSixteen => "9:16",
            AspectRatio::SixteenNine => "16:9",
        }
    }
}

/// Video generation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoParams {
    /// Frame shape.
    pub aspect: AspectRatio,
    /// Resolution label such as `720p`.
    pub resolution: String,
}

impl Default for VideoParams {
    fn default() -> Self {
        Self {
            aspect: AspectRatio::NineSixteen,
            resolution: "720p".to_string(),
        }
    }
}

/// Handle for a long-running video job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    /// Server-side operation name.
    pub name: String,
    /// Whether the job has finished.
    pub done: bool,
    /// Download URI, present once `done`.
    pub uri: Option<String>,
}

/// The external model API.
pub trait GenerationService: Send + Sync {
    /// Caption and tags for a video about `topic`.
    fn caption(&self, topic: &str) -> Result<Caption, GenerationError>;

    /// Web-grounded answer for `query`.
    fn search(&self, query: &str) -> Result<GroundedAnswer, GenerationError>;

    /// Generate an image. `Ok(None)` when the response carries no image part.
    fn generate_image(
        &self,
        prompt: &str,
        size: ImageSize,
        aspect: AspectRatio,
    ) -> Result<Option<String>, GenerationError>;

    /// Free-form analysis of the media at `media_uri`.
    fn analyze(&self, media_uri: &str, prompt: &str) -> Result<Option<String>, GenerationError>;

    /// Start a video job.
    fn submit_video(
        &self,
        prompt: &str,
        params: &VideoParams,
    ) -> Result<VideoOperation, GenerationError>;

    /// Re-check a video job.
    fn check_video(&self, operation: &VideoOperation) -> Result<VideoOperation, GenerationError>;
}

// ===== Cancellation =====

/// Shared cancellation flag that also wakes sleepers.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    /// Fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter.
    pub fn cancel(&self) {
        let (flag, cvar) = &*self.inner;
        let mut cancelled = flag.lock().unwrap_or_else(|e| e.into_inner());
        *cancelled = true;
        cvar.notify_all();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Block up to `timeout`. Returns `true` if cancelled meanwhile.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (flag, cvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(|e| e.into_inner());
        let (guard, _) = cvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(|e| e.into_inner());
        *guard
    }
}

/// Waits between poll checks.
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`. Returns `false` if `cancel` fired first.
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool;
}

/// Real sleeper, woken early by cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool {
        !cancel.wait_timeout(duration)
    }
}

/// Test doubles shared by unit and integration tests.
#[doc(hidden)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Sleeper that returns immediately and records requested durations.
    #[derive(Debug, Default)]
    pub struct InstantSleeper {
        /// Every requested duration, in order.
        pub slept: Mutex<Vec<Duration>>,
    }

    impl InstantSleeper {
        /// Sum of requested sleeps.
        pub fn total(&self) -> Duration {
            self.slept
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .iter()
                .sum()
        }

        /// Number of sleeps.
        pub fn count(&self) -> usize {
            self.slept.lock().unwrap_or_else(|e| e.into_inner()).len()
        }
    }

    impl Sleeper for InstantSleeper {
        fn sleep(&self, duration: Duration, cancel: &CancelToken) -> bool {
            self.slept
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(duration);
            !cancel.is_cancelled()
        }
    }

    /// Scripted service. Video status checks pop from `statuses`; once empty,
    /// the job stays pending.
    #[derive(Debug, Default)]
    pub struct ScriptedService {
        /// Replies to `check_video`, popped front first.
        pub statuses: Mutex<VecDeque<Result<VideoOperation, GenerationError>>>,
        /// Prompts passed to `submit_video`.
        pub submitted: Mutex<Vec<String>>,
        /// Number of `check_video` calls.
        pub checks: Mutex<usize>,
        /// Caption reply; defaults to the topic.
        pub caption: Option<Caption>,
        /// Image reply.
        pub image: Option<String>,
        /// Analysis reply.
        pub analysis: Option<String>,
        /// Search reply; `NoResult` when unset.
        pub answer: Option<GroundedAnswer>,
        /// Error returned by every non-polling call when set.
        pub fail_with: Option<fn() -> GenerationError>,
    }

    impl ScriptedService {
        /// Pending `n` times, then done with `uri`.
        pub fn video_after(n: usize, uri: &str) -> Self {
            let service = Self::default();
            {
                let mut statuses = service.statuses.lock().unwrap_or_else(|e| e.into_inner());
                for _ in 0..n {
                    statuses.push_back(Ok(pending()));
                }
                statuses.push_back(Ok(VideoOperation {
                    name: "operations/test".to_string(),
                    done: true,
                    uri: Some(uri.to_string()),
                }));
            }
            service
        }

        /// Number of status checks so far.
        pub fn check_count(&self) -> usize {
            *self.checks.lock().unwrap_or_else(|e| e.into_inner())
        }

        fn failure(&self) -> Option<GenerationError> {
            self.fail_with.map(|f| f())
        }
    }

    /// A not-yet-done operation.
    pub fn pending() -> VideoOperation {
        VideoOperation {
            name: "operations/test".to_string(),
            done: false,
            uri: None,
        }
    }

    impl GenerationService for ScriptedService {
        fn caption(&self, topic: &str) -> Result<Caption, GenerationError> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            Ok(self.caption.clone().unwrap_or_else(|| Caption {
                caption: topic.to_string(),
                tags: vec!["ai".to_string()],
            }))
        }

        fn search(&self, _query: &str) -> Result<GroundedAnswer, GenerationError> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.answer.clone().ok_or(GenerationError::NoResult)
        }

        fn generate_image(
            &self,
            _prompt: &str,
            _size: ImageSize,
            _aspect: AspectRatio,
        ) -> Result<Option<String>, GenerationError> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            Ok(self.image.clone())
        }

        fn analyze(
            &self,
            _media_uri: &str,
            _prompt: &str,
        ) -> Result<Option<String>, GenerationError> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            Ok(self.analysis.clone())
        }

        fn submit_video(
            &self,
            prompt: &str,
            _params: &VideoParams,
        ) -> Result<VideoOperation, GenerationError> {
            if let Some(e) = self.failure() {
                return Err(e);
            }
            self.submitted
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(prompt.to_string());
            Ok(pending())
        }

        fn check_video(
            &self,
            _operation: &VideoOperation,
        ) -> Result<VideoOperation, GenerationError> {
            *self.checks.lock().unwrap_or_else(|e| e.into_inner()) += 1;
            self.statuses
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .pop_front()
                .unwrap_or_else(|| Ok(pending()))
        }
    }
}

//! Capture device boundary.
//!
//! The create flow asks a `CaptureDevice` for a live stream when it enters
//! camera mode. The returned `CaptureStream` releases the device when dropped,
//! so every successful acquisition is paired with exactly one release.
//!
//! The terminal build has no camera. `FileCapture` stands in for one: it
//! "records" a configured clip from disk.

use crate::model::CaptureError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Which camera to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Front-facing camera.
    User,
    /// Rear camera.
    Environment,
}

/// Requested stream parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    /// Target width in pixels.
    pub width: u32,
    /// Target height in pixels.
    pub height: u32,
    /// Which camera to open.
    pub facing: Facing,
    /// Capture audio alongside video.
    pub audio: bool,
}

impl Default for CaptureConstraints {
    /// Portrait 1080x1920, front camera, with audio.
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            facing: Facing::User,
            audio: true,
        }
    }
}

/// A finished recording held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct RecordedClip {
    /// Container mime type, e.g. `video/webm`.
    pub mime: String,
    /// Encoded clip bytes.
    pub bytes: Arc<[u8]>,
    /// Time between start and stop.
    pub duration: Duration,
}

impl std::fmt::Debug for RecordedClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedClip")
            .field("mime", &self.mime)
            .field("bytes", &self.bytes.len())
            .field("duration", &self.duration)
            .finish()
    }
}

/// Source of live capture streams.
pub trait CaptureDevice: Send {
    /// Request a live stream. Denial and missing hardware are errors.
    fn open(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// A live stream. Dropping it releases the device.
pub trait CaptureStream: Send + std::fmt::Debug {
    /// Human-readable device label for the viewfinder.
    fn label(&self) -> &str;
    /// Begin collecting a clip. Fails if the stream is already recording.
    fn start_recording(&mut self, now: Instant) -> Result<(), CaptureError>;
    /// Finish recording and return the collected clip.
    fn stop_recording(&mut self, now: Instant) -> Result<RecordedClip, CaptureError>;
    /// Whether a clip is being collected.
    fn is_recording(&self) -> bool;

    /// Release the device now. Same as dropping the stream.
    fn release(self: Box<Self>) {}
}

/// Mime type for a clip file, from its extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        _ => "video/webm",
    }
}

// ===== FileCapture =====

/// Capture device backed by a clip file.
///
/// With no clip configured the device reports itself unavailable, which the
/// create flow surfaces as a permission notice.
#[derive(Debug, Clone, Default)]
pub struct FileCapture {
    clip: Option<PathBuf>,
}

impl FileCapture {
    /// Device that records `clip`, or an unavailable device for `None`.
    pub fn new(clip: Option<PathBuf>) -> Self {
        Self { clip }
    }
}

impl CaptureDevice for FileCapture {
    fn open(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let Some(path) = self.clip.clone() else {
            return Err(CaptureError::DeviceUnavailable);
        };
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(CaptureError::DeviceUnavailable),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(CaptureError::PermissionDenied {
                    reason: e.to_string(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(CaptureError::DeviceUnavailable)
            }
            Err(e) => return Err(CaptureError::Io(e)),
        }

        info!(
            path = %path.display(),
            width = constraints.width,
            height = constraints.height,
            "capture stream acquired"
        );
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());
        Ok(Box::new(FileStream {
            path,
            label,
            recording_since: None,
        }))
    }
}

#[derive(Debug)]
struct FileStream {
    path: PathBuf,
    label: String,
    recording_since: Option<Instant>,
}

impl CaptureStream for FileStream {
    fn label(&self) -> &str {
        &self.label
    }

    fn start_recording(&mut self, now: Instant) -> Result<(), CaptureError> {
        if self.recording_since.is_some() {
            return Err(CaptureError::Recording("already recording".to_string()));
        }
        self.recording_since = Some(now);
        Ok(())
    }

    fn stop_recording(&mut self, now: Instant) -> Result<RecordedClip, CaptureError> {
        let since = self
            .recording_since
            .take()
            .ok_or_else(|| CaptureError::Recording("not recording".to_string()))?;
        let bytes = std::fs::read(&self.path)?;
        debug!(bytes = bytes.len(), "recording collected");
        Ok(RecordedClip {
            mime: mime_for_path(&self.path).to_string(),
            bytes: bytes.into(),
            duration: now.saturating_duration_since(since),
        })
    }

    fn is_recording(&self) -> bool {
        self.recording_since.is_some()
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        info!(path = %self.path.display(), "capture stream released");
    }
}

/// Test doubles shared by unit and integration tests.
#[doc(hidden)]
pub mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts of device acquisitions and releases.
    #[derive(Debug, Default)]
    pub struct CaptureCounters {
        /// Successful `open` calls.
        pub acquired: AtomicUsize,
        /// Dropped streams.
        pub released: AtomicUsize,
    }

    impl CaptureCounters {
        /// Acquisitions so far.
        pub fn acquired(&self) -> usize {
            self.acquired.load(Ordering::SeqCst)
        }

        /// Releases so far.
        pub fn released(&self) -> usize {
            self.released.load(Ordering::SeqCst)
        }
    }

    /// In-memory device that can be told to deny access.
    #[derive(Debug, Clone, Default)]
    pub struct FakeCapture {
        /// Refuse every `open`.
        pub deny: bool,
        /// Shared with the test for assertions.
        pub counters: Arc<CaptureCounters>,
    }

    impl FakeCapture {
        /// Device that always refuses access.
        pub fn denying() -> Self {
            Self {
                deny: true,
                ..Self::default()
            }
        }
    }

    impl CaptureDevice for FakeCapture {
        fn open(
            &mut self,
            _constraints: &CaptureConstraints,
        ) -> Result<Box<dyn CaptureStream>, CaptureError> {
            if self.deny {
                return Err(CaptureError::PermissionDenied {
                    reason: "denied by user".to_string(),
                });
            }
            self.counters.acquired.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                counters: Arc::clone(&self.counters),
                recording_since: None,
            }))
        }
    }

    #[derive(Debug)]
    struct FakeStream {
        counters: Arc<CaptureCounters>,
        recording_since: Option<Instant>,
    }

    impl CaptureStream for FakeStream {
        fn label(&self) -> &str {
            "fake camera"
        }

        fn start_recording(&mut self, now: Instant) -> Result<(), CaptureError> {
            self.recording_since = Some(now);
            Ok(())
        }

        fn stop_recording(&mut self, now: Instant) -> Result<RecordedClip, CaptureError> {
            let since = self
                .recording_since
                .take()
                .ok_or_else(|| CaptureError::Recording("not recording".to_string()))?;
            Ok(RecordedClip {
                mime: "video/webm".to_string(),
                bytes: Arc::from(&b"webm"[..]),
                duration: now.saturating_duration_since(since),
            })
        }

        fn is_recording(&self) -> bool {
            self.recording_since.is_some()
        }
    }

    impl Drop for FakeStream {
        fn drop(&mut self) {
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

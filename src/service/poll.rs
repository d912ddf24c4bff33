//! Bounded polling for long-running video jobs.

use super::{CancelToken, GenerationService, Sleeper, VideoParams};
use crate::model::GenerationError;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default wait between status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default ceiling on total wait.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Interval and hard ceiling for a poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status checks.
    pub interval: Duration,
    /// Give up once this much time has passed.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Submit a video job and wait for its result URI.
///
/// Each iteration checks `cancel`, refuses to start a wait that would push the
/// accumulated wait past `policy.timeout`, sleeps `policy.interval` and then
/// re-checks the job. The returned URI is exactly what the service reported.
pub fn await_video(
    service: &dyn GenerationService,
    prompt: &str,
    params: &VideoParams,
    policy: PollPolicy,
    sleeper: &dyn Sleeper,
    cancel: &CancelToken,
) -> Result<String, GenerationError> {
    let mut operation = service.submit_video(prompt, params)?;
    info!(operation = %operation.name, "video job submitted");

    let mut waited = Duration::ZERO;
    let mut checks = 0usize;
    while !operation.done {
        if cancel.is_cancelled() {
            info!(checks, "video job cancelled");
            return Err(GenerationError::Cancelled);
        }
        if waited + policy.interval > policy.timeout {
            warn!(checks, waited_secs = waited.as_secs(), "video job timed out");
            return Err(GenerationError::Timeout {
                waited_secs: waited.as_secs(),
            });
        }
        if !sleeper.sleep(policy.interval, cancel) {
            info!(checks, "video job cancelled while waiting");
            return Err(GenerationError::Cancelled);
        }
        waited += policy.interval;

        operation = service.check_video(&operation)?;
        checks += 1;
        debug!(checks, done = operation.done, "video job status");
    }

    operation.uri.ok_or_else(|| {
        GenerationError::MalformedResponse("completed operation has no video URI".to_string())
    })
}

//! Background execution of generation jobs.
//!
//! Each job runs on its own named thread against a shared `GenerationService`
//! and reports back over an mpsc channel. The UI drains finished outcomes on
//! every tick, so state transitions stay on the UI thread.

use super::poll::{await_video, PollPolicy};
use super::{
    CancelToken, Caption, GenerationService, GroundedAnswer, ImageSize, Sleeper, ThreadSleeper,
    VideoParams,
};
use crate::model::{GenerationError, VideoId};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Work the UI asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Describe or transform the media of one card.
    Analyze {
        /// Card the analysis belongs to.
        item: VideoId,
        /// Which analysis option was picked.
        option_id: &'static str,
        /// Media handed to the model.
        media_uri: String,
        /// Instruction for the model.
        prompt: &'static str,
    },
    /// Web-grounded search.
    Search {
        /// User query.
        query: String,
    },
    /// `ticket` is echoed in the outcome.
    Image {
        /// Echoed back so stale results can be dropped.
        ticket: u64,
        /// Image prompt.
        prompt: String,
        /// Requested output size.
        size: ImageSize,
    },
    /// Caption first, then the polled video job.
    Video {
        /// Echoed back so stale results can be dropped.
        ticket: u64,
        /// Topic for caption and video.
        prompt: String,
    },
}

impl Job {
    fn kind(&self) -> &'static str {
        match self {
            Job::Analyze { .. } => "analyze",
            Job::Search { .. } => "search",
            Job::Image { .. } => "image",
            Job::Video { .. } => "video",
        }
    }
}

/// Finished work, tagged so the UI can drop stale results.
#[derive(Debug)]
pub enum JobOutcome {
    /// Result of [`Job::Analyze`].
    Analysis {
        /// Card the analysis was for.
        item: VideoId,
        /// Option that was picked.
        option_id: &'static str,
        /// Analysis text, `None` when the model returned nothing.
        result: Result<Option<String>, GenerationError>,
    },
    /// Result of [`Job::Search`].
    Search {
        /// Query as submitted.
        query: String,
        /// Answer or failure.
        result: Result<GroundedAnswer, GenerationError>,
    },
    /// Result of [`Job::Image`].
    Image {
        /// Ticket of the originating job.
        ticket: u64,
        /// Prompt as submitted.
        prompt: String,
        /// Image URI, `None` when no image part came back.
        result: Result<Option<String>, GenerationError>,
    },
    /// Result of [`Job::Video`].
    Video {
        /// Ticket of the originating job.
        ticket: u64,
        /// Prompt as submitted.
        prompt: String,
        /// Caption plus download URI.
        result: Result<(Caption, String), GenerationError>,
    },
}

fn execute(
    job: Job,
    service: &dyn GenerationService,
    sleeper: &dyn Sleeper,
    policy: PollPolicy,
    cancel: &CancelToken,
) -> JobOutcome {
    match job {
        Job::Analyze {
            item,
            option_id,
            media_uri,
            prompt,
        } => JobOutcome::Analysis {
            item,
            option_id,
            result: service.analyze(&media_uri, prompt),
        },
        Job::Search { query } => {
            let result = service.search(&query);
            JobOutcome::Search { query, result }
        }
        Job::Image {
            ticket,
            prompt,
            size,
        } => {
            let result = service.generate_image(&prompt, size, Default::default());
            JobOutcome::Image {
                ticket,
                prompt,
                result,
            }
        }
        Job::Video { ticket, prompt } => {
            let result = service.caption(&prompt).and_then(|caption| {
                let uri = await_video(
                    service,
                    &prompt,
                    &VideoParams::default(),
                    policy,
                    sleeper,
                    cancel,
                )?;
                Ok((caption, uri))
            });
            JobOutcome::Video {
                ticket,
                prompt,
                result,
            }
        }
    }
}

/// Outcome for a job that could not run at all.
fn rejected(job: Job, err: fn() -> GenerationError) -> JobOutcome {
    match job {
        Job::Analyze { item, option_id, .. } => JobOutcome::Analysis {
            item,
            option_id,
            result: Err(err()),
        },
        Job::Search { query } => JobOutcome::Search {
            query,
            result: Err(err()),
        },
        Job::Image { ticket, prompt, .. } => JobOutcome::Image {
            ticket,
            prompt,
            result: Err(err()),
        },
        Job::Video { ticket, prompt } => JobOutcome::Video {
            ticket,
            prompt,
            result: Err(err()),
        },
    }
}

/// Runner-assigned id pairing an outcome with its cancel token.
type JobId = u64;

/// Runs jobs on worker threads.
pub struct JobRunner {
    service: Option<Arc<dyn GenerationService>>,
    sleeper: Arc<dyn Sleeper>,
    policy: PollPolicy,
    tx: Sender<(JobId, JobOutcome)>,
    rx: Receiver<(JobId, JobOutcome)>,
    next_id: JobId,
    /// Tokens of jobs whose outcome has not been received yet.
    in_flight: Vec<(JobId, CancelToken)>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("has_service", &self.service.is_some())
            .field("policy", &self.policy)
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl JobRunner {
    /// Runner that sleeps on real threads.
    pub fn new(service: Option<Arc<dyn GenerationService>>, policy: PollPolicy) -> Self {
        Self::with_sleeper(service, policy, Arc::new(ThreadSleeper))
    }

    /// Runner with an injected sleeper.
    pub fn with_sleeper(
        service: Option<Arc<dyn GenerationService>>,
        policy: PollPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            sleeper,
            policy,
            tx,
            rx,
            next_id: 0,
            in_flight: Vec::new(),
        }
    }

    /// Replace the service (new API key). Running jobs keep the old one.
    pub fn set_service(&mut self, service: Option<Arc<dyn GenerationService>>) {
        self.service = service;
    }

    /// Whether jobs can reach the model at all.
    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    /// Jobs started but not yet drained.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start `job`. Without a service the job fails immediately with
    /// `MissingCredential`; the outcome still arrives through the channel.
    pub fn submit(&mut self, job: Job) -> CancelToken {
        let cancel = CancelToken::new();
        let id = self.next_id;
        self.next_id += 1;
        let Some(service) = self.service.clone() else {
            debug!(kind = job.kind(), "no service configured");
            let _ = self
                .tx
                .send((id, rejected(job, || GenerationError::MissingCredential)));
            return cancel;
        };

        self.in_flight.push((id, cancel.clone()));

        let kind = job.kind();
        let tx = self.tx.clone();
        let sleeper = Arc::clone(&self.sleeper);
        let policy = self.policy;
        let token = cancel.clone();
        let fallback = job.clone();
        let spawned = thread::Builder::new()
            .name(format!("reelfeed-{kind}"))
            .spawn(move || {
                info!(kind, "job started");
                let outcome = execute(job, service.as_ref(), sleeper.as_ref(), policy, &token);
                // Receiver gone means the app is shutting down.
                let _ = tx.send((id, outcome));
            });
        if let Err(e) = spawned {
            error!(kind, error = %e, "failed to spawn job thread");
            let _ = self.tx.send((
                id,
                rejected(fallback, || {
                    GenerationError::Network("could not start background job".to_string())
                }),
            ));
        }
        cancel
    }

    fn finished(&mut self, (id, outcome): (JobId, JobOutcome)) -> JobOutcome {
        self.in_flight.retain(|(running, _)| *running != id);
        outcome
    }

    /// Finished outcomes, without blocking.
    pub fn drain(&mut self) -> Vec<JobOutcome> {
        let received: Vec<_> = self.rx.try_iter().collect();
        received.into_iter().map(|r| self.finished(r)).collect()
    }

    /// Block up to `timeout` for the next outcome.
    pub fn next_outcome(&mut self, timeout: Duration) -> Option<JobOutcome> {
        match self.rx.recv_timeout(timeout) {
            Ok(received) => Some(self.finished(received)),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Cancel every in-flight job.
    pub fn cancel_all(&mut self) {
        for (_, token) in self.in_flight.drain(..) {
            token.cancel();
        }
    }
}

impl Drop for JobRunner {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

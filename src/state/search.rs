//! Search state machine.
//!
//! SearchPhase is a sum type representing the three possible search states:
//! - Idle: the query box is editable, no answer shown
//! - Loading: a grounded search is in flight; a stage message rotates
//! - Answer: the answer text and its sources are shown

use super::scheduler::Scheduler;
use crate::model::catalog::{SEARCH_LOADING_STAGES, SUGGESTED_TOPICS, TRENDING_TAGS};
use crate::model::GenerationError;
use crate::service::GroundedAnswer;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Loading stage rotation period.
pub const STAGE_ROTATION: Duration = Duration::from_secs(2);

// ===== SearchQuery =====

/// Validated search query. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Smart constructor: returns None if the query is empty or whitespace-only.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let s = raw.into();
        if s.trim().is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Query for a trending tag, e.g. `#lofi` → "Tell me about lofi trends".
    pub fn for_trending_tag(tag: &str) -> Option<Self> {
        Self::new(format!("Tell me about {} trends", tag.replacen('#', "", 1)))
    }

    /// Query text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ===== SearchPhase =====

/// Sum type enforces exactly one phase at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchPhase {
    /// Nothing submitted.
    #[default]
    Idle,
    /// Waiting on an answer.
    Loading {
        /// Submitted query.
        query: SearchQuery,
        /// Index of the rotating loading message.
        stage: usize,
    },
    /// Answer for the last query.
    Answer {
        /// Query that produced the answer.
        query: SearchQuery,
        /// Answer with sources.
        answer: GroundedAnswer,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StageTimer;

/// Canned queries: suggested topics, then one per trending tag.
pub fn suggestions() -> Vec<SearchQuery> {
    SUGGESTED_TOPICS
        .iter()
        .filter_map(|topic| SearchQuery::new(*topic))
        .chain(TRENDING_TAGS.iter().filter_map(|tag| SearchQuery::for_trending_tag(tag)))
        .collect()
}

// ===== SearchState =====

/// Search screen state: editable input plus the current phase.
#[derive(Debug, Default)]
pub struct SearchState {
    input: String,
    phase: SearchPhase,
    /// Highlighted entry of `suggestions()` (keyboard selection).
    highlight: Option<usize>,
    timers: Scheduler<StageTimer>,
}

impl SearchState {
    /// Empty input, idle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Input box text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Current phase.
    pub fn phase(&self) -> &SearchPhase {
        &self.phase
    }

    /// Whether a query is in flight.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SearchPhase::Loading { .. })
    }

    /// Keyboard-highlighted suggestion.
    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Move the suggestion highlight by `delta`, clamped to the list.
    pub fn move_highlight(&mut self, delta: i32) {
        let len = suggestions().len() as i64;
        let next = match self.highlight {
            None if delta > 0 => 0,
            None => return,
            Some(i) => i as i64 + delta as i64,
        };
        self.highlight = if next < 0 {
            None
        } else {
            Some(next.min(len - 1) as usize)
        };
    }

    /// Type into the input. Ignored while loading.
    pub fn push_char(&mut self, c: char) {
        if !self.is_loading() {
            self.input.push(c);
            self.highlight = None;
        }
    }

    /// Backspace. Ignored while loading.
    pub fn pop_char(&mut self) {
        if !self.is_loading() {
            self.input.pop();
        }
    }

    /// Submit the input box, or the highlighted suggestion when the box is
    /// blank. Returns the query to run, if any.
    pub fn submit(&mut self, now: Instant) -> Option<SearchQuery> {
        if let Some(query) = SearchQuery::new(self.input.clone()) {
            return self.start(query, now);
        }
        let index = self.highlight?;
        self.select_suggestion(index, now)
    }

    /// Submit entry `index` of `suggestions()`.
    pub fn select_suggestion(&mut self, index: usize, now: Instant) -> Option<SearchQuery> {
        let query = suggestions().into_iter().nth(index)?;
        self.submit_query(query, now)
    }

    /// Submit a canned query (suggested topic or trending tag).
    pub fn submit_query(&mut self, query: SearchQuery, now: Instant) -> Option<SearchQuery> {
        if self.is_loading() {
            return None;
        }
        self.input = query.as_str().to_string();
        self.highlight = None;
        self.start(query, now)
    }

    fn start(&mut self, query: SearchQuery, now: Instant) -> Option<SearchQuery> {
        if self.is_loading() {
            return None;
        }
        debug!(query = query.as_str(), "search started");
        self.phase = SearchPhase::Loading {
            query: query.clone(),
            stage: 0,
        };
        self.timers.schedule(StageTimer, now, STAGE_ROTATION);
        Some(query)
    }

    /// Current loading stage message.
    pub fn stage_message(&self) -> Option<&'static str> {
        match self.phase {
            SearchPhase::Loading { stage, .. } => SEARCH_LOADING_STAGES.get(stage).copied(),
            _ => None,
        }
    }

    /// Apply a finished search. Dropped unless still loading `query`.
    pub fn complete(&mut self, query: &str, result: Result<GroundedAnswer, GenerationError>) {
        let SearchPhase::Loading { query: pending, .. } = &self.phase else {
            return;
        };
        if pending.as_str() != query {
            return;
        }
        let pending = pending.clone();
        self.timers.clear();
        self.phase = match result {
            Ok(answer) => SearchPhase::Answer {
                query: pending,
                answer,
            },
            Err(e) => {
                warn!(error = %e, "search failed");
                SearchPhase::Idle
            }
        };
    }

    /// Back to idle with an empty query.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.input.clear();
        self.highlight = None;
        self.phase = SearchPhase::Idle;
    }

    /// Rotate the loading message.
    pub fn tick(&mut self, now: Instant) {
        if self.timers.take_due(now).is_empty() {
            return;
        }
        if let SearchPhase::Loading { stage, .. } = &mut self.phase {
            *stage = (*stage + 1) % SEARCH_LOADING_STAGES.len();
            self.timers.schedule(StageTimer, now, STAGE_ROTATION);
        }
    }

    /// Next rotation deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;

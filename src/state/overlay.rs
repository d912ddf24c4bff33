//! Overlay stack for one feed card.
//!
//! A single tagged value holds whichever panel is open, so the analysis drawer
//! and the comments/share sheets can never be visible together.

use crate::model::catalog::{AnalysisOption, ANALYSIS_OPTIONS};

/// Text shown when analysis returns nothing.
pub const EMPTY_ANALYSIS_TEXT: &str = "Could not analyze.";

/// Text shown when analysis fails.
pub const FAILED_ANALYSIS_TEXT: &str = "Analysis error.";

/// AI analysis drawer sub-state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisPanel {
    /// Option list.
    Picker,
    /// Waiting on the model.
    Loading {
        /// Option being run.
        option: AnalysisOption,
    },
    /// Finished analysis.
    Result {
        /// Option that produced the text.
        option: AnalysisOption,
        /// Answer, or the failure text.
        text: String,
    },
}

/// Bottom sheets that close on backdrop tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    /// Comment thread.
    Comments,
    /// Share targets.
    Share,
}

/// The one panel currently layered over the media surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Overlay {
    /// Nothing open.
    #[default]
    None,
    /// AI analysis drawer.
    Analysis(AnalysisPanel),
    /// A bottom sheet.
    Sheet(Sheet),
}

/// An analysis request the shell should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Picked option; carries the prompt.
    pub option: AnalysisOption,
}

impl Overlay {
    /// Analysis button: closes any analysis sub-state, otherwise opens the picker
    /// (replacing an open sheet).
    pub fn toggle_analysis(&mut self) {
        *self = match self {
            Overlay::Analysis(_) => Overlay::None,
            _ => Overlay::Analysis(AnalysisPanel::Picker),
        };
    }

    /// Choose the 0-based option from the picker. Only valid while the picker is open.
    pub fn select_option(&mut self, index: usize) -> Option<AnalysisRequest> {
        if !matches!(self, Overlay::Analysis(AnalysisPanel::Picker)) {
            return None;
        }
        let option = *ANALYSIS_OPTIONS.get(index)?;
        *self = Overlay::Analysis(AnalysisPanel::Loading { option });
        Some(AnalysisRequest { option })
    }

    /// Apply an analysis outcome. Dropped unless still loading the same option.
    pub fn complete_analysis(&mut self, option_id: &str, outcome: Result<Option<String>, String>) {
        let Overlay::Analysis(AnalysisPanel::Loading { option }) = self else {
            return;
        };
        if option.id != option_id {
            return;
        }
        let text = match outcome {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => EMPTY_ANALYSIS_TEXT.to_string(),
            Err(_) => FAILED_ANALYSIS_TEXT.to_string(),
        };
        *self = Overlay::Analysis(AnalysisPanel::Result {
            option: *option,
            text,
        });
    }

    /// Show `sheet`, replacing whatever was open.
    pub fn open_sheet(&mut self, sheet: Sheet) {
        *self = Overlay::Sheet(sheet);
    }

    /// Backdrop tap on `sheet`: closes it only if it is the open one.
    pub fn close_sheet(&mut self, sheet: Sheet) {
        if *self == Overlay::Sheet(sheet) {
            *self = Overlay::None;
        }
    }

    /// Close whatever is open.
    pub fn close(&mut self) {
        *self = Overlay::None;
    }

    /// Whether anything covers the media.
    pub fn is_open(&self) -> bool {
        !matches!(self, Overlay::None)
    }

    /// The analysis sub-state, if the drawer is open.
    pub fn analysis(&self) -> Option<&AnalysisPanel> {
        match self {
            Overlay::Analysis(panel) => Some(panel),
            _ => None,
        }
    }

    /// The open sheet, if any.
    pub fn sheet(&self) -> Option<Sheet> {
        match self {
            Overlay::Sheet(sheet) => Some(*sheet),
            _ => None,
        }
    }
}

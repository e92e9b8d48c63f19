//! Session state for the extraction pipeline: `IDLE → READING → EXTRACTING →
//! COMPLETE`, with `ERROR` reachable from the two in-flight states. A
//! completed or failed session stays terminal until a reset or a new upload.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use crate::error::StateError;
use crate::model::ExtractionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessingStatus {
    Idle,
    Reading,
    Extracting,
    Complete,
    Error,
}

impl ProcessingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessingStatus::Idle => "IDLE",
            ProcessingStatus::Reading => "READING",
            ProcessingStatus::Extracting => "EXTRACTING",
            ProcessingStatus::Complete => "COMPLETE",
            ProcessingStatus::Error => "ERROR",
        }
    }

    /// A pipeline is in flight; new uploads are rejected meanwhile.
    pub fn is_busy(self) -> bool {
        matches!(self, ProcessingStatus::Reading | ProcessingStatus::Extracting)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owned session state: current status, the current extraction result, and
/// the date selected for display. One per process; mutations are synchronous.
#[derive(Debug)]
pub struct Session {
    status: ProcessingStatus,
    result: Option<ExtractionResult>,
    selected_date: Option<NaiveDate>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            status: ProcessingStatus::Idle,
            result: None,
            selected_date: None,
        }
    }

    pub fn status(&self) -> ProcessingStatus {
        self.status
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        self.result.as_ref()
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.selected_date
    }

    /// Starts a new pipeline. The previous result is discarded here, at
    /// `READING` time, never earlier.
    pub fn begin_reading(&mut self) -> Result<(), StateError> {
        if self.status.is_busy() {
            return Err(StateError::Busy);
        }

        self.result = None;
        self.selected_date = None;
        self.status = ProcessingStatus::Reading;
        Ok(())
    }

    pub fn begin_extracting(&mut self) -> Result<(), StateError> {
        if self.status != ProcessingStatus::Reading {
            return Err(StateError::InvalidTransition {
                from: self.status,
                to: ProcessingStatus::Extracting,
            });
        }

        self.status = ProcessingStatus::Extracting;
        Ok(())
    }

    /// Stores a finished extraction and selects the earliest event date for
    /// display.
    pub fn complete(&mut self, result: ExtractionResult) -> Result<(), StateError> {
        if self.status != ProcessingStatus::Extracting {
            return Err(StateError::InvalidTransition {
                from: self.status,
                to: ProcessingStatus::Complete,
            });
        }

        self.selected_date = result.earliest_date();
        self.result = Some(result);
        self.status = ProcessingStatus::Complete;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), StateError> {
        if !self.status.is_busy() {
            return Err(StateError::InvalidTransition {
                from: self.status,
                to: ProcessingStatus::Error,
            });
        }

        self.status = ProcessingStatus::Error;
        Ok(())
    }

    /// Returns to `IDLE` from any state, clearing the result and the
    /// selected date.
    pub fn reset(&mut self) {
        self.status = ProcessingStatus::Idle;
        self.result = None;
        self.selected_date = None;
    }

    /// Removes one event from the current result. A no-op without a result
    /// or for an unknown id.
    pub fn delete_event(&mut self, id: &str) -> bool {
        self.result
            .as_mut()
            .map_or(false, |result| result.delete_event(id))
    }
}

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Label used when the extraction step returns no course name.
pub const FALLBACK_COURSE_NAME: &str = "Unknown Course";

/// Filename stem used when a course name is unusable for an export filename.
pub const FALLBACK_FILENAME_STEM: &str = "Syllabus";

/// Classification of an extracted event.
///
/// Deserialization coerces every tag outside the six known ones to `Other`,
/// so an unrecognized classification never enters the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Exam,
    Quiz,
    Assignment,
    Project,
    Holiday,
    Other,
}

impl EventType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "EXAM" => EventType::Exam,
            "QUIZ" => EventType::Quiz,
            "ASSIGNMENT" => EventType::Assignment,
            "PROJECT" => EventType::Project,
            "HOLIDAY" => EventType::Holiday,
            _ => EventType::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Exam => "EXAM",
            EventType::Quiz => "QUIZ",
            EventType::Assignment => "ASSIGNMENT",
            EventType::Project => "PROJECT",
            EventType::Holiday => "HOLIDAY",
            EventType::Other => "OTHER",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(EventType::from_tag(&tag))
    }
}

/// A single dated item extracted from a syllabus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type")]
    pub kind: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

/// The course name plus the events produced by one document analysis.
///
/// Event order is the order the extraction step returned; consumers may sort
/// their own copies but this order stays canonical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub course_name: String,
    pub events: Vec<Event>,
}

impl ExtractionResult {
    /// Removes the event with the given id, keeping the order of the rest.
    /// Unknown ids are a no-op.
    pub fn delete_event(&mut self, id: &str) -> bool {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        self.events.len() != before
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.events.iter().map(|event| event.date).min()
    }

    /// Download filename for the exported calendar, derived from the course
    /// name. Characters that cannot appear in a header-carried filename are
    /// dropped; an unusable name falls back to a fixed stem.
    pub fn export_filename(&self) -> String {
        let stem: String = self
            .course_name
            .chars()
            .filter(|c| !c.is_control() && !matches!(c, '"' | '\\' | '/'))
            .collect();

        let stem = stem.trim();
        if stem.is_empty() {
            format!("{FALLBACK_FILENAME_STEM}.ics")
        } else {
            format!("{stem}.ics")
        }
    }
}

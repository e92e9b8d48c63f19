//! Client for the Gemini `generateContent` endpoint. Sends the document
//! bytes with a fixed structured-output schema and maps the decoded response
//! into an [`ExtractionResult`]. No partial results: any failure aborts the
//! whole document.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use crate::error::ExtractError;
use crate::model::{Event, EventType, ExtractionResult, FALLBACK_COURSE_NAME};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const PROMPT: &str = concat!(
    "Analyze this syllabus document. ",
    "Extract the course name and all significant dates such as exams, quizzes, ",
    "assignments, project deadlines, and holidays. ",
    "Ignore regular weekly class schedules (like \"every Monday\"). ",
    "Focus on specific dates. ",
    "Format dates strictly as YYYY-MM-DD. ",
    "Infer the year from context if missing (assume current or upcoming academic year). ",
    "Classify each event into one of these types: EXAM, QUIZ, ASSIGNMENT, PROJECT, ",
    "HOLIDAY, OTHER.",
);

static RESPONSE_SCHEMA: Lazy<serde_json::Value> = Lazy::new(|| {
    json!({
        "type": "OBJECT",
        "properties": {
            "courseName": {
                "type": "STRING",
                "description": "Name of the course, e.g. 'CS 101'"
            },
            "events": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "Title of the event" },
                        "date": { "type": "STRING", "description": "Date in YYYY-MM-DD format" },
                        "time": {
                            "type": "STRING",
                            "description": "Time of event if available, else empty"
                        },
                        "type": {
                            "type": "STRING",
                            "enum": ["EXAM", "QUIZ", "ASSIGNMENT", "PROJECT", "HOLIDAY", "OTHER"]
                        },
                        "description": { "type": "STRING", "description": "Any extra details" }
                    },
                    "required": ["title", "date", "type"]
                }
            }
        }
    })
});

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part<'a> {
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: &'a str, data: String },
    Text(&'a str),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// The decoded extraction payload, before ids are minted. Cached between
/// uploads of identical documents; ids are assigned per call to
/// [`RawExtraction::to_result`], never reused.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraction {
    course_name: Option<String>,
    #[serde(default)]
    events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    title: String,
    date: NaiveDate,
    time: Option<String>,
    #[serde(rename = "type")]
    kind: EventType,
    description: Option<String>,
    confidence_score: Option<f64>,
}

impl RawExtraction {
    /// Builds the typed result, assigning a fresh unique id to every event
    /// and substituting the fallback label for a missing course name.
    pub fn to_result(&self) -> ExtractionResult {
        let events = self
            .events
            .iter()
            .map(|raw| Event {
                id: Uuid::new_v4().to_string(),
                title: raw.title.clone(),
                date: raw.date,
                time: raw.time.clone().filter(|time| !time.is_empty()),
                kind: raw.kind,
                description: raw.description.clone(),
                confidence_score: raw.confidence_score,
            })
            .collect();

        ExtractionResult {
            course_name: self
                .course_name
                .clone()
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_COURSE_NAME.to_string()),
            events,
        }
    }
}

pub struct Extractor {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl Extractor {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string(), api_key, model)
    }

    pub fn with_base_url(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            model,
            api_key,
        }
    }

    pub async fn extract(
        &self,
        document: &[u8],
        mime_type: &str,
    ) -> Result<ExtractionResult, ExtractError> {
        Ok(self.extract_raw(document, mime_type).await?.to_result())
    }

    /// Issues the inference call and decodes the structured payload, leaving
    /// id assignment to [`RawExtraction::to_result`].
    pub async fn extract_raw(
        &self,
        document: &[u8],
        mime_type: &str,
    ) -> Result<RawExtraction, ExtractError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        mime_type,
                        data: BASE64.encode(document),
                    },
                    Part::Text(PROMPT),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &*RESPONSE_SCHEMA,
            },
        };

        debug!(model = %self.model, mime_type, size = document.len(), "sending inference request");

        let response: GenerateContentResponse = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
            .ok_or(ExtractError::EmptyResponse)?;

        Ok(serde_json::from_str(&text)?)
    }
}

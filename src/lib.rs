//! Syllabus Sync: turns an uploaded syllabus document into course events and
//! an importable `.ics` calendar, with the document understanding delegated to
//! the Gemini inference API.

pub mod cache;
pub mod cli;
pub mod error;
pub mod extract;
pub mod ics;
pub mod model;
pub mod server;
pub mod session;
pub mod upload;

pub use extract::Extractor;
pub use model::{Event, EventType, ExtractionResult};
pub use session::{ProcessingStatus, Session};

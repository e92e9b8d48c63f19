//! Serialization of an extraction result into the iCalendar interchange
//! format. Every event is emitted as an all-day entry; a captured `time` is
//! display-only and never encoded.

use chrono::{DateTime, Utc};
use ics::components::Property;
use ics::parameters::Value;
use ics::properties::{CalScale, Categories, Description, DtStart, Method, Summary};
use ics::{escape_text, ICalendar};

use crate::model::{Event, ExtractionResult};

/// Namespace suffix appended to event ids to form globally unique UIDs.
pub const UID_SUFFIX: &str = "@syllabussync.app";

const PRODID: &str = "-//SyllabusSync//EN";

impl ExtractionResult {
    /// Serializes the result, stamping the current instant into `DTSTAMP`.
    #[must_use]
    pub fn to_ics(&self) -> ICalendar<'_> {
        self.to_ics_at(Utc::now())
    }

    /// Deterministic variant: identical inputs and generation instant produce
    /// byte-identical output.
    #[must_use]
    pub fn to_ics_at(&self, generated_at: DateTime<Utc>) -> ICalendar<'_> {
        let dtstamp = generated_at.format("%Y%m%dT%H%M%SZ").to_string();

        let mut icalendar = ICalendar::new("2.0", PRODID);
        icalendar.push(CalScale::new("GREGORIAN"));
        icalendar.push(Method::new("PUBLISH"));
        icalendar.push(Property::new(
            "X-WR-CALNAME",
            escape_text(self.course_name.as_str()),
        ));

        for event in &self.events {
            icalendar.add_event(event.to_ics(dtstamp.clone()));
        }

        icalendar
    }
}

impl Event {
    fn to_ics(&self, dtstamp: String) -> ics::Event<'_> {
        let uid = format!("{}{UID_SUFFIX}", self.id);
        let mut ics_event = ics::Event::new(uid, dtstamp);

        let mut start = DtStart::new(self.date.format("%Y%m%d").to_string());
        start.add(Value::new("DATE"));
        ics_event.push(start);

        ics_event.push(Summary::new(escape_text(self.title.as_str())));

        if let Some(description) = &self.description {
            ics_event.push(Description::new(escape_text(description.as_str())));
        }

        ics_event.push(Categories::new(self.kind.as_str()));

        ics_event
    }
}

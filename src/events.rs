//! Event feed: events whose `payload` is either a document or a report.
//!
//! ```text
//! Query.events: [Event]
//!   Event   { id: ID, name: String, type: String, payload: Payload }
//!   Payload = Document | Report
//!   Document { id: ID, title: String }
//!   Report   { id: ID, name: String }
//! ```
//!
//! Typed records convert into tagged [`Value`]s, so the payload's variant
//! becomes the object's discriminator.

use serde::{Deserialize, Serialize};

use crate::model::{Object, Value};
use crate::schema::{CollectionResolver, FieldKind, ScalarKind, Schema, SchemaBuilder, Shape, UnionShape};
use crate::source::MemorySource;
use crate::Result;

pub const REPORT_CREATED_EVENT: &str = "REPORT_CREATED_EVENT";
pub const FILE_UPLOADED_EVENT: &str = "FILE_UPLOADED_EVENT";

pub const EVENT: &str = "Event";
pub const DOCUMENT: &str = "Document";
pub const REPORT: &str = "Report";
pub const PAYLOAD: &str = "Payload";

/// Root field and collection name.
pub const EVENTS: &str = "events";

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
}

/// What an event carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__typename")]
pub enum Payload {
    Document(Document),
    Report(Report),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: Payload,
}

impl Event {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            payload: payload.into(),
        }
    }
}

impl From<Document> for Payload { fn from(v: Document) -> Self { Payload::Document(v) } }
impl From<Report> for Payload { fn from(v: Report) -> Self { Payload::Report(v) } }

// ============================================================================
// Conversions into tagged values
// ============================================================================

// Blank ids are left off the object and project to null.

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Object::new(DOCUMENT)
            .with_field_if(!doc.id.is_empty(), "id", doc.id)
            .with_field("title", doc.title)
            .into()
    }
}

impl From<Report> for Value {
    fn from(report: Report) -> Self {
        Object::new(REPORT)
            .with_field_if(!report.id.is_empty(), "id", report.id)
            .with_field("name", report.name)
            .into()
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Document(doc) => doc.into(),
            Payload::Report(report) => report.into(),
        }
    }
}

impl From<Event> for Value {
    fn from(event: Event) -> Self {
        Object::new(EVENT)
            .with_field_if(!event.id.is_empty(), "id", event.id)
            .with_field("name", event.name)
            .with_field("type", event.kind)
            .with_field("payload", event.payload)
            .into()
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Register `Document`, `Report`, the `Payload` union and `Event`.
pub fn register_shapes(builder: &mut SchemaBuilder) -> Result<()> {
    builder
        .register(
            Shape::new(DOCUMENT)
                .scalar("id", ScalarKind::Id)
                .scalar("title", ScalarKind::String),
        )?
        .register(
            Shape::new(REPORT)
                .scalar("id", ScalarKind::Id)
                .scalar("name", ScalarKind::String),
        )?
        .register(UnionShape::new(PAYLOAD).member(DOCUMENT).member(REPORT))?
        .register(
            Shape::new(EVENT)
                .scalar("id", ScalarKind::Id)
                .scalar("name", ScalarKind::String)
                .scalar("type", ScalarKind::String)
                .field("payload", FieldKind::union(PAYLOAD)),
        )?;
    Ok(())
}

/// Register the shapes and the `events` root field, read from the `events`
/// collection of the data source.
pub fn install(builder: &mut SchemaBuilder) -> Result<()> {
    register_shapes(builder)?;
    builder.root_field(
        EVENTS,
        FieldKind::list(FieldKind::shape(EVENT)),
        CollectionResolver::new(EVENTS),
    )?;
    Ok(())
}

/// A schema holding only the event feed.
pub fn schema() -> Result<Schema> {
    let mut builder = Schema::builder();
    install(&mut builder)?;
    builder.build()
}

/// An in-memory source serving `events`.
pub fn source(events: impl IntoIterator<Item = Event>) -> MemorySource {
    let values: Vec<Value> = events.into_iter().map(Value::from).collect();
    MemorySource::new().with_collection(EVENTS, values)
}

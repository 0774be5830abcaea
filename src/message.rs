//! Queue message delivered to the check generator.

use chrono::{DateTime, Utc};

/// One message from the `checksQueue` queue. The body is the check amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Queue-assigned message identifier.
    pub id: String,
    /// When the message was put on the queue.
    pub inserted_on: Option<DateTime<Utc>>,
    /// When the message expires from the queue.
    pub expires_on: Option<DateTime<Utc>>,
    /// How many times the message has been dequeued, including this one.
    pub dequeue_count: Option<u32>,
    /// Message text, rendered verbatim.
    pub body: String,
}

impl InboundMessage {
    /// A message with an id and a body and no queue metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inserted_on: None,
            expires_on: None,
            dequeue_count: None,
            body: body.into(),
        }
    }
}

/// Parse a queue timestamp as sent by the Functions host.
///
/// Accepts RFC 3339 (`2024-03-02T14:05:09+00:00`) and the host's
/// `2024-03-02T14:05:09.1234567Z` variant. Returns `None` otherwise.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim()).ok().map(|t| t.with_timezone(&Utc))
}

mod id;
pub use id::ObjectId;

pub mod timestamp;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;
use time::OffsetDateTime;

/// The questionnaire answers captured for a quote, keyed by field name.
///
/// The store never inspects or validates its content.
pub type FormData = serde_json::Map<String, serde_json::Value>;

/// The processing status of a quote.
///
/// Only [`QuoteStatus::pending`] is ever set by this crate, but any value passed to
/// `update_status` is stored verbatim.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, Hash, PartialEq)]
#[serde(transparent)]
pub struct QuoteStatus(String);

impl QuoteStatus {
    pub const PENDING: &'static str = "pending";

    pub fn pending() -> Self {
        Self(Self::PENDING.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuoteStatus {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuoteStatus {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A persisted quote request.
///
/// One logical record exists per `session_id`. The field names are the on-disk and
/// wire names; both timestamps render as fixed-width ISO-8601 text (see [`timestamp`]).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Quote {
    #[serde(rename = "_id")]
    pub id: String,
    pub session_id: String,
    pub email: String,
    pub form_data: FormData,
    pub status: QuoteStatus,
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: OffsetDateTime,
}

impl Quote {
    /// Replaces the form answers and refreshes `updated_at`.
    pub fn set_form_data(&mut self, form_data: FormData, now: OffsetDateTime) {
        self.form_data = form_data;
        self.touch(now);
    }

    /// Replaces the status and refreshes `updated_at`.
    pub fn set_status(&mut self, status: QuoteStatus, now: OffsetDateTime) {
        self.status = status;
        self.touch(now);
    }

    fn touch(&mut self, now: OffsetDateTime) {
        self.updated_at = now.max(self.created_at);
    }
}

/// A quote that has not been assigned an id yet.
#[derive(Clone, Debug, PartialEq)]
pub struct NewQuote {
    pub session_id: String,
    pub email: String,
    pub form_data: FormData,
    pub status: QuoteStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl NewQuote {
    /// A `pending` quote created and last updated at `now`.
    pub fn pending(session_id: &str, email: &str, form_data: FormData, now: OffsetDateTime) -> Self {
        Self {
            session_id: session_id.to_string(),
            email: email.to_string(),
            form_data,
            status: QuoteStatus::pending(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(self, id: impl Into<String>) -> Quote {
        Quote {
            id: id.into(),
            session_id: self.session_id,
            email: self.email,
            form_data: self.form_data,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

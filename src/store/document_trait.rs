use crate::quote::{FormData, NewQuote, Quote, QuoteStatus};
use crate::store::Error;
use std::future::Future;
use time::OffsetDateTime;

/// A targeted field update applied to the quote matching a session.
#[derive(Clone, Debug, PartialEq)]
pub enum QuoteUpdate {
    /// Replaces `form_data` and `updated_at`.
    FormData {
        form_data: FormData,
        updated_at: OffsetDateTime,
    },
    /// Replaces `status` and `updated_at`.
    Status {
        status: QuoteStatus,
        updated_at: OffsetDateTime,
    },
}

impl QuoteUpdate {
    /// Applies the update to an in-memory copy of the quote.
    pub fn apply(self, quote: &mut Quote) {
        match self {
            QuoteUpdate::FormData {
                form_data,
                updated_at,
            } => quote.set_form_data(form_data, updated_at),
            QuoteUpdate::Status { status, updated_at } => quote.set_status(status, updated_at),
        }
    }
}

/// The acknowledgement of an `update_one` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub modified: u64,
}

/// The contract of a networked document store holding quotes.
///
/// Absence is reported as data (`None`, or an [`UpdateResult`] with `modified == 0`),
/// never as an error. Any `Err` returned by an implementation is therefore a backend
/// failure, and the [`QuoteStore`](crate::QuoteStore) answers it from the local fallback.
pub trait DocumentStore: Clone + Send + Sync + 'static {
    /// A lightweight round-trip proving the store is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), Error>> + Send;

    /// Gets the quote stored for `session_id`.
    fn find_one(&self, session_id: &str) -> impl Future<Output = Result<Option<Quote>, Error>> + Send;

    /// Inserts a new quote and returns the id the store assigned to it.
    fn insert_one(&self, quote: NewQuote) -> impl Future<Output = Result<String, Error>> + Send;

    /// Applies `update` to the quote stored for `session_id`.
    fn update_one(
        &self,
        session_id: &str,
        update: QuoteUpdate,
    ) -> impl Future<Output = Result<UpdateResult, Error>> + Send;

    /// Gets every quote, newest `created_at` first.
    fn find_all(&self) -> impl Future<Output = Result<Vec<Quote>, Error>> + Send;

    /// Releases the underlying connection.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

/// A [`DocumentStore`] that can open its own connection from a URI.
pub trait Connect: DocumentStore + Sized {
    fn connect(uri: &str) -> impl Future<Output = Result<Self, Error>> + Send;
}

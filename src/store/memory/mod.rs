use crate::quote::{NewQuote, ObjectId, Quote};
use crate::store::{Connect, DocumentStore, Error, QuoteUpdate, UpdateResult};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug)]
struct Inner {
    documents: DashMap<String, Quote>,
    available: AtomicBool,
    closed: AtomicBool,
}

/// An in-memory document store.
///
/// Clones share the same collection. Availability can be switched off with
/// [`MemoryStore::set_available`], after which every call fails the way an
/// unreachable network store would.
///
/// ### Note
///
/// Do not use this in a production environment.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub const SCHEME: &'static str = "memory://";

    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                documents: DashMap::new(),
                available: AtomicBool::new(true),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Makes every subsequent call succeed (`true`) or fail (`false`).
    pub fn set_available(&self, available: bool) {
        self.inner.available.store(available, Ordering::SeqCst);
    }

    /// The number of stored documents, regardless of availability.
    pub fn len(&self) -> usize {
        self.inner.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.documents.is_empty()
    }

    fn check(&self) -> Result<(), Error> {
        if self.inner.closed.load(Ordering::SeqCst) {
            return Err(Error::Backend("memory store is closed".to_string()));
        }
        if !self.inner.available.load(Ordering::SeqCst) {
            return Err(Error::Backend("memory store is unavailable".to_string()));
        }
        Ok(())
    }

    fn first_for_session(&self, session_id: &str) -> Option<Quote> {
        self.inner
            .documents
            .iter()
            .filter(|entry| entry.session_id == session_id)
            .min_by_key(|entry| entry.created_at)
            .map(|entry| entry.value().clone())
    }
}

impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<(), Error> {
        self.check()
    }

    async fn find_one(&self, session_id: &str) -> Result<Option<Quote>, Error> {
        self.check()?;
        Ok(self.first_for_session(session_id))
    }

    async fn insert_one(&self, quote: NewQuote) -> Result<String, Error> {
        self.check()?;

        let id = ObjectId::default().to_string();
        self.inner
            .documents
            .insert(id.clone(), quote.with_id(id.clone()));

        Ok(id)
    }

    async fn update_one(&self, session_id: &str, update: QuoteUpdate) -> Result<UpdateResult, Error> {
        self.check()?;

        let Some(existing) = self.first_for_session(session_id) else {
            return Ok(UpdateResult::default());
        };

        match self.inner.documents.get_mut(&existing.id) {
            Some(mut quote) => {
                update.apply(quote.value_mut());
                Ok(UpdateResult { modified: 1 })
            }
            None => Ok(UpdateResult::default()),
        }
    }

    async fn find_all(&self) -> Result<Vec<Quote>, Error> {
        self.check()?;

        let mut quotes: Vec<Quote> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        quotes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(quotes)
    }

    async fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
    }
}

impl Connect for MemoryStore {
    async fn connect(uri: &str) -> Result<Self, Error> {
        if uri.starts_with(Self::SCHEME) {
            Ok(Self::new())
        } else {
            Err(Error::Backend(format!("unsupported memory store uri: {uri}")))
        }
    }
}

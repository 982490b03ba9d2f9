use crate::quote::{FormData, NewQuote, Quote, QuoteStatus, timestamp};
use crate::store::file::FileStore;
use crate::store::{Connect, DocumentStore, Error, QuoteUpdate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// How a `save` call was satisfied.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    /// A new record was inserted into the primary store.
    Created,
    /// The session's existing record in the primary store was updated.
    Updated,
    /// The record was written to the local fallback store.
    SavedLocally,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaveOutcome {
    pub action: SaveAction,
    pub record_id: String,
}

/// Which backend a [`QuoteStore`] tries first.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// The primary store answered its health check at construction.
    Connected,
    /// Every call goes straight to the local fallback for the life of the store.
    Disconnected,
}

/// Quote persistence with transparent failover.
///
/// Every operation is first attempted against the primary [`DocumentStore`]. If the
/// store is [`Mode::Disconnected`], or the primary call fails, the same operation is
/// answered by the local [`FileStore`] instead. A primary that reports the quote as
/// missing is *not* a failure: `get` and `update_status` return [`Error::NotFound`]
/// without consulting the fallback.
///
/// Whether the primary is used is decided once, when the store is constructed. There
/// is no reconnection, and records written to the fallback while the primary was
/// unavailable are not copied back to it.
///
/// ### Note
///
/// The find-then-write sequence in `save` is not guarded by a per-session lock. Two
/// concurrent saves for the same session can race, and the last write wins.
///
/// ## Example
///
/// ```rust,no_run
/// use quotestash::QuoteStore;
/// use quotestash::store::file::FileStore;
/// use quotestash::store::memory::MemoryStore;
///
/// # async fn run() {
/// let store: QuoteStore<MemoryStore> =
///     QuoteStore::connect("memory://", FileStore::new("quotes")).await;
///
/// let mut form = quotestash::FormData::new();
/// form.insert("sign_type".to_string(), "neon".into());
///
/// let outcome = store.save("session-1", "a@b.com", form).await.unwrap();
/// println!("{:?} {}", outcome.action, outcome.record_id);
///
/// store.close().await;
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct QuoteStore<P: DocumentStore> {
    primary: Option<P>,
    fallback: FileStore,
}

impl<P: DocumentStore> QuoteStore<P> {
    /// Opens a primary connection from `uri` and checks it with a health call.
    ///
    /// Any failure leaves the store [`Mode::Disconnected`].
    pub async fn connect(uri: &str, fallback: FileStore) -> Self
    where
        P: Connect,
    {
        match P::connect(uri).await {
            Ok(primary) => Self::with_primary(primary, fallback).await,
            Err(e) => {
                warn!(error = %e, "primary store connection failed, quotes will be stored locally only");
                Self::fallback_only(fallback)
            }
        }
    }

    /// Uses an already constructed primary if it answers a health check.
    pub async fn with_primary(primary: P, fallback: FileStore) -> Self {
        match primary.ping().await {
            Ok(()) => {
                info!("primary store connected");
                Self {
                    primary: Some(primary),
                    fallback,
                }
            }
            Err(e) => {
                warn!(error = %e, "primary store health check failed, quotes will be stored locally only");
                primary.close().await;
                Self::fallback_only(fallback)
            }
        }
    }

    /// A store that only ever uses the local fallback.
    pub fn fallback_only(fallback: FileStore) -> Self {
        Self {
            primary: None,
            fallback,
        }
    }

    pub fn mode(&self) -> Mode {
        match self.primary {
            Some(_) => Mode::Connected,
            None => Mode::Disconnected,
        }
    }

    pub fn primary(&self) -> Option<&P> {
        self.primary.as_ref()
    }

    pub fn fallback(&self) -> &FileStore {
        &self.fallback
    }

    /// Releases the primary connection.
    pub async fn close(self) {
        if let Some(primary) = self.primary {
            primary.close().await;
        }
    }

    /// Creates the session's quote, or replaces the form data of the existing one.
    ///
    /// Only a failure of the local fallback is returned as an error.
    pub async fn save(
        &self,
        session_id: &str,
        email: &str,
        form_data: FormData,
    ) -> Result<SaveOutcome, Error> {
        if let Some(primary) = &self.primary {
            match save_primary(primary, session_id, email, form_data.clone()).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) => warn!(%session_id, error = %e, "saving quote to primary store failed, falling back to local storage"),
            }
        } else {
            debug!(%session_id, "primary store not connected, saving quote locally");
        }

        self.fallback
            .save(session_id, email, form_data)
            .await
            .inspect_err(|e| error!(%session_id, error = %e, "saving quote locally failed"))
    }

    /// Gets the session's quote.
    pub async fn get(&self, session_id: &str) -> Result<Quote, Error> {
        if let Some(primary) = &self.primary {
            match primary.find_one(session_id).await {
                Ok(found) => return found.ok_or(Error::NotFound),
                Err(e) => warn!(%session_id, error = %e, "reading quote from primary store failed, falling back to local storage"),
            }
        }

        self.fallback.get(session_id).await.inspect_err(|e| {
            if *e != Error::NotFound {
                error!(%session_id, error = %e, "reading local quote failed");
            }
        })
    }

    /// Sets the status of the session's quote.
    ///
    /// Returns [`Error::NotFound`] when no quote was modified.
    pub async fn update_status(
        &self,
        session_id: &str,
        status: impl Into<QuoteStatus>,
    ) -> Result<(), Error> {
        let status = status.into();

        if let Some(primary) = &self.primary {
            let update = QuoteUpdate::Status {
                status: status.clone(),
                updated_at: timestamp::now(),
            };
            match primary.update_one(session_id, update).await {
                Ok(result) if result.modified > 0 => {
                    info!(%session_id, %status, "quote status updated");
                    return Ok(());
                }
                Ok(_) => return Err(Error::NotFound),
                Err(e) => warn!(%session_id, error = %e, "updating quote status in primary store failed, falling back to local storage"),
            }
        }

        self.fallback
            .update_status(session_id, status)
            .await
            .inspect_err(|e| {
                if *e != Error::NotFound {
                    error!(%session_id, error = %e, "updating local quote status failed");
                }
            })
    }

    /// Gets every quote, newest first.
    pub async fn get_all(&self) -> Result<Vec<Quote>, Error> {
        if let Some(primary) = &self.primary {
            match primary.find_all().await {
                Ok(quotes) => return Ok(quotes),
                Err(e) => warn!(error = %e, "listing quotes from primary store failed, falling back to local storage"),
            }
        }

        self.fallback
            .get_all()
            .await
            .inspect_err(|e| error!(error = %e, "listing local quotes failed"))
    }
}

async fn save_primary<P: DocumentStore>(
    primary: &P,
    session_id: &str,
    email: &str,
    form_data: FormData,
) -> Result<SaveOutcome, Error> {
    let now = timestamp::now();

    match primary.find_one(session_id).await? {
        Some(existing) => {
            let update = QuoteUpdate::FormData {
                form_data,
                updated_at: now,
            };
            let result = primary.update_one(session_id, update).await?;
            if result.modified == 0 {
                return Err(Error::Backend(format!(
                    "quote for session {session_id} vanished before it could be updated"
                )));
            }
            info!(%session_id, "quote updated");

            Ok(SaveOutcome {
                action: SaveAction::Updated,
                record_id: existing.id,
            })
        }
        None => {
            let record_id = primary
                .insert_one(NewQuote::pending(session_id, email, form_data, now))
                .await?;
            info!(%session_id, "quote created");

            Ok(SaveOutcome {
                action: SaveAction::Created,
                record_id,
            })
        }
    }
}

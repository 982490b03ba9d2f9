use crate::quote::{FormData, NewQuote, Quote, QuoteStatus, timestamp};
use crate::quote_store::{SaveAction, SaveOutcome};
use crate::store::Error;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The local fallback store: one pretty-printed JSON file per session.
///
/// Records live at `<dir>/quote_<session_id>.json` and are rewritten whole on every
/// change. A crash in the middle of a write can leave a truncated file behind, which
/// later reads report as a decoding error.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub const FILE_PREFIX: &'static str = "quote_";
    pub const FILE_SUFFIX: &'static str = ".json";
    pub const ID_PREFIX: &'static str = "local_";

    /// Creates a store rooted at `dir`. The directory is created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file holding the quote for `session_id`.
    ///
    /// Fails for ids that could name a path outside the store directory.
    pub fn path_for(&self, session_id: &str) -> Result<PathBuf, Error> {
        let unsafe_id = matches!(session_id, "" | "." | "..")
            || session_id.contains(['/', '\\', '\0']);
        if unsafe_id {
            return Err(Error::InvalidSessionId(session_id.to_string()));
        }

        Ok(self
            .dir
            .join(format!("{}{session_id}{}", Self::FILE_PREFIX, Self::FILE_SUFFIX)))
    }

    async fn read(&self, path: &Path) -> Result<Option<Quote>, Error> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(Some(
                serde_json::from_str(&text).map_err(|e| Error::Decode(e.to_string()))?,
            )),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &Path, quote: &Quote) -> Result<(), Error> {
        let text = serde_json::to_string_pretty(quote).map_err(|e| Error::Encode(e.to_string()))?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(path, text).await?;
        Ok(())
    }

    /// Creates the session's quote, or replaces its form data if it already exists.
    ///
    /// An existing record keeps its `_id`, `email`, `status` and `created_at`.
    pub async fn save(
        &self,
        session_id: &str,
        email: &str,
        form_data: FormData,
    ) -> Result<SaveOutcome, Error> {
        let path = self.path_for(session_id)?;
        let now = timestamp::now();

        let quote = match self.read(&path).await? {
            Some(mut existing) => {
                existing.set_form_data(form_data, now);
                existing
            }
            None => NewQuote::pending(session_id, email, form_data, now)
                .with_id(format!("{}{session_id}", Self::ID_PREFIX)),
        };

        self.write(&path, &quote).await?;
        info!(%session_id, "quote saved locally");

        Ok(SaveOutcome {
            action: SaveAction::SavedLocally,
            record_id: quote.id,
        })
    }

    pub async fn get(&self, session_id: &str) -> Result<Quote, Error> {
        let path = self.path_for(session_id)?;
        self.read(&path).await?.ok_or(Error::NotFound)
    }

    pub async fn update_status(&self, session_id: &str, status: QuoteStatus) -> Result<(), Error> {
        let path = self.path_for(session_id)?;
        let mut quote = self.read(&path).await?.ok_or(Error::NotFound)?;

        quote.set_status(status, timestamp::now());
        self.write(&path, &quote).await?;
        info!(%session_id, status = %quote.status, "quote status updated locally");

        Ok(())
    }

    /// Gets every stored quote, newest first.
    ///
    /// Records are ordered by comparing the stored `created_at` text, which is
    /// chronological because the timestamp format is fixed-width.
    pub async fn get_all(&self) -> Result<Vec<Quote>, Error> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut quotes = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path
                .extension()
                .is_some_and(|ext| ext == Self::FILE_SUFFIX.trim_start_matches('.'));
            if !is_record || !entry.file_type().await?.is_file() {
                debug!(path = %path.display(), "skipping non-record entry");
                continue;
            }

            if let Some(quote) = self.read(&path).await? {
                let created_at = timestamp::format(&quote.created_at)
                    .map_err(|e| Error::Encode(e.to_string()))?;
                quotes.push((created_at, quote));
            }
        }

        quotes.sort_by(|(a, _), (b, _)| b.cmp(a));
        Ok(quotes.into_iter().map(|(_, quote)| quote).collect())
    }
}

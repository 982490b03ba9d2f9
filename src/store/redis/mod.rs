mod lua;

use crate::quote::{NewQuote, ObjectId, Quote, timestamp};
use crate::store::redis::lua::{
    FETCH_SCRIPT, FETCH_SCRIPT_HASH, INSERT_SCRIPT, INSERT_SCRIPT_HASH, UPDATE_SCRIPT,
    UPDATE_SCRIPT_HASH,
};
use crate::store::{
    Connect, DocumentStore, Error, QuoteUpdate, UpdateResult, decode_json, encode_json,
};
use fred::clients::Client;
use fred::interfaces::{ClientLike, KeysInterface, SortedSetsInterface};
use fred::prelude::{Builder, Config, LuaInterface};
use fred::types::Value;
use std::sync::Arc;
use time::OffsetDateTime;
use tokio::sync::OnceCell;
use tracing::warn;

/// Number of values `FETCH_SCRIPT` returns per document.
const DOCUMENT_FIELDS: usize = 7;

/// Upper bound on the keys passed to a single `FETCH_SCRIPT` call.
const FETCH_CHUNK: usize = 1000;

/// A Redis-backed document store.
///
/// Each quote is a Redis Hash at `<prefix>:quote:<session_id>` with one hash field per
/// quote field; `form_data` is kept as JSON text and the timestamps as fixed-width
/// ISO-8601 text. The sorted set `<prefix>:quotes` orders session ids by creation time
/// in microseconds.
///
/// Inserts and updates run as Lua scripts, so the existence check and the write are a
/// single atomic step on the server. An update only writes the targeted field and
/// `updated_at`, leaving the rest of the hash untouched.
#[derive(Clone, Debug)]
pub struct RedisStore<
    C: ClientLike + KeysInterface + SortedSetsInterface + LuaInterface + Clone + Send + Sync = Client,
> {
    client: Arc<C>,
    prefix: String,
}

impl<C> RedisStore<C>
where
    C: ClientLike + KeysInterface + SortedSetsInterface + LuaInterface + Clone + Send + Sync,
{
    pub const DEFAULT_PREFIX: &'static str = "quotestash";

    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            prefix: Self::DEFAULT_PREFIX.to_string(),
        }
    }

    /// Sets the namespace for every key this store touches.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    fn document_prefix(&self) -> String {
        format!("{}:quote:", self.prefix)
    }

    fn document_key(&self, session_id: &str) -> String {
        format!("{}{session_id}", self.document_prefix())
    }

    fn index_key(&self) -> String {
        format!("{}:quotes", self.prefix)
    }

    /// Loads the documents stored at `keys`, in order, skipping keys that no longer exist.
    async fn fetch(&self, keys: &[String]) -> Result<Vec<Quote>, Error> {
        let hash = script_hash(self.client.as_ref(), &FETCH_SCRIPT_HASH, FETCH_SCRIPT).await?;

        let mut quotes = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(FETCH_CHUNK) {
            let values: Vec<Option<String>> = self
                .client
                .evalsha(hash.as_str(), chunk.to_vec(), Vec::<String>::new())
                .await?;

            for document in values.chunks(DOCUMENT_FIELDS) {
                if let Some(quote) = decode_document(document)? {
                    quotes.push(quote);
                }
            }
        }

        Ok(quotes)
    }
}

/// Builds a quote from the values returned by `FETCH_SCRIPT` for one key.
///
/// A document without an `_id` does not exist.
fn decode_document(values: &[Option<String>]) -> Result<Option<Quote>, Error> {
    let [id, session_id, email, form_data, status, created_at, updated_at] = values else {
        return Err(Error::Decode(format!(
            "expected {DOCUMENT_FIELDS} document fields, got {}",
            values.len()
        )));
    };
    let Some(id) = id else {
        return Ok(None);
    };

    let field = |name: &str, value: &Option<String>| {
        value
            .clone()
            .ok_or_else(|| Error::Decode(format!("document {id} is missing `{name}`")))
    };
    let parse_ts = |name: &str, value: &Option<String>| -> Result<OffsetDateTime, Error> {
        timestamp::parse(&field(name, value)?).map_err(|e| Error::Decode(e.to_string()))
    };

    Ok(Some(Quote {
        id: id.clone(),
        session_id: field("session_id", session_id)?,
        email: field("email", email)?,
        form_data: decode_json(&field("form_data", form_data)?)?,
        status: field("status", status)?.into(),
        created_at: parse_ts("created_at", created_at)?,
        updated_at: parse_ts("updated_at", updated_at)?,
    }))
}

fn format_ts(ts: &OffsetDateTime) -> Result<String, Error> {
    timestamp::format(ts).map_err(|e| Error::Encode(e.to_string()))
}

async fn script_hash<C>(client: &C, once_cell: &OnceCell<String>, script: &str) -> Result<String, Error>
where
    C: LuaInterface + Send + Sync,
{
    let hash = once_cell
        .get_or_try_init(|| async {
            let hash = fred::util::sha1_hash(script);
            if !client.script_exists::<bool, _>(&hash).await? {
                let _: () = client.script_load(script).await?;
            }
            Ok::<String, fred::error::Error>(hash)
        })
        .await?;

    Ok(hash.clone())
}

impl<C> DocumentStore for RedisStore<C>
where
    C: ClientLike + KeysInterface + SortedSetsInterface + LuaInterface + Clone + Send + Sync + 'static,
{
    async fn ping(&self) -> Result<(), Error> {
        let _: i64 = self.client.exists(self.index_key()).await?;
        Ok(())
    }

    async fn find_one(&self, session_id: &str) -> Result<Option<Quote>, Error> {
        let mut quotes = self.fetch(&[self.document_key(session_id)]).await?;
        Ok(quotes.pop())
    }

    async fn insert_one(&self, quote: NewQuote) -> Result<String, Error> {
        let id = ObjectId::default().to_string();
        let score = (quote.created_at.unix_timestamp_nanos() / 1_000) as i64;

        let args: Vec<Value> = vec![
            id.clone().into(),
            quote.session_id.clone().into(),
            quote.email.into(),
            encode_json(&quote.form_data)?.into(),
            quote.status.as_str().into(),
            format_ts(&quote.created_at)?.into(),
            format_ts(&quote.updated_at)?.into(),
            score.into(),
        ];

        let hash = script_hash(self.client.as_ref(), &INSERT_SCRIPT_HASH, INSERT_SCRIPT).await?;
        let inserted: i64 = self
            .client
            .evalsha(
                hash,
                vec![self.document_key(&quote.session_id), self.index_key()],
                args,
            )
            .await?;

        if inserted == 0 {
            return Err(Error::Backend(format!(
                "a quote for session {} already exists",
                quote.session_id
            )));
        }

        Ok(id)
    }

    async fn update_one(&self, session_id: &str, update: QuoteUpdate) -> Result<UpdateResult, Error> {
        let (field, value, updated_at) = match &update {
            QuoteUpdate::FormData {
                form_data,
                updated_at,
            } => ("form_data", encode_json(form_data)?, updated_at),
            QuoteUpdate::Status { status, updated_at } => {
                ("status", status.as_str().to_string(), updated_at)
            }
        };

        let hash = script_hash(self.client.as_ref(), &UPDATE_SCRIPT_HASH, UPDATE_SCRIPT).await?;
        let modified: i64 = self
            .client
            .evalsha(
                hash,
                vec![self.document_key(session_id)],
                vec![field.to_string(), value, format_ts(updated_at)?],
            )
            .await?;

        Ok(UpdateResult {
            modified: modified as u64,
        })
    }

    async fn find_all(&self) -> Result<Vec<Quote>, Error> {
        let session_ids: Vec<String> = self
            .client
            .zrevrange(self.index_key(), 0, -1, false)
            .await?;
        if session_ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = session_ids
            .iter()
            .map(|session_id| self.document_key(session_id))
            .collect();
        self.fetch(&keys).await
    }

    async fn close(&self) {
        if let Err(e) = self.client.quit().await {
            warn!(error = %e, "closing redis connection failed");
        }
    }
}

impl Connect for RedisStore<Client> {
    async fn connect(uri: &str) -> Result<Self, Error> {
        let config = Config::from_url(uri)?;
        let client = Builder::from_config(config).build()?;
        client.init().await?;

        Ok(Self::new(Arc::new(client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn values(fields: [Option<&str>; DOCUMENT_FIELDS]) -> Vec<Option<String>> {
        fields.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_decode_document() {
        let quote = decode_document(&values([
            Some("65f0a1b2c3d4e5f6a7b8c9d0"),
            Some("s1"),
            Some("a@b.com"),
            Some(r#"{"colors":[],"size":{}}"#),
            Some("approved"),
            Some("2024-05-01T12:00:00.000000Z"),
            Some("2024-05-01T12:30:00.000000Z"),
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(quote.session_id, "s1");
        assert_eq!(quote.status.as_str(), "approved");
        assert_eq!(quote.form_data["colors"], json!([]));
        assert_eq!(quote.form_data["size"], json!({}));
        assert_eq!(quote.created_at, datetime!(2024-05-01 12:00:00 UTC));
        assert_eq!(quote.updated_at, datetime!(2024-05-01 12:30:00 UTC));
    }

    #[test]
    fn test_decode_missing_document() {
        assert_eq!(decode_document(&values([None; DOCUMENT_FIELDS])), Ok(None));
    }

    #[test]
    fn test_decode_incomplete_document() {
        let mut fields = [Some("x"); DOCUMENT_FIELDS];
        fields[4] = None;
        assert!(matches!(
            decode_document(&values(fields)),
            Err(Error::Decode(_))
        ));
        assert!(matches!(decode_document(&[]), Err(Error::Decode(_))));
    }
}

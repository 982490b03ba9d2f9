//! # Quotestash: quote request storage with local failover
//!
//! `quotestash` persists quote request form submissions keyed by a session id. Every
//! operation first goes to a networked document store (the primary) and, when that
//! store is unreachable or fails, to a directory of JSON files on local disk (the
//! fallback). Callers see the same interface either way.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quotestash::{FormData, QuoteStore, Reply};
//! use quotestash::store::file::FileStore;
//! use quotestash::store::memory::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Quotes land in `./quotes` whenever the primary cannot be used.
//!     let fallback = FileStore::new("quotes");
//!
//!     // Connection and health check happen once, here.
//!     let store: QuoteStore<MemoryStore> = QuoteStore::connect("memory://", fallback).await;
//!
//!     let mut form = FormData::new();
//!     form.insert("sign_type".to_string(), "neon".into());
//!     form.insert("width_cm".to_string(), 120.into());
//!
//!     let saved: Reply = store.save("session-1", "a@b.com", form).await.into();
//!     assert!(saved.success);
//!
//!     store.update_status("session-1", "approved").await.unwrap();
//!
//!     let quote = store.get("session-1").await.unwrap();
//!     assert_eq!(quote.status.as_str(), "approved");
//!
//!     store.close().await;
//! }
//! ```
//!
//! # Operations
//!
//! | operation                           | primary                               | fallback                      |
//! |-------------------------------------|---------------------------------------|-------------------------------|
//! | `save(session_id, email, form)`     | update if the session exists, else insert | merge into `quote_<id>.json` |
//! | `get(session_id)`                   | find by session                       | read the session's file       |
//! | `update_status(session_id, status)` | targeted field update                 | rewrite the session's file    |
//! | `get_all()`                         | all quotes, newest first              | every file, newest first      |
//!
//! A quote missing from the primary is a final answer: the fallback is consulted only
//! when the primary *fails*. Results convert into a [`Reply`], the
//! `{"success": ..., ...}` shape consumed by callers.
//!
//! # Stores
//!
//! ## Redis
//!
//! Requires the `redis-store` feature.
//!
//! ```rust,ignore
//! use quotestash::QuoteStore;
//! use quotestash::store::file::FileStore;
//! use quotestash::store::redis::RedisStore;
//!
//! # async fn run() {
//! let store: QuoteStore<RedisStore> =
//!     QuoteStore::connect("redis://127.0.0.1:6379", FileStore::new("quotes")).await;
//! # }
//! ```
//!
//! ## Postgres
//!
//! Requires the `postgres-store` feature. Connecting creates the `t_quotes` table if it
//! doesn't exist; use [`PostgresStoreBuilder`](store::postgres::PostgresStoreBuilder)
//! with [`QuoteStore::with_primary`] for a custom schema or table name.
//!
//! ```rust,ignore
//! use quotestash::QuoteStore;
//! use quotestash::store::file::FileStore;
//! use quotestash::store::postgres::PostgresStore;
//!
//! # async fn run() {
//! let store: QuoteStore<PostgresStore> =
//!     QuoteStore::connect("postgres://localhost/quotes", FileStore::new("quotes")).await;
//! # }
//! ```
//!
//! ## Memory
//!
//! [`MemoryStore`](store::memory::MemoryStore) keeps documents in process and can be
//! switched unavailable at runtime, which makes it the primary of choice in tests.
//!
//! # Important Notes
//!
//! - The primary is chosen once, at construction. A store that started disconnected
//!   stays disconnected.
//! - Quotes written to the fallback are not copied to the primary once it is back.
//! - Concurrent saves for the same session are not serialized; the last write wins.

mod config;
pub use config::*;

mod quote;
pub use quote::*;

mod quote_store;
pub use quote_store::*;

mod reply;
pub use reply::*;

pub mod store;

pub use time;

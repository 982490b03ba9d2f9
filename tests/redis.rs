#![cfg(feature = "redis-store")]

mod common;

#[cfg(test)]
mod tests {
    use super::common::{sign_form, tick};
    use quotestash::store::file::FileStore;
    use quotestash::store::redis::RedisStore;
    use quotestash::store::{Connect, DocumentStore, QuoteUpdate};
    use quotestash::{Mode, NewQuote, QuoteStore, SaveAction, timestamp};
    use time::Duration;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())
    }

    /// A store namespaced under a random prefix so tests never see each other's keys.
    async fn setup_redis() -> RedisStore {
        <RedisStore>::connect(&redis_url())
            .await
            .unwrap()
            .with_prefix(format!("quotestash_test_{}", rand::random::<u32>()))
    }

    #[tokio::test]
    async fn test_insert_find_update() {
        let store = setup_redis().await;
        store.ping().await.unwrap();
        assert!(store.find_one("s1").await.unwrap().is_none());

        let quote = quotestash::NewQuote::pending("s1", "a@b.com", sign_form("neon"), timestamp::now());
        let id = store.insert_one(quote).await.unwrap();

        let found = store.find_one("s1").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.form_data, sign_form("neon"));

        let result = store
            .update_one(
                "s1",
                QuoteUpdate::Status {
                    status: "approved".into(),
                    updated_at: timestamp::now(),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.modified, 1);
        assert_eq!(store.find_one("s1").await.unwrap().unwrap().status.as_str(), "approved");

        let missing = store
            .update_one(
                "s2",
                QuoteUpdate::Status {
                    status: "approved".into(),
                    updated_at: timestamp::now(),
                },
            )
            .await
            .unwrap();
        assert_eq!(missing.modified, 0);
        store.close().await;
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let store = setup_redis().await;
        let quote = quotestash::NewQuote::pending("s1", "a@b.com", sign_form("neon"), timestamp::now());

        store.insert_one(quote.clone()).await.unwrap();
        assert!(store.insert_one(quote).await.is_err());
        store.close().await;
    }

    #[tokio::test]
    async fn test_interleaved_updates_keep_both_fields() {
        let store = setup_redis().await;
        store
            .insert_one(NewQuote::pending("s1", "a@b.com", sign_form("neon"), timestamp::now()))
            .await
            .unwrap();

        let (status, form) = tokio::join!(
            store.update_one(
                "s1",
                QuoteUpdate::Status {
                    status: "approved".into(),
                    updated_at: timestamp::now(),
                },
            ),
            store.update_one(
                "s1",
                QuoteUpdate::FormData {
                    form_data: sign_form("led"),
                    updated_at: timestamp::now(),
                },
            ),
        );
        assert_eq!(status.unwrap().modified, 1);
        assert_eq!(form.unwrap().modified, 1);

        let found = store.find_one("s1").await.unwrap().unwrap();
        assert_eq!(found.status.as_str(), "approved");
        assert_eq!(found.form_data, sign_form("led"));
        assert!(found.updated_at >= found.created_at);
        store.close().await;
    }

    #[tokio::test]
    async fn test_concurrent_status_and_save_over_redis() {
        let tmp = tempfile::tempdir().unwrap();
        let store = QuoteStore::with_primary(setup_redis().await, FileStore::new(tmp.path())).await;
        store.save("s1", "a@b.com", sign_form("neon")).await.unwrap();

        for round in 0..20 {
            let status = format!("reviewed_{round}");
            let sign_type = format!("led_{round}");
            let (updated, saved) = tokio::join!(
                store.update_status("s1", status.as_str()),
                store.save("s1", "a@b.com", sign_form(&sign_type)),
            );
            updated.unwrap();
            assert_eq!(saved.unwrap().action, SaveAction::Updated);

            let found = store.get("s1").await.unwrap();
            assert_eq!(found.status.as_str(), status);
            assert_eq!(found.form_data, sign_form(&sign_type));
        }

        store.close().await;
    }

    #[tokio::test]
    async fn test_find_all_spans_fetch_chunks() {
        let store = setup_redis().await;
        let start = timestamp::now();
        let count = 2_500;

        for i in 0..count {
            let created_at = start + Duration::microseconds(i);
            let quote = NewQuote::pending(&format!("s{i}"), "a@b.com", sign_form("neon"), created_at);
            store.insert_one(quote).await.unwrap();
        }

        let quotes = store.find_all().await.unwrap();
        assert_eq!(quotes.len(), count as usize);
        assert_eq!(quotes[0].session_id, format!("s{}", count - 1));
        assert_eq!(quotes[quotes.len() - 1].session_id, "s0");
        assert!(quotes.windows(2).all(|w| w[0].created_at > w[1].created_at));
        store.close().await;
    }

    #[tokio::test]
    async fn test_quote_store_over_redis() {
        let tmp = tempfile::tempdir().unwrap();
        let store = QuoteStore::with_primary(setup_redis().await, FileStore::new(tmp.path())).await;
        assert_eq!(store.mode(), Mode::Connected);

        for session in ["s1", "s2", "s3"] {
            let outcome = store.save(session, "a@b.com", sign_form(session)).await.unwrap();
            assert_eq!(outcome.action, SaveAction::Created);
            tick().await;
        }
        let outcome = store.save("s1", "a@b.com", sign_form("led")).await.unwrap();
        assert_eq!(outcome.action, SaveAction::Updated);

        let sessions: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.session_id)
            .collect();
        assert_eq!(sessions, ["s3", "s2", "s1"]);
        assert_eq!(store.get("s1").await.unwrap().form_data, sign_form("led"));
        assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());

        store.close().await;
    }

    #[tokio::test]
    async fn test_unreachable_redis_runs_locally() {
        let tmp = tempfile::tempdir().unwrap();
        let store: QuoteStore<RedisStore> =
            QuoteStore::connect("redis://127.0.0.1:1", FileStore::new(tmp.path())).await;
        assert_eq!(store.mode(), Mode::Disconnected);

        let outcome = store.save("s1", "a@b.com", sign_form("neon")).await.unwrap();
        assert_eq!(outcome.action, SaveAction::SavedLocally);
    }
}

#![cfg(feature = "postgres-store")]

mod common;

#[cfg(test)]
mod tests {
    use super::common::{sign_form, tick};
    use quotestash::store::file::FileStore;
    use quotestash::store::postgres::{PostgresStore, PostgresStoreBuilder};
    use quotestash::store::{DocumentStore, QuoteUpdate};
    use quotestash::{Mode, NewQuote, QuoteStore, SaveAction, timestamp};
    use sqlx::PgPool;

    /// A store over a fresh, randomly named table.
    async fn setup_store() -> PostgresStore {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
        let pool = PgPool::connect(&database_url).await.unwrap();

        PostgresStoreBuilder::new(pool, true)
            .table_name(format!("quotes_{}", rand::random::<u32>()))
            .build()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_find_update() {
        let store = setup_store().await;
        store.ping().await.unwrap();

        let created = timestamp::now();
        let id = store
            .insert_one(NewQuote::pending("s1", "a@b.com", sign_form("neon"), created))
            .await
            .unwrap();

        let found = store.find_one("s1").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.created_at, created);
        assert_eq!(found.form_data, sign_form("neon"));

        let result = store
            .update_one(
                "s1",
                QuoteUpdate::FormData {
                    form_data: sign_form("led"),
                    updated_at: timestamp::now(),
                },
            )
            .await
            .unwrap();
        assert_eq!(result.modified, 1);

        let updated = store.find_one("s1").await.unwrap().unwrap();
        assert_eq!(updated.form_data, sign_form("led"));
        assert_eq!(updated.created_at, created);
        assert!(updated.updated_at >= created);

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
    }

    #[tokio::test]
    async fn test_quote_store_over_postgres() {
        let tmp = tempfile::tempdir().unwrap();
        let store = QuoteStore::with_primary(setup_store().await, FileStore::new(tmp.path())).await;
        assert_eq!(store.mode(), Mode::Connected);

        for session in ["s1", "s2", "s3"] {
            store.save(session, "a@b.com", sign_form(session)).await.unwrap();
            tick().await;
        }
        let outcome = store.save("s2", "a@b.com", sign_form("led")).await.unwrap();
        assert_eq!(outcome.action, SaveAction::Updated);

        store.update_status("s2", "approved").await.unwrap();
        assert_eq!(store.get("s2").await.unwrap().status.as_str(), "approved");

        let sessions: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.session_id)
            .collect();
        assert_eq!(sessions, ["s3", "s2", "s1"]);

        store.close().await;
    }
}

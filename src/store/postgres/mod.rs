use crate::quote::{FormData, NewQuote, ObjectId, Quote, QuoteStatus};
use crate::store::{Connect, DocumentStore, Error, QuoteUpdate, UpdateResult};
use sqlx::PgPool;
use sqlx::types::Json;
use time::OffsetDateTime;

/// A builder for creating a `PostgresStore`.
///
/// This allows for customizing the table and schema names for quote storage.
#[derive(Debug)]
pub struct PostgresStoreBuilder {
    pool: PgPool,
    table_name: String,
    create_table: bool,
    schema_name: Option<String>,
}

impl PostgresStoreBuilder {
    /// Creates a new builder with a database pool and default settings.
    pub fn new(pool: PgPool, create_table: bool) -> Self {
        Self {
            pool,
            table_name: "t_quotes".to_string(),
            create_table,
            schema_name: None,
        }
    }

    /// Sets a custom table name for the quote store. Defaults to "t_quotes".
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Sets a custom schema name for the quote store.
    pub fn schema_name(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    /// Builds the `PostgresStore`, creating the schema and table if they don't exist.
    pub async fn build(self) -> Result<PostgresStore, sqlx::Error> {
        let table_name = match &self.schema_name {
            Some(schema) => format!("\"{}\".\"{}\"", schema, self.table_name),
            None => format!("\"{}\"", self.table_name),
        };

        if self.create_table {
            if let Some(schema) = &self.schema_name {
                sqlx::query(&format!("create schema if not exists \"{schema}\""))
                    .execute(&self.pool)
                    .await?;
            }

            sqlx::raw_sql(&format!(
                r#"
                create table if not exists {table_name} (
                    id text primary key,
                    session_id text not null,
                    email text not null,
                    form_data jsonb not null,
                    status text not null,
                    created_at timestamptz not null,
                    updated_at timestamptz not null
                );
                create index if not exists idx_{index}_session_id on {table_name}(session_id);
                create index if not exists idx_{index}_created_at on {table_name}(created_at);
                "#,
                index = self.table_name,
            ))
            .execute(&self.pool)
            .await?;
        }

        Ok(PostgresStore {
            pool: self.pool,
            table_name,
        })
    }
}

/// A Postgres-backed document store.
///
/// Form answers are kept as `jsonb`. When several rows share a session id, the oldest
/// one is the session's quote.
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
    table_name: String,
}

type QuoteRow = (
    String,
    String,
    String,
    Json<FormData>,
    String,
    OffsetDateTime,
    OffsetDateTime,
);

fn quote_from_row(row: QuoteRow) -> Quote {
    let (id, session_id, email, Json(form_data), status, created_at, updated_at) = row;
    Quote {
        id,
        session_id,
        email,
        form_data,
        status: QuoteStatus::from(status),
        created_at,
        updated_at,
    }
}

impl PostgresStore {
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DocumentStore for PostgresStore {
    async fn ping(&self) -> Result<(), Error> {
        sqlx::query("select 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_one(&self, session_id: &str) -> Result<Option<Quote>, Error> {
        let query = format!(
            r#"
            select id, session_id, email, form_data, status, created_at, updated_at
            from {table}
            where session_id = $1
            order by created_at asc
            limit 1
            "#,
            table = self.table_name
        );

        let row: Option<QuoteRow> = sqlx::query_as(&query)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(quote_from_row))
    }

    async fn insert_one(&self, quote: NewQuote) -> Result<String, Error> {
        let id = ObjectId::default().to_string();
        let query = format!(
            r#"
            insert into {table} (id, session_id, email, form_data, status, created_at, updated_at)
            values ($1, $2, $3, $4, $5, $6, $7)
            "#,
            table = self.table_name
        );

        sqlx::query(&query)
            .bind(&id)
            .bind(&quote.session_id)
            .bind(&quote.email)
            .bind(Json(&quote.form_data))
            .bind(quote.status.as_str())
            .bind(quote.created_at)
            .bind(quote.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn update_one(&self, session_id: &str, update: QuoteUpdate) -> Result<UpdateResult, Error> {
        let (column, updated_at) = match &update {
            QuoteUpdate::FormData { updated_at, .. } => ("form_data", *updated_at),
            QuoteUpdate::Status { updated_at, .. } => ("status", *updated_at),
        };

        let query = format!(
            r#"
            update {table}
            set {column} = $2, updated_at = greatest($3, created_at)
            where id = (
                select id from {table}
                where session_id = $1
                order by created_at asc
                limit 1
            )
            "#,
            table = self.table_name
        );

        let query = sqlx::query(&query).bind(session_id);
        let query = match update {
            QuoteUpdate::FormData { form_data, .. } => query.bind(Json(form_data)),
            QuoteUpdate::Status { status, .. } => query.bind(status.as_str().to_string()),
        };
        let result = query.bind(updated_at).execute(&self.pool).await?;

        Ok(UpdateResult {
            modified: result.rows_affected(),
        })
    }

    async fn find_all(&self) -> Result<Vec<Quote>, Error> {
        let query = format!(
            r#"
            select id, session_id, email, form_data, status, created_at, updated_at
            from {table}
            order by created_at desc
            "#,
            table = self.table_name
        );

        let rows: Vec<QuoteRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(quote_from_row).collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

impl Connect for PostgresStore {
    async fn connect(uri: &str) -> Result<Self, Error> {
        let pool = PgPool::connect(uri).await?;
        Ok(PostgresStoreBuilder::new(pool, true).build().await?)
    }
}

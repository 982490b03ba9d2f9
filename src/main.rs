//! `quotestash` command line: save, read and list quotes from a shell.
//!
//! Every command prints the JSON reply on stdout; logs go to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use quotestash::store::DocumentStore;
use quotestash::store::file::FileStore;
use quotestash::store::memory::MemoryStore;
use quotestash::{Config, FormData, QuoteStore, Reply};

/// Store and inspect quote requests
#[derive(Parser, Debug)]
#[command(name = "quotestash")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the session's quote, or replace its form data
    Save {
        session_id: String,
        email: String,
        /// Form answers as a JSON object
        form_data: String,
    },
    /// Show the session's quote
    Get { session_id: String },
    /// Set the status of the session's quote
    Status { session_id: String, status: String },
    /// List every quote, newest first
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn,quotestash=info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::debug!(?config, "configuration loaded");

    let fallback = FileStore::new(&config.store_dir);
    let scheme = config
        .store_uri
        .split_once("://")
        .map(|(scheme, _)| scheme)
        .unwrap_or_default();

    let reply = match scheme {
        "memory" => {
            let store: QuoteStore<MemoryStore> = QuoteStore::connect(&config.store_uri, fallback).await;
            run(store, cli.command).await?
        }
        #[cfg(feature = "redis-store")]
        "redis" | "rediss" => {
            let store: QuoteStore<quotestash::store::redis::RedisStore> =
                QuoteStore::connect(&config.store_uri, fallback).await;
            run(store, cli.command).await?
        }
        #[cfg(feature = "postgres-store")]
        "postgres" | "postgresql" => {
            let store: QuoteStore<quotestash::store::postgres::PostgresStore> =
                QuoteStore::connect(&config.store_uri, fallback).await;
            run(store, cli.command).await?
        }
        _ => {
            tracing::warn!(
                uri = %config.store_uri,
                "no primary store available for this uri, quotes will be stored locally only"
            );
            let store: QuoteStore<MemoryStore> = QuoteStore::fallback_only(fallback);
            run(store, cli.command).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}

async fn run<P: DocumentStore>(store: QuoteStore<P>, command: Command) -> anyhow::Result<Reply> {
    let reply = match command {
        Command::Save {
            session_id,
            email,
            form_data,
        } => {
            let form_data: FormData =
                serde_json::from_str(&form_data).context("form data must be a JSON object")?;
            store.save(&session_id, &email, form_data).await.into()
        }
        Command::Get { session_id } => store.get(&session_id).await.into(),
        Command::Status { session_id, status } => {
            store.update_status(&session_id, status).await.into()
        }
        Command::List => store.get_all().await.into(),
    };

    store.close().await;
    Ok(reply)
}

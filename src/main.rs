use std::{env, io, process};

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use syllabus_sync::cache::{Cache, Config as CacheConfig};
use syllabus_sync::cli;
use syllabus_sync::extract::Extractor;
use syllabus_sync::server::{router, App};

const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const LOG_FILTER: &str = "SYLLABUS_SYNC_LOG";

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let Ok(api_key) = env::var(GEMINI_API_KEY) else {
        eprintln!("The `{GEMINI_API_KEY}` environment variable is required");
        process::exit(1);
    };

    let extractor = Extractor::new(api_key, args.model);
    let cache = Cache::new(CacheConfig {
        enabled: args.enable_cache,
        ttl: args.cache_ttl,
    });

    let app = App::new(extractor, cache);

    let listener = TcpListener::bind(args.address).await?;
    info!("listening at http://{}", args.address);

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install the shutdown handler");
        return;
    }

    info!("shutting down");
}

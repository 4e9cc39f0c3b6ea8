use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use departures_server::config::AppConfig;
use departures_server::feed::{FeedFetcher, FetchConfig};
use departures_server::ingest::Ingestor;
use departures_server::store::{
    DurableStore, FreshStore, FreshStoreConfig, HttpKvStore, KvStoreConfig, ReadPath,
};
use departures_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let fetch_config = FetchConfig::new(&config.feed_base_url, &config.feed_type)
        .with_timeout(config.http_timeout_secs);
    let fetcher = FeedFetcher::new(fetch_config).expect("failed to create feed fetcher");

    let fresh = Arc::new(FreshStore::new(&FreshStoreConfig::default()));

    let durable: Option<Arc<dyn DurableStore>> = match &config.kv {
        Some(kv) => {
            let store = HttpKvStore::new(
                KvStoreConfig::new(&kv.endpoint, &kv.token).with_timeout(config.http_timeout_secs),
            )
            .expect("failed to create durable store client");
            Some(Arc::new(store))
        }
        None => {
            info!("no durable store configured, running volatile-only");
            None
        }
    };

    let read_path = ReadPath::new(fresh.clone(), durable.clone());
    let ingestor = Ingestor::new(fetcher, fresh, durable);

    let state = AppState::new(read_path, ingestor);
    let app = create_router(state);

    info!(addr = %config.bind_addr, "departures server listening");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}

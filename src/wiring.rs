//! Builds the hub and its collaborators from configuration.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use tracing::info;

use scrapehub_clients::{
    FileJobStore, GraphqlJobStore, HttpScrapeExecutor, MemoryJobStore, MemoryResultCache,
    UpstashCache,
};
use scrapehub_config::{CacheBackend, CacheConfig, Config, ExecutorConfig, StoreBackend, StoreConfig};
use scrapehub_core::{JobStore, ResultCache, ScrapeExecutor};
use scrapehub_scheduler::{CachePolicy, HubConfig, ScrapeHub};

type BoxResult<T> = Result<T, Box<dyn Error>>;

pub(crate) async fn build_store(config: &StoreConfig) -> BoxResult<Arc<dyn JobStore>> {
    let store: Arc<dyn JobStore> = match config.backend {
        StoreBackend::Graphql => {
            let endpoint = config
                .endpoint
                .as_deref()
                .ok_or("store.endpoint is required for the graphql backend")?;
            let mut store = GraphqlJobStore::new(endpoint)
                .with_timeout(Duration::from_secs(config.timeout_secs));
            if let Some(token) = &config.token {
                store = store.with_token(token);
            }
            info!("Job store: GraphQL at {}", endpoint);
            Arc::new(store)
        }
        StoreBackend::File => {
            let path = config.data_dir();
            info!("Job store: files under {}", path.display());
            Arc::new(FileJobStore::new(path).await?)
        }
        StoreBackend::Memory => {
            info!("Job store: in-memory (empty)");
            Arc::new(MemoryJobStore::new())
        }
    };
    Ok(store)
}

pub(crate) fn build_cache(config: &CacheConfig) -> BoxResult<Arc<dyn ResultCache>> {
    let cache: Arc<dyn ResultCache> = match config.backend {
        CacheBackend::Upstash => {
            let url = config
                .url
                .as_deref()
                .ok_or("cache.url is required for the upstash backend")?;
            let token = config
                .token
                .as_deref()
                .ok_or("cache.token is required for the upstash backend")?;
            info!("Result cache: Upstash at {}", url);
            Arc::new(UpstashCache::new(url, token))
        }
        CacheBackend::Memory => {
            info!("Result cache: in-memory");
            Arc::new(MemoryResultCache::new())
        }
    };
    Ok(cache)
}

pub(crate) fn build_executor(config: &ExecutorConfig) -> BoxResult<Arc<dyn ScrapeExecutor>> {
    let url = config.url.as_deref().ok_or("executor.url is required")?;
    let mut executor = HttpScrapeExecutor::new(url);
    if let Some(token) = &config.token {
        executor = executor.with_token(token);
    }
    if let Some(secs) = config.timeout_secs {
        executor = executor.with_timeout(Duration::from_secs(secs));
    }
    info!("Scrape executor: {}", url);
    Ok(Arc::new(executor))
}

pub(crate) fn hub_config(config: &Config) -> BoxResult<HubConfig> {
    Ok(HubConfig {
        timezone: parse_timezone(&config.scheduler.timezone)?,
        cache: CachePolicy {
            key_prefix: config.cache.key_prefix.clone(),
            ttl: config.cache.ttl_secs.map(Duration::from_secs),
        },
    })
}

pub(crate) fn parse_timezone(name: &str) -> BoxResult<Tz> {
    name.parse::<Tz>()
        .map_err(|e| format!("unknown timezone '{}': {}", name, e).into())
}

pub(crate) async fn build_hub(config: &Config) -> BoxResult<Arc<ScrapeHub>> {
    let store = build_store(&config.store).await?;
    let cache = build_cache(&config.cache)?;
    let executor = build_executor(&config.executor)?;
    Ok(Arc::new(ScrapeHub::new(hub_config(config)?, store, cache, executor)))
}

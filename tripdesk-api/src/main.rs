use std::sync::Arc;
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tripdesk_api::{app, metrics::Metrics, state::{AppState, AuthConfig}};
use tripdesk_catalog::{PricingConfig, PricingEngine};
use tripdesk_store::app_config::Config;
use tripdesk_store::memory::{
    MemoryBookingRepository, MemoryCache, MemoryMemberRepository, MemoryProductRepository, MemoryTripRepository,
};
use tripdesk_store::{
    DbClient, RedisClient, StoreBookingRepository, StoreMemberRepository, StoreProductRepository,
    StoreTripRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripdesk_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    let in_memory = config.server.in_memory || std::env::args().any(|a| a == "--memory");
    tracing::info!("Starting TripDesk API on port {}", config.server.port);

    let app_state = if in_memory {
        tracing::warn!("Serving from in-memory repositories; data is lost on exit");
        memory_state(&config)?
    } else {
        store_state(&config).await?
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await?;

    Ok(())
}

async fn store_state(config: &Config) -> anyhow::Result<AppState> {
    // Postgres Connection
    let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;
    let business_rules = db.fetch_business_rules(config.business_rules.clone()).await?;

    // Redis Connection
    let redis = RedisClient::new(&config.redis.url).await?;

    // SSE Broadcast Channel
    let (events, _) = broadcast::channel(100);

    Ok(AppState {
        trips: Arc::new(StoreTripRepository::new(db.pool.clone())),
        bookings: Arc::new(StoreBookingRepository::new(db.pool.clone())),
        products: Arc::new(StoreProductRepository::new(db.pool.clone())),
        members: Arc::new(StoreMemberRepository::new(db.pool.clone())),
        cache: Arc::new(redis),
        events,
        pricing: Arc::new(PricingEngine::new(PricingConfig { currency: business_rules.currency.clone() })),
        auth: auth_config(config),
        business_rules,
        metrics: Arc::new(Metrics::new()?),
    })
}

fn memory_state(config: &Config) -> anyhow::Result<AppState> {
    let (events, _) = broadcast::channel(100);
    let business_rules = config.business_rules.clone();

    Ok(AppState {
        trips: Arc::new(MemoryTripRepository::default()),
        bookings: Arc::new(MemoryBookingRepository::default()),
        products: Arc::new(MemoryProductRepository::default()),
        members: Arc::new(MemoryMemberRepository::default()),
        cache: Arc::new(MemoryCache::default()),
        events,
        pricing: Arc::new(PricingEngine::new(PricingConfig { currency: business_rules.currency.clone() })),
        auth: auth_config(config),
        business_rules,
        metrics: Arc::new(Metrics::new()?),
    })
}

fn auth_config(config: &Config) -> AuthConfig {
    AuthConfig {
        secret: config.auth.jwt_secret.clone(),
    }
}

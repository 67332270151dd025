use actix_web::{App, HttpServer};
use db_pool::{create_pool, DbConfig};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yatube_service::cache::PageCache;
use yatube_service::middleware::MetricsMiddleware;
use yatube_service::{db, routes, AppServices, Config};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn connect_cache(config: &Config) -> PageCache {
    let Some(url) = config.cache.url.as_deref() else {
        tracing::info!("REDIS_URL not set; index page cache disabled");
        return PageCache::disabled();
    };

    let client = match redis::Client::open(url) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("Invalid REDIS_URL ({}); index page cache disabled", e);
            return PageCache::disabled();
        }
    };

    match redis::aio::ConnectionManager::new(client).await {
        Ok(manager) => {
            tracing::info!("Connected to Redis; index pages cached for {}s", config.cache.index_ttl_secs);
            PageCache::new(manager, config.cache.index_ttl_secs)
        }
        Err(e) => {
            tracing::warn!("Redis unavailable ({}); index page cache disabled", e);
            PageCache::disabled()
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting yatube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let mut db_cfg = DbConfig::from_env("yatube-service");
    if db_cfg.database_url.is_empty() {
        db_cfg.database_url = config.database.url.clone();
    }

    db_cfg.log_config();
    let db_pool = match create_pool(db_cfg).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = db::run_migrations(&db_pool).await {
        tracing::error!("Database migrations failed: {}", e);
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to run migrations: {e}"),
        ));
    }

    tokio::fs::create_dir_all(&config.media.root).await?;
    tracing::info!("Serving media from {}", config.media.root.display());

    let cache = connect_cache(&config).await;
    let services = AppServices::new(db_pool, cache, &config);

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let server = HttpServer::new(move || {
        let services = services.clone();
        App::new()
            .configure(|cfg| services.register(cfg))
            .configure(routes::configure)
            .wrap(routes::error_pages())
            .wrap(services.session_middleware())
            .wrap(MetricsMiddleware)
            .wrap(tracing_actix_web::TracingLogger::default())
    })
    .bind(&bind_address)?
    .workers(config.app.workers)
    .run();

    let handle = server.handle();
    actix_rt::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await?;
    tracing::info!("yatube-service stopped");
    Ok(())
}

use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

use anyhow::Context;
use clap::Parser;

/// Demo recorder service.
#[derive(Debug, Parser)]
#[command(name = "server")]
#[command(about = "Parses uploaded demo logs into match documents")]
struct Args {
    /// Port the HTTP server listens on.
    #[arg(long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Directory demo uploads are spooled to while parsing.
    #[arg(long, env = "UPLOAD_DIR", default_value = "data/uploads")]
    upload_dir: std::path::PathBuf,

    /// Directory finished match documents are written to.
    #[arg(long, env = "MATCH_DIR", default_value = "data/matches")]
    match_dir: std::path::PathBuf,

    /// Directory holding map configs and radar images.
    #[arg(long, env = "MAPS_DIR", default_value = "assets/maps")]
    maps_dir: std::path::PathBuf,

    /// Directory the built frontend is served from.
    #[arg(long, env = "WEB_DIR", default_value = "web/dist")]
    web_dir: std::path::PathBuf,

    /// Upper bound in map units when matching a smoke bloom to its throw,
    /// unlimited when unset.
    #[arg(long, env = "GRENADE_MATCH_DISTANCE")]
    grenade_match_distance: Option<f64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        );
    tracing::subscriber::set_global_default(registry)?;

    tracing::info!("Starting...");

    for dir in [&args.upload_dir, &args.match_dir] {
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Creating {}", dir.display()))?;
        }
    }

    let maps = server::maps::MapRegistry::load(&args.maps_dir);
    tracing::info!(maps = maps.len(), "Loaded map configs");

    let state = std::sync::Arc::new(server::api::AppState {
        jobs: server::jobs::JobStore::default(),
        maps,
        storage: Box::new(server::storage::FileStorage::new(&args.upload_dir)),
        match_dir: args.match_dir.clone(),
        collect: collector::Config {
            max_grenade_match_distance: args.grenade_match_distance,
            ..collector::Config::default()
        },
    });

    let router = axum::Router::new()
        .nest("/api/", server::api::router(state))
        .fallback_service(
            tower_http::services::ServeDir::new(&args.web_dir).not_found_service(
                tower_http::services::ServeFile::new(args.web_dir.join("index.html")),
            ),
        )
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::compression::CompressionLayer::new());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", args.port))
        .await
        .with_context(|| format!("Binding port {}", args.port))?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;

    Ok(())
}

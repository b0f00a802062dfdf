use std::{path::Path, sync::Arc};

use anyhow::Context;
use jellyfin_manga_source::{
    config::Config,
    jellyfin_client::HttpClientFactory,
    session::Session,
    source::JellyfinSource,
    source_api::SourceApi,
    storage::DbSettingsStore,
};
use migration::MigratorTrait;
use poem::{
    EndpointExt, Route, Server,
    listener::TcpListener,
    middleware::{Cors, Tracing as PoemTracing},
};
use poem_openapi::OpenApiService;
use sea_orm::Database;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,poem=info,reqwest=warn,h2=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "starting Jellyfin manga source"
    );
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let db_conn = Database::connect(&config.db_connection_string)
        .await
        .with_context(|| "Failed to connect to database")?;

    migration::Migrator::up(&db_conn, None)
        .await
        .with_context(|| "Failed to run database migrations")?;

    let session = Session::new(Arc::new(DbSettingsStore::new(db_conn)), config.source_id);
    if let Some(server_url) = config.server_url.as_deref() {
        session
            .set_server_url(server_url)
            .await
            .with_context(|| "Failed to store JELLYFIN_SERVER_URL")?;
    }
    if let Some(api_key) = config.api_key.as_deref() {
        session
            .set_api_key(api_key)
            .await
            .with_context(|| "Failed to store JELLYFIN_API_KEY")?;
    }
    tracing::info!(
        source_id = %config.source_id,
        server_url = %session.server_url().await?,
        has_api_key = !session.api_key().await?.is_empty(),
        "configured source"
    );

    let factory = HttpClientFactory::new().with_context(|| "Failed to build HTTP client")?;
    let source = JellyfinSource::new(session, Arc::new(factory));
    serve(Arc::new(source), &config.bind_addr).await
}

async fn serve(source: Arc<JellyfinSource>, bind_addr: &str) -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let api = SourceApi { source };
    let api_service = OpenApiService::new(api, "Jellyfin Manga Source API", version)
        .server(format!("http://{}", bind_addr));
    let ui = api_service.rapidoc();
    let spec = api_service.spec();
    let route = Route::new()
        .nest("/", api_service)
        .nest("/ui", ui)
        .nest("/spec", poem::endpoint::make_sync(move |_| spec.clone()))
        .with(Cors::new())
        .with(PoemTracing);

    tracing::info!(%bind_addr, "starting HTTP server");
    Server::new(TcpListener::bind(bind_addr)).run(route).await?;
    Ok(())
}

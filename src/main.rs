use std::sync::Arc;

use tracing::info;

use stocktrace_api::{
    app_router,
    config::AppConfig,
    db, events, logging, AppServices, AppState, Collaborators,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config.log_level);

    let pool = db::establish_connection_from_app_config(&config).await?;
    if config.auto_migrate {
        db::run_migrations(&pool).await?;
    }
    let pool = Arc::new(pool);

    let (event_sender, receiver) = events::channel(config.event_channel_capacity);
    tokio::spawn(events::process_events(receiver));
    let event_sender = Arc::new(event_sender);

    let services = AppServices::build(
        pool.clone(),
        event_sender.clone(),
        Collaborators::default(),
        config.scan_txn_timeout(),
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState {
        db: pool,
        config,
        event_sender,
        services,
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "stocktrace-api listening");
    axum::serve(listener, app_router(state)).await?;

    Ok(())
}

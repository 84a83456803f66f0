use oxicrm::bootstrap;
use oxicrm::config::Config;
use oxicrm::infrastructure::http::router::build_router;
use oxicrm::infrastructure::observability;
use oxicrm::infrastructure::persistence::Database;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let _observability = observability::init(&config)?;
    tracing::info!("Configuration loaded");

    let db = Database::connect(&config.database_url).await?;
    tracing::info!("Database connection established");

    db.run_migrations().await?;
    tracing::info!("Database migrations applied");

    if let Err(e) = bootstrap::initialize_admin(&db, &config).await {
        tracing::error!("Failed to initialize master user: {}", e);
        return Err(e.into());
    }

    let state = bootstrap::build_app_state(db, &config).await?;
    let app = build_router(state);

    let addr = config.server_address();
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use coffeeshop_auth::{AuthGate, CachedKeySet, TokenValidator};
use coffeeshop_drinks_server::adapter::handler::{self, AppState};
use coffeeshop_drinks_server::adapter::repository::{
    DrinkPostgresRepository, InMemoryDrinkRepository,
};
use coffeeshop_drinks_server::domain::repository::DrinkRepository;
use coffeeshop_drinks_server::infrastructure::config::Config;
use coffeeshop_drinks_server::infrastructure::logger;
use coffeeshop_drinks_server::usecase::{
    CreateDrinkUseCase, DeleteDrinkUseCase, ListDrinksUseCase, UpdateDrinkUseCase,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config
    let config_path =
        std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/config.yaml".to_string());
    let mut cfg = Config::load(&config_path)?;
    cfg.apply_env_overrides();

    // Logger
    logger::init_logger(&cfg.app.environment, &cfg.app.log_format);

    info!(
        app_name = %cfg.app.name,
        version = %cfg.app.version,
        environment = %cfg.app.environment,
        "starting drinks server"
    );

    // Drink repository: PostgreSQL if DATABASE_URL or database config is set, otherwise in-memory
    let reset_on_start = cfg.database.as_ref().is_some_and(|db| db.reset_on_start);
    let max_conns = cfg.database.as_ref().map_or(10, |db| db.max_open_conns);
    let database_url = std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| cfg.database.as_ref().map(|db| db.connection_url()));

    let drink_repo: Arc<dyn DrinkRepository> = if let Some(url) = database_url {
        info!("connecting to PostgreSQL...");
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_conns)
            .connect(&url)
            .await?;
        info!("connected to PostgreSQL");

        let repo = DrinkPostgresRepository::new(Arc::new(pool));
        repo.ensure_schema().await?;
        if reset_on_start {
            warn!("reset_on_start is enabled, dropping and re-seeding drinks table");
            repo.reset().await?;
        }
        Arc::new(repo)
    } else {
        info!("no database configured, using in-memory repository");
        let repo = InMemoryDrinkRepository::new();
        repo.reset().await?;
        Arc::new(repo)
    };

    // Authorization gate
    let jwks_url = cfg.auth.jwks_url();
    info!(
        jwks_url = %jwks_url,
        audience = %cfg.auth.audience,
        "initializing JWKS token validator"
    );
    let keys = Arc::new(CachedKeySet::new(
        &jwks_url,
        Duration::from_secs(cfg.auth.jwks_cache_ttl_secs),
    )?);
    let validator = TokenValidator::new(&cfg.auth, keys)?;
    let gate = AuthGate::new(Arc::new(validator));

    // Use cases
    let state = AppState {
        list_drinks_uc: Arc::new(ListDrinksUseCase::new(drink_repo.clone())),
        create_drink_uc: Arc::new(CreateDrinkUseCase::new(drink_repo.clone())),
        update_drink_uc: Arc::new(UpdateDrinkUseCase::new(drink_repo.clone())),
        delete_drink_uc: Arc::new(DeleteDrinkUseCase::new(drink_repo)),
        auth: gate,
    };

    let app = handler::router(state, &cfg.cors);

    let listener =
        tokio::net::TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    info!(addr = %listener.local_addr()?, "REST server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("drinks server exited");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

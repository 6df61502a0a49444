//! Haven Companion server binary.

use std::sync::Arc;

use secrecy::Secret;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use haven_companion::adapters::ai::{AnthropicConfig, AnthropicProvider};
use haven_companion::adapters::auth::JwtTokenVerifier;
use haven_companion::adapters::http::{app_router, AppState, AuthState};
use haven_companion::adapters::postgres::{
    PostgresCheckInStore, PostgresConversationStore, PostgresJournalStore, PostgresMilestoneStore,
};
use haven_companion::application::TurnProcessor;
use haven_companion::config::AppConfig;
use haven_companion::ports::{
    AiProvider, CheckInStore, ConversationStore, JournalStore, MilestoneStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(config.server.is_production());
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let conversations: Arc<dyn ConversationStore> =
        Arc::new(PostgresConversationStore::new(pool.clone()));
    let check_ins: Arc<dyn CheckInStore> = Arc::new(PostgresCheckInStore::new(pool.clone()));
    let journals: Arc<dyn JournalStore> = Arc::new(PostgresJournalStore::new(pool.clone()));
    let milestones: Arc<dyn MilestoneStore> = Arc::new(PostgresMilestoneStore::new(pool.clone()));

    let provider: Arc<dyn AiProvider> = Arc::new(AnthropicProvider::new(
        AnthropicConfig::new(config.ai.api_key.clone())
            .with_model(config.ai.model.clone())
            .with_base_url(config.ai.base_url.clone())
            .with_timeout(config.ai.timeout()),
    )?);

    let turns = Arc::new(TurnProcessor::new(
        conversations,
        check_ins.clone(),
        journals.clone(),
        milestones.clone(),
        provider,
    ));

    let state = AppState {
        turns,
        check_ins,
        journals,
        milestones,
    };
    let verifier: AuthState = Arc::new(JwtTokenVerifier::new(Secret::new(
        config.auth_secret.clone(),
    )));

    let addr = config.server.socket_addr()?;
    tracing::info!(%addr, "haven-companion listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app_router(state, verifier))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(production: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,haven_companion=debug"));

    if production {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}

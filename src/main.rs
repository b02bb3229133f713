//! Lifedrop Server — Blood Donation Management Platform
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use lifedrop_auth::password::CredentialHasher;
use lifedrop_auth::ratelimit::TokenBucket;
use lifedrop_auth::rbac::PolicyEngine;
use lifedrop_auth::token::{Keypair, TokenIssuer, TokenVerifier};
use lifedrop_core::config::AppConfig;
use lifedrop_core::error::AppError;
use lifedrop_database::repositories::{PgAccountStore, PgOtpStore};
use lifedrop_database::{DatabasePool, PostgresPolicyAdapter};
use lifedrop_service::AccountService;

#[tokio::main]
async fn main() {
    let env = std::env::var("LIFEDROP_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Lifedrop v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db_pool = DatabasePool::connect(&config.database).await?;
    lifedrop_database::migration::run_migrations(db_pool.pool()).await?;

    // ── Step 2: Trust core construction (fails fast on weak config)
    let hasher = Arc::new(CredentialHasher::new(&config.password)?);

    let keypair = Arc::new(Keypair::from_pem_files(
        &config.token.private_key_path,
        &config.token.public_key_path,
    )?);
    let issuer = Arc::new(TokenIssuer::new(Arc::clone(&keypair), &config.token));
    let verifier = Arc::new(TokenVerifier::new(Arc::clone(&keypair), &config.token));

    let limiter = Arc::new(TokenBucket::new(
        config.rate_limit.threshold,
        std::time::Duration::from_secs(config.rate_limit.window_seconds),
    ));

    // ── Step 3: Policy engine synced from the database ───────────
    let policy_adapter = Arc::new(PostgresPolicyAdapter::new(db_pool.pool().clone()));
    let engine = Arc::new(PolicyEngine::new(policy_adapter).await?);
    seed_default_policy(&engine).await?;

    // ── Step 4: Stores and services ──────────────────────────────
    let account_store = Arc::new(PgAccountStore::new(db_pool.pool().clone()));
    let otp_store = Arc::new(PgOtpStore::new(db_pool.pool().clone()));
    let accounts = Arc::new(AccountService::new(
        account_store,
        otp_store,
        hasher,
        issuer,
    ));

    // ── Step 5: HTTP server ──────────────────────────────────────
    let state = lifedrop_api::AppState::new(
        engine,
        verifier,
        Arc::clone(&limiter),
        accounts,
        lifedrop_api::router::PUBLIC_ROUTES,
    );
    let app = lifedrop_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Lifedrop server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Teardown ─────────────────────────────────────────
    limiter.stop();
    db_pool.close().await;

    tracing::info!("Lifedrop server shut down gracefully");
    Ok(())
}

/// Seed the baseline donor policy on an empty rule set.
async fn seed_default_policy(engine: &PolicyEngine) -> Result<(), AppError> {
    if engine.rule_count().await > 0 {
        return Ok(());
    }

    engine
        .add_policy("donor", "*", "/account/v1/self", "GET")
        .await?;
    tracing::info!("Seeded default donor policy");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

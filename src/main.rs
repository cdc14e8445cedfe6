// src/main.rs

use chrono::Utc;
use quiz_backend::config::Config;
use quiz_backend::error::AppError;
use quiz_backend::models::User;
use quiz_backend::routes;
use quiz_backend::state::AppState;
use quiz_backend::storage::Collection;
use quiz_backend::utils::hash::hash_password;
use quiz_backend::Database;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Firebase when configured, memory otherwise
    let db = Database::from_config(&config);
    tracing::info!("Storage backend: {}", db.backend().as_str());

    // Seed Admin User
    if let Err(e) = seed_admin_user(&db, &config).await {
        tracing::error!("Failed to seed admin user: {}", e);
    }

    // Create AppState
    let state = AppState {
        db,
        config: config.clone(),
    };

    // Create the Axum application router
    let app = routes::create_router(state);

    // Bind to the listening address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}

async fn seed_admin_user(db: &Database, config: &Config) -> Result<(), AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    if db.get_user_by_username(username).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", username);
    let email = config
        .admin_email
        .clone()
        .unwrap_or_else(|| format!("{}@localhost", username));

    let admin = User {
        id: db.get_next_id(Collection::Users).await?,
        username: username.clone(),
        email,
        password: hash_password(password)?,
        role: "admin".to_string(),
        created_at: Some(Utc::now()),
        extra: Default::default(),
    };

    db.create_user(admin).await?;
    tracing::info!("Admin user created successfully.");
    Ok(())
}

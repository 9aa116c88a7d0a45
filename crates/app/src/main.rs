use std::{sync::Arc, time::Duration};

use documents::{DisabledMailer, Mailer, ResendMailer};
use migration::{Migrator, MigratorTrait};
use server::{ServerState, TokenVerifier};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "marcenaria={level},server={level},engine={level},documents={level}",
            level = settings.app.level
        ))
        .init();

    let verifier = TokenVerifier::from_settings(&settings.auth)?;
    let company = settings.company.profile()?;
    let mailer = build_mailer(&settings.email)?;

    let db = parse_database(&settings.server.database).await?;
    let engine = engine::Engine::builder()
        .database(db)
        .timezone(company.timezone)
        .build()
        .await?;

    let state = ServerState::new(engine, verifier, mailer, company)
        .request_timeout(Duration::from_secs(settings.server.request_timeout_secs));

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let mut tasks = tokio::task::JoinSet::new();
    tasks.spawn(async move {
        if let Err(err) = server::run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn build_mailer(
    config: &settings::Email,
) -> Result<Arc<dyn Mailer>, Box<dyn std::error::Error + Send + Sync>> {
    match config.api_key.as_deref().filter(|key| !key.is_empty()) {
        Some(api_key) => {
            tracing::info!("Email delivery through {}", config.endpoint);
            Ok(Arc::new(ResendMailer::new(
                api_key,
                config.from.clone(),
                config.endpoint.clone(),
                Duration::from_secs(config.timeout_secs),
            )?))
        }
        None => {
            tracing::warn!("No email api key configured, email delivery is disabled");
            Ok(Arc::new(DisabledMailer))
        }
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}

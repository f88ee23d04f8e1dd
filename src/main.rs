use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use course_catalog::auth::{PasswordHasher, TokenIssuer};
use course_catalog::cache::Cache;
use course_catalog::config::AppConfig;
use course_catalog::database::{DatabaseManager, PgStore};
use course_catalog::state::AppState;

#[derive(Parser)]
#[command(name = "course-catalog")]
#[command(about = "Course catalog REST API")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Port to listen on, overriding PORT
        #[arg(long)]
        port: Option<u16>,
        /// Start without applying pending migrations
        #[arg(long)]
        skip_migrations: bool,
    },
    /// Apply the embedded schema migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.api.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate()?;
    info!("Starting course catalog in {:?} mode", config.environment);

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        skip_migrations: false,
    }) {
        Command::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            info!("Migrations applied");
            Ok(())
        }
        Command::Serve {
            port,
            skip_migrations,
        } => serve(config, port, skip_migrations).await,
    }
}

async fn serve(config: AppConfig, port: Option<u16>, skip_migrations: bool) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database).await?;
    if skip_migrations {
        info!("Skipping migrations");
    } else {
        DatabaseManager::migrate(&pool).await?;
    }

    let cache = Cache::connect(&config.cache).await;
    let passwords = PasswordHasher::new(
        config.security.password_memory_kib,
        config.security.password_iterations,
        config.security.password_parallelism,
    )
    .context("invalid password hashing parameters")?;
    let tokens = TokenIssuer::new(
        config.security.jwt_secret.clone(),
        chrono::Duration::hours(config.security.jwt_expiry_hours),
    );

    let state = AppState::new(Arc::new(PgStore::new(pool)), cache, tokens, passwords);
    let app = course_catalog::app(state);

    let port = port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Course catalog listening on http://{}", bind_addr);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

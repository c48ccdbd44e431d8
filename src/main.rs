use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http_server;
pub mod services;
pub mod webhooks;

use crate::config::AppConfig;
use crate::http_server::run_http_server;
use megaphone::db::create_pool;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error:\n{}", e);
            std::process::exit(1);
        }
    };

    let pool = match create_pool(&config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!("Failed to get database connection: {}", e);
                std::process::exit(1);
            }
        };

        if let Err(e) = conn.run_pending_migrations(MIGRATIONS) {
            tracing::error!("Database migration failed: {}", e);
            std::process::exit(1);
        }
    }

    run_http_server(config, pool).await.expect("Http server error");
}

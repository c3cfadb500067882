mod cli;
mod clients;
mod config;
mod error;
mod models;
mod runtime;
mod service;
mod tasks;

use std::env;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("duelbot=info")),
        )
        .init();

    let config = match env::var("CONFIG_FILE") {
        Ok(path) => match AppConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load config file {}: {}", path, err);
                std::process::exit(1);
            }
        },
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> { config.get(key).or_else(|| env::var(key).ok()) };

    if let Err(err) = cli::cli(get_prop).await {
        tracing::error!(error = %err, "run failed");
        std::process::exit(1);
    }
}

//! Skydock - Entry Point
//!
//! Deployment orchestration service: request intake, multi-round
//! Create/Enhance deployments, and at-least-once completion notification.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use skydock::app::options::{AppOptions, ServerOptions};
use skydock::app::run::run;
use skydock::logs::{init_logging, LogOptions};
use skydock::settings::Settings;
use skydock::utils::version_info;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version).unwrap());
        return;
    }

    // Load settings from the environment
    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to load settings: {}", e);
            return;
        }
    };

    // CLI overrides
    if let Some(path) = cli_args.get("store") {
        settings.store_path = PathBuf::from(path);
    }
    if let Some(level) = cli_args.get("log-level") {
        match level.parse() {
            Ok(level) => settings.log_level = level,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        }
    }

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // Assemble server options: defaults, then env, then CLI
    let defaults = ServerOptions::default();
    let host = cli_args
        .get("host")
        .cloned()
        .or_else(|| settings.bind_host.clone())
        .unwrap_or(defaults.host);
    let port = match cli_args.get("port") {
        Some(value) => match value.parse::<u16>() {
            Ok(port) => port,
            Err(e) => {
                error!("Invalid --port: {}", e);
                return;
            }
        },
        None => settings.bind_port.unwrap_or(defaults.port),
    };

    let options = AppOptions {
        server: ServerOptions { host, port },
        ..Default::default()
    };

    info!("Running skydock with options: {:?}", options);
    let result = run(version.version, settings, options, await_shutdown_signal()).await;
    if let Err(e) = result {
        error!("Failed to run the service: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}

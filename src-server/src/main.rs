mod config;
mod constants;
mod debounce;
mod error;
mod page;
mod prompts;
mod routes;
mod session;
mod state;
mod surface;

use config::AppConfig;
use state::{AppState, Services};

#[tokio::main]
async fn main() {
    // Initialize logging - RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("AI App Builder starting...");

    let data_dir = config::data_dir();
    if !data_dir.exists() {
        match tokio::fs::create_dir_all(&data_dir).await {
            Ok(()) => log::info!("Created data directory: {:?}", data_dir),
            Err(e) => log::error!(
                "Failed to create data directory {:?}: {}. Assets will not persist.",
                data_dir,
                e
            ),
        }
    }

    let config_exists = data_dir.join(constants::paths::CONFIG_FILE).exists();
    let config = match AppConfig::load(&data_dir).await {
        Ok(config) => {
            if !config_exists {
                // Write defaults so there is a file to edit
                if let Err(e) = config.save(&data_dir).await {
                    log::warn!("Failed to write default config: {}", e);
                }
            }
            config
        }
        Err(e) => {
            log::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };

    if !config.preview.babel_script_path.exists() {
        log::warn!(
            "Babel bundle not found at {:?}; previews will report \"Babel is not loaded.\"",
            config.preview.babel_script_path
        );
    }

    let services = Services::from_env(&config, &data_dir);
    if !services.gateway.is_configured().await {
        log::warn!("Code generation is not configured; chat replies will report the missing key");
    }

    let state = AppState::new(&config, services);
    state::spawn_mount_watchdog(state.clone());

    let app = routes::router(state);
    let addr = config.server.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    log::info!("Builder UI available at http://{}", addr);
    if let Err(e) = axum::serve(listener, app).await {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

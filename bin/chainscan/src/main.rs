use axum::http::Method;
use clap::Parser;
use log::{debug, error, info};
use thiserror::Error;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use api::{ServiceController, CHAIN_BANNER};
use config::Config;
use ledger::{AlchemyClient, LedgerError};
use market_data::{CoingeckoClient, CoingeckoClientError};

#[derive(Parser, Debug)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenv::dotenv().ok();
    simple_logger::SimpleLogger::new().env().init()?;

    let args = Args::parse();
    debug!("Args: {:?}", args);

    // Load configuration from yaml, credentials come from the environment
    let config =
        Config::from_file(&args.config).map_err(|err| StartupError::Config(err.to_string()))?;
    debug!("Config: {:?}", config);

    run_server(config).await
}

async fn run_server(config: Config) -> Result<(), StartupError> {
    info!("Starting Chainscan Server");
    info!("{}", CHAIN_BANNER);

    let (app_host, app_port) = (config.server.host.clone(), config.server.port);

    // Long lived upstream clients, shared by every request
    let market_data = CoingeckoClient::from_config(&config)?;
    let ledger = AlchemyClient::from_config(&config)?;

    // API service controller
    let service_controller = ServiceController::new(market_data, ledger);

    let cors = CorsLayer::new().allow_origin(Any).allow_methods([Method::GET, Method::POST]);

    let app = service_controller.router().layer(cors);

    let address = format!("{}:{}", app_host, app_port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|err| StartupError::Bind(address.clone(), err))?;
    info!("Listening on {}", address);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!("Server stopped.");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Unable to handle ctrl+c: {}", err);
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!("Failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("Failed to initialise logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Failed to load config file: {0}")]
    Config(String),

    #[error("Failed to build CoinGecko client: {0}")]
    MarketData(#[from] CoingeckoClientError),

    #[error("Failed to build node provider client: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Failed to bind {0}: {1}")]
    Bind(String, std::io::Error),

    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

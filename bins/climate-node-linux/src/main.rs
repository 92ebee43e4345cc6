mod simulated;

use std::net::SocketAddr;

use climate_core::{NodeConfig, SensorReader};
use climate_protocol::ClimateService;
use climate_web::{create_router, shared};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::simulated::SimulatedSensor;

const NODE_NAME: &str = "climate-node-linux";
const HTTP_PORT: u16 = 8080;

/// Every Nth simulated transaction fails (0 = never).
const FAIL_EVERY_ENV: &str = "CLIMATE_SIM_FAIL_EVERY";

// Requests are served one at a time, so a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,climate_web=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Climate node starting...");

    // Configuration. The host OS owns the network, so only the HTTP side applies.
    let config = NodeConfig {
        node_name: NODE_NAME.to_string(),
        http_port: HTTP_PORT,
        ..Default::default()
    };
    config.validate_serving()?;

    let fail_every = match std::env::var(FAIL_EVERY_ENV) {
        Ok(value) => value.parse::<u32>()?,
        Err(_) => 0,
    };
    if fail_every > 0 {
        tracing::info!("Simulated sensor fails every {} reads", fail_every);
    }

    let sensor = SimulatedSensor::new(fail_every);
    let service = ClimateService::new(&config.node_name, SensorReader::new(sensor));
    let app = create_router(shared(service)).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server started on {}", addr);
    tracing::info!("   Page: http://localhost:{}/", config.http_port);
    tracing::info!("   Data: http://localhost:{}/data", config.http_port);

    tokio::select! {
        result = async { axum::serve(listener, app).await } => {
            result?;
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

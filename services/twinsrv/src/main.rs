//! twinsrv main program

use clap::Parser;
use scgdi_store::HistoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use twinsrv::api::{self, ApiState};
use twinsrv::config::TwinConfig;
use twinsrv::mirror::MirrorTree;
use twinsrv::net::{bind_with_fallback, split_endpoint};
use twinsrv::pipeline::{Pipeline, HEARTBEAT_INTERVAL};
use twinsrv::{discovery, logging, transport, Result};

#[derive(Parser, Debug)]
#[clap(author, version, about = "twinsrv - SCGDI motor digital twin", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[clap(short, long, value_parser, default_value = "config/twinsrv.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TwinConfig::load(&args.config)?;
    config.validate()?;
    logging::init(&config.log_level)?;

    info!("Starting twinsrv v{}", env!("CARGO_PKG_VERSION"));

    // Durable store first: persistence is the authoritative record
    let store = HistoryStore::connect(&config.db_path).await?;
    info!("History database: {}", config.db_path);

    // Fixed address-space tree and the single owning pipeline
    let (mirror, vars) = MirrorTree::build_motor_tree();
    let mirror = Arc::new(mirror);
    let pipeline = Arc::new(Pipeline::new(
        mirror.clone(),
        store.clone(),
        config.thresholds,
        vars,
    ));

    // Bind the browse endpoint, falling back to successor ports when
    // the preferred one is occupied. Exhaustion is fatal.
    let endpoint = split_endpoint(&config.endpoint)?;
    let (listener, addr) = bind_with_fallback(&endpoint).await?;
    let public_endpoint = format!("http://{}{}", addr, endpoint.path);
    info!("Address space endpoint: {}", public_endpoint);

    discovery::try_register(&config, &public_endpoint).await;

    let api_router = {
        let routes = api::router(ApiState::new(mirror.clone(), store.clone(), &config));
        if endpoint.path.is_empty() {
            routes
        } else {
            axum::Router::new().nest(&endpoint.path, routes)
        }
    };

    let api_task = tokio::spawn(async move { axum::serve(listener, api_router).await });

    let mqtt_pipeline = pipeline.clone();
    let mqtt_config = config.mqtt.clone();
    let mqtt_task = tokio::spawn(async move { transport::run(mqtt_config, mqtt_pipeline).await });

    let heartbeat_pipeline = pipeline.clone();
    let heartbeat_task =
        tokio::spawn(async move { heartbeat_pipeline.run_heartbeat(HEARTBEAT_INTERVAL).await });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
        result = api_task => {
            error!("Browse API task exited: {:?}", result);
        }
        result = mqtt_task => {
            error!("MQTT task exited: {:?}", result);
        }
        result = heartbeat_task => {
            error!("Heartbeat task exited: {:?}", result);
        }
    }

    Ok(())
}

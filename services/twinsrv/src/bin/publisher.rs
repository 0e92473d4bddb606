//! Synthetic motor telemetry publisher
//!
//! Publishes jittered readings around the nominal operating point on
//! the three canonical topics: electrical and vibration every 5s,
//! environment every 60s. Useful for demos and for exercising the
//! ingestion pipeline against a live broker.

use chrono::Utc;
use clap::Parser;
use rand::Rng;
use rumqttc::{AsyncClient, MqttOptions, QoS};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Synthetic SCGDI motor telemetry publisher", long_about = None)]
struct Args {
    /// MQTT broker host
    #[clap(long, env = "SCGDI_MQTT__HOST", default_value = "localhost")]
    host: String,

    /// MQTT broker port
    #[clap(long, env = "SCGDI_MQTT__PORT", default_value_t = 1883)]
    port: u16,

    #[clap(long, env = "SCGDI_MQTT__USERNAME")]
    username: Option<String>,

    #[clap(long, env = "SCGDI_MQTT__PASSWORD")]
    password: Option<String>,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

fn jitter(base: f64, spread: f64) -> f64 {
    base + rand::thread_rng().gen_range(-spread..spread)
}

async fn send_electrical(client: AsyncClient) {
    loop {
        let payload = json!({
            "timestamp": now_iso(),
            "voltage": {
                "a": jitter(220.0, 2.0),
                "b": jitter(220.0, 2.0),
                "c": jitter(220.0, 2.0),
            },
            "current": {
                "a": jitter(10.0, 0.3),
                "b": jitter(10.0, 0.3),
                "c": jitter(10.0, 0.3),
            },
            "power": {
                "active": jitter(4500.0, 50.0),
                "reactive": jitter(500.0, 30.0),
                "apparent": jitter(4600.0, 50.0),
            },
            "energy": {
                "active": jitter(10000.0, 5.0),
                "reactive": jitter(1200.0, 2.0),
                "apparent": jitter(10200.0, 5.0),
            },
            "powerFactor": jitter(0.95, 0.01),
            "frequency": jitter(60.0, 0.05),
        });
        publish(&client, "scgdi/motor/electrical", payload.to_string()).await;
        sleep(Duration::from_secs(5)).await;
    }
}

async fn send_environment(client: AsyncClient) {
    loop {
        let payload = json!({
            "timestamp": now_iso(),
            "temperature": jitter(34.0, 1.0),
            "humidity": jitter(55.0, 3.0),
            "caseTemperature": jitter(40.0, 2.0),
        });
        publish(&client, "scgdi/motor/environment", payload.to_string()).await;
        sleep(Duration::from_secs(60)).await;
    }
}

async fn send_vibration(client: AsyncClient) {
    loop {
        let payload = json!({
            "timestamp": now_iso(),
            "axial": jitter(0.10, 0.03),
            "radial": jitter(0.12, 0.03),
        });
        publish(&client, "scgdi/motor/vibration", payload.to_string()).await;
        sleep(Duration::from_secs(5)).await;
    }
}

async fn publish(client: &AsyncClient, topic: &str, body: String) {
    if let Err(e) = client.publish(topic, QoS::AtMostOnce, false, body).await {
        error!("Publish to {} failed: {}", topic, e);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let client_id = format!("scgdi-publisher-{}", std::process::id());
    let mut options = MqttOptions::new(client_id, &args.host, args.port);
    options.set_keep_alive(Duration::from_secs(30));
    if let (Some(username), Some(password)) = (&args.username, &args.password) {
        options.set_credentials(username, password);
    }

    let (client, mut eventloop) = AsyncClient::new(options, 16);
    info!("Publishing to {}:{}", args.host, args.port);

    tokio::spawn(send_electrical(client.clone()));
    tokio::spawn(send_environment(client.clone()));
    tokio::spawn(send_vibration(client.clone()));

    loop {
        match eventloop.poll().await {
            Ok(event) => debug!("MQTT event: {:?}", event),
            Err(e) => {
                error!("MQTT connection error: {}", e);
                sleep(Duration::from_secs(5)).await;
            }
        }
    }
}

//! MQTT ingestion task
//!
//! Pumps inbound telemetry from the broker into the pipeline. All nine
//! topics (canonical and legacy aliases) are subscribed on every
//! connection acknowledgment, so a broker reconnect resubscribes
//! automatically.

use crate::config::MqttConfig;
use crate::mirror::AddressSpace;
use crate::pipeline::Pipeline;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use scgdi_model::SUBSCRIBED_TOPICS;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Delay before polling again after a connection error
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Run the MQTT event loop until the task is cancelled.
///
/// Connection errors are logged and retried; they never tear down the
/// pipeline.
pub async fn run<M: AddressSpace>(config: MqttConfig, pipeline: Arc<Pipeline<M>>) {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(Duration::from_secs(30));
    options.set_clean_session(true);
    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        options.set_credentials(username, password);
    }

    let (client, mut eventloop) = AsyncClient::new(options, 64);
    info!("MQTT broker: {}:{}", config.host, config.port);

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!("MQTT connected: {}:{} ({:?})", config.host, config.port, ack.code);
                for topic in SUBSCRIBED_TOPICS {
                    if let Err(e) = client.subscribe(topic, QoS::AtMostOnce).await {
                        error!("MQTT subscribe failed for {}: {}", topic, e);
                    }
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                if publish.topic.starts_with("$SYS/") {
                    continue;
                }
                pipeline.ingest(&publish.topic, &publish.payload).await;
            }
            Ok(event) => {
                debug!("MQTT event: {:?}", event);
            }
            Err(e) => {
                error!("MQTT connection error: {}", e);
                sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

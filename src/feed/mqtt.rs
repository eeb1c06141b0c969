use crate::error::AppError;
use crate::feed::{TopicMap, parse_reading};
use crate::state::AppState;
use crate::tracker::TrackerCommand;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

const KEEP_ALIVE: Duration = Duration::from_secs(30);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const EVENT_QUEUE_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub broker_host: String,
    pub broker_port: u16,
    pub client_id: String,
    pub topics: TopicMap,
}

/// Run the MQTT feed client until the tracker side shuts down.
///
/// Readings are forwarded to the tracker command channel; connectivity is
/// mirrored into shared state so the presentation layer can show it. A lost
/// connection is never fatal: the loop backs off and lets the event loop
/// reconnect while the tracker holds its last known state.
pub async fn run_feed(
    settings: FeedSettings,
    commands: mpsc::Sender<TrackerCommand>,
    state: Arc<RwLock<AppState>>,
) -> Result<(), AppError> {
    let mut options = MqttOptions::new(
        settings.client_id.clone(),
        settings.broker_host.clone(),
        settings.broker_port,
    );
    options.set_keep_alive(KEEP_ALIVE);

    let (client, mut eventloop) = AsyncClient::new(options, EVENT_QUEUE_CAPACITY);
    for topic in settings.topics.topics() {
        client
            .subscribe(topic, QoS::AtMostOnce)
            .await
            .map_err(|err| AppError::Feed(err.to_string()))?;
    }

    info!(
        host = %settings.broker_host,
        port = settings.broker_port,
        topics = ?settings.topics.topics(),
        "Feed client subscribed"
    );

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Feed connected");
                set_feed_connected(&state, true);
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                match parse_reading(&settings.topics, &publish.topic, &publish.payload) {
                    Ok(reading) => {
                        let command = TrackerCommand::Reading {
                            lane: reading.lane,
                            distance_cm: reading.distance_cm,
                        };
                        if commands.send(command).await.is_err() {
                            warn!("Tracker command channel closed, stopping feed");
                            return Err(AppError::CommandSend);
                        }
                    }
                    Err(err) => {
                        warn!(topic = %publish.topic, error = %err, "Dropping malformed feed reading");
                    }
                }
            }
            Ok(_) => {}
            Err(err) => {
                set_feed_connected(&state, false);
                warn!(error = %err, "Feed connection lost, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

fn set_feed_connected(state: &Arc<RwLock<AppState>>, connected: bool) {
    match state.write() {
        Ok(mut guard) => {
            if guard.feed_connected() != connected && guard.set_feed_connected(connected).is_err() {
                warn!("Feed connectivity watch channel closed");
            }
        }
        Err(_) => warn!("State lock poisoned while updating feed connectivity"),
    }
}

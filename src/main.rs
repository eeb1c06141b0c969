use lotgate::{api, config, feed, state, store, tracker};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

const COMMAND_QUEUE_CAPACITY: usize = 64;

fn init_tracing() {
    let subscriber = tracing_subscriber::fmt().with_target(false).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    tracing::info!(
        config_path = config::DEFAULT_CONFIG_PATH,
        "lotgate starting"
    );
    let config = config::load_default()?;

    let store = store::json_file::JsonFileStore::new(config.store_path());
    let tracker_config = tracker::TrackerConfig {
        capacity: config.capacity(),
        gate_threshold_cm: config.gate_threshold_cm(),
    };
    let tracker = tracker::OccupancyTracker::from_store(tracker_config, store);
    tracing::info!(
        count = tracker.snapshot().count,
        capacity = config.capacity(),
        store_path = %config.store_path().display(),
        "Occupancy tracker ready"
    );

    let state = Arc::new(RwLock::new(state::AppState::new(tracker.snapshot())));

    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    tokio::spawn(tracker::run_tracker_loop(
        tracker,
        commands_rx,
        Arc::clone(&state),
    ));

    let feed_settings = feed::mqtt::FeedSettings {
        broker_host: config.broker_host().to_string(),
        broker_port: config.broker_port(),
        client_id: config.client_id().to_string(),
        topics: feed::TopicMap::new(config.entry_topic(), config.exit_topic()),
    };
    tokio::spawn({
        let state = Arc::clone(&state);
        let commands = commands_tx.clone();
        async move {
            if let Err(err) = feed::mqtt::run_feed(feed_settings, commands, state).await {
                tracing::error!(error = %err, "Feed task stopped");
            }
        }
    });

    let app = api::router(api::ApiContext {
        state: Arc::clone(&state),
        commands: commands_tx,
    });
    let port = config.server_port();
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "API server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

use crate::config::DEFAULT_CAPACITY;
use crate::error::AppError;
use crate::tracker::LotSnapshot;
use tokio::sync::watch;

/// Shared view of the running system: the latest lot snapshot published by
/// the tracker task and the feed connectivity flag maintained by the MQTT
/// client. Watch channels let collaborators observe changes without polling.
#[derive(Debug)]
pub struct AppState {
    snapshot: LotSnapshot,
    snapshot_tx: watch::Sender<LotSnapshot>,
    // Held so publishing never fails while no collaborator is subscribed.
    _snapshot_rx: watch::Receiver<LotSnapshot>,
    feed_connected: bool,
    feed_connected_tx: watch::Sender<bool>,
    _feed_connected_rx: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(initial: LotSnapshot) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(initial.clone());
        let (feed_connected_tx, feed_connected_rx) = watch::channel(false);
        Self {
            snapshot: initial,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
            feed_connected: false,
            feed_connected_tx,
            _feed_connected_rx: feed_connected_rx,
        }
    }

    pub fn snapshot(&self) -> &LotSnapshot {
        &self.snapshot
    }

    pub fn subscribe_snapshot(&self) -> watch::Receiver<LotSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn set_snapshot(&mut self, snapshot: LotSnapshot) -> Result<(), AppError> {
        self.snapshot = snapshot.clone();
        self.snapshot_tx
            .send(snapshot)
            .map_err(|_| AppError::WatchSend)
    }

    pub fn feed_connected(&self) -> bool {
        self.feed_connected
    }

    pub fn subscribe_feed_connected(&self) -> watch::Receiver<bool> {
        self.feed_connected_tx.subscribe()
    }

    pub fn set_feed_connected(&mut self, connected: bool) -> Result<(), AppError> {
        self.feed_connected = connected;
        self.feed_connected_tx
            .send(connected)
            .map_err(|_| AppError::WatchSend)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LotSnapshot {
            count: 0,
            capacity: DEFAULT_CAPACITY,
            is_full: false,
            last_entry_at: None,
            entry_gate_open: false,
            exit_gate_open: false,
        })
    }
}

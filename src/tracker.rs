use crate::gate::{Lane, gate_open};
use crate::state::AppState;
use crate::store::{self, PersistedState, StateStore};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub capacity: u32,
    pub gate_threshold_cm: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            capacity: crate::config::DEFAULT_CAPACITY,
            gate_threshold_cm: crate::config::DEFAULT_GATE_THRESHOLD_CM,
        }
    }
}

/// Read-only view of the lot handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSnapshot {
    pub count: u32,
    pub capacity: u32,
    pub is_full: bool,
    pub last_entry_at: Option<SystemTime>,
    pub entry_gate_open: bool,
    pub exit_gate_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrackerCommand {
    Reading { lane: Lane, distance_cm: f64 },
    Reset,
}

/// The occupancy state machine. Sole mutator of the vehicle count.
///
/// Each reading runs the same pipeline: derive the raw gate state from the
/// distance, force the entry gate closed while the lot is full, detect the
/// rising edge against the stored previous state, apply the count delta, and
/// write the record through to the store before the next event is processed.
///
/// The gate-open fields double as edge memory: after an event they hold the
/// current effective state, which is exactly what the next edge check needs.
pub struct OccupancyTracker<S: StateStore> {
    config: TrackerConfig,
    store: S,
    count: u32,
    last_entry_at: Option<SystemTime>,
    entry_gate_open: bool,
    exit_gate_open: bool,
}

impl<S: StateStore> OccupancyTracker<S> {
    /// Bootstrap from the persisted record. A missing or unreadable record
    /// starts the lot empty; bootstrap never fails the process.
    pub fn from_store(config: TrackerConfig, store: S) -> Self {
        let mut tracker = Self {
            config,
            store,
            count: 0,
            last_entry_at: None,
            entry_gate_open: false,
            exit_gate_open: false,
        };

        match tracker.store.load() {
            Ok(Some(persisted)) => tracker.restore(persisted),
            Ok(None) => {
                info!("No persisted occupancy record, starting empty");
            }
            Err(err) => {
                warn!(error = %err, "Failed to load occupancy record, starting empty");
            }
        }

        tracker
    }

    fn restore(&mut self, persisted: PersistedState) {
        self.count = if persisted.count > self.config.capacity {
            warn!(
                count = persisted.count,
                capacity = self.config.capacity,
                "Persisted count exceeds capacity, clamping"
            );
            self.config.capacity
        } else {
            persisted.count
        };

        self.last_entry_at = match persisted.last_entry_at.as_deref() {
            Some(raw) => {
                let parsed = store::parse_timestamp(raw);
                if parsed.is_none() {
                    warn!(value = raw, "Unparseable last-entry timestamp, discarding");
                }
                parsed
            }
            None => None,
        };
        self.entry_gate_open = persisted.entry_gate_open;
        self.exit_gate_open = persisted.exit_gate_open;

        info!(
            count = self.count,
            entry_gate_open = self.entry_gate_open,
            exit_gate_open = self.exit_gate_open,
            "Restored occupancy record"
        );
    }

    pub fn handle_reading(&mut self, lane: Lane, distance_cm: f64, now: SystemTime) {
        let before = self.persisted();
        let raw_open = gate_open(distance_cm, self.config.gate_threshold_cm);

        match lane {
            Lane::Entry => self.apply_entry_gate(raw_open, now),
            Lane::Exit => self.apply_exit_gate(raw_open),
        }

        let after = self.persisted();
        if after != before {
            self.persist(&after);
        }
    }

    fn apply_entry_gate(&mut self, raw_open: bool, now: SystemTime) {
        // Capacity gating comes before edge detection: a full lot forces the
        // entry gate closed no matter how close the vehicle is, so freeing a
        // slot later produces a fresh rising edge for the waiting vehicle.
        let effective_open = raw_open && !self.is_full();
        let rising = effective_open && !self.entry_gate_open;
        self.entry_gate_open = effective_open;

        if rising && self.count < self.config.capacity {
            self.count += 1;
            self.last_entry_at = Some(now);
            info!(count = self.count, capacity = self.config.capacity, "Vehicle entered");
        }
    }

    fn apply_exit_gate(&mut self, raw_open: bool) {
        let rising = raw_open && !self.exit_gate_open;
        self.exit_gate_open = raw_open;

        if rising {
            // Floored at zero: an exit edge on an empty lot is clamped, not
            // surfaced as an error.
            self.count = self.count.saturating_sub(1);
            info!(count = self.count, "Vehicle exited");
        }
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.last_entry_at = None;
        self.entry_gate_open = false;
        self.exit_gate_open = false;
        info!("Occupancy reset");
        let cleared = self.persisted();
        self.persist(&cleared);
    }

    pub fn is_full(&self) -> bool {
        self.count >= self.config.capacity
    }

    pub fn snapshot(&self) -> LotSnapshot {
        LotSnapshot {
            count: self.count,
            capacity: self.config.capacity,
            is_full: self.is_full(),
            last_entry_at: self.last_entry_at,
            entry_gate_open: self.entry_gate_open,
            exit_gate_open: self.exit_gate_open,
        }
    }

    fn persisted(&self) -> PersistedState {
        PersistedState {
            count: self.count,
            last_entry_at: self.last_entry_at.and_then(store::format_timestamp),
            entry_gate_open: self.entry_gate_open,
            exit_gate_open: self.exit_gate_open,
        }
    }

    fn persist(&self, state: &PersistedState) {
        // Log-and-continue: the in-memory state stays authoritative, the next
        // successful write reconciles the record.
        if let Err(err) = self.store.save(state) {
            warn!(error = %err, "Failed to persist occupancy record");
        }
    }
}

/// Drive the tracker from a single command channel.
///
/// One receiver means one logical owner: readings and resets from any number
/// of producers are applied strictly in arrival order, which keeps reset
/// atomic with respect to concurrent edges and keeps store writes ordered.
pub async fn run_tracker_loop<S: StateStore>(
    mut tracker: OccupancyTracker<S>,
    mut commands: mpsc::Receiver<TrackerCommand>,
    state: Arc<RwLock<AppState>>,
) {
    publish_snapshot(&state, tracker.snapshot());

    while let Some(command) = commands.recv().await {
        match command {
            TrackerCommand::Reading { lane, distance_cm } => {
                tracker.handle_reading(lane, distance_cm, SystemTime::now());
            }
            TrackerCommand::Reset => tracker.reset(),
        }
        publish_snapshot(&state, tracker.snapshot());
    }
}

fn publish_snapshot(state: &Arc<RwLock<AppState>>, snapshot: LotSnapshot) {
    match state.write() {
        Ok(mut guard) => {
            if guard.set_snapshot(snapshot).is_err() {
                warn!("Snapshot watch channel closed");
            }
        }
        Err(_) => warn!("State lock poisoned while publishing snapshot"),
    }
}

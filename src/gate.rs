use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD_CM: f64 = 20.0;

/// Traffic direction through the lot. Each lane has its own distance sensor
/// and its own barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Entry,
    Exit,
}

/// A vehicle close to the sensor opens the gate. No hysteresis: a reading at
/// exactly the threshold reads as closed.
pub fn gate_open(distance_cm: f64, threshold_cm: f64) -> bool {
    distance_cm < threshold_cm
}

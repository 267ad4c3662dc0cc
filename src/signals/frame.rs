use super::SignalKey;
use crate::types::{MonitorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A decoded signal payload exactly as the controller sends it.
///
/// Deserialization is the validation step: every field must be present and
/// booleans must be real JSON booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundFrame {
    pub timestamp: DateTime<Utc>,
    pub machine_running: bool,
    pub fault_active: bool,
    pub cleaning_active: bool,
    pub material_low: bool,
    pub estop_ok: bool,
    pub air_pressure_ok: bool,
}

impl InboundFrame {
    /// Parses and validates a text frame
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MonitorError::InvalidFrame(e.to_string()))
    }

    /// Raw wire value of the field backing `key`, before any inversion
    pub fn wire_value(&self, key: SignalKey) -> bool {
        match key {
            SignalKey::MachineRunning => self.machine_running,
            SignalKey::FaultActive => self.fault_active,
            SignalKey::CleaningActive => self.cleaning_active,
            SignalKey::MaterialLow => self.material_low,
            SignalKey::EmergencyStop => self.estop_ok,
            SignalKey::AirPressureLow => self.air_pressure_ok,
        }
    }
}

use crate::notifications::NotificationKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six signals reported by the controller.
///
/// Declaration order is the canonical order used for iteration and for
/// transition reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKey {
    MachineRunning,
    FaultActive,
    CleaningActive,
    MaterialLow,
    /// Wire field `estop_ok`, inverted
    EmergencyStop,
    /// Wire field `air_pressure_ok`, inverted
    AirPressureLow,
}

impl SignalKey {
    pub const COUNT: usize = 6;

    pub const ALL: [SignalKey; Self::COUNT] = [
        Self::MachineRunning,
        Self::FaultActive,
        Self::CleaningActive,
        Self::MaterialLow,
        Self::EmergencyStop,
        Self::AirPressureLow,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Logical name of the signal
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MachineRunning => "machine_running",
            Self::FaultActive => "fault_active",
            Self::CleaningActive => "cleaning_active",
            Self::MaterialLow => "material_low",
            Self::EmergencyStop => "emergency_stop",
            Self::AirPressureLow => "air_pressure_low",
        }
    }

    /// Name of the field carrying this signal in an inbound frame
    pub fn wire_field(self) -> &'static str {
        match self {
            Self::EmergencyStop => "estop_ok",
            Self::AirPressureLow => "air_pressure_ok",
            other => other.as_str(),
        }
    }

    /// The controller reports these as "ok" flags, so wire `false` means the
    /// alarm is active.
    pub fn is_inverted(self) -> bool {
        matches!(self, Self::EmergencyStop | Self::AirPressureLow)
    }

    /// Severity used when this signal becomes active
    pub fn notification_kind(self) -> NotificationKind {
        match self {
            Self::MachineRunning => NotificationKind::Success,
            Self::CleaningActive | Self::MaterialLow => NotificationKind::Warning,
            Self::FaultActive | Self::EmergencyStop | Self::AirPressureLow => {
                NotificationKind::Alert
            }
        }
    }

    /// Operator message used when this signal becomes active
    pub fn activation_message(self) -> &'static str {
        match self {
            Self::MachineRunning => "Machine started",
            Self::FaultActive => "Machine fault detected",
            Self::CleaningActive => "Cleaning cycle in progress",
            Self::MaterialLow => "Material level low",
            Self::EmergencyStop => "Emergency stop activated",
            Self::AirPressureLow => "Compressed air pressure low",
        }
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

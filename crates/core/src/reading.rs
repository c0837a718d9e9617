//! Battery query outcome.

use serde::Serialize;

pub const MSG_LIBRARY_MISSING: &str = "native HID library not found";
pub const MSG_NO_DEVICE: &str = "no headset device detected";
pub const MSG_CONNECT_FAILED: &str = "could not connect to headset";
pub const MSG_INACTIVE: &str = "headset found but not active";
pub const MSG_BATTERY_NA: &str = "battery N/A";

/// Result class of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Device answered with a valid charge level.
    Success { percent: u8 },
    /// Device answered with 0: headset off or dongle unpaired.
    Inactive,
    /// No usable answer.
    Unavailable,
}

/// Colour band of a successful reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeBand {
    /// 50% and above.
    High,
    /// 20% to 49%.
    Medium,
    /// Below 20%.
    Low,
}

impl ChargeBand {
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            50..=u8::MAX => Self::High,
            20..=49 => Self::Medium,
            _ => Self::Low,
        }
    }
}

/// Immutable outcome of one battery query, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatteryReading {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub message: String,
    /// `"manufacturer product"` once the device strings were read.
    pub label: Option<String>,
}

impl BatteryReading {
    pub fn success(percent: u8, label: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Success { percent },
            message: format!("battery at {percent}%"),
            label: Some(label.into()),
        }
    }

    pub fn inactive(label: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Inactive,
            message: MSG_INACTIVE.into(),
            label: Some(label.into()),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Unavailable,
            message: message.into(),
            label: None,
        }
    }

    pub fn unavailable_with_label(message: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::unavailable(message)
        }
    }

    /// Interpret the raw battery byte. `None` means the byte could not be
    /// read from the response.
    pub fn from_battery_byte(byte: Option<u8>, label: &str) -> Self {
        match byte {
            Some(0) => Self::inactive(label),
            Some(percent @ 1..=100) => Self::success(percent, label),
            _ => Self::unavailable_with_label(MSG_BATTERY_NA, label),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    /// Charge level; only set on success.
    pub fn percent(&self) -> Option<u8> {
        match self.outcome {
            Outcome::Success { percent } => Some(percent),
            _ => None,
        }
    }

    pub fn band(&self) -> Option<ChargeBand> {
        self.percent().map(ChargeBand::from_percent)
    }

    /// `"NN%"` on success, `"--%"` otherwise.
    pub fn display_percent(&self) -> String {
        match self.percent() {
            Some(p) => format!("{p}%"),
            None => "--%".into(),
        }
    }
}

impl std::fmt::Display for BatteryReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.outcome, &self.label) {
            (Outcome::Success { .. }, Some(label)) => {
                write!(f, "{} {}", self.display_percent(), label)
            }
            (_, Some(label)) => write!(f, "{} ({})", self.message, label),
            (_, None) => write!(f, "{}", self.message),
        }
    }
}

//! Error types for headset-battery-core.
//!
//! Only faults live here. A missing headset, a session that could not be
//! opened, or an out-of-range battery byte are ordinary
//! [`BatteryReading`](crate::reading::BatteryReading) values, not errors.

use thiserror::Error;

/// Core library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The native HID library could not be initialized.
    #[error("native HID library not found: {0}")]
    LibraryUnavailable(String),

    /// HID transport call failure.
    #[error("HID error: {0}")]
    Hid(String),

    /// Device path that cannot be handed to the native layer.
    #[error("invalid device path: {0}")]
    InvalidPath(String),

    /// Settings file unreadable or out of range.
    #[error("config error: {0}")]
    Config(String),
}

impl From<hidapi::HidError> for Error {
    fn from(err: hidapi::HidError) -> Self {
        Error::Hid(err.to_string())
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_unavailable_message_names_the_library() {
        let err = Error::LibraryUnavailable("hid_init failed".into());
        assert!(err.to_string().starts_with("native HID library not found"));
    }

    #[test]
    fn hid_error_converts() {
        let err: Error = hidapi::HidError::HidApiError {
            message: "device disconnected".into(),
        }
        .into();
        assert!(matches!(err, Error::Hid(ref msg) if msg.contains("device disconnected")));
    }
}

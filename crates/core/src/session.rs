//! Scoped ownership of one open device.

use crate::error::{Error, Result};
use crate::transport::{HidBackend, HidConnection};
use tracing::debug;

/// Manufacturer string buffer size, terminator included.
pub const MANUFACTURER_CAPACITY: usize = 64;

/// Product string buffer size, terminator included.
pub const PRODUCT_CAPACITY: usize = 128;

/// An exclusively owned handle to one device path.
///
/// The handle is either open or invalid. It is released exactly once: by
/// [`close`](Self::close) or, on any other exit path, when the session is
/// dropped. A closed session cannot be used again since `close` consumes it.
pub struct DeviceSession {
    path: String,
    handle: Option<Box<dyn HidConnection>>,
}

impl DeviceSession {
    /// Open `path`. A path that cannot be opened yields an invalid session
    /// rather than an error.
    pub fn open(backend: &dyn HidBackend, path: &str) -> Self {
        let handle = backend.open(path);
        if handle.is_none() {
            debug!(path, "Session could not be opened");
        }
        Self {
            path: path.to_string(),
            handle,
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.handle.is_none()
    }

    /// The open connection.
    pub fn connection(&self) -> Result<&dyn HidConnection> {
        self.handle
            .as_deref()
            .ok_or_else(|| Error::Hid(format!("session for {} is not open", self.path)))
    }

    pub fn manufacturer(&self) -> Result<String> {
        let conn = self.connection()?;
        conn.manufacturer_string(MANUFACTURER_CAPACITY)
    }

    pub fn product(&self) -> Result<String> {
        self.connection()?.product_string(PRODUCT_CAPACITY)
    }

    /// Release the native handle.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(path = %self.path, "Closing session");
            drop(handle);
        }
    }
}

impl Drop for DeviceSession {
    fn drop(&mut self) {
        self.release();
    }
}

/// Display label: `"manufacturer product"`, trimmed.
pub fn device_label(manufacturer: &str, product: &str) -> String {
    format!("{manufacturer} {product}").trim().to_string()
}

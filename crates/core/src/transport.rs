//! HID transport abstraction.
//!
//! Provides a trait-based transport layer so that the `hidapi` binding and
//! mock devices share the same interface. The engine only ever talks to
//! [`HidBackend`] and [`HidConnection`].

use crate::error::Result;
use serde::Serialize;

/// One enumerated logical HID interface.
///
/// Created fresh on every enumeration; never cached across calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    /// Opaque, transport-assigned locator used to open a session.
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub usage: u16,
    pub usage_page: u16,
    /// Manufacturer string as reported by enumeration, if any.
    pub manufacturer: Option<String>,
    /// Product string as reported by enumeration, if any.
    pub product: Option<String>,
}

/// Enumeration and connection capability of a native HID library.
pub trait HidBackend: Send + Sync {
    /// Make sure the native library is loaded and initialized.
    fn init(&self) -> Result<()>;

    /// List interfaces matching exactly one (vendor, product) pair.
    ///
    /// The returned list is fully materialized; the native enumeration is
    /// released before this returns.
    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Result<Vec<DeviceDescriptor>>;

    /// Open a path. `None` means the path could not be opened, which happens
    /// whenever a device is unplugged between enumerate and open.
    fn open(&self, path: &str) -> Option<Box<dyn HidConnection>>;
}

/// An open device. Dropping the connection closes the native handle.
pub trait HidConnection {
    /// Manufacturer string, at most `capacity - 1` characters.
    fn manufacturer_string(&self, capacity: usize) -> Result<String>;

    /// Product string, at most `capacity - 1` characters.
    fn product_string(&self, capacity: usize) -> Result<String>;

    /// Write an output report. Returns the number of bytes written.
    fn write(&self, data: &[u8]) -> Result<usize>;

    /// Read one input report into a `len`-byte buffer.
    ///
    /// The buffer is returned whole, zero-filled past whatever the device
    /// sent; a timeout yields an all-zero buffer.
    fn read_timeout(&self, len: usize, timeout_ms: i32) -> Result<Vec<u8>>;

    /// Request an input report. `buf[0]` carries the report id.
    fn get_input_report(&self, buf: &mut [u8]) -> Result<usize>;
}

/// Cut a descriptor string to a fixed-capacity buffer, terminator included.
pub fn truncate_to_capacity(s: &str, capacity: usize) -> String {
    s.chars().take(capacity.saturating_sub(1)).collect()
}


#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;

    #[test]
    fn truncate_keeps_room_for_terminator() {
        assert_eq!(truncate_to_capacity("HyperX", 64), "HyperX");
        assert_eq!(truncate_to_capacity("HyperX", 4), "Hyp");
        assert_eq!(truncate_to_capacity("HyperX", 0), "");
    }

    #[test]
    fn mock_enumerate_filters_by_pair() {
        let backend = MockBackend::new()
            .with_interface(descriptor("a", 0x03F0, 0x098D, 1, 0xFF00))
            .with_interface(descriptor("b", 0x03F0, 0x018B, 1, 0xFF00));
        let found = backend.enumerate(0x03F0, 0x098D).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "a");
    }

    #[test]
    fn mock_records_close_on_drop() {
        let backend = MockBackend::new().with_device(
            descriptor("a", 0x03F0, 0x098D, 1, 0xFF00),
            MockDevice::new("HP", "HyperX Cloud Alpha Wireless"),
        );
        let conn = backend.open("a").unwrap();
        assert_eq!(backend.close_count(), 0);
        drop(conn);
        assert_eq!(backend.close_count(), 1);
    }

    #[test]
    fn mock_read_pads_response() {
        let backend = MockBackend::new().with_device(
            descriptor("a", 0x03F0, 0x098D, 1, 0xFF00),
            MockDevice::new("HP", "x").battery_at(3, 42),
        );
        let conn = backend.open("a").unwrap();
        let buf = conn.read_timeout(20, 1000).unwrap();
        assert_eq!(buf.len(), 20);
        assert_eq!(buf[3], 42);
    }
}

//! `hidapi`-backed transport.

use crate::error::{Error, Result};
use crate::transport::{truncate_to_capacity, DeviceDescriptor, HidBackend, HidConnection};
use hidapi::{HidApi, HidDevice};
use std::ffi::CString;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

/// Native HID library binding.
///
/// The `HidApi` context is created by the first successful [`init`] and
/// reused afterwards; `hidapi` allows only one context per process.
///
/// [`init`]: HidBackend::init
pub struct HidApiBackend {
    api: Mutex<Option<HidApi>>,
}

impl HidApiBackend {
    pub fn new() -> Self {
        Self {
            api: Mutex::new(None),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<HidApi>>> {
        self.api
            .lock()
            .map_err(|_| Error::Hid("HID context lock poisoned".into()))
    }
}

impl Default for HidApiBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert an opaque path into the form the native layer accepts.
pub fn device_path(path: &str) -> Result<CString> {
    CString::new(path).map_err(|_| Error::InvalidPath(path.to_string()))
}

impl HidBackend for HidApiBackend {
    fn init(&self) -> Result<()> {
        let mut api = self.lock()?;
        if api.is_none() {
            let ctx = HidApi::new().map_err(|e| Error::LibraryUnavailable(e.to_string()))?;
            debug!("hidapi initialized");
            *api = Some(ctx);
        }
        Ok(())
    }

    fn enumerate(&self, vendor_id: u16, product_id: u16) -> Result<Vec<DeviceDescriptor>> {
        let mut guard = self.lock()?;
        let api = guard
            .as_mut()
            .ok_or_else(|| Error::LibraryUnavailable("hidapi not initialized".into()))?;

        api.reset_devices()?;
        api.add_devices(vendor_id, product_id)?;

        let devices: Vec<DeviceDescriptor> = api
            .device_list()
            .filter(|info| info.vendor_id() == vendor_id && info.product_id() == product_id)
            .map(|info| DeviceDescriptor {
                path: info.path().to_string_lossy().into_owned(),
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                usage: info.usage(),
                usage_page: info.usage_page(),
                manufacturer: info.manufacturer_string().map(str::to_string),
                product: info.product_string().map(str::to_string),
            })
            .collect();

        trace!(
            vid = format_args!("0x{:04X}", vendor_id),
            pid = format_args!("0x{:04X}", product_id),
            count = devices.len(),
            "hid_enumerate"
        );
        Ok(devices)
    }

    fn open(&self, path: &str) -> Option<Box<dyn HidConnection>> {
        let c_path = match device_path(path) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "Refusing to open device");
                return None;
            }
        };

        let guard = match self.lock() {
            Ok(g) => g,
            Err(e) => {
                warn!(error = %e, "Cannot open device");
                return None;
            }
        };
        let api = guard.as_ref()?;

        match api.open_path(&c_path) {
            Ok(device) => {
                debug!(path, "Opened HID device");
                Some(Box::new(HidApiConnection {
                    device,
                    path: path.to_string(),
                }))
            }
            Err(e) => {
                debug!(path, error = %e, "hid_open_path failed");
                None
            }
        }
    }
}

struct HidApiConnection {
    device: HidDevice,
    path: String,
}

impl HidConnection for HidApiConnection {
    fn manufacturer_string(&self, capacity: usize) -> Result<String> {
        let s = self.device.get_manufacturer_string()?.unwrap_or_default();
        Ok(truncate_to_capacity(&s, capacity))
    }

    fn product_string(&self, capacity: usize) -> Result<String> {
        let s = self.device.get_product_string()?.unwrap_or_default();
        Ok(truncate_to_capacity(&s, capacity))
    }

    fn write(&self, data: &[u8]) -> Result<usize> {
        trace!(report_hex = format_args!("{:02X?}", data), "HID TX");
        Ok(self.device.write(data)?)
    }

    fn read_timeout(&self, len: usize, timeout_ms: i32) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let n = self.device.read_timeout(&mut buf, timeout_ms)?;
        trace!(
            received = n,
            report_hex = format_args!("{:02X?}", &buf[..n]),
            "HID RX"
        );
        if n == 0 {
            debug!(timeout_ms, "hid_read_timeout returned no data");
        }
        Ok(buf)
    }

    fn get_input_report(&self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.device.get_input_report(buf)?)
    }
}

impl Drop for HidApiConnection {
    fn drop(&mut self) {
        debug!(path = %self.path, "Closing HID device");
    }
}

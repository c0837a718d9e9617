//! Battery query engine: selector, session, protocol and outcome in one call.
//!
//! [`BatteryQueryEngine::query`] is the only operation the UI layer needs.
//! It never fails: every fault is folded into an `Unavailable` reading.

use crate::catalog::{CatalogEntry, CATALOG};
use crate::error::{Error, Result};
use crate::protocol::{self, ProtocolProfile, READ_TIMEOUT_MS};
use crate::reading::{BatteryReading, MSG_CONNECT_FAILED, MSG_LIBRARY_MISSING, MSG_NO_DEVICE};
use crate::selector::{self, DiagnosticRow};
use crate::session::{device_label, DeviceSession};
use crate::transport::HidBackend;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError, TryLockError};
use tracing::{debug, info, warn};

/// Runs battery queries against one transport, one at a time.
pub struct BatteryQueryEngine<B: HidBackend> {
    backend: B,
    catalog: &'static [CatalogEntry],
    read_timeout_ms: i32,
    in_flight: Mutex<()>,
}

impl<B: HidBackend> BatteryQueryEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            catalog: CATALOG,
            read_timeout_ms: READ_TIMEOUT_MS,
            in_flight: Mutex::new(()),
        }
    }

    /// Override the response read timeout.
    pub fn with_read_timeout(mut self, timeout_ms: u32) -> Self {
        self.read_timeout_ms = i32::try_from(timeout_ms).unwrap_or(i32::MAX);
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Query the battery. Blocks while another query is in flight, then runs.
    pub fn query(&self) -> BatteryReading {
        let _guard = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.query_exclusive()
    }

    /// Query the battery unless a query is already in flight, in which case
    /// this returns `None` immediately.
    pub fn try_query(&self) -> Option<BatteryReading> {
        let _guard = match self.in_flight.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                debug!("Battery query already in flight, request dropped");
                return None;
            }
        };
        Some(self.query_exclusive())
    }

    /// Diagnostic listing of every interface of the first connected headset.
    pub fn list_devices(&self) -> Result<Vec<DiagnosticRow>> {
        self.backend.init()?;
        selector::list_devices(&self.backend, self.catalog)
    }

    fn query_exclusive(&self) -> BatteryReading {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run())) {
            Ok(Ok(reading)) => reading,
            Ok(Err(e)) => {
                warn!(error = %e, "Battery query failed");
                BatteryReading::unavailable(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(error = %message, "Battery query panicked");
                BatteryReading::unavailable(message)
            }
        }
    }

    fn run(&self) -> Result<BatteryReading> {
        match self.backend.init() {
            Ok(()) => {}
            Err(Error::LibraryUnavailable(detail)) => {
                warn!(detail = %detail, "HID library unavailable");
                return Ok(BatteryReading::unavailable(MSG_LIBRARY_MISSING));
            }
            Err(e) => return Err(e),
        }

        let Some(device) = selector::select_device(&self.backend, self.catalog)? else {
            debug!("No supported headset connected");
            return Ok(BatteryReading::unavailable(MSG_NO_DEVICE));
        };

        let session = DeviceSession::open(&self.backend, &device.path);
        if session.is_invalid() {
            return Ok(BatteryReading::unavailable(MSG_CONNECT_FAILED));
        }

        let manufacturer = session.manufacturer()?;
        let product = session.product()?;
        let label = device_label(&manufacturer, &product);

        let profile = ProtocolProfile::resolve(&manufacturer, &product);
        debug!(
            label = %label,
            family = profile.family.name(),
            "Resolved protocol"
        );

        let byte =
            protocol::read_battery_byte(session.connection()?, &profile, self.read_timeout_ms)?;
        session.close();

        let reading = BatteryReading::from_battery_byte(byte, &label);
        info!(
            label = %label,
            outcome = ?reading.outcome,
            "Battery query complete"
        );
        Ok(reading)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "battery query panicked".to_string()
    }
}

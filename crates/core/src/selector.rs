//! Device selection: which logical interface of a connected headset to talk to.
//!
//! One physical headset exposes several HID interfaces (consumer control,
//! vendor-defined, ...). The vendor battery protocol lives on the interface
//! with the highest (usage, usage page) pair.

use crate::catalog::CatalogEntry;
use crate::error::Result;
use crate::transport::{DeviceDescriptor, HidBackend};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// Diagnostic paths longer than this are shortened for display.
pub const PATH_DISPLAY_MAX: usize = 80;

/// Enumerate catalog entries in order and return the interfaces of the first
/// entry that yields any. Later entries are not consulted.
pub fn first_catalog_match(
    backend: &dyn HidBackend,
    catalog: &[CatalogEntry],
) -> Result<Vec<DeviceDescriptor>> {
    for entry in catalog {
        let found = backend.enumerate(entry.vendor_id, entry.product_id)?;
        if !found.is_empty() {
            debug!(
                vid = format_args!("0x{:04X}", entry.vendor_id),
                pid = format_args!("0x{:04X}", entry.product_id),
                interfaces = found.len(),
                "Catalog entry matched"
            );
            return Ok(found);
        }
    }
    Ok(Vec::new())
}

/// Pick the interface with the highest (usage, usage page).
///
/// On equal pairs the later interface wins, so the answer is fixed for a
/// fixed input order.
pub fn pick_highest_usage(candidates: &[DeviceDescriptor]) -> Option<&DeviceDescriptor> {
    candidates.iter().fold(None, |best, d| match best {
        Some(b) if (d.usage, d.usage_page) < (b.usage, b.usage_page) => Some(b),
        _ => Some(d),
    })
}

/// Select the single interface to open, or `None` when no headset is connected.
pub fn select_device(
    backend: &dyn HidBackend,
    catalog: &[CatalogEntry],
) -> Result<Option<DeviceDescriptor>> {
    let candidates = first_catalog_match(backend, catalog)?;
    let best = pick_highest_usage(&candidates).cloned();
    if let Some(d) = &best {
        debug!(
            usage = format_args!("0x{:04X}", d.usage),
            usage_page = format_args!("0x{:04X}", d.usage_page),
            path = %d.path,
            "Selected interface"
        );
    }
    Ok(best)
}

/// One line of the diagnostic device listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticRow {
    /// Vendor id as `0xNNNN`.
    pub vid: String,
    /// Product id as `0xNNNN`.
    pub pid: String,
    pub usage: u16,
    pub usage_page: u16,
    pub manufacturer: String,
    pub product: String,
    pub path: String,
}

impl DiagnosticRow {
    fn from_descriptor(d: DeviceDescriptor) -> Self {
        Self {
            vid: format!("0x{:04X}", d.vendor_id),
            pid: format!("0x{:04X}", d.product_id),
            usage: d.usage,
            usage_page: d.usage_page,
            manufacturer: d.manufacturer.unwrap_or_default(),
            product: d.product.unwrap_or_default(),
            path: d.path,
        }
    }

    /// Path cut to [`PATH_DISPLAY_MAX`] characters with a trailing `...`.
    pub fn path_short(&self) -> String {
        if self.path.chars().count() <= PATH_DISPLAY_MAX {
            return self.path.clone();
        }
        let head: String = self.path.chars().take(PATH_DISPLAY_MAX - 3).collect();
        format!("{head}...")
    }

    fn display_order(&self, other: &Self) -> Ordering {
        other
            .usage
            .cmp(&self.usage)
            .then_with(|| other.usage_page.cmp(&self.usage_page))
            .then_with(|| self.manufacturer.cmp(&other.manufacturer))
    }
}

/// List every interface of the first matching catalog entry, for display.
///
/// Sorted by usage descending, usage page descending, then manufacturer.
/// Strings come from the enumeration record; no device is opened.
pub fn list_devices(
    backend: &dyn HidBackend,
    catalog: &[CatalogEntry],
) -> Result<Vec<DiagnosticRow>> {
    let mut rows: Vec<DiagnosticRow> = first_catalog_match(backend, catalog)?
        .into_iter()
        .map(DiagnosticRow::from_descriptor)
        .collect();
    rows.sort_by(DiagnosticRow::display_order);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CATALOG;
    use crate::transport::mock::{descriptor, Call, MockBackend};
    use crate::{pids, HP_VID, KINGSTON_VID};

    #[test]
    fn pick_highest_usage_prefers_usage_then_page() {
        let list = vec![
            descriptor("consumer", HP_VID, pids::HP_CLOUD_ALPHA, 0x0001, 0x000C),
            descriptor("vendor", HP_VID, pids::HP_CLOUD_ALPHA, 0x0001, 0xFF90),
            descriptor("kbd", HP_VID, pids::HP_CLOUD_ALPHA, 0x0000, 0xFFFF),
        ];
        assert_eq!(pick_highest_usage(&list).unwrap().path, "vendor");
    }

    #[test]
    fn pick_highest_usage_later_tie_wins() {
        let list = vec![
            descriptor("first", HP_VID, pids::HP_CLOUD_II, 3, 0xFF00),
            descriptor("second", HP_VID, pids::HP_CLOUD_II, 3, 0xFF00),
        ];
        assert_eq!(pick_highest_usage(&list).unwrap().path, "second");
    }

    #[test]
    fn pick_highest_usage_is_deterministic() {
        let list = vec![
            descriptor("a", HP_VID, pids::HP_CLOUD_II, 1, 0xFF13),
            descriptor("b", HP_VID, pids::HP_CLOUD_II, 5, 0x000C),
            descriptor("c", HP_VID, pids::HP_CLOUD_II, 5, 0x0001),
        ];
        let first = pick_highest_usage(&list).unwrap().path.clone();
        for _ in 0..10 {
            assert_eq!(pick_highest_usage(&list).unwrap().path, first);
        }
        let best = pick_highest_usage(&list).unwrap();
        assert!(list.iter().all(|d| best.usage >= d.usage));
        assert_eq!(best.path, "b");
    }

    #[test]
    fn pick_highest_usage_accepts_all_zero_interface() {
        let only = descriptor("only", KINGSTON_VID, pids::KINGSTON_CLOUD_II, 0, 0);
        assert_eq!(pick_highest_usage(&[only]).unwrap().path, "only");
        assert!(pick_highest_usage(&[]).is_none());
    }

    #[test]
    fn first_match_stops_at_earliest_catalog_entry() {
        let stinger = descriptor("stinger", HP_VID, pids::HP_CLOUD_STINGER_II, 9, 9);
        let core = descriptor("core", HP_VID, pids::HP_CLOUD_II_CORE, 1, 1);
        let backend = MockBackend::new()
            .with_interface(stinger)
            .with_interface(core);

        let found = first_catalog_match(&backend, CATALOG).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "core");

        // Kingston, HP Cloud II, then HP Cloud II Core matched: stinger never queried.
        let filters: Vec<_> = backend
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Enumerate { .. }))
            .collect();
        assert_eq!(filters.len(), 3);
    }

    #[test]
    fn select_device_none_when_nothing_connected() {
        let backend = MockBackend::new();
        assert!(select_device(&backend, CATALOG).unwrap().is_none());
        assert_eq!(backend.calls().len(), CATALOG.len());
    }

    #[test]
    fn list_devices_sorts_for_display() {
        let mut a = descriptor("a", HP_VID, pids::HP_CLOUD_II, 1, 0x000C);
        a.manufacturer = Some("HP".into());
        let mut b = descriptor("b", HP_VID, pids::HP_CLOUD_II, 1, 0xFF00);
        b.manufacturer = Some("HP".into());
        let mut c = descriptor("c", HP_VID, pids::HP_CLOUD_II, 3, 0x000C);
        c.manufacturer = Some("HP".into());
        c.product = Some("HyperX Cloud II Wireless".into());
        let mut d = descriptor("d", HP_VID, pids::HP_CLOUD_II, 1, 0x000C);
        d.manufacturer = Some("Alpha".into());

        let backend = MockBackend::new()
            .with_interface(a)
            .with_interface(b)
            .with_interface(c)
            .with_interface(d);

        let rows = list_devices(&backend, CATALOG).unwrap();
        let order: Vec<_> = rows.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(order, ["c", "b", "d", "a"]);
        assert_eq!(rows[0].vid, "0x03F0");
        assert_eq!(rows[0].pid, "0x018B");
        assert_eq!(rows[0].product, "HyperX Cloud II Wireless");
        assert_eq!(rows[1].product, "");
    }

    #[test]
    fn list_devices_empty_when_nothing_connected() {
        let backend = MockBackend::new();
        assert!(list_devices(&backend, CATALOG).unwrap().is_empty());
    }

    #[test]
    fn path_short_truncates_long_paths() {
        let hidraw = descriptor("/dev/hidraw0", KINGSTON_VID, pids::KINGSTON_CLOUD_II, 1, 1);
        let mut row = DiagnosticRow::from_descriptor(hidraw);
        assert_eq!(row.path_short(), "/dev/hidraw0");

        row.path = "x".repeat(81);
        let short = row.path_short();
        assert_eq!(short.len(), 80);
        assert!(short.ends_with("..."));

        row.path = "y".repeat(80);
        assert_eq!(row.path_short(), row.path);
    }
}

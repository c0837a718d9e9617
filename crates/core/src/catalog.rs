//! Supported headset table.
//!
//! Table order is priority order: the selector stops at the first entry that
//! enumerates anything. Supporting new hardware means appending an entry.

use crate::{pids, HP_VID, KINGSTON_VID};

/// One supported (vendor, product) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl CatalogEntry {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

/// Supported headsets, in selection priority order.
pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry::new(KINGSTON_VID, pids::KINGSTON_CLOUD_II),
    CatalogEntry::new(HP_VID, pids::HP_CLOUD_II),
    CatalogEntry::new(HP_VID, pids::HP_CLOUD_II_CORE),
    CatalogEntry::new(HP_VID, pids::HP_CLOUD_ALPHA),
    CatalogEntry::new(HP_VID, pids::HP_CLOUD_II_B),
    CatalogEntry::new(HP_VID, pids::HP_CLOUD_STINGER_II),
];

//! headset-battery-core: headset discovery, vendor battery protocols, and the
//! battery query engine.
//!
//! This crate speaks the proprietary HID battery-query protocols of HyperX
//! (Kingston and HP era) wireless headsets and reports a charge percentage.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod hid;
pub mod poller;
pub mod protocol;
pub mod reading;
pub mod selector;
pub mod session;
pub mod transport;

/// Kingston USB Vendor ID.
pub const KINGSTON_VID: u16 = 0x0951;

/// HP USB Vendor ID (HyperX after the 2021 acquisition).
pub const HP_VID: u16 = 0x03F0;

/// Known headset product IDs.
pub mod pids {
    /// Kingston HyperX Cloud II Wireless dongle.
    pub const KINGSTON_CLOUD_II: u16 = 0x1718;
    /// HP HyperX Cloud II Wireless dongle.
    pub const HP_CLOUD_II: u16 = 0x018B;
    /// HP HyperX Cloud II Wireless dongle, later revision.
    pub const HP_CLOUD_II_B: u16 = 0x0696;
    /// HP HyperX Cloud II Core Wireless.
    pub const HP_CLOUD_II_CORE: u16 = 0x0995;
    /// HP HyperX Cloud Alpha Wireless.
    pub const HP_CLOUD_ALPHA: u16 = 0x098D;
    /// HP HyperX Cloud Stinger 2 Wireless.
    pub const HP_CLOUD_STINGER_II: u16 = 0x0D93;
}

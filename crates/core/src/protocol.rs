//! Vendor battery-query protocols.
//!
//! The device family is told apart only by its descriptor strings, matched
//! case-insensitively by substring:
//!
//! | Manufacturer | Product contains                                   | Payload (index: value)                          | Battery byte |
//! |--------------|----------------------------------------------------|-------------------------------------------------|--------------|
//! | has "HP"     | "Cloud II Core"                                    | 0:66 1:89                                       | 4            |
//! | has "HP"     | "Cloud II Wireless" or "Cloud Stinger 2 Wireless"  | 0:06 1:FF 2:BB 3:02                             | 7            |
//! | has "HP"     | "Cloud Alpha Wireless"                             | 0:21 1:BB 2:0B                                  | 3            |
//! | no "HP"      | any (Kingston)                                     | 0:06 2:02 4:9A 7:68 8:4A 9:8E 10:0A 14:BB 15:02 | 7            |
//!
//! An HP device with an unrecognized product gets an all-zero payload and
//! battery byte 7. Kingston firmware additionally needs a priming input
//! report (id 0x06, 160 bytes) before it answers the query.

use crate::error::Result;
use crate::transport::HidConnection;
use tracing::{debug, trace};

/// Size of every query payload.
pub const WRITE_BUFFER_SIZE: usize = 52;

/// Size of the response buffer.
pub const RESPONSE_BUFFER_SIZE: usize = 20;

/// Default read-with-timeout bound.
pub const READ_TIMEOUT_MS: i32 = 1000;

/// Battery byte used when no family matches.
pub const DEFAULT_BATTERY_OFFSET: usize = 7;

/// Kingston priming input report.
pub const KINGSTON_PRIMING_REPORT_ID: u8 = 0x06;
pub const KINGSTON_PRIMING_BUFFER_SIZE: usize = 160;

/// Protocol family resolved from descriptor strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFamily {
    HpCloudIICore,
    HpCloudIIWireless,
    HpCloudAlphaWireless,
    /// HP firmware with no known product string.
    HpUnknown,
    Kingston,
}

impl ProtocolFamily {
    /// Resolve the family. Matching is case-insensitive substring search.
    pub fn resolve(manufacturer: &str, product: &str) -> Self {
        let manufacturer = manufacturer.to_lowercase();
        let product = product.to_lowercase();

        if !manufacturer.contains("hp") {
            return Self::Kingston;
        }
        if product.contains("cloud ii core") {
            Self::HpCloudIICore
        } else if product.contains("cloud ii wireless")
            || product.contains("cloud stinger 2 wireless")
        {
            Self::HpCloudIIWireless
        } else if product.contains("cloud alpha wireless") {
            Self::HpCloudAlphaWireless
        } else {
            Self::HpUnknown
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::HpCloudIICore => "HP Cloud II Core",
            Self::HpCloudIIWireless => "HP Cloud II / Stinger 2 Wireless",
            Self::HpCloudAlphaWireless => "HP Cloud Alpha Wireless",
            Self::HpUnknown => "HP (unrecognized product)",
            Self::Kingston => "Kingston Cloud II Wireless",
        }
    }

    /// Sparse (index, value) bytes of the query payload.
    fn payload_bytes(&self) -> &'static [(usize, u8)] {
        match self {
            Self::HpCloudIICore => &[(0, 0x66), (1, 0x89)],
            Self::HpCloudIIWireless => &[(0, 0x06), (1, 0xFF), (2, 0xBB), (3, 0x02)],
            Self::HpCloudAlphaWireless => &[(0, 0x21), (1, 0xBB), (2, 0x0B)],
            Self::HpUnknown => &[],
            Self::Kingston => &[
                (0, 0x06),
                (2, 0x02),
                (4, 0x9A),
                (7, 0x68),
                (8, 0x4A),
                (9, 0x8E),
                (10, 0x0A),
                (14, 0xBB),
                (15, 0x02),
            ],
        }
    }

    fn battery_offset(&self) -> usize {
        match self {
            Self::HpCloudIICore => 4,
            Self::HpCloudAlphaWireless => 3,
            Self::HpCloudIIWireless | Self::HpUnknown | Self::Kingston => DEFAULT_BATTERY_OFFSET,
        }
    }
}

/// Input report to request and discard before the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimingRead {
    pub report_id: u8,
    pub buffer_size: usize,
}

/// Everything needed to run one battery query against a device family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolProfile {
    pub family: ProtocolFamily,
    pub payload: [u8; WRITE_BUFFER_SIZE],
    pub battery_offset: usize,
    pub priming: Option<PrimingRead>,
}

impl ProtocolProfile {
    /// Build the profile for a manufacturer/product pair.
    pub fn resolve(manufacturer: &str, product: &str) -> Self {
        Self::for_family(ProtocolFamily::resolve(manufacturer, product))
    }

    pub fn for_family(family: ProtocolFamily) -> Self {
        let mut payload = [0u8; WRITE_BUFFER_SIZE];
        for &(index, value) in family.payload_bytes() {
            payload[index] = value;
        }
        let priming = (family == ProtocolFamily::Kingston).then_some(PrimingRead {
            report_id: KINGSTON_PRIMING_REPORT_ID,
            buffer_size: KINGSTON_PRIMING_BUFFER_SIZE,
        });
        Self {
            family,
            payload,
            battery_offset: family.battery_offset(),
            priming,
        }
    }
}

/// Run the query exchange and return the raw battery byte.
///
/// Order: priming read (if any, result discarded), payload write, one read of
/// [`RESPONSE_BUFFER_SIZE`] bytes. Returns `None` when the battery offset
/// falls outside the response buffer.
pub fn read_battery_byte(
    conn: &dyn HidConnection,
    profile: &ProtocolProfile,
    timeout_ms: i32,
) -> Result<Option<u8>> {
    if let Some(priming) = profile.priming {
        let mut buf = vec![0u8; priming.buffer_size];
        buf[0] = priming.report_id;
        match conn.get_input_report(&mut buf) {
            Ok(n) => trace!(received = n, "Priming input report"),
            Err(e) => debug!(error = %e, "Priming input report failed, continuing"),
        }
    }

    conn.write(&profile.payload)?;
    let response = conn.read_timeout(RESPONSE_BUFFER_SIZE, timeout_ms)?;

    let byte = response.get(profile.battery_offset).copied();
    debug!(
        family = profile.family.name(),
        offset = profile.battery_offset,
        value = ?byte,
        "Battery byte"
    );
    Ok(byte)
}

//! Constants for the cellular HAL contract.
//!
//! These constants correspond to the status codes, buffer capacities and
//! physical value ranges that every implementation of the contract must
//! respect.

/// Status codes returned by the C-style surface.
pub mod status {
    pub const RETURN_OK: i32 = 0;
    pub const RETURN_ERROR: i32 = -1;
}

/// Raw boolean bytes.
pub mod flag {
    pub const TRUE: u8 = 1;
    pub const FALSE: u8 = 0;
}

/// Buffer capacities in bytes, NUL terminator included.
pub mod limits {
    pub const IMEI: usize = 16;
    pub const IMEISV: usize = 16;
    pub const ICCID: usize = 21;
    pub const MSISDN: usize = 20;
    pub const FIRMWARE_VERSION: usize = 128;
    pub const RADIO_TECHNOLOGY: usize = 128;
    pub const NETWORK_NAME: usize = 128;
    pub const PROFILE_NAME: usize = 64;
    pub const APN: usize = 64;
    pub const USERNAME: usize = 256;
    pub const PASSWORD: usize = 256;
    pub const PROXY: usize = 45;
    /// Highest MCC/MNC value
    pub const MOBILE_CODE_MAX: u32 = 999;
    /// Area codes are non-negative 32-bit signed values
    pub const AREA_CODE_MAX: u32 = i32::MAX as u32;
}

/// Physical ranges of [`SignalInfo`](crate::SignalInfo) fields (inclusive).
pub mod signal_range {
    pub const RSSI: (f64, f64) = (-90.0, -30.0);
    pub const RSRQ: (f64, f64) = (-19.5, -3.0);
    pub const RSRP: (f64, f64) = (-140.0, -44.0);
    pub const SNR: (f64, f64) = (-20.0, 30.0);
    pub const TX_POWER: (f64, f64) = (0.0, 30.0);
}

/// UICC slot counts the platform supports.
pub mod slots {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 2;
}

/// Timeout constants for asynchronous completions.
///
/// The contract itself has no timeouts; these are the defaults used by
/// [`ModemOptions`](crate::ModemOptions) when a caller waits on a
/// [`Completion`](crate::Completion).
pub mod timeouts {
    use std::time::Duration;

    /// Maximum time to wait for a profile operation (10 seconds).
    const PROFILE_TIMEOUT_SECS: u64 = 10;

    /// Maximum time to wait for a data session to come up (30 seconds).
    ///
    /// Context activation includes an implicit attach, which can take a
    /// while on a weak signal.
    const NETWORK_START_TIMEOUT_SECS: u64 = 30;

    /// Returns the profile operation timeout.
    pub fn profile_timeout() -> Duration {
        Duration::from_secs(PROFILE_TIMEOUT_SECS)
    }

    /// Returns the data session start timeout.
    pub fn network_start_timeout() -> Duration {
        Duration::from_secs(NETWORK_START_TIMEOUT_SECS)
    }
}

/// Event bus sizing.
pub mod events {
    /// Events buffered per subscriber before the oldest are dropped.
    pub const CHANNEL_CAPACITY: usize = 64;
}

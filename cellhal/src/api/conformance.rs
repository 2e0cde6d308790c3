//! Output conformance checks.
//!
//! Everything a modem reports must lie within the documented enumerations
//! and physical ranges. [`CellularModem`](crate::CellularModem) runs these
//! checks on backend output (unless disabled in
//! [`ModemOptions`](crate::ModemOptions)); vendor test suites can run them
//! on raw structures directly.
//!
//! # Example
//!
//! ```rust
//! use cellhal::SignalInfo;
//! use cellhal::conformance::check_signal_info;
//!
//! let reading = SignalInfo { rssi: -120, rsrq: -10.0, rsrp: -95, snr: 5, tx_power: 10 };
//! assert!(check_signal_info(&reading).is_err());
//! ```

use crate::Result;
use crate::api::models::{
    HalError, NetworkScanResult, PacketStats, PlmnInfo, RegisteredService, RegistrationStatus,
    SignalInfo, UiccApplication, UiccFormFactor, UiccSlotInfo, UiccStatus,
};
use crate::api::raw::{RawNetworkScanResult, RawPlmnInfo, RawUiccSlotInfo};
use crate::core::validation::{parse_enum, parse_flag};
use crate::types::constants::{limits, signal_range, slots};

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(HalError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Checks a string output: non-empty and fitting `capacity` bytes with its
/// terminator.
pub fn check_string_output(field: &'static str, value: &str, capacity: usize) -> Result<()> {
    if value.is_empty() {
        return Err(HalError::EmptyValue(field));
    }
    check_string_capacity(field, value, capacity)
}

/// Checks that a string, possibly empty, fits `capacity` bytes with its
/// terminator.
pub fn check_string_capacity(field: &'static str, value: &str, capacity: usize) -> Result<()> {
    let needed = value.len() + 1;
    if needed > capacity || value.as_bytes().contains(&0) {
        return Err(HalError::BufferTooSmall {
            field,
            needed,
            capacity,
        });
    }
    Ok(())
}

/// Checks every signal field against its physical range.
pub fn check_signal_info(signal: &SignalInfo) -> Result<()> {
    check_range("rssi", f64::from(signal.rssi), signal_range::RSSI)?;
    check_range("rsrq", f64::from(signal.rsrq), signal_range::RSRQ)?;
    check_range("rsrp", f64::from(signal.rsrp), signal_range::RSRP)?;
    check_range("snr", f64::from(signal.snr), signal_range::SNR)?;
    check_range("tx_power", f64::from(signal.tx_power), signal_range::TX_POWER)?;
    Ok(())
}

fn check_mobile_code(field: &'static str, code: u32) -> Result<()> {
    check_range(
        field,
        f64::from(code),
        (0.0, f64::from(limits::MOBILE_CODE_MAX)),
    )
}

/// Checks registration information.
pub fn check_plmn_info(plmn: &PlmnInfo) -> Result<()> {
    check_string_output("network_name", &plmn.network_name, limits::NETWORK_NAME)?;
    check_mobile_code("mcc", plmn.mcc)?;
    check_mobile_code("mnc", plmn.mnc)?;
    check_range(
        "area_code",
        f64::from(plmn.area_code),
        (0.0, f64::from(limits::AREA_CODE_MAX)),
    )?;
    Ok(())
}

/// Checks one scan entry.
pub fn check_scan_result(network: &NetworkScanResult) -> Result<()> {
    check_string_capacity("network_name", &network.network_name, limits::NETWORK_NAME)?;
    check_mobile_code("mcc", network.mcc)?;
    check_mobile_code("mnc", network.mnc)?;
    Ok(())
}

/// Checks that the platform reports a supported number of UICC slots.
pub fn check_slot_count(count: u32) -> Result<()> {
    check_range(
        "uicc_slot_count",
        f64::from(count),
        (f64::from(slots::MIN), f64::from(slots::MAX)),
    )
}

/// Checks the text fields of a slot snapshot. An empty slot reports empty
/// strings.
pub fn check_slot_info(info: &UiccSlotInfo) -> Result<()> {
    check_string_capacity("operator_name", &info.operator_name, limits::NETWORK_NAME)?;
    check_string_capacity("iccid", &info.iccid, limits::ICCID)?;
    check_string_capacity("msisdn", &info.msisdn, limits::MSISDN)?;
    Ok(())
}

/// Checks that no cumulative counter went backwards since `previous`.
pub fn check_counters(previous: Option<&PacketStats>, current: &PacketStats) -> Result<()> {
    let Some(previous) = previous else {
        return Ok(());
    };

    for ((name, before), (_, after)) in previous
        .cumulative_counters()
        .into_iter()
        .zip(current.cumulative_counters())
    {
        if after < before {
            return Err(HalError::CounterRegression(name));
        }
    }
    Ok(())
}

/// Checks a raw slot snapshot: strict flags and in-range codes.
pub fn check_raw_slot_info(info: &RawUiccSlotInfo) -> Result<()> {
    parse_flag("slot_enabled", info.slot_enabled)?;
    parse_flag("card_present", info.card_present)?;
    parse_flag("card_enabled", info.card_enabled)?;
    parse_enum::<UiccFormFactor>("form_factor", info.form_factor)?;
    parse_enum::<UiccApplication>("application", info.application)?;
    parse_enum::<UiccStatus>("status", info.status)?;
    Ok(())
}

/// Checks raw registration information.
pub fn check_raw_plmn_info(plmn: &RawPlmnInfo) -> Result<()> {
    check_mobile_code("mcc", plmn.mcc)?;
    check_mobile_code("mnc", plmn.mnc)?;
    parse_flag("roaming_enabled", plmn.roaming_enabled)?;
    check_range("area_code", f64::from(plmn.area_code), (0.0, f64::from(i32::MAX)))?;
    parse_enum::<RegistrationStatus>("registration_status", plmn.registration_status)?;
    parse_enum::<RegisteredService>("registered_service", plmn.registered_service)?;
    Ok(())
}

/// Checks a raw scan entry.
pub fn check_raw_scan_result(network: &RawNetworkScanResult) -> Result<()> {
    check_mobile_code("mcc", network.mcc)?;
    check_mobile_code("mnc", network.mnc)?;
    parse_flag("allowed", network.allowed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal() -> SignalInfo {
        SignalInfo {
            rssi: -60,
            rsrq: -19.5,
            rsrp: -44,
            snr: -20,
            tx_power: 30,
        }
    }

    #[test]
    fn signal_bounds_are_inclusive() {
        assert!(check_signal_info(&signal()).is_ok());
    }

    #[test]
    fn signal_outside_range_names_field() {
        let mut s = signal();
        s.rsrq = -19.6;
        assert!(matches!(
            check_signal_info(&s),
            Err(HalError::OutOfRange { field: "rsrq", .. })
        ));

        let mut s = signal();
        s.tx_power = -1;
        assert!(matches!(
            check_signal_info(&s),
            Err(HalError::OutOfRange {
                field: "tx_power",
                ..
            })
        ));

        let mut s = signal();
        s.rsrq = f32::NAN;
        assert!(check_signal_info(&s).is_err());
    }

    #[test]
    fn string_outputs() {
        assert!(check_string_output("imei", "356938035643809", limits::IMEI).is_ok());
        assert!(matches!(
            check_string_output("imei", "", limits::IMEI),
            Err(HalError::EmptyValue("imei"))
        ));
        assert!(check_string_output("imei", "3569380356438091", limits::IMEI).is_err());
    }

    #[test]
    fn scan_names_must_fit() {
        let mut network = NetworkScanResult {
            network_name: "Example".into(),
            mcc: 310,
            mnc: 260,
            allowed: true,
        };
        assert!(check_scan_result(&network).is_ok());

        network.network_name = "n".repeat(limits::NETWORK_NAME);
        assert!(matches!(
            check_scan_result(&network),
            Err(HalError::BufferTooSmall {
                field: "network_name",
                ..
            })
        ));
    }

    #[test]
    fn slot_strings_may_be_empty_but_must_fit() {
        let mut info = UiccSlotInfo {
            slot_enabled: true,
            card_present: false,
            card_enabled: false,
            form_factor: UiccFormFactor::ThreeFf,
            application: UiccApplication::Usim,
            status: UiccStatus::Empty,
            operator_name: String::new(),
            iccid: String::new(),
            msisdn: String::new(),
        };
        assert!(check_slot_info(&info).is_ok());

        info.iccid = "8".repeat(limits::ICCID - 1);
        info.msisdn = "1".repeat(limits::MSISDN - 1);
        assert!(check_slot_info(&info).is_ok());

        info.iccid.push('9');
        assert!(matches!(
            check_slot_info(&info),
            Err(HalError::BufferTooSmall { field: "iccid", .. })
        ));

        info.iccid.clear();
        info.msisdn.push_str("23");
        assert!(matches!(
            check_slot_info(&info),
            Err(HalError::BufferTooSmall {
                field: "msisdn",
                ..
            })
        ));
    }

    #[test]
    fn slot_count_is_one_or_two() {
        assert!(check_slot_count(0).is_err());
        assert!(check_slot_count(1).is_ok());
        assert!(check_slot_count(2).is_ok());
        assert!(check_slot_count(3).is_err());
    }

    #[test]
    fn counters_may_not_regress() {
        let before = PacketStats {
            bytes_sent: 100,
            ..Default::default()
        };
        let after = PacketStats {
            bytes_sent: 50,
            upstream_max_bit_rate: 0,
            ..Default::default()
        };
        assert!(check_counters(None, &after).is_ok());
        assert!(matches!(
            check_counters(Some(&before), &after),
            Err(HalError::CounterRegression("bytes_sent"))
        ));
        assert!(check_counters(Some(&after), &before).is_ok());
    }

    #[test]
    fn raw_slot_info_flags_must_be_strict() {
        let mut raw = RawUiccSlotInfo {
            slot_enabled: 1,
            card_present: 1,
            card_enabled: 0,
            form_factor: 3,
            application: 2,
            status: 0,
            ..Default::default()
        };
        assert!(check_raw_slot_info(&raw).is_ok());

        raw.card_present = 2;
        assert!(check_raw_slot_info(&raw).is_err());

        raw.card_present = 1;
        raw.form_factor = 4;
        assert!(check_raw_slot_info(&raw).is_err());
    }
}

//! Contract conformance tests over the status surface.
//!
//! Every call returns RETURN_OK or RETURN_ERROR, missing outputs fail
//! without a write, and every reported value lies within its documented
//! enumeration or physical range.

use cellhal::conformance::{check_raw_plmn_info, check_raw_scan_result, check_raw_slot_info};
use cellhal::status::{RETURN_ERROR, RETURN_OK, read_c_string};
use cellhal::types::constants::{limits, signal_range};
use cellhal::{
    CellularModem, IpFamily, ModemOptions, NetworkIpType, PdpAuthentication, PdpNetworkConfig,
    PdpType, ProfileType, RadioTechPreference, RawInitConfig, RawNetworkScanResult, RawPlmnInfo,
    RawProfileDescriptor, RawUiccSlotInfo, SignalInfo, SimulatedModem, StatusApi,
};
use std::sync::Arc;

fn status_api() -> StatusApi {
    StatusApi::new(CellularModem::new(
        Arc::new(SimulatedModem::default()),
        ModemOptions::default(),
    ))
}

fn raw_profile(profile_id: u32) -> RawProfileDescriptor {
    RawProfileDescriptor {
        profile_id,
        profile_type: ProfileType::ThreeGpp.as_raw(),
        pdp_context_number: 1,
        pdp_type: PdpType::Ipv4v6.as_raw(),
        pdp_authentication: PdpAuthentication::None.as_raw(),
        pdp_network_config: PdpNetworkConfig::Nas.as_raw(),
        profile_name: "internet".into(),
        apn: "internet.example".into(),
        is_default: 1,
        ..Default::default()
    }
}

fn raw_init(ip_family: u32) -> RawInitConfig {
    RawInitConfig {
        ip_family_preference: ip_family,
        preferred_technology: RadioTechPreference::Lte.as_raw(),
        default_profile: raw_profile(1),
    }
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value >= min && value <= max
}

#[tokio::test]
async fn test_missing_outputs_fail() {
    let api = status_api();

    assert_eq!(api.get_total_no_of_uicc_slots(None).await, RETURN_ERROR);
    assert_eq!(api.get_uicc_slot_info(0, None).await, RETURN_ERROR);
    assert_eq!(api.get_active_card_status(None).await, RETURN_ERROR);
    assert_eq!(api.get_signal_info(None).await, RETURN_ERROR);
    assert_eq!(api.get_device_imei(None).await, RETURN_ERROR);
    assert_eq!(api.get_device_imei_sv(None).await, RETURN_ERROR);
    assert_eq!(api.get_modem_current_iccid(None).await, RETURN_ERROR);
    assert_eq!(api.get_modem_current_msisdn(None).await, RETURN_ERROR);
    assert_eq!(api.get_modem_firmware_version(None).await, RETURN_ERROR);
    assert_eq!(api.get_packet_statistics(None).await, RETURN_ERROR);
    assert_eq!(api.get_current_modem_interface_status(None).await, RETURN_ERROR);
    assert_eq!(api.get_current_plmn_information(None).await, RETURN_ERROR);
    assert_eq!(api.get_modem_preferred_radio_technology(None).await, RETURN_ERROR);
    assert_eq!(api.get_modem_current_radio_technology(None).await, RETURN_ERROR);
    assert_eq!(api.get_modem_supported_radio_technology(None).await, RETURN_ERROR);
    assert_eq!(api.set_modem_preferred_radio_technology(None).await, RETURN_ERROR);

    let mut count = 77;
    assert_eq!(api.get_profile_list(None, Some(&mut count)).await, RETURN_ERROR);
    assert_eq!(count, 77);

    let mut networks = Vec::new();
    assert_eq!(
        api.get_available_networks_information(Some(&mut networks), None)
            .await,
        RETURN_ERROR
    );
    assert!(networks.is_empty());
}

#[tokio::test]
async fn test_uicc_slot_count_is_one_or_two() {
    let api = status_api();
    let mut count = 0;
    assert_eq!(api.get_total_no_of_uicc_slots(Some(&mut count)).await, RETURN_OK);
    assert!((1..=2).contains(&count));
}

#[tokio::test]
async fn test_uicc_slot_info_fields() {
    let api = status_api();
    let mut count = 0;
    assert_eq!(api.get_total_no_of_uicc_slots(Some(&mut count)).await, RETURN_OK);

    for index in 0..count {
        let mut info = RawUiccSlotInfo::default();
        assert_eq!(api.get_uicc_slot_info(index, Some(&mut info)).await, RETURN_OK);
        assert!(check_raw_slot_info(&info).is_ok(), "slot {index}: {info:?}");
    }

    let mut info = RawUiccSlotInfo {
        form_factor: 9,
        ..Default::default()
    };
    assert_eq!(api.get_uicc_slot_info(count, Some(&mut info)).await, RETURN_ERROR);
    assert_eq!(info.form_factor, 9);
}

#[tokio::test]
async fn test_active_card_status_in_range() {
    let api = status_api();
    let mut status = 99;
    assert_eq!(api.get_active_card_status(Some(&mut status)).await, RETURN_OK);
    assert!(status <= 3);
}

#[tokio::test]
async fn test_signal_info_in_range() {
    let api = status_api();
    let mut signal = SignalInfo {
        rssi: 0,
        rsrq: 0.0,
        rsrp: 0,
        snr: 0,
        tx_power: -1,
    };
    assert_eq!(api.get_signal_info(Some(&mut signal)).await, RETURN_OK);

    assert!(in_range(f64::from(signal.rssi), signal_range::RSSI));
    assert!(in_range(f64::from(signal.rsrq), signal_range::RSRQ));
    assert!(in_range(f64::from(signal.rsrp), signal_range::RSRP));
    assert!(in_range(f64::from(signal.snr), signal_range::SNR));
    assert!(in_range(f64::from(signal.tx_power), signal_range::TX_POWER));
}

#[tokio::test]
async fn test_identity_strings() {
    let api = status_api();

    let mut imei = [0u8; limits::IMEI];
    assert_eq!(api.get_device_imei(Some(&mut imei)).await, RETURN_OK);
    let imei = read_c_string(&imei).unwrap();
    assert!(!imei.is_empty() && imei.len() < limits::IMEI);

    let mut imeisv = [0u8; limits::IMEISV];
    assert_eq!(api.get_device_imei_sv(Some(&mut imeisv)).await, RETURN_OK);
    assert!(!read_c_string(&imeisv).unwrap().is_empty());

    let mut iccid = [0u8; limits::ICCID];
    assert_eq!(api.get_modem_current_iccid(Some(&mut iccid)).await, RETURN_OK);
    assert!(!read_c_string(&iccid).unwrap().is_empty());

    let mut msisdn = [0u8; limits::MSISDN];
    assert_eq!(api.get_modem_current_msisdn(Some(&mut msisdn)).await, RETURN_OK);
    assert!(!read_c_string(&msisdn).unwrap().is_empty());

    let mut firmware = [0u8; limits::FIRMWARE_VERSION];
    assert_eq!(api.get_modem_firmware_version(Some(&mut firmware)).await, RETURN_OK);
    assert!(!read_c_string(&firmware).unwrap().is_empty());
}

#[tokio::test]
async fn test_undersized_buffer_fails() {
    let api = status_api();
    let mut tiny = [0xaau8; 4];
    assert_eq!(api.get_device_imei(Some(&mut tiny)).await, RETURN_ERROR);
    assert_eq!(tiny, [0xaa; 4]);
}

#[tokio::test]
async fn test_sim_power_enable_arguments() {
    let api = status_api();
    assert_eq!(api.sim_power_enable(0, 1).await, RETURN_OK);
    assert_eq!(api.sim_power_enable(0, 2).await, RETURN_ERROR);
    assert_eq!(api.sim_power_enable(0, 0xff).await, RETURN_ERROR);
    assert_eq!(api.sim_power_enable(7, 1).await, RETURN_ERROR);
}

#[tokio::test]
async fn test_operating_configurations() {
    let api = status_api();
    for config in 1..=5 {
        assert_eq!(
            api.set_modem_operating_configuration(config).await,
            RETURN_OK,
            "config {config}"
        );
    }
    for config in [0, 6, 99, u32::MAX] {
        assert_eq!(
            api.set_modem_operating_configuration(config).await,
            RETURN_ERROR,
            "config {config}"
        );
    }
}

#[tokio::test]
async fn test_preferred_radio_technology_round_trip() {
    let api = status_api();
    assert_eq!(api.set_modem_preferred_radio_technology(Some("LTE")).await, RETURN_OK);

    let mut buf = [0u8; limits::RADIO_TECHNOLOGY];
    assert_eq!(api.get_modem_preferred_radio_technology(Some(&mut buf)).await, RETURN_OK);
    assert_eq!(read_c_string(&buf), Some("LTE"));

    assert_eq!(api.set_modem_preferred_radio_technology(Some("5G")).await, RETURN_ERROR);
    assert_eq!(api.get_modem_preferred_radio_technology(Some(&mut buf)).await, RETURN_OK);
    assert_eq!(read_c_string(&buf), Some("LTE"));
}

#[tokio::test]
async fn test_radio_technology_strings_use_vocabulary() {
    let api = status_api();
    let tokens = ["AUTO", "CDMA20001X", "EVDO", "GSM", "UMTS", "LTE"];

    let mut buf = [0u8; limits::RADIO_TECHNOLOGY];
    assert_eq!(api.get_modem_current_radio_technology(Some(&mut buf)).await, RETURN_OK);
    let current = read_c_string(&buf).unwrap().to_string();
    assert!(current.split(',').all(|t| tokens.contains(&t)));

    assert_eq!(api.get_modem_supported_radio_technology(Some(&mut buf)).await, RETURN_OK);
    let supported = read_c_string(&buf).unwrap();
    assert!(supported.split(',').all(|t| tokens.contains(&t)));
}

#[tokio::test]
async fn test_stop_network_ip_types() {
    let api = status_api();
    for ip_type in NetworkIpType::ALL {
        assert_eq!(api.stop_network(ip_type.as_raw()).await, RETURN_OK);
    }
    assert_eq!(api.stop_network(99).await, RETURN_ERROR);
    assert_eq!(api.stop_network(0).await, RETURN_ERROR);
}

#[tokio::test]
async fn test_init_arguments() {
    assert_eq!(status_api().init(None).await, RETURN_ERROR);
    assert_eq!(status_api().init(Some(&raw_init(0))).await, RETURN_ERROR);

    for family in [IpFamily::Unknown, IpFamily::Ipv4, IpFamily::Ipv6] {
        let api = status_api();
        assert_eq!(
            api.init(Some(&raw_init(family.as_raw()))).await,
            RETURN_OK,
            "family {family}"
        );
    }
}

#[tokio::test]
async fn test_profile_list_fields() {
    let api = status_api();
    assert_eq!(api.init(Some(&raw_init(IpFamily::Ipv4.as_raw()))).await, RETURN_OK);

    let mut profiles = Vec::new();
    let mut count = 0;
    assert_eq!(
        api.get_profile_list(Some(&mut profiles), Some(&mut count))
            .await,
        RETURN_OK
    );
    assert_eq!(count as usize, profiles.len());
    assert!(count >= 1);

    for p in &profiles {
        assert!(p.profile_type <= 1);
        assert!(p.pdp_type <= 3);
        assert!(p.pdp_authentication <= 2);
        for flag in [p.no_roaming, p.apn_disabled, p.is_default] {
            assert!(flag == 0 || flag == 1);
        }
    }
}

#[tokio::test]
async fn test_plmn_and_scan_fields() {
    let api = status_api();
    assert_eq!(api.set_modem_network_attach().await, RETURN_OK);

    let mut plmn = RawPlmnInfo::default();
    assert_eq!(api.get_current_plmn_information(Some(&mut plmn)).await, RETURN_OK);
    assert!(check_raw_plmn_info(&plmn).is_ok());

    let mut networks: Vec<RawNetworkScanResult> = Vec::new();
    let mut count = 0;
    assert_eq!(
        api.get_available_networks_information(Some(&mut networks), Some(&mut count))
            .await,
        RETURN_OK
    );
    assert_eq!(count as usize, networks.len());
    assert!(networks.iter().all(|n| check_raw_scan_result(n).is_ok()));
}

#[tokio::test]
async fn test_interface_status_in_range() {
    let api = status_api();
    let mut status = 0;
    assert_eq!(api.get_current_modem_interface_status(Some(&mut status)).await, RETURN_OK);
    assert!((1..=7).contains(&status));
}

//! Tests for input validation.
//!
//! Invalid inputs are rejected before the modem is touched, so a failed
//! call never leaves a partial change behind.

use cellhal::status::{RETURN_ERROR, RETURN_OK};
use cellhal::{
    CellularModem, HalError, ModemOptions, NetworkIpType, ProfileDescriptor, RawInitConfig,
    RawProfileDescriptor, SimulatedModem, StatusApi,
};
use std::sync::Arc;
use tokio::sync::oneshot;

fn setup() -> (StatusApi, Arc<SimulatedModem>) {
    let sim = Arc::new(SimulatedModem::default());
    let api = StatusApi::new(CellularModem::new(sim.clone(), ModemOptions::default()));
    (api, sim)
}

fn raw_profile() -> RawProfileDescriptor {
    RawProfileDescriptor {
        profile_id: 9,
        pdp_type: 3,
        pdp_network_config: 1,
        profile_name: "internet".into(),
        apn: "internet.example".into(),
        ..Default::default()
    }
}

#[test]
fn test_raw_profile_conversion() {
    let profile = ProfileDescriptor::try_from(&raw_profile()).unwrap();
    assert_eq!(profile.profile_id, 9);
    assert_eq!(RawProfileDescriptor::from(&profile), raw_profile());
}

#[test]
fn test_invalid_raw_profiles() {
    let cases: Vec<(&str, RawProfileDescriptor)> = vec![
        ("profile_type", RawProfileDescriptor { profile_type: 2, ..raw_profile() }),
        ("pdp_type", RawProfileDescriptor { pdp_type: 4, ..raw_profile() }),
        ("pdp_authentication", RawProfileDescriptor { pdp_authentication: 3, ..raw_profile() }),
        ("pdp_network_config", RawProfileDescriptor { pdp_network_config: 3, ..raw_profile() }),
        ("no_roaming", RawProfileDescriptor { no_roaming: 2, ..raw_profile() }),
        ("is_default", RawProfileDescriptor { is_default: 0x80, ..raw_profile() }),
        ("proxy_port", RawProfileDescriptor { proxy_port: 70_000, ..raw_profile() }),
        ("apn", RawProfileDescriptor { apn: "a".repeat(64), ..raw_profile() }),
        ("profile_name", RawProfileDescriptor { profile_name: String::new(), ..raw_profile() }),
    ];

    for (field, raw) in cases {
        let err = ProfileDescriptor::try_from(&raw).unwrap_err();
        assert!(err.is_invalid_argument(), "{field}: {err}");
    }
}

#[tokio::test]
async fn test_rejected_profile_leaves_no_trace() {
    let (api, sim) = setup();
    let bad = RawProfileDescriptor {
        pdp_type: 7,
        ..raw_profile()
    };

    let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = Arc::clone(&called);
    assert_eq!(
        api.profile_create(Some(&bad), move |_| {
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        })
        .await,
        RETURN_ERROR
    );
    assert_eq!(api.profile_create(None, |_| {}).await, RETURN_ERROR);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
    assert!(sim.stored_profiles().is_empty());
}

#[tokio::test]
async fn test_accepted_profile_invokes_callback() {
    let (api, sim) = setup();
    let (tx, rx) = oneshot::channel();

    assert_eq!(
        api.profile_create(Some(&raw_profile()), move |result| {
            let _ = tx.send(result.map(|event| event.profile_id));
        })
        .await,
        RETURN_OK
    );
    assert_eq!(rx.await.unwrap().unwrap(), 9);
    assert_eq!(sim.stored_profiles().len(), 1);
}

#[tokio::test]
async fn test_invalid_init_leaves_modem_uninitialized() {
    let (api, sim) = setup();
    let mut raw = RawInitConfig {
        ip_family_preference: 2,
        preferred_technology: 7,
        default_profile: raw_profile(),
    };
    raw.default_profile.pdp_authentication = 5;

    assert_eq!(api.init(Some(&raw)).await, RETURN_ERROR);
    assert!(sim.stored_profiles().is_empty());

    raw.default_profile.pdp_authentication = 0;
    assert_eq!(api.init(Some(&raw)).await, RETURN_OK);
}

#[tokio::test]
async fn test_init_accepts_every_family_on_one_modem() {
    let (api, sim) = setup();
    for family in [1, 2, 3] {
        let raw = RawInitConfig {
            ip_family_preference: family,
            preferred_technology: 7,
            default_profile: raw_profile(),
        };
        assert_eq!(api.init(Some(&raw)).await, RETURN_OK, "family {family}");
    }
    assert_eq!(sim.stored_profiles().len(), 1);
}

#[tokio::test]
async fn test_unsupported_technology_rejected() {
    let (api, _sim) = setup();
    // the simulated modem has no CDMA radio
    assert_eq!(
        api.set_modem_preferred_radio_technology(Some("CDMA20001X"))
            .await,
        RETURN_ERROR
    );
    assert!(matches!(
        api.modem()
            .set_preferred_radio_technology("EVDO")
            .await,
        Err(HalError::UnsupportedRadioTechnology(_))
    ));
    assert!(matches!(
        api.modem().set_preferred_radio_technology("LTE,AUTO").await,
        Err(HalError::InvalidRadioTechnology(_))
    ));
}

#[tokio::test]
async fn test_start_network_arguments() {
    let (api, _sim) = setup();
    assert_eq!(api.start_network(0, None, |_| {}).await, RETURN_ERROR);

    let bad = RawProfileDescriptor {
        pdp_authentication: 3,
        ..raw_profile()
    };
    assert_eq!(
        api.start_network(NetworkIpType::Ipv4.as_raw(), Some(&bad), |_| {})
            .await,
        RETURN_ERROR
    );
    // no init, no default profile
    assert_eq!(
        api.start_network(NetworkIpType::Ipv4.as_raw(), None, |_| {})
            .await,
        RETURN_ERROR
    );
}

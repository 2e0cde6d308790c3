//! Profile management through the typed API.

use cellhal::{
    CellularModem, HalError, InitConfig, IpFamily, ModemEvent, ModemOptions, NetworkIpType,
    PdpType, ProfileAction, ProfileBuilder, RadioTechPreference, RadioTechSet, SimulatedModem,
};
use std::sync::Arc;
use std::time::Duration;

fn modem() -> (CellularModem, Arc<SimulatedModem>) {
    let sim = Arc::new(SimulatedModem::default());
    let modem = CellularModem::new(sim.clone(), ModemOptions::default());
    (modem, sim)
}

fn init_config() -> InitConfig {
    InitConfig {
        ip_family: IpFamily::Ipv4v6,
        preferred_technology: RadioTechPreference::Lte,
        default_profile: ProfileBuilder::new(1, "internet")
            .apn("internet.example")
            .build()
            .unwrap(),
    }
}

#[tokio::test]
async fn test_init_stores_default_profile() {
    let (modem, sim) = modem();
    assert!(!modem.is_initialized().await);
    modem.init(init_config()).await.unwrap();
    assert!(modem.is_initialized().await);

    let profiles = modem.profile_list().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert!(profiles[0].is_default);
    assert_eq!(sim.stored_profiles().len(), 1);
    assert_eq!(sim.preferred_radio_technology(), RadioTechSet::LTE);
    assert_eq!(
        modem.preferred_radio_technology().await.unwrap(),
        RadioTechSet::LTE
    );
}

#[tokio::test]
async fn test_repeat_init_replaces_configuration() {
    let (modem, sim) = modem();
    modem.init(init_config()).await.unwrap();

    let replacement = InitConfig {
        ip_family: IpFamily::Ipv4,
        preferred_technology: RadioTechPreference::Umts,
        default_profile: ProfileBuilder::new(1, "internet")
            .apn("replacement.example")
            .pdp_type(PdpType::Ipv4)
            .build()
            .unwrap(),
    };
    modem.init(replacement).await.unwrap();

    let profiles = modem.profile_list().await.unwrap();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].apn, "replacement.example");
    assert!(profiles[0].is_default);
    assert_eq!(sim.stored_profiles()[0].apn, "replacement.example");
    assert_eq!(
        modem.preferred_radio_technology().await.unwrap(),
        RadioTechSet::UMTS
    );
}

#[tokio::test]
async fn test_init_with_new_default_moves_the_flag() {
    let (modem, _sim) = modem();
    modem.init(init_config()).await.unwrap();

    let mut other = init_config();
    other.default_profile = ProfileBuilder::new(2, "second").build().unwrap();
    modem.init(other).await.unwrap();

    let profiles = modem.profile_list().await.unwrap();
    assert_eq!(profiles.len(), 2);
    let defaults: Vec<u32> = profiles
        .iter()
        .filter(|p| p.is_default)
        .map(|p| p.profile_id)
        .collect();
    assert_eq!(defaults, vec![2]);
}

#[tokio::test]
async fn test_init_refused_while_default_profile_in_use() {
    let (modem, _sim) = modem();
    modem.init(init_config()).await.unwrap();
    modem
        .start_network(NetworkIpType::Ipv4, None)
        .await
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(
        modem.init(init_config()).await,
        Err(HalError::ProfileInUse(1))
    ));

    modem.stop_network(NetworkIpType::Ipv4).await.unwrap();
    modem.init(init_config()).await.unwrap();
}

#[tokio::test]
async fn test_create_modify_delete() {
    let (modem, sim) = modem();
    let mut events = modem.subscribe();

    let profile = ProfileBuilder::new(5, "iot")
        .apn("iot.example")
        .pdp_type(PdpType::Ipv4)
        .build()
        .unwrap();

    let created = modem
        .profile_create(profile.clone())
        .await
        .unwrap()
        .wait_timeout(Duration::from_secs(2))
        .await
        .unwrap();
    assert_eq!(created.profile_id, 5);
    assert_eq!(created.action, ProfileAction::Created);
    assert!(matches!(
        events.recv().await.unwrap(),
        ModemEvent::Profile(e) if e.action == ProfileAction::Created
    ));

    let mut changed = profile.clone();
    changed.apn = "iot2.example".into();
    let modified = modem
        .profile_modify(changed)
        .await
        .unwrap()
        .await
        .unwrap();
    assert_eq!(modified.action, ProfileAction::Modified);
    assert_eq!(sim.stored_profiles()[0].apn, "iot2.example");

    let deleted = modem
        .profile_delete(profile)
        .await
        .unwrap()
        .await
        .unwrap();
    assert_eq!(deleted.action, ProfileAction::Deleted);
    assert!(modem.profile_list().await.unwrap().is_empty());
    assert!(sim.stored_profiles().is_empty());
}

#[tokio::test]
async fn test_preconditions_fail_before_completion() {
    let (modem, _sim) = modem();
    let profile = ProfileBuilder::new(2, "backup").build().unwrap();

    assert!(matches!(
        modem.profile_modify(profile.clone()).await,
        Err(HalError::UnknownProfile(2))
    ));
    assert!(matches!(
        modem.profile_delete(profile.clone()).await,
        Err(HalError::UnknownProfile(2))
    ));

    modem
        .profile_create(profile.clone())
        .await
        .unwrap()
        .await
        .unwrap();
    assert!(matches!(
        modem.profile_create(profile).await,
        Err(HalError::DuplicateProfile(2))
    ));
}

#[tokio::test]
async fn test_only_one_default_profile() {
    let (modem, _sim) = modem();
    modem.init(init_config()).await.unwrap();

    let other = ProfileBuilder::new(2, "other")
        .default_profile(true)
        .build()
        .unwrap();
    modem.profile_create(other).await.unwrap().await.unwrap();

    let defaults: Vec<u32> = modem
        .profile_list()
        .await
        .unwrap()
        .into_iter()
        .filter(|p| p.is_default)
        .map(|p| p.profile_id)
        .collect();
    assert_eq!(defaults, vec![2]);
}

#[tokio::test]
async fn test_profile_in_use_cannot_change() {
    let (modem, _sim) = modem();
    let config = init_config();
    let default_profile = config.default_profile.clone();
    modem.init(config).await.unwrap();

    modem
        .start_network(NetworkIpType::Ipv4, None)
        .await
        .unwrap()
        .await
        .unwrap();

    assert!(matches!(
        modem.profile_delete(default_profile.clone()).await,
        Err(HalError::ProfileInUse(1))
    ));

    modem.stop_network(NetworkIpType::Ipv4).await.unwrap();
    modem
        .profile_delete(default_profile)
        .await
        .unwrap()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_factory_reset_clears_profiles_and_init() {
    let (modem, sim) = modem();
    modem.init(init_config()).await.unwrap();
    modem.reset().await.unwrap();
    assert_eq!(modem.profile_list().await.unwrap().len(), 1);

    modem.factory_reset().await.unwrap();
    assert!(modem.profile_list().await.unwrap().is_empty());
    assert!(sim.stored_profiles().is_empty());
    assert_eq!(
        modem.preferred_radio_technology().await.unwrap(),
        RadioTechSet::AUTO
    );

    modem.init(init_config()).await.unwrap();
}

#[tokio::test]
async fn test_absent_modem_rejects_profiles() {
    let (modem, sim) = modem();
    sim.set_present(false);
    let profile = ProfileBuilder::new(1, "internet").build().unwrap();
    assert!(matches!(
        modem.profile_create(profile).await,
        Err(HalError::ModemNotPresent)
    ));
}

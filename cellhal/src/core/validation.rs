//! Input validation.
//!
//! Every structurally invalid input is rejected here, in one pass, before
//! the modem state or the backend is touched. Raw contract structures go in,
//! typed models come out; the first invalid field is reported.

use log::debug;

use crate::Result;
use crate::api::models::{
    HalError, InitConfig, IpFamily, ModemOperatingConfig, NetworkIpType, PdpAuthentication,
    PdpNetworkConfig, PdpType, ProfileDescriptor, ProfileType, RadioTechPreference,
};
use crate::api::raw::{RawInitConfig, RawProfileDescriptor};
use crate::types::constants::{flag, limits};

/// Decodes an enumeration code, reporting `field` on failure.
pub(crate) fn parse_enum<T>(field: &'static str, raw: u32) -> Result<T>
where
    T: TryFrom<u32, Error = HalError>,
{
    T::try_from(raw).map_err(|_| HalError::InvalidEnum { field, value: raw })
}

/// Decodes a contract boolean byte. Only TRUE (1) and FALSE (0) are valid.
pub(crate) fn parse_flag(field: &'static str, raw: u8) -> Result<bool> {
    match raw {
        flag::TRUE => Ok(true),
        flag::FALSE => Ok(false),
        value => Err(HalError::InvalidFlag { field, value }),
    }
}

/// Checks that a string fits a buffer of `capacity` bytes including its
/// terminator and carries no interior NUL.
pub(crate) fn check_text(field: &'static str, value: &str, capacity: usize) -> Result<()> {
    if value.as_bytes().contains(&0) {
        return Err(HalError::InvalidText {
            field,
            reason: "contains a NUL byte".into(),
        });
    }

    let needed = value.len() + 1;
    if needed > capacity {
        return Err(HalError::InvalidText {
            field,
            reason: format!("{} bytes exceeds capacity {capacity}", value.len()),
        });
    }

    Ok(())
}

/// Checks the text fields of a typed profile.
pub(crate) fn check_profile(profile: &ProfileDescriptor) -> Result<()> {
    if profile.profile_name.trim().is_empty() {
        return Err(HalError::InvalidText {
            field: "profile_name",
            reason: "cannot be empty".into(),
        });
    }

    check_text("profile_name", &profile.profile_name, limits::PROFILE_NAME)?;
    check_text("apn", &profile.apn, limits::APN)?;
    check_text("username", &profile.username, limits::USERNAME)?;
    check_text("password", &profile.password, limits::PASSWORD)?;
    check_text("proxy", &profile.proxy, limits::PROXY)?;

    Ok(())
}

/// Converts a raw profile into a typed one.
pub(crate) fn validate_profile(raw: &RawProfileDescriptor) -> Result<ProfileDescriptor> {
    let profile = ProfileDescriptor {
        profile_id: raw.profile_id,
        profile_type: parse_enum::<ProfileType>("profile_type", raw.profile_type)?,
        pdp_context_number: raw.pdp_context_number,
        pdp_type: parse_enum::<PdpType>("pdp_type", raw.pdp_type)?,
        authentication: parse_enum::<PdpAuthentication>(
            "pdp_authentication",
            raw.pdp_authentication,
        )?,
        network_config: parse_enum::<PdpNetworkConfig>(
            "pdp_network_config",
            raw.pdp_network_config,
        )?,
        profile_name: raw.profile_name.clone(),
        apn: raw.apn.clone(),
        username: raw.username.clone(),
        password: raw.password.clone(),
        proxy: raw.proxy.clone(),
        proxy_port: u16::try_from(raw.proxy_port)
            .map_err(|_| HalError::InvalidPort(raw.proxy_port))?,
        no_roaming: parse_flag("no_roaming", raw.no_roaming)?,
        apn_disabled: parse_flag("apn_disabled", raw.apn_disabled)?,
        is_default: parse_flag("is_default", raw.is_default)?,
    };

    check_profile(&profile)?;
    Ok(profile)
}

/// Converts raw initialization parameters into a typed configuration.
///
/// Any invalid field fails the whole conversion.
pub(crate) fn validate_init(raw: &RawInitConfig) -> Result<InitConfig> {
    let ip_family = parse_enum::<IpFamily>("ip_family_preference", raw.ip_family_preference)?;
    let preferred_technology =
        parse_enum::<RadioTechPreference>("preferred_technology", raw.preferred_technology)?;
    let default_profile = validate_profile(&raw.default_profile)?;

    debug!(
        "Validated init config: family={ip_family}, technology={preferred_technology}, profile={}",
        default_profile.profile_id
    );

    Ok(InitConfig {
        ip_family,
        preferred_technology,
        default_profile,
    })
}

/// Decodes a data session IP type.
pub(crate) fn parse_ip_type(raw: u32) -> Result<NetworkIpType> {
    parse_enum("ip_type", raw)
}

/// Decodes an operating configuration request.
pub(crate) fn parse_operating_config(raw: u32) -> Result<ModemOperatingConfig> {
    parse_enum("operating_config", raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_profile() -> RawProfileDescriptor {
        RawProfileDescriptor {
            profile_id: 1,
            profile_type: ProfileType::ThreeGpp.as_raw(),
            pdp_context_number: 1,
            pdp_type: PdpType::Ipv4v6.as_raw(),
            pdp_authentication: PdpAuthentication::None.as_raw(),
            pdp_network_config: PdpNetworkConfig::Nas.as_raw(),
            profile_name: "internet".into(),
            apn: "internet.example".into(),
            proxy_port: 8080,
            is_default: flag::TRUE,
            ..Default::default()
        }
    }

    #[test]
    fn test_flag_bytes() {
        assert!(parse_flag("x", 1).unwrap());
        assert!(!parse_flag("x", 0).unwrap());
        assert!(matches!(
            parse_flag("x", 2),
            Err(HalError::InvalidFlag { value: 2, .. })
        ));
        assert!(parse_flag("x", 0xff).is_err());
    }

    #[test]
    fn test_valid_profile() {
        let profile = validate_profile(&raw_profile()).unwrap();
        assert_eq!(profile.pdp_type, PdpType::Ipv4v6);
        assert_eq!(profile.proxy_port, 8080);
        assert!(profile.is_default);
    }

    #[test]
    fn test_profile_enum_fields_reported() {
        let mut raw = raw_profile();
        raw.pdp_authentication = 3;
        assert!(matches!(
            validate_profile(&raw),
            Err(HalError::InvalidEnum {
                field: "pdp_authentication",
                value: 3
            })
        ));

        let mut raw = raw_profile();
        raw.pdp_network_config = 0;
        assert!(matches!(
            validate_profile(&raw),
            Err(HalError::InvalidEnum {
                field: "pdp_network_config",
                ..
            })
        ));
    }

    #[test]
    fn test_profile_port_and_flags() {
        let mut raw = raw_profile();
        raw.proxy_port = 65_536;
        assert!(matches!(
            validate_profile(&raw),
            Err(HalError::InvalidPort(65_536))
        ));

        let mut raw = raw_profile();
        raw.apn_disabled = 7;
        assert!(validate_profile(&raw).is_err());
    }

    #[test]
    fn test_profile_text_limits() {
        let mut raw = raw_profile();
        raw.apn = "a".repeat(limits::APN - 1);
        assert!(validate_profile(&raw).is_ok());

        raw.apn = "a".repeat(limits::APN);
        assert!(validate_profile(&raw).is_err());

        let mut raw = raw_profile();
        raw.profile_name = "  ".into();
        assert!(validate_profile(&raw).is_err());

        let mut raw = raw_profile();
        raw.password = "pa\0ss".into();
        assert!(validate_profile(&raw).is_err());
    }

    #[test]
    fn test_init_rejects_each_invalid_field() {
        let valid = RawInitConfig {
            ip_family_preference: IpFamily::Ipv4.as_raw(),
            preferred_technology: RadioTechPreference::Lte.as_raw(),
            default_profile: raw_profile(),
        };
        assert!(validate_init(&valid).is_ok());

        let mut bad = valid.clone();
        bad.ip_family_preference = 0;
        assert!(validate_init(&bad).is_err());

        let mut bad = valid.clone();
        bad.preferred_technology = 0;
        assert!(validate_init(&bad).is_err());

        let mut bad = valid.clone();
        bad.default_profile.pdp_type = 4;
        assert!(validate_init(&bad).is_err());

        let mut bad = valid;
        bad.default_profile.pdp_authentication = 9;
        assert!(validate_init(&bad).is_err());
    }

    #[test]
    fn test_ip_type_and_operating_config() {
        assert_eq!(parse_ip_type(3).unwrap(), NetworkIpType::Unknown);
        assert!(parse_ip_type(99).is_err());
        assert!(parse_ip_type(0).is_err());
        assert_eq!(
            parse_operating_config(5).unwrap(),
            ModemOperatingConfig::FactoryReset
        );
        assert!(parse_operating_config(0).is_err());
    }
}

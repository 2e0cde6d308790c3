//! Raw structures of the C-callable contract.
//!
//! These mirror the typed models with the integer and byte fields a
//! C caller exchanges: enumerations as `u32` codes and booleans as bytes
//! that must be exactly [`TRUE`](crate::types::constants::flag::TRUE) or
//! [`FALSE`](crate::types::constants::flag::FALSE). Inputs are converted to
//! the typed models with a single validation pass; outputs are converted
//! with `From`.

use crate::api::models::{
    InitConfig, NetworkScanResult, PlmnInfo, ProfileDescriptor, UiccSlotInfo,
};
use crate::core::validation;
use crate::types::constants::flag;

/// Encodes a boolean as a contract byte.
pub fn flag_byte(value: bool) -> u8 {
    if value { flag::TRUE } else { flag::FALSE }
}

/// PDP profile as exchanged over the C surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawProfileDescriptor {
    pub profile_id: u32,
    pub profile_type: u32,
    pub pdp_context_number: u32,
    pub pdp_type: u32,
    pub pdp_authentication: u32,
    pub pdp_network_config: u32,
    pub profile_name: String,
    pub apn: String,
    pub username: String,
    pub password: String,
    pub proxy: String,
    pub proxy_port: u32,
    pub no_roaming: u8,
    pub apn_disabled: u8,
    pub is_default: u8,
}

/// Initialization parameters as exchanged over the C surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInitConfig {
    pub ip_family_preference: u32,
    pub preferred_technology: u32,
    pub default_profile: RawProfileDescriptor,
}

/// Slot snapshot as exchanged over the C surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawUiccSlotInfo {
    pub slot_enabled: u8,
    pub card_present: u8,
    pub card_enabled: u8,
    pub form_factor: u32,
    pub application: u32,
    pub status: u32,
    pub operator_name: String,
    pub iccid: String,
    pub msisdn: String,
}

/// Registration information as exchanged over the C surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlmnInfo {
    pub network_name: String,
    pub mcc: u32,
    pub mnc: u32,
    pub roaming_enabled: u8,
    pub area_code: i32,
    pub cell_id: u32,
    pub registration_status: u32,
    pub registered_service: u32,
}

/// Scan entry as exchanged over the C surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNetworkScanResult {
    pub network_name: String,
    pub mcc: u32,
    pub mnc: u32,
    pub allowed: u8,
}

impl TryFrom<&RawProfileDescriptor> for ProfileDescriptor {
    type Error = crate::HalError;

    fn try_from(raw: &RawProfileDescriptor) -> crate::Result<Self> {
        validation::validate_profile(raw)
    }
}

impl TryFrom<&RawInitConfig> for InitConfig {
    type Error = crate::HalError;

    fn try_from(raw: &RawInitConfig) -> crate::Result<Self> {
        validation::validate_init(raw)
    }
}

impl From<&ProfileDescriptor> for RawProfileDescriptor {
    fn from(p: &ProfileDescriptor) -> Self {
        Self {
            profile_id: p.profile_id,
            profile_type: p.profile_type.as_raw(),
            pdp_context_number: p.pdp_context_number,
            pdp_type: p.pdp_type.as_raw(),
            pdp_authentication: p.authentication.as_raw(),
            pdp_network_config: p.network_config.as_raw(),
            profile_name: p.profile_name.clone(),
            apn: p.apn.clone(),
            username: p.username.clone(),
            password: p.password.clone(),
            proxy: p.proxy.clone(),
            proxy_port: u32::from(p.proxy_port),
            no_roaming: flag_byte(p.no_roaming),
            apn_disabled: flag_byte(p.apn_disabled),
            is_default: flag_byte(p.is_default),
        }
    }
}

impl From<&InitConfig> for RawInitConfig {
    fn from(c: &InitConfig) -> Self {
        Self {
            ip_family_preference: c.ip_family.as_raw(),
            preferred_technology: c.preferred_technology.as_raw(),
            default_profile: RawProfileDescriptor::from(&c.default_profile),
        }
    }
}

impl From<&UiccSlotInfo> for RawUiccSlotInfo {
    fn from(s: &UiccSlotInfo) -> Self {
        Self {
            slot_enabled: flag_byte(s.slot_enabled),
            card_present: flag_byte(s.card_present),
            card_enabled: flag_byte(s.card_enabled),
            form_factor: s.form_factor.as_raw(),
            application: s.application.as_raw(),
            status: s.status.as_raw(),
            operator_name: s.operator_name.clone(),
            iccid: s.iccid.clone(),
            msisdn: s.msisdn.clone(),
        }
    }
}

/// Fails with [`HalError::OutOfRange`](crate::HalError::OutOfRange) when the
/// area code does not fit the signed C field.
impl TryFrom<&PlmnInfo> for RawPlmnInfo {
    type Error = crate::HalError;

    fn try_from(p: &PlmnInfo) -> crate::Result<Self> {
        let area_code =
            i32::try_from(p.area_code).map_err(|_| crate::HalError::OutOfRange {
                field: "area_code",
                value: f64::from(p.area_code),
                min: 0.0,
                max: f64::from(i32::MAX),
            })?;
        Ok(Self {
            network_name: p.network_name.clone(),
            mcc: p.mcc,
            mnc: p.mnc,
            roaming_enabled: flag_byte(p.roaming_enabled),
            area_code,
            cell_id: p.cell_id,
            registration_status: p.registration_status.as_raw(),
            registered_service: p.registered_service.as_raw(),
        })
    }
}

impl From<&NetworkScanResult> for RawNetworkScanResult {
    fn from(n: &NetworkScanResult) -> Self {
        Self {
            network_name: n.network_name.clone(),
            mcc: n.mcc,
            mnc: n.mnc,
            allowed: flag_byte(n.allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{RegisteredService, RegistrationStatus};

    fn plmn(area_code: u32) -> PlmnInfo {
        PlmnInfo {
            network_name: "Example Mobile".into(),
            mcc: 310,
            mnc: 260,
            roaming_enabled: false,
            area_code,
            cell_id: 7,
            registration_status: RegistrationStatus::Home,
            registered_service: RegisteredService::CsPs,
        }
    }

    #[test]
    fn area_code_must_fit_signed_field() {
        let raw = RawPlmnInfo::try_from(&plmn(12_345)).unwrap();
        assert_eq!(raw.area_code, 12_345);

        let max = RawPlmnInfo::try_from(&plmn(i32::MAX as u32)).unwrap();
        assert_eq!(max.area_code, i32::MAX);

        assert!(matches!(
            RawPlmnInfo::try_from(&plmn(i32::MAX as u32 + 1)),
            Err(crate::HalError::OutOfRange {
                field: "area_code",
                ..
            })
        ));
    }
}

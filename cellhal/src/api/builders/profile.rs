//! PDP profile builder.

use crate::Result;
use crate::api::models::{
    PdpAuthentication, PdpNetworkConfig, PdpType, ProfileDescriptor, ProfileType,
};
use crate::core::validation::check_profile;

/// Builder for [`ProfileDescriptor`].
///
/// Defaults to a 3GPP, dual-stack (IPv4v6) profile on PDP context 1 with
/// no authentication, NAS-assigned addressing and no proxy.
///
/// # Examples
///
/// ```rust
/// use cellhal::builders::ProfileBuilder;
///
/// let profile = ProfileBuilder::new(1, "internet")
///     .apn("internet.example")
///     .proxy("10.0.0.1", 8080)
///     .build()
///     .unwrap();
///
/// assert_eq!(profile.proxy_port, 8080);
/// assert!(!profile.is_default);
/// ```
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    profile: ProfileDescriptor,
}

impl ProfileBuilder {
    pub fn new(profile_id: u32, name: impl Into<String>) -> Self {
        Self {
            profile: ProfileDescriptor {
                profile_id,
                profile_type: ProfileType::ThreeGpp,
                pdp_context_number: 1,
                pdp_type: PdpType::Ipv4v6,
                authentication: PdpAuthentication::None,
                network_config: PdpNetworkConfig::Nas,
                profile_name: name.into(),
                apn: String::new(),
                username: String::new(),
                password: String::new(),
                proxy: String::new(),
                proxy_port: 0,
                no_roaming: false,
                apn_disabled: false,
                is_default: false,
            },
        }
    }

    #[must_use]
    pub fn profile_type(mut self, profile_type: ProfileType) -> Self {
        self.profile.profile_type = profile_type;
        self
    }

    #[must_use]
    pub fn pdp_context_number(mut self, number: u32) -> Self {
        self.profile.pdp_context_number = number;
        self
    }

    #[must_use]
    pub fn pdp_type(mut self, pdp_type: PdpType) -> Self {
        self.profile.pdp_type = pdp_type;
        self
    }

    #[must_use]
    pub fn authentication(mut self, authentication: PdpAuthentication) -> Self {
        self.profile.authentication = authentication;
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.profile.username = username.into();
        self.profile.password = password.into();
        self
    }

    #[must_use]
    pub fn network_config(mut self, network_config: PdpNetworkConfig) -> Self {
        self.profile.network_config = network_config;
        self
    }

    #[must_use]
    pub fn apn(mut self, apn: impl Into<String>) -> Self {
        self.profile.apn = apn.into();
        self
    }

    #[must_use]
    pub fn proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.profile.proxy = host.into();
        self.profile.proxy_port = port;
        self
    }

    /// Keeps the profile off visited networks.
    #[must_use]
    pub fn no_roaming(mut self, no_roaming: bool) -> Self {
        self.profile.no_roaming = no_roaming;
        self
    }

    #[must_use]
    pub fn apn_disabled(mut self, disabled: bool) -> Self {
        self.profile.apn_disabled = disabled;
        self
    }

    /// Marks the profile as the default. Storing it clears the flag on
    /// every other profile.
    #[must_use]
    pub fn default_profile(mut self, is_default: bool) -> Self {
        self.profile.is_default = is_default;
        self
    }

    /// Validates the text fields and returns the profile.
    pub fn build(self) -> Result<ProfileDescriptor> {
        check_profile(&self.profile)?;
        Ok(self.profile)
    }
}

//! The authoritative view of modem, SIM and session state.
//!
//! One [`ModemContext`] exists per modem. All state lives in a single
//! [`ModemState`] behind one async mutex, and every operation that changes
//! it holds the lock across its backend calls, so operations on the same
//! modem are serialized and each one is all-or-nothing.

use log::debug;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};

use crate::Result;
use crate::api::models::{
    HalError, InitConfig, IpReadyInfo, ModemEvent, ModemOptions, NetworkIpType, OperatingMode,
    PacketStats, ProfileDescriptor, RadioTechSet,
};
use crate::backend::ModemBackend;

/// PDP profiles known to the HAL, keyed by profile id.
#[derive(Debug, Default)]
pub(crate) struct ProfileStore {
    profiles: BTreeMap<u32, ProfileDescriptor>,
}

impl ProfileStore {
    pub(crate) fn contains(&self, profile_id: u32) -> bool {
        self.profiles.contains_key(&profile_id)
    }

    /// Inserts or replaces a profile. A profile flagged as default takes the
    /// flag away from every other profile.
    pub(crate) fn upsert(&mut self, profile: ProfileDescriptor) {
        if profile.is_default {
            for other in self.profiles.values_mut() {
                other.is_default = false;
            }
        }
        self.profiles.insert(profile.profile_id, profile);
    }

    pub(crate) fn get(&self, profile_id: u32) -> Option<&ProfileDescriptor> {
        self.profiles.get(&profile_id)
    }

    pub(crate) fn remove(&mut self, profile_id: u32) -> Option<ProfileDescriptor> {
        self.profiles.remove(&profile_id)
    }

    pub(crate) fn default_profile(&self) -> Option<&ProfileDescriptor> {
        self.profiles.values().find(|p| p.is_default)
    }

    pub(crate) fn list(&self) -> Vec<ProfileDescriptor> {
        self.profiles.values().cloned().collect()
    }

    pub(crate) fn clear(&mut self) {
        self.profiles.clear();
    }
}

/// A running data session.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub(crate) ip_type: NetworkIpType,
    pub(crate) profile_id: u32,
    pub(crate) ip: IpReadyInfo,
}

/// Running data sessions, at most one per IP type.
#[derive(Debug, Default)]
pub(crate) struct SessionTable {
    sessions: Vec<ActiveSession>,
}

impl SessionTable {
    pub(crate) fn contains(&self, ip_type: NetworkIpType) -> bool {
        self.sessions.iter().any(|s| s.ip_type == ip_type)
    }

    pub(crate) fn uses_profile(&self, profile_id: u32) -> bool {
        self.sessions.iter().any(|s| s.profile_id == profile_id)
    }

    pub(crate) fn insert(&mut self, session: ActiveSession) {
        self.sessions.push(session);
    }

    /// Sessions that stopping `ip_type` would end. `Unknown` selects all.
    pub(crate) fn matching(&self, ip_type: NetworkIpType) -> Vec<ActiveSession> {
        self.sessions
            .iter()
            .filter(|s| ip_type == NetworkIpType::Unknown || s.ip_type == ip_type)
            .cloned()
            .collect()
    }

    pub(crate) fn remove(&mut self, ip_type: NetworkIpType) {
        self.sessions.retain(|s| s.ip_type != ip_type);
    }

    pub(crate) fn drain(&mut self) -> Vec<ActiveSession> {
        std::mem::take(&mut self.sessions)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Mutable modem state.
#[derive(Debug)]
pub(crate) struct ModemState {
    /// Set by `init`, cleared by a factory reset
    pub(crate) init: Option<InitConfig>,
    pub(crate) mode: OperatingMode,
    pub(crate) attached: bool,
    /// `None` until selected or lazily resolved
    pub(crate) active_slot: Option<u32>,
    pub(crate) preferred_rat: RadioTechSet,
    pub(crate) profiles: ProfileStore,
    pub(crate) sessions: SessionTable,
    /// Baseline for counter regression checks
    pub(crate) last_stats: Option<PacketStats>,
}

impl Default for ModemState {
    fn default() -> Self {
        Self {
            init: None,
            mode: OperatingMode::Online,
            attached: false,
            active_slot: None,
            preferred_rat: RadioTechSet::AUTO,
            profiles: ProfileStore::default(),
            sessions: SessionTable::default(),
            last_stats: None,
        }
    }
}

/// Shared context behind a [`CellularModem`](crate::CellularModem).
pub(crate) struct ModemContext {
    pub(crate) backend: Arc<dyn ModemBackend>,
    pub(crate) state: Mutex<ModemState>,
    pub(crate) options: ModemOptions,
    events: broadcast::Sender<ModemEvent>,
}

impl ModemContext {
    pub(crate) fn new(backend: Arc<dyn ModemBackend>, options: ModemOptions) -> Self {
        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        Self {
            backend,
            state: Mutex::new(ModemState::default()),
            options,
            events,
        }
    }

    /// Publishes an event to every subscriber. Having none is fine.
    pub(crate) fn publish(&self, event: ModemEvent) {
        if self.events.send(event).is_err() {
            debug!("No event subscribers");
        }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ModemEvent> {
        self.events.subscribe()
    }

    /// Applies an output conformance check unless checks are disabled.
    pub(crate) fn conform(&self, check: Result<()>) -> Result<()> {
        match check {
            Err(e) if self.options.check_outputs => Err(e),
            Err(e) => {
                debug!("Ignoring conformance failure: {e}");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    /// Fails unless modem hardware is present.
    pub(crate) async fn require_present(&self) -> Result<()> {
        if self.backend.is_present().await {
            Ok(())
        } else {
            Err(HalError::ModemNotPresent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProfileBuilder;

    #[test]
    fn default_flag_moves_to_latest_default_profile() {
        let mut store = ProfileStore::default();
        store.upsert(
            ProfileBuilder::new(1, "first")
                .default_profile(true)
                .build()
                .unwrap(),
        );
        store.upsert(
            ProfileBuilder::new(2, "second")
                .default_profile(true)
                .build()
                .unwrap(),
        );

        assert_eq!(store.default_profile().map(|p| p.profile_id), Some(2));
        assert_eq!(store.list().iter().filter(|p| p.is_default).count(), 1);
    }

    #[test]
    fn unknown_ip_type_matches_every_session() {
        let mut table = SessionTable::default();
        let ip = IpReadyInfo {
            interface_name: "wwan0".into(),
            ip_type: NetworkIpType::Ipv4,
            ip_address: String::new(),
            subnet_mask: String::new(),
            default_gateway: String::new(),
            dns_primary: String::new(),
            dns_secondary: String::new(),
            domains: String::new(),
            mtu: 1500,
        };
        for ip_type in [NetworkIpType::Ipv4, NetworkIpType::Ipv6] {
            table.insert(ActiveSession {
                ip_type,
                profile_id: 1,
                ip: ip.clone(),
            });
        }

        assert_eq!(table.matching(NetworkIpType::Ipv6).len(), 1);
        assert_eq!(table.matching(NetworkIpType::Unknown).len(), 2);
        assert!(table.uses_profile(1));
        assert_eq!(table.drain().len(), 2);
        assert!(table.is_empty());
    }
}

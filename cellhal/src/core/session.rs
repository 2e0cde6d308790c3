//! Packet domain attach and data sessions.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::Result;
use crate::api::models::{
    HalError, IpReadyInfo, ModemEvent, NasStatus, NetworkIpType, OperatingMode,
    PacketServiceEvent, PacketServiceStatus, PdpType, ProfileDescriptor, RegisteredService,
    RegistrationEvent, RegistrationStatus,
};
use crate::core::slots::{active_slot_info, is_usable};
use crate::core::state::{ActiveSession, ModemContext, ModemState};
use crate::core::state_wait::Completion;
use crate::core::validation::check_profile;

/// Whether a context of `pdp` can carry a session of `ip_type`.
fn pdp_carries(pdp: PdpType, ip_type: NetworkIpType) -> bool {
    match (pdp, ip_type) {
        (PdpType::Ipv4v6, _) | (_, NetworkIpType::Unknown) => true,
        (PdpType::Ipv4 | PdpType::Ppp, NetworkIpType::Ipv4) => true,
        (PdpType::Ipv6, NetworkIpType::Ipv6) => true,
        _ => false,
    }
}

fn packet_event(
    interface_name: String,
    ip_type: NetworkIpType,
    status: PacketServiceStatus,
) -> ModemEvent {
    ModemEvent::PacketService(PacketServiceEvent {
        interface_name,
        ip_type,
        status,
    })
}

/// Clears every session and the attach, publishing the matching events.
///
/// Only tracked state is touched; callers bring the backend down first.
pub(crate) fn teardown(ctx: &ModemContext, state: &mut ModemState) {
    for session in state.sessions.drain() {
        debug!("Session {} ended by teardown", session.ip_type);
        ctx.publish(packet_event(
            session.ip.interface_name,
            session.ip_type,
            PacketServiceStatus::Disconnected,
        ));
    }

    if std::mem::take(&mut state.attached) {
        ctx.publish(ModemEvent::Registration(RegistrationEvent {
            status: NasStatus::NotRegistered,
            roaming: false,
            service: RegisteredService::None,
        }));
    }
}

/// Forgets one session and reports it disconnected.
fn end_session(ctx: &ModemContext, state: &mut ModemState, session: ActiveSession) {
    state.sessions.remove(session.ip_type);
    ctx.publish(packet_event(
        session.ip.interface_name,
        session.ip_type,
        PacketServiceStatus::Disconnected,
    ));
}

/// Brings the tracked attach and sessions in line with the modem.
///
/// Sessions whose context the modem no longer has are ended, and the
/// attach flag follows the modem in both directions.
pub(crate) async fn reconcile(ctx: &ModemContext, state: &mut ModemState) -> Result<()> {
    let link = ctx.backend.link_state().await?;

    for session in state.sessions.matching(NetworkIpType::Unknown) {
        if !link.contexts.contains(&session.ip_type) {
            warn!("Data session {} dropped by the modem", session.ip_type);
            end_session(ctx, state, session);
        }
    }

    if state.attached && !link.attached {
        warn!("Packet domain attach lost");
        state.attached = false;
        ctx.publish(ModemEvent::Registration(RegistrationEvent {
            status: NasStatus::NotRegistered,
            roaming: false,
            service: RegisteredService::None,
        }));
    } else if !state.attached && link.attached {
        info!("Modem attached without a request");
        state.attached = true;
        ctx.publish(ModemEvent::Registration(registration(ctx).await));
    }
    Ok(())
}

/// Checks that a session of `ip_type` may start now.
async fn check_session_ready(
    ctx: &ModemContext,
    state: &mut ModemState,
    ip_type: NetworkIpType,
) -> Result<()> {
    if state.mode != OperatingMode::Online {
        return Err(HalError::ModemOffline(state.mode));
    }
    reconcile(ctx, state).await?;
    if !active_slot_info(ctx, state).await?.is_some_and(|s| is_usable(&s)) {
        return Err(HalError::NoActiveCard);
    }
    if state.sessions.contains(ip_type) {
        return Err(HalError::SessionActive(ip_type));
    }
    Ok(())
}

/// Registration details of a fresh attach.
async fn registration(ctx: &ModemContext) -> RegistrationEvent {
    let (roaming, service) = match ctx.backend.plmn_info().await {
        Ok(Some(plmn)) => (
            plmn.registration_status == RegistrationStatus::Roaming,
            plmn.registered_service,
        ),
        Ok(None) => (false, RegisteredService::Ps),
        Err(e) => {
            warn!("Attached but registration details unavailable: {e}");
            (false, RegisteredService::Ps)
        }
    };
    RegistrationEvent {
        status: NasStatus::Registered,
        roaming,
        service,
    }
}

async fn attach_locked(ctx: &ModemContext, state: &mut ModemState) -> Result<()> {
    ctx.backend.attach().await?;
    state.attached = true;

    let event = registration(ctx).await;
    info!(
        "Attached to packet domain (roaming={}, service={})",
        event.roaming, event.service
    );
    ctx.publish(ModemEvent::Registration(event));
    Ok(())
}

pub(crate) async fn attach(ctx: &ModemContext) -> Result<()> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    if state.mode != OperatingMode::Online {
        return Err(HalError::ModemOffline(state.mode));
    }
    reconcile(ctx, &mut state).await?;
    if state.attached {
        debug!("Already attached");
        return Ok(());
    }
    attach_locked(ctx, &mut state).await
}

/// Detaches from the packet domain, ending every data session first.
pub(crate) async fn detach(ctx: &ModemContext) -> Result<()> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    reconcile(ctx, &mut state).await?;
    if !state.attached && state.sessions.is_empty() {
        debug!("Already detached");
        return Ok(());
    }

    for session in state.sessions.matching(NetworkIpType::Unknown) {
        ctx.backend.deactivate_context(session.ip_type).await?;
        debug!("Data session {} stopped by detach", session.ip_type);
        end_session(ctx, &mut state, session);
    }
    ctx.backend.detach().await?;
    teardown(ctx, &mut state);
    info!("Detached from packet domain");
    Ok(())
}

/// Starts a data session.
///
/// Without an explicit profile the default profile is used, which requires
/// a prior `init`. The modem must be online with a usable active card and
/// no session of the same IP type running. The packet domain is attached
/// implicitly; the completion resolves once the IP configuration is known.
pub(crate) async fn start_network(
    ctx: &Arc<ModemContext>,
    ip_type: NetworkIpType,
    profile: Option<ProfileDescriptor>,
) -> Result<Completion<IpReadyInfo>> {
    if let Some(profile) = &profile {
        check_profile(profile)?;
    }
    ctx.require_present().await?;

    let profile = {
        let mut state = ctx.state.lock().await;
        let profile = match profile {
            Some(profile) => profile,
            None => {
                let init = state.init.as_ref().ok_or(HalError::NotInitialized)?;
                state
                    .profiles
                    .default_profile()
                    .cloned()
                    .ok_or(HalError::UnknownProfile(init.default_profile.profile_id))?
            }
        };
        if !pdp_carries(profile.pdp_type, ip_type) {
            return Err(HalError::IpTypeMismatch {
                ip_type,
                pdp_type: profile.pdp_type,
            });
        }
        check_session_ready(ctx, &mut state, ip_type).await?;
        profile
    };

    let (completer, completion) = Completion::channel();
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let result = bring_up(&ctx, ip_type, profile).await;
        if let Err(e) = &result {
            warn!("Data session {ip_type} failed: {e}");
        }
        completer.complete(result);
    });
    Ok(completion)
}

async fn bring_up(
    ctx: &ModemContext,
    ip_type: NetworkIpType,
    profile: ProfileDescriptor,
) -> Result<IpReadyInfo> {
    let mut state = ctx.state.lock().await;
    // state may have moved while the task was queued
    check_session_ready(ctx, &mut state, ip_type).await?;

    if !state.attached {
        attach_locked(ctx, &mut state).await?;
    }

    let ip = ctx.backend.activate_context(&profile, ip_type).await?;
    state.sessions.insert(ActiveSession {
        ip_type,
        profile_id: profile.profile_id,
        ip: ip.clone(),
    });

    info!(
        "Data session {ip_type} up on {} with profile {} ({})",
        ip.interface_name, profile.profile_id, ip.ip_address
    );
    ctx.publish(packet_event(
        ip.interface_name.clone(),
        ip_type,
        PacketServiceStatus::Connected,
    ));
    Ok(ip)
}

/// Stops the session of `ip_type`, or every session for `Unknown`.
/// Stopping when nothing runs succeeds without effect.
pub(crate) async fn stop_network(ctx: &ModemContext, ip_type: NetworkIpType) -> Result<()> {
    ctx.require_present().await?;
    let mut state = ctx.state.lock().await;
    reconcile(ctx, &mut state).await?;

    let ending = state.sessions.matching(ip_type);
    if ending.is_empty() {
        debug!("No {ip_type} session to stop");
        return Ok(());
    }

    // each context is forgotten as soon as the modem confirms it is down
    for session in ending {
        ctx.backend.deactivate_context(session.ip_type).await?;
        info!("Data session {} stopped", session.ip_type);
        end_session(ctx, &mut state, session);
    }
    Ok(())
}

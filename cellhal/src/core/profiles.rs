//! PDP profile management.
//!
//! Each operation validates its input and preconditions before returning,
//! then applies the change from a spawned task: modem storage first, the
//! profile store second, so a failed write leaves the store untouched.

use log::{debug, info, warn};
use std::sync::Arc;

use crate::Result;
use crate::api::models::{HalError, ModemEvent, ProfileAction, ProfileDescriptor, ProfileEvent};
use crate::core::state::{ModemContext, ModemState};
use crate::core::state_wait::Completion;
use crate::core::validation::check_profile;

fn check_action(
    state: &ModemState,
    profile: &ProfileDescriptor,
    action: ProfileAction,
) -> Result<()> {
    let id = profile.profile_id;
    match action {
        ProfileAction::Created if state.profiles.contains(id) => {
            Err(HalError::DuplicateProfile(id))
        }
        ProfileAction::Modified | ProfileAction::Deleted if !state.profiles.contains(id) => {
            Err(HalError::UnknownProfile(id))
        }
        ProfileAction::Modified | ProfileAction::Deleted if state.sessions.uses_profile(id) => {
            Err(HalError::ProfileInUse(id))
        }
        _ => Ok(()),
    }
}

async fn apply(
    ctx: &ModemContext,
    profile: ProfileDescriptor,
    action: ProfileAction,
) -> Result<ProfileEvent> {
    let mut state = ctx.state.lock().await;
    check_action(&state, &profile, action)?;

    let event = ProfileEvent {
        profile_id: profile.profile_id,
        profile_type: profile.profile_type,
        action,
    };

    match action {
        ProfileAction::Created | ProfileAction::Modified => {
            ctx.backend.write_profile(&profile).await?;
            state.profiles.upsert(profile);
        }
        ProfileAction::Deleted => {
            ctx.backend.erase_profile(profile.profile_id).await?;
            state.profiles.remove(profile.profile_id);
        }
    }

    info!("Profile {} {action}", event.profile_id);
    Ok(event)
}

async fn submit(
    ctx: &Arc<ModemContext>,
    profile: ProfileDescriptor,
    action: ProfileAction,
) -> Result<Completion<ProfileEvent>> {
    if action != ProfileAction::Deleted {
        check_profile(&profile)?;
    }
    ctx.require_present().await?;
    check_action(&*ctx.state.lock().await, &profile, action)?;
    debug!("Profile {} {action} accepted", profile.profile_id);

    let (completer, completion) = Completion::channel();
    let ctx = Arc::clone(ctx);
    tokio::spawn(async move {
        let result = apply(&ctx, profile, action).await;
        match &result {
            Ok(event) => ctx.publish(ModemEvent::Profile(*event)),
            Err(e) => warn!("Profile operation failed: {e}"),
        }
        completer.complete(result);
    });
    Ok(completion)
}

pub(crate) async fn create(
    ctx: &Arc<ModemContext>,
    profile: ProfileDescriptor,
) -> Result<Completion<ProfileEvent>> {
    submit(ctx, profile, ProfileAction::Created).await
}

pub(crate) async fn modify(
    ctx: &Arc<ModemContext>,
    profile: ProfileDescriptor,
) -> Result<Completion<ProfileEvent>> {
    submit(ctx, profile, ProfileAction::Modified).await
}

pub(crate) async fn delete(
    ctx: &Arc<ModemContext>,
    profile: ProfileDescriptor,
) -> Result<Completion<ProfileEvent>> {
    submit(ctx, profile, ProfileAction::Deleted).await
}

pub(crate) async fn list(ctx: &ModemContext) -> Result<Vec<ProfileDescriptor>> {
    ctx.require_present().await?;
    Ok(ctx.state.lock().await.profiles.list())
}

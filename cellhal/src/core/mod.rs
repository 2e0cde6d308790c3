//! Core modem logic.
//!
//! Validation, the tracked modem state and the operations behind
//! [`CellularModem`](crate::CellularModem). Nothing here is public; the
//! `api` module is the only way in.

pub(crate) mod device;
pub(crate) mod power;
pub(crate) mod profiles;
pub(crate) mod session;
pub(crate) mod slots;
pub(crate) mod state;
pub(crate) mod state_wait;
pub(crate) mod validation;

//! Event-driven monitoring of registration, slot and packet service changes.
//!
//! Monitors listen on the modem event bus rather than polling the backend.
//! Each runs until its shutdown channel fires or its sender is dropped.

pub(crate) mod events;

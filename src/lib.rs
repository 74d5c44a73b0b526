//! # admute
//!
//! Mute Spotify advertisements by watching MPRIS playback signals.
//!
//! **Purpose:** Subscribe to the player's property-change signals on the
//! session bus, detect when an advertisement track starts or stops, and toggle
//! system audio mute accordingly.
//!
//! **Architecture:** Bus signal → [`watcher`] (filter/normalize) → [`engine`]
//! (classify/dedupe/sequence) → [`strategy`] (side effects) → [`mixer`] /
//! [`notify`].

pub mod config;
pub mod engine;
pub mod error;
pub mod liveness;
pub mod mixer;
pub mod notify;
pub mod strategy;
pub mod watcher;

pub use error::{ConfigError, Error, Result};

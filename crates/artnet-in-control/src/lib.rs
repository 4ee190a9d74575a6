//! ArtNet In Control - Art-Net DMX input for expression evaluation
//!
//! This crate receives Art-Net DMX frames on a background thread and exposes
//! the latest per-channel values to readers on any other thread without
//! blocking them.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use artnet_in_control::{ArtNetInput, ReceiverConfig};
//!
//! # fn main() -> artnet_in_control::Result<()> {
//! let mut input = ArtNetInput::new(ReceiverConfig::default());
//! input.configure("0.0.0.0", 6454, 3)?;
//! input.start()?;
//!
//! let dimmer = input.channel_value_normalized(0);
//! println!("{} ({:.2})", input.status(), dimmer);
//!
//! input.stop()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`dmx`] - Art-Net frame codec, channel buffer and receiver
//! - [`controller`] - Host-facing lifecycle controller
//! - [`config`] - Receiver configuration
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Receiver configuration
pub mod config;
/// Host-facing lifecycle controller
pub mod controller;
/// DMX input (Art-Net)
pub mod dmx;
/// Error types
pub mod error;

// Re-exports
pub use config::{ReceiverConfig, ARTNET_PORT};
pub use controller::{ArtNetInput, ShutdownHook};
pub use dmx::{ArtNetReceiver, ChannelBuffer, ChannelReader, ReceiverStatus, DMX_CHANNELS};
pub use error::{ControlError, Result};

//! DMX input system
//!
//! This module receives DMX512 over Art-Net and keeps the latest value of
//! every channel of one universe.
//!
//! ## Art-Net
//!
//! Art-Net is a UDP protocol for DMX transmission over Ethernet.
//! - Default port 6454
//! - Supports 32768 universes (15-bit Port-Address)
//! - Latest frame wins; sequence numbers are ignored
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use artnet_in_control::dmx::ArtNetReceiver;
//!
//! # fn main() -> artnet_in_control::Result<()> {
//! let receiver = ArtNetReceiver::new();
//! receiver.open("0.0.0.0:6454".parse().unwrap(), 0)?;
//!
//! // Hand a reader to the evaluation thread
//! let reader = receiver.reader();
//! std::thread::spawn(move || {
//!     let dimmer = reader.dmxf(0);
//!     println!("dimmer at {:.0}%", dimmer * 100.0);
//! });
//!
//! receiver.close()?;
//! # Ok(())
//! # }
//! ```

pub mod artnet;
pub mod channels;
pub mod reader;
pub mod receiver;

pub use artnet::{FrameTemplate, ProtocolError};
pub use channels::{ChannelBuffer, DMX_CHANNELS};
pub use reader::ChannelReader;
pub use receiver::{ArtNetReceiver, ReceiverStatus, SessionGuard, Timeouts};

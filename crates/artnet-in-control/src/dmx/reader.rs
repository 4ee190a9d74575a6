//! Read-only channel access for expression/driver evaluation
//!
//! A [`ChannelReader`] can be cloned freely and handed to any thread. It never
//! fails and never blocks: missing data reads as zero.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::channels::{ChannelBuffer, DMX_CHANNELS};
use super::receiver::ReceiverStatus;

/// Cloneable read handle on a receiver's channels and status
#[derive(Debug, Clone)]
pub struct ChannelReader {
    buffer: Arc<ChannelBuffer>,
    status: Arc<ArcSwap<ReceiverStatus>>,
}

impl ChannelReader {
    pub(crate) fn new(buffer: Arc<ChannelBuffer>, status: Arc<ArcSwap<ReceiverStatus>>) -> Self {
        Self { buffer, status }
    }

    /// Channel value (0-255). Out-of-range channels read as 0.
    pub fn dmx(&self, channel: u16) -> u8 {
        self.buffer.read(channel as usize).unwrap_or(0)
    }

    /// Channel value scaled to 0.0-1.0
    pub fn dmxf(&self, channel: u16) -> f32 {
        normalize(self.dmx(channel))
    }

    /// Copy all channels
    pub fn snapshot(&self) -> [u8; DMX_CHANNELS] {
        self.buffer.snapshot()
    }

    /// Status text for display
    pub fn status(&self) -> String {
        self.status.load().to_string()
    }
}

/// Scale a DMX value to 0.0-1.0
pub fn normalize(value: u8) -> f32 {
    value as f32 / 255.0
}

//! DMX channel buffer shared between the receive thread and readers
//!
//! Each channel is stored as an `AtomicU8` accessed with relaxed ordering.
//! A single-byte element cannot tear, so readers never block and never see
//! a half-written value. Channels are independent: a [`ChannelBuffer::snapshot`]
//! taken while a frame is being written may mix old and new values across
//! indices.
//!
//! Widening the element type (e.g. 16-bit channels) needs per-element atomics
//! of that width or a reader-writer lock.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::{error::ControlError, Result};

/// Number of channels in one DMX universe
pub const DMX_CHANNELS: usize = 512;

/// Last known value of every channel in a universe
#[derive(Debug)]
pub struct ChannelBuffer {
    channels: [AtomicU8; DMX_CHANNELS],
}

impl ChannelBuffer {
    /// Create a buffer with every channel at zero
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    /// Number of channels (always [`DMX_CHANNELS`])
    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    /// Copy `payload` into the buffer starting at channel 0.
    ///
    /// Bytes beyond the capacity are dropped. Channels past the end of a short
    /// payload keep their previous value. Returns the number of channels
    /// written.
    ///
    /// Only the receive thread writes; consumers get read access.
    pub(crate) fn write(&self, payload: &[u8]) -> usize {
        let len = payload.len().min(self.capacity());

        for (slot, value) in self.channels.iter().zip(&payload[..len]) {
            slot.store(*value, Ordering::Relaxed);
        }

        len
    }

    /// Read the current value of one channel (0-based)
    pub fn read(&self, index: usize) -> Result<u8> {
        self.channels
            .get(index)
            .map(|slot| slot.load(Ordering::Relaxed))
            .ok_or(ControlError::OutOfRange {
                index,
                capacity: DMX_CHANNELS,
            })
    }

    /// Copy all channels
    pub fn snapshot(&self) -> [u8; DMX_CHANNELS] {
        std::array::from_fn(|i| self.channels[i].load(Ordering::Relaxed))
    }
}

impl Default for ChannelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

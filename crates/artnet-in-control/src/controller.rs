//! Lifecycle controller
//!
//! [`ArtNetInput`] is the object a host application owns: it holds the
//! configuration, starts and stops the receiver on command and answers
//! channel queries. Nothing here depends on a host callback mechanism.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ReceiverConfig;
use crate::dmx::reader::normalize;
use crate::dmx::{ArtNetReceiver, ChannelBuffer, ChannelReader, DMX_CHANNELS};
use crate::{error::ControlError, Result};

/// Host-facing Art-Net input
pub struct ArtNetInput {
    config: ReceiverConfig,
    receiver: Arc<ArtNetReceiver>,
    shutdown: ShutdownHook,
}

impl ArtNetInput {
    /// Create a stopped input
    pub fn new(config: ReceiverConfig) -> Self {
        Self::with_buffer(config, Arc::new(ChannelBuffer::new()))
    }

    /// Create a stopped input writing into an existing buffer
    pub fn with_buffer(config: ReceiverConfig, buffer: Arc<ChannelBuffer>) -> Self {
        let receiver = Arc::new(ArtNetReceiver::with_buffer(buffer));
        let shutdown = ShutdownHook {
            receiver: receiver.clone(),
            fired: Arc::new(AtomicBool::new(false)),
        };

        Self {
            config,
            receiver,
            shutdown,
        }
    }

    /// Set IP, port and universe for the next start
    pub fn configure(&mut self, ip: &str, port: u16, universe: u16) -> Result<()> {
        let config = ReceiverConfig {
            ip: ip.to_string(),
            port,
            universe,
            ..self.config.clone()
        };
        self.set_config(config)
    }

    /// Replace the whole configuration for the next start
    pub fn set_config(&mut self, config: ReceiverConfig) -> Result<()> {
        config.validate()?;

        if self.is_running() && config != self.config {
            info!("Art-Net configuration changed, restart to apply");
        }

        self.config = config;
        Ok(())
    }

    /// Get the current configuration
    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Start receiving with the current configuration.
    ///
    /// A running receiver is restarted.
    pub fn start(&mut self) -> Result<()> {
        if self.shutdown.has_run() {
            return Err(ControlError::ShutDown);
        }

        self.config.validate()?;
        let endpoint = self.config.endpoint()?;

        self.receiver.set_timeouts(self.config.timeouts());
        self.receiver.open(endpoint, self.config.universe)
    }

    /// Stop receiving. Safe to call when never started.
    pub fn stop(&mut self) -> Result<()> {
        self.receiver.close()
    }

    /// Check whether the receiver is running
    pub fn is_running(&self) -> bool {
        self.receiver.is_open()
    }

    /// Channel value (0-255), 0 when unavailable
    pub fn channel_value(&self, index: u16) -> u8 {
        self.receiver.get_channel(index as usize).unwrap_or(0)
    }

    /// Channel value scaled to 0.0-1.0
    pub fn channel_value_normalized(&self, index: u16) -> f32 {
        normalize(self.channel_value(index))
    }

    /// Copy all channels
    pub fn channels(&self) -> [u8; DMX_CHANNELS] {
        self.receiver.snapshot()
    }

    /// Status text for display
    pub fn status(&self) -> String {
        self.receiver.status().to_string()
    }

    /// Get the underlying receiver
    pub fn receiver(&self) -> &ArtNetReceiver {
        &self.receiver
    }

    /// Create a read handle for an evaluation thread
    pub fn reader(&self) -> ChannelReader {
        self.receiver.reader()
    }

    /// Create a hook for the process shutdown path
    pub fn shutdown_hook(&self) -> ShutdownHook {
        self.shutdown.clone()
    }
}

impl Drop for ArtNetInput {
    fn drop(&mut self) {
        self.shutdown.run();
    }
}

/// Stops the receiver exactly once on process shutdown.
///
/// All clones share one flag with the owning [`ArtNetInput`], whose `Drop`
/// also runs the hook.
#[derive(Clone)]
pub struct ShutdownHook {
    receiver: Arc<ArtNetReceiver>,
    fired: Arc<AtomicBool>,
}

impl ShutdownHook {
    /// Stop the receiver. Returns `false` if the hook already ran.
    pub fn run(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }

        info!("Closing Art-Net receiver for shutdown");
        if let Err(e) = self.receiver.close() {
            warn!("Error closing Art-Net receiver on shutdown: {}", e);
        }
        true
    }

    /// Check whether the hook already ran
    pub fn has_run(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

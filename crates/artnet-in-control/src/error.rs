//! Error types for the Art-Net input system
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Control system errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// The UDP socket could not be bound
    #[error("Failed to bind Art-Net socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Channel index outside the buffer
    #[error("Channel index {index} out of range (capacity {capacity})")]
    OutOfRange { index: usize, capacity: usize },

    /// Receive thread did not stop within the bounded wait
    #[error("Receive thread did not stop within {timeout:?}")]
    JoinTimeout { timeout: Duration },

    /// Receive thread could not be started
    #[error("Failed to spawn receive thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// Receive thread terminated by panicking
    #[error("Receive thread panicked")]
    ThreadPanicked,

    /// Start requested after the process shutdown hook ran
    #[error("Art-Net input has been shut down")]
    ShutDown,

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

//! Art-Net receiver
//!
//! Binds a UDP socket and runs a dedicated receive thread that validates
//! incoming frames and writes their channel data into a shared
//! [`ChannelBuffer`]. The socket never leaves the receive thread.
//!
//! The thread blocks on the socket with a short read timeout so it can notice
//! a stop request. [`ArtNetReceiver::close`] waits a bounded time for it to
//! exit; the socket is dropped by the thread before it signals completion,
//! so the port is free again once `close` returns successfully.

use std::fmt;
use std::mem::{self, Discriminant};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwap;
use crossbeam_channel::{bounded, RecvTimeoutError};
use parking_lot::Mutex;
use tracing::{debug, info, trace, warn};

use super::artnet::{FrameTemplate, MAX_DATAGRAM_SIZE, MAX_UNIVERSE};
use super::channels::{ChannelBuffer, DMX_CHANNELS};
use super::reader::ChannelReader;
use crate::{error::ControlError, Result};

/// Default socket read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Default bounded wait for the receive thread on close
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(3);

/// Receiver health, for display only
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReceiverStatus {
    /// Not listening
    #[default]
    Inactive,
    /// Last datagram was a valid frame with this many channels
    Receiving(usize),
    /// No datagram within the read timeout
    Timeout,
    /// Last datagram was not a frame for the configured universe
    InvalidData,
    /// Socket error while receiving
    Error(String),
}

impl fmt::Display for ReceiverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "Inactive"),
            Self::Receiving(count) => write!(f, "Receiving {} Channels", count),
            Self::Timeout => write!(f, "Timeout"),
            Self::InvalidData => write!(f, "Invalid Data"),
            Self::Error(detail) => write!(f, "Error {}", detail),
        }
    }
}

/// Socket timings of a receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// How long one socket read may block
    pub read: Duration,
    /// How long `close` waits for the receive thread
    pub join: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: DEFAULT_READ_TIMEOUT,
            join: DEFAULT_JOIN_TIMEOUT,
        }
    }
}

/// A running receive thread
struct Session {
    endpoint: SocketAddr,
    universe: u16,
    running: Arc<AtomicBool>,
    // Disconnects once the thread has dropped its socket
    finished: crossbeam_channel::Receiver<()>,
    thread: JoinHandle<()>,
    join_timeout: Duration,
}

/// Art-Net receiver for one universe
pub struct ArtNetReceiver {
    buffer: Arc<ChannelBuffer>,
    status: Arc<ArcSwap<ReceiverStatus>>,
    session: Mutex<Option<Session>>,
    timeouts: Mutex<Timeouts>,
}

impl ArtNetReceiver {
    /// Create a closed receiver with its own zeroed channel buffer
    pub fn new() -> Self {
        Self::with_buffer(Arc::new(ChannelBuffer::new()))
    }

    /// Create a closed receiver writing into an existing buffer
    pub fn with_buffer(buffer: Arc<ChannelBuffer>) -> Self {
        Self {
            buffer,
            status: Arc::new(ArcSwap::from_pointee(ReceiverStatus::Inactive)),
            session: Mutex::new(None),
            timeouts: Mutex::new(Timeouts::default()),
        }
    }

    /// Set the timings used by the next `open`
    pub fn set_timeouts(&self, timeouts: Timeouts) {
        *self.timeouts.lock() = timeouts;
    }

    /// Get the timings used by the next `open`
    pub fn timeouts(&self) -> Timeouts {
        *self.timeouts.lock()
    }

    /// Bind `endpoint` and start receiving frames for `universe`.
    ///
    /// An already open receiver is closed first.
    pub fn open(&self, endpoint: SocketAddr, universe: u16) -> Result<()> {
        if universe > MAX_UNIVERSE {
            return Err(ControlError::InvalidParameter(format!(
                "Universe {} out of range (0-{})",
                universe, MAX_UNIVERSE
            )));
        }

        let previous = self.session.lock().take();
        if let Some(session) = previous {
            info!(
                "Art-Net receiver already open on {}, restarting",
                session.endpoint
            );
            if let Err(e) = Self::finish(session) {
                warn!("Previous Art-Net session did not stop cleanly: {}", e);
            }
        }

        let timeouts = self.timeouts();

        let socket = UdpSocket::bind(endpoint).map_err(|source| {
            warn!("Failed to bind Art-Net socket on {}: {}", endpoint, source);
            self.status
                .store(Arc::new(ReceiverStatus::Error(source.to_string())));
            ControlError::Bind {
                addr: endpoint,
                source,
            }
        })?;
        socket.set_read_timeout(Some(timeouts.read))?;
        // Resolves port 0 to the port actually bound
        let local_addr = socket.local_addr()?;

        let running = Arc::new(AtomicBool::new(true));
        let (done_tx, finished) = bounded::<()>(0);

        let receive_loop = ReceiveLoop {
            socket,
            template: FrameTemplate::new(universe),
            buffer: self.buffer.clone(),
            status: self.status.clone(),
            running: running.clone(),
            backoff: timeouts.read,
        };

        // Stored before the thread starts so its first update wins
        self.status.store(Arc::new(ReceiverStatus::Receiving(0)));

        let thread = thread::Builder::new()
            .name(format!("artnet-rx-{}", universe))
            .spawn(move || {
                let _done = done_tx;
                receive_loop.run();
            })
            .map_err(|e| {
                self.status
                    .store(Arc::new(ReceiverStatus::Error(e.to_string())));
                ControlError::ThreadSpawn(e)
            })?;

        info!(
            "Opened Art-Net receiver on {} (universe {})",
            local_addr, universe
        );

        let session = Session {
            endpoint: local_addr,
            universe,
            running,
            finished,
            thread,
            join_timeout: timeouts.join,
        };

        // A concurrent open may have slipped in while we were binding
        if let Some(raced) = self.session.lock().replace(session) {
            if let Err(e) = Self::finish(raced) {
                warn!("Replaced Art-Net session did not stop cleanly: {}", e);
            }
        }

        Ok(())
    }

    /// Stop the receive thread and release the socket.
    ///
    /// Safe to call when already closed. Returns [`ControlError::JoinTimeout`]
    /// if the thread did not exit in time; the receiver is closed either way.
    pub fn close(&self) -> Result<()> {
        let session = self.session.lock().take();

        let result = match session {
            Some(session) => {
                let endpoint = session.endpoint;
                let result = Self::finish(session);
                info!("Closed Art-Net receiver on {}", endpoint);
                result
            }
            None => Ok(()),
        };

        self.status.store(Arc::new(ReceiverStatus::Inactive));
        result
    }

    fn finish(session: Session) -> Result<()> {
        session.running.store(false, Ordering::Release);

        // Called from the receive thread itself: it exits after this iteration
        if session.thread.thread().id() == thread::current().id() {
            debug!("Art-Net receiver closed from its own thread");
            return Ok(());
        }

        match session.finished.recv_timeout(session.join_timeout) {
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Art-Net receive thread on {} did not stop within {:?}",
                    session.endpoint, session.join_timeout
                );
                Err(ControlError::JoinTimeout {
                    timeout: session.join_timeout,
                })
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => session
                .thread
                .join()
                .map_err(|_| ControlError::ThreadPanicked),
        }
    }

    /// Open and return a guard that closes the receiver when dropped
    pub fn session(&self, endpoint: SocketAddr, universe: u16) -> Result<SessionGuard<'_>> {
        self.open(endpoint, universe)?;
        Ok(SessionGuard { receiver: self })
    }

    /// Check whether a receive thread is running
    pub fn is_open(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Get the local address of the running session
    pub fn endpoint(&self) -> Option<SocketAddr> {
        self.session.lock().as_ref().map(|s| s.endpoint)
    }

    /// Get the universe of the running session
    pub fn universe(&self) -> Option<u16> {
        self.session.lock().as_ref().map(|s| s.universe)
    }

    /// Get the current status
    pub fn status(&self) -> ReceiverStatus {
        self.status.load_full().as_ref().clone()
    }

    /// Read one channel (0-based). Zero until a frame has been received.
    pub fn get_channel(&self, index: usize) -> Result<u8> {
        self.buffer.read(index)
    }

    /// Copy all channels
    pub fn snapshot(&self) -> [u8; DMX_CHANNELS] {
        self.buffer.snapshot()
    }

    /// Create a read-only handle for consumers on other threads
    pub fn reader(&self) -> ChannelReader {
        ChannelReader::new(self.buffer.clone(), self.status.clone())
    }
}

impl Default for ArtNetReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ArtNetReceiver {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Error closing Art-Net receiver: {}", e);
        }
    }
}

/// Closes the receiver when dropped
pub struct SessionGuard<'a> {
    receiver: &'a ArtNetReceiver,
}

impl SessionGuard<'_> {
    pub fn receiver(&self) -> &ArtNetReceiver {
        self.receiver
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.receiver.close() {
            warn!("Error closing Art-Net session: {}", e);
        }
    }
}

/// State owned by the receive thread
struct ReceiveLoop {
    socket: UdpSocket,
    template: FrameTemplate,
    buffer: Arc<ChannelBuffer>,
    status: Arc<ArcSwap<ReceiverStatus>>,
    running: Arc<AtomicBool>,
    backoff: Duration,
}

impl ReceiveLoop {
    fn run(self) {
        debug!(
            "Art-Net receive thread started (universe {})",
            self.template.universe()
        );

        let mut datagram = [0u8; MAX_DATAGRAM_SIZE];
        let mut last_kind: Option<Discriminant<ReceiverStatus>> = None;

        while self.running.load(Ordering::Acquire) {
            let status = self.receive_next(&mut datagram);

            // Loaded before the flag check: once closed, `close` or a newer
            // session owns the status and the swap below fails
            let current = self.status.load();
            if !self.running.load(Ordering::Acquire) {
                break;
            }

            let kind = mem::discriminant(&status);
            if last_kind != Some(kind) {
                debug!("Art-Net receiver status: {}", status);
                last_kind = Some(kind);
            }

            let failed = matches!(status, ReceiverStatus::Error(_));
            if **current != status {
                self.status.compare_and_swap(&current, Arc::new(status));
            }
            drop(current);

            // Errors can return immediately; avoid spinning on a broken socket
            if failed {
                thread::sleep(self.backoff);
            }
        }

        debug!(
            "Art-Net receive thread stopped (universe {})",
            self.template.universe()
        );
    }

    fn receive_next(&self, datagram: &mut [u8]) -> ReceiverStatus {
        match self.socket.recv_from(datagram) {
            Ok((len, _peer)) => handle_datagram(&self.template, &self.buffer, &datagram[..len]),
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                ReceiverStatus::Timeout
            }
            Err(e) => ReceiverStatus::Error(e.to_string()),
        }
    }
}

/// Validate one datagram and publish its channels
fn handle_datagram(
    template: &FrameTemplate,
    buffer: &ChannelBuffer,
    datagram: &[u8],
) -> ReceiverStatus {
    match template.extract(datagram) {
        Ok(payload) => {
            buffer.write(payload);
            trace!(
                "Art-Net frame for universe {} with {} channels",
                template.universe(),
                payload.len()
            );
            ReceiverStatus::Receiving(payload.len())
        }
        Err(_) => ReceiverStatus::InvalidData,
    }
}

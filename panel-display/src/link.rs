//! Bounded outbound queue and the `display-tx` transmitter thread.
//!
//! Producers encode on their own thread and copy the finished bytes into an
//! [`OutboundMessage`] slot. The transmitter drains the channel and performs
//! one `Transport::send` per message, in enqueue order.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::message::{OutboundMessage, MAX_MESSAGE_SIZE};
use crate::transport::{Transport, UdpTransport};

/// Default number of queued messages. One full redraw is about twenty.
pub const DEFAULT_QUEUE_CAPACITY: usize = 512;

/// Upper bound on how long the transmitter sleeps without a wakeup.
const RECV_TIMEOUT: Duration = Duration::from_secs(1);

/// Counters shared between the producer and the transmitter.
#[derive(Debug, Default)]
pub struct LinkStats {
    sent: AtomicU64,
    failed: AtomicU64,
    dropped: AtomicU64,
}

impl LinkStats {
    pub fn sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub struct DisplayLink {
    tx: Option<Sender<OutboundMessage>>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<LinkStats>,
    overflowing: AtomicBool,
}

impl DisplayLink {
    /// Create the queue and start the transmitter over `transport`.
    pub fn spawn<T: Transport>(transport: T, capacity: usize) -> io::Result<Self> {
        let (tx, rx) = crossbeam_channel::bounded::<OutboundMessage>(capacity.max(1));
        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(LinkStats::default());

        let thread_running = running.clone();
        let thread_stats = stats.clone();
        let handle = thread::Builder::new()
            .name("display-tx".into())
            .spawn(move || {
                transmit_loop(transport, rx, thread_running, thread_stats);
            })?;

        Ok(Self {
            tx: Some(tx),
            running,
            handle: Some(handle),
            stats,
            overflowing: AtomicBool::new(false),
        })
    }

    /// Open a UDP transport to `dest` and start the transmitter.
    pub fn connect(dest: SocketAddr, capacity: usize) -> io::Result<Self> {
        let transport = UdpTransport::connect(dest)?;
        log::debug!(target: "panel::display", "display link to {}", dest);
        Self::spawn(transport, capacity)
    }

    /// Queue a copy of `bytes` for transmission. Never blocks.
    ///
    /// Returns `false` when the message was dropped, either because the
    /// queue is full or because the link has shut down.
    pub fn enqueue(&self, bytes: &[u8]) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        if bytes.len() > MAX_MESSAGE_SIZE {
            log::trace!(
                target: "panel::display",
                "truncating {} byte message to {}",
                bytes.len(),
                MAX_MESSAGE_SIZE
            );
        }
        match tx.try_send(OutboundMessage::from_slice(bytes)) {
            Ok(()) => {
                self.overflowing.store(false, Ordering::Relaxed);
                true
            }
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                if !self.overflowing.swap(true, Ordering::Relaxed) {
                    log::warn!(target: "panel::display", "display queue full, dropping messages");
                }
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the transmitter after it drains what is already queued.
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Release);
        self.tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!(target: "panel::display", "display-tx thread panicked");
            }
            log::debug!(
                target: "panel::display",
                "display link stopped: sent={} failed={} dropped={}",
                self.stats.sent(),
                self.stats.failed(),
                self.stats.dropped()
            );
        }
    }
}

impl Drop for DisplayLink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn transmit_loop<T: Transport>(
    mut transport: T,
    rx: Receiver<OutboundMessage>,
    running: Arc<AtomicBool>,
    stats: Arc<LinkStats>,
) {
    while running.load(Ordering::Acquire) {
        match rx.recv_timeout(RECV_TIMEOUT) {
            Ok(msg) => {
                transmit(&mut transport, &msg, &stats);
                while let Ok(msg) = rx.try_recv() {
                    transmit(&mut transport, &msg, &stats);
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    while let Ok(msg) = rx.try_recv() {
        transmit(&mut transport, &msg, &stats);
    }
}

fn transmit<T: Transport>(transport: &mut T, msg: &OutboundMessage, stats: &LinkStats) {
    match transport.send(msg.as_bytes()) {
        Ok(()) => {
            stats.sent.fetch_add(1, Ordering::Relaxed);
        }
        Err(e) => {
            stats.failed.fetch_add(1, Ordering::Relaxed);
            log::debug!(target: "panel::display", "send failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Blocks inside the first `send` until the gate opens.
    struct GatedTransport {
        entered: Sender<()>,
        gate: Receiver<()>,
        log: Arc<Mutex<Vec<Vec<u8>>>>,
        first: bool,
    }

    impl Transport for GatedTransport {
        fn send(&mut self, datagram: &[u8]) -> io::Result<()> {
            if self.first {
                self.first = false;
                let _ = self.entered.send(());
                let _ = self.gate.recv();
            }
            self.log.lock().unwrap().push(datagram.to_vec());
            Ok(())
        }
    }

    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&mut self, _datagram: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        }
    }

    #[test]
    fn overflow_drops_newest_and_counts() {
        let (entered_tx, entered_rx) = crossbeam_channel::unbounded();
        let (gate_tx, gate_rx) = crossbeam_channel::unbounded();
        let log = Arc::new(Mutex::new(Vec::new()));
        let transport = GatedTransport {
            entered: entered_tx,
            gate: gate_rx,
            log: log.clone(),
            first: true,
        };
        let mut link = DisplayLink::spawn(transport, 1).unwrap();

        assert!(link.enqueue(b"one"));
        entered_rx.recv().unwrap();
        assert!(link.enqueue(b"two"));
        assert!(!link.enqueue(b"three"));
        assert!(!link.enqueue(b"four"));
        assert_eq!(link.stats().dropped(), 2);

        gate_tx.send(()).unwrap();
        link.shutdown();

        let sent = log.lock().unwrap().clone();
        assert_eq!(sent, vec![b"one".to_vec(), b"two".to_vec()]);
        assert_eq!(link.stats().sent(), 2);
    }

    #[test]
    fn failed_sends_are_counted() {
        let mut link = DisplayLink::spawn(FailingTransport, 8).unwrap();
        assert!(link.enqueue(b"a"));
        assert!(link.enqueue(b"b"));
        link.shutdown();
        assert_eq!(link.stats().failed(), 2);
        assert_eq!(link.stats().sent(), 0);
    }

    #[test]
    fn enqueue_after_shutdown_is_rejected() {
        let mut link = DisplayLink::spawn(FailingTransport, 8).unwrap();
        link.shutdown();
        assert!(!link.is_running());
        assert!(!link.enqueue(b"late"));
        link.shutdown();
    }
}

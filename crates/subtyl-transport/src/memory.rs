// ============================================
// File: crates/subtyl-transport/src/memory.rs
// ============================================
//! # In-Memory Link
//!
//! ## Creation Reason
//! Provides an in-process transport pair for the demo binary, the
//! throughput harness and the integration tests - no sockets, no
//! privileges, and a natural seat for an "attacker" that inspects or
//! rewrites messages between `send` and delivery.
//!
//! ## Main Functionality
//! - `MemoryLink::pair()`: two connected endpoints
//! - Bounded queues with blocking `recv`
//!
//! ## Usage in Tests
//! ```
//! use subtyl_transport::memory::MemoryLink;
//! use subtyl_transport::traits::MessageLink;
//!
//! let (a, b) = MemoryLink::pair();
//! a.send(b"ping").unwrap();
//! assert_eq!(b.recv().unwrap(), b"ping");
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - Queues are bounded to prevent unbounded memory growth
//! - Closing either endpoint closes both directions
//!
//! ## Last Modified
//! v0.1.0 - Initial in-memory link

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{Result, TransportError};
use crate::traits::MessageLink;

// ============================================
// Constants
// ============================================

/// Maximum number of messages queued per direction.
const MAX_QUEUE_SIZE: usize = 1024;

// ============================================
// Shared Queue
// ============================================

/// One direction of the pair.
struct Pipe {
    queue: Mutex<VecDeque<Vec<u8>>>,
    available: Condvar,
    closed: AtomicBool,
}

impl Pipe {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(64)),
            available: Condvar::new(),
            closed: AtomicBool::new(false),
        }
    }

    fn push(&self, msg: Vec<u8>) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }

        let mut queue = self.queue.lock();
        if queue.len() >= MAX_QUEUE_SIZE {
            return Err(TransportError::QueueFull {
                limit: MAX_QUEUE_SIZE,
            });
        }
        queue.push_back(msg);
        drop(queue);

        self.available.notify_one();
        Ok(())
    }

    fn pop_blocking(&self) -> Result<Vec<u8>> {
        let mut queue = self.queue.lock();
        loop {
            if let Some(msg) = queue.pop_front() {
                return Ok(msg);
            }
            if self.closed.load(Ordering::Acquire) {
                return Err(TransportError::Closed);
            }
            self.available.wait(&mut queue);
        }
    }

    fn pop_now(&self) -> Result<Option<Vec<u8>>> {
        let mut queue = self.queue.lock();
        if let Some(msg) = queue.pop_front() {
            return Ok(Some(msg));
        }
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed);
        }
        Ok(None)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.available.notify_all();
    }
}

// ============================================
// MemoryLink
// ============================================

/// One endpoint of an in-process message pair.
pub struct MemoryLink {
    outbound: Arc<Pipe>,
    inbound: Arc<Pipe>,
}

impl MemoryLink {
    /// Creates two connected endpoints.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let forward = Arc::new(Pipe::new());
        let backward = Arc::new(Pipe::new());

        (
            Self {
                outbound: Arc::clone(&forward),
                inbound: Arc::clone(&backward),
            },
            Self {
                outbound: backward,
                inbound: forward,
            },
        )
    }
}

impl MessageLink for MemoryLink {
    fn send(&self, msg: &[u8]) -> Result<()> {
        self.outbound.push(msg.to_vec())
    }

    fn recv(&self) -> Result<Vec<u8>> {
        self.inbound.pop_blocking()
    }

    fn try_recv(&self) -> Result<Option<Vec<u8>>> {
        self.inbound.pop_now()
    }

    fn close(&self) {
        self.outbound.close();
        self.inbound.close();
    }

    fn is_open(&self) -> bool {
        !self.outbound.closed.load(Ordering::Acquire)
            && !self.inbound.closed.load(Ordering::Acquire)
    }
}

impl Drop for MemoryLink {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================
// Tests
// ============================================

//! Outgoing frame queue, single-flight send gate and upload buffer.
//!
//! Producers push frames from any thread. Whoever wins the gate drains the
//! whole queue into the upload buffer and takes it as one request body.

use std::sync::atomic::{AtomicBool, Ordering};

use bytes::{Bytes, BytesMut};
use crossbeam_queue::SegQueue;
use parking_lot::Mutex;

/// Frames waiting for the next send cycle.
#[derive(Debug, Default)]
pub struct Outbox {
    /// FIFO of frames not yet moved into a request body.
    queue: SegQueue<Bytes>,
    /// Set while a send request is in flight.
    sending: AtomicBool,
    /// Body of the next outbound request.
    upload: Mutex<BytesMut>,
}

impl Outbox {
    /// Create an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame; ordering is preserved.
    pub fn enqueue(&self, frame: Bytes) {
        self.queue.push(frame);
    }

    /// Number of frames waiting.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Check if no frames are waiting.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Try to become the single sender. Returns `false` if a cycle is running.
    pub fn try_acquire(&self) -> bool {
        self.sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the gate after a cycle completes.
    pub fn release(&self) {
        self.sending.store(false, Ordering::Release);
    }

    /// Check if a send cycle holds the gate.
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// Drain every queued frame into the upload buffer and take it as one body.
    ///
    /// Only the gate holder may call this.
    pub fn take_batch(&self) -> Bytes {
        let mut upload = self.upload.lock();
        while let Some(frame) = self.queue.pop() {
            upload.extend_from_slice(&frame);
        }
        upload.split().freeze()
    }

    /// Write `bytes` into the upload buffer and take it as one body.
    pub fn stage(&self, bytes: &[u8]) -> Bytes {
        let mut upload = self.upload.lock();
        upload.extend_from_slice(bytes);
        upload.split().freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_is_single_flight() {
        let outbox = Outbox::new();
        assert!(outbox.try_acquire());
        assert!(outbox.is_sending());
        assert!(!outbox.try_acquire());

        outbox.release();
        assert!(!outbox.is_sending());
        assert!(outbox.try_acquire());
    }

    #[test]
    fn test_take_batch_preserves_order() {
        let outbox = Outbox::new();
        outbox.enqueue(Bytes::from_static(b"one;"));
        outbox.enqueue(Bytes::from_static(b"two;"));
        outbox.enqueue(Bytes::from_static(b"three;"));
        assert_eq!(outbox.len(), 3);

        assert_eq!(outbox.take_batch(), Bytes::from_static(b"one;two;three;"));
        assert!(outbox.is_empty());
        assert!(outbox.take_batch().is_empty());
    }

    #[test]
    fn test_batches_do_not_leak_into_each_other() {
        let outbox = Outbox::new();
        let handshake = outbox.stage(b"hello");

        outbox.enqueue(Bytes::from_static(b"frame"));
        let batch = outbox.take_batch();

        assert_eq!(handshake, Bytes::from_static(b"hello"));
        assert_eq!(batch, Bytes::from_static(b"frame"));
    }

    #[test]
    fn test_concurrent_acquire_has_one_winner() {
        let outbox = std::sync::Arc::new(Outbox::new());
        let winners: usize = (0..8)
            .map(|_| {
                let outbox = outbox.clone();
                std::thread::spawn(move || outbox.try_acquire())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(winners, 1);
    }
}

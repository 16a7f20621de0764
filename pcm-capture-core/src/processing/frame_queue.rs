//! Lock-free single-producer/single-consumer queue of raw captured frames.
//!
//! The producer half moves into the real-time callback; the consumer half
//! stays with the backend. Neither half is `Clone`, so the SPSC discipline
//! holds by construction.
//!
//! Overflow behavior: drops the newest frames. The queue is sized so this is
//! not expected in practice; drops are counted rather than silently lost.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

use crate::models::sample::{RawFrame, StereoSample};
use crate::models::settings::MAX_QUEUE_CAPACITY;
use crate::processing::sample_format::FrameBatch;

/// Counters shared by both halves of a queue.
#[derive(Debug, Default)]
pub struct QueueCounters {
    callbacks: AtomicU64,
    captured: AtomicU64,
    dropped: AtomicU64,
}

impl QueueCounters {
    /// Producer callbacks delivered so far.
    pub fn callbacks(&self) -> u64 {
        self.callbacks.load(Ordering::Relaxed)
    }

    /// Stereo frames stored in the queue so far.
    pub fn captured(&self) -> u64 {
        self.captured.load(Ordering::Relaxed)
    }

    /// Stereo frames discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Constructor for a producer/consumer pair.
pub struct FrameQueue;

impl FrameQueue {
    /// Create a queue holding up to `capacity` raw frames.
    ///
    /// Capacity is clamped to `2..=MAX_QUEUE_CAPACITY` and rounded up to an
    /// even number so left/right pairs always fit whole.
    pub fn new(capacity: usize) -> (FrameProducer, FrameConsumer) {
        let capacity = capacity.clamp(2, MAX_QUEUE_CAPACITY).next_multiple_of(2);
        let (producer, consumer) = HeapRb::<RawFrame>::new(capacity).split();
        let counters = Arc::new(QueueCounters::default());

        (
            FrameProducer {
                producer,
                counters: Arc::clone(&counters),
            },
            FrameConsumer { consumer, counters },
        )
    }
}

/// Write half of the frame queue. Safe to use from a real-time thread:
/// no locks, no allocation, no logging.
pub struct FrameProducer {
    producer: HeapProd<RawFrame>,
    counters: Arc<QueueCounters>,
}

impl FrameProducer {
    /// Append a single raw frame. Returns `false` if the queue is full.
    pub fn enqueue(&mut self, frame: RawFrame) -> bool {
        self.producer.try_push(frame).is_ok()
    }

    /// Append one left/right pair, or drop it whole if there is no room.
    pub fn push_stereo(&mut self, left: RawFrame, right: RawFrame) -> bool {
        if self.producer.vacant_len() < 2 {
            self.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return false;
        }
        // One slice push publishes both channels together.
        self.producer.push_slice(&[left, right]);
        self.counters.captured.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Decode and enqueue one callback buffer. Returns the number of stereo
    /// frames stored.
    pub fn push_batch(&mut self, batch: &FrameBatch<'_>) -> usize {
        self.counters.callbacks.fetch_add(1, Ordering::Relaxed);
        if batch.is_empty() {
            return 0;
        }
        let mut stored = 0;
        for (left, right) in batch.stereo_frames() {
            if self.push_stereo(left, right) {
                stored += 1;
            }
        }
        stored
    }

    /// Free slots, in raw frames.
    pub fn available_space(&self) -> usize {
        self.producer.vacant_len()
    }

    pub fn is_full(&self) -> bool {
        self.producer.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.producer.capacity().get()
    }

    pub fn counters(&self) -> &QueueCounters {
        &self.counters
    }
}

/// Read half of the frame queue.
pub struct FrameConsumer {
    consumer: HeapCons<RawFrame>,
    counters: Arc<QueueCounters>,
}

impl FrameConsumer {
    /// Oldest unread raw frame, or `None` when the queue is empty.
    pub fn try_dequeue(&mut self) -> Option<RawFrame> {
        self.consumer.try_pop()
    }

    /// Oldest unread left/right pair.
    ///
    /// Returns `None` unless both channels are present; a lone frame stays
    /// queued so channel alignment survives a partially published pair.
    pub fn try_dequeue_stereo(&mut self) -> Option<StereoSample> {
        if self.consumer.occupied_len() < 2 {
            return None;
        }
        let mut pair = [0; 2];
        self.consumer.pop_slice(&mut pair);
        Some(StereoSample::new(pair[0], pair[1]))
    }

    /// Unread raw frames.
    pub fn len(&self) -> usize {
        self.consumer.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.consumer.capacity().get()
    }

    /// Discard everything currently queued.
    pub fn clear(&mut self) -> usize {
        self.consumer.clear()
    }

    pub fn counters(&self) -> &QueueCounters {
        &self.counters
    }
}

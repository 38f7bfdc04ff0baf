use crate::error::Ja3Error;
use crate::filter::PortFilter;
use crate::output::FingerprintRecord;
use crate::process::{process_frame, DecodeStats};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// A captured frame and its capture time in seconds
pub type Frame = (Vec<u8>, f64);

/// Result of dispatching a frame to a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchResult {
    /// Frame successfully queued
    Queued,
    /// Frame dropped (queue full or worker gone)
    Dropped,
}

/// Statistics for a single worker
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerStats {
    /// Worker ID
    pub id: usize,
    /// Current queue size (approximate)
    pub queue_size: usize,
    /// Frames dropped before reaching this worker
    pub dropped: u64,
    /// Fingerprints produced by this worker
    pub fingerprints: u64,
    /// ClientHello records this worker rejected as malformed
    pub rejected: u64,
}

impl fmt::Display for WorkerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Worker {}: queue_size={}, dropped={}, fingerprints={}, rejected={}",
            self.id, self.queue_size, self.dropped, self.fingerprints, self.rejected
        )
    }
}

/// Pool-wide statistics
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Frames queued since start
    pub total_dispatched: u64,
    /// Frames dropped because queues were full
    pub total_dropped: u64,
    /// Per-worker statistics
    pub workers: Vec<WorkerStats>,
    /// Frames, fingerprints and drops by reason across all workers; filled in by [`WorkerPool::join`]
    pub decode: DecodeStats,
}

impl PoolStats {
    pub fn total_fingerprints(&self) -> u64 {
        self.workers.iter().map(|w| w.fingerprints).sum()
    }
}

impl fmt::Display for PoolStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "JA3 Pool Stats - frames dispatched: {}, frames dropped: {}",
            self.total_dispatched, self.total_dropped
        )?;
        for worker in &self.workers {
            writeln!(f, "  {worker}")?;
        }
        if self.decode.packets > 0 {
            writeln!(f, "  Decoded: {}", self.decode)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct WorkerCounters {
    dropped: AtomicU64,
    fingerprints: AtomicU64,
    rejected: AtomicU64,
}

/// Fixed set of threads fingerprinting frames independently.
///
/// Frames are handed out round-robin. Decoding keeps no state between frames, so
/// workers never coordinate; each one sends its records straight to the result channel.
pub struct WorkerPool {
    workers: Vec<thread::JoinHandle<DecodeStats>>,
    frame_senders: Vec<Sender<Frame>>,
    pub num_workers: NonZeroUsize,
    next_worker: AtomicUsize,
    queued_count: AtomicU64,
    dropped_count: AtomicU64,
    counters: Vec<Arc<WorkerCounters>>,
}

impl WorkerPool {
    /// Create a new worker pool
    ///
    /// # Errors
    ///
    /// Returns an error if unable to spawn worker threads or if num_workers is 0
    pub fn new(
        num_workers: usize,
        queue_size: usize,
        filter: PortFilter,
        result_sender: mpsc::Sender<FingerprintRecord>,
    ) -> Result<Self, Ja3Error> {
        let num_workers = NonZeroUsize::new(num_workers).ok_or_else(|| {
            Ja3Error::Misconfiguration("Worker count must be greater than 0".to_string())
        })?;

        debug!("Creating JA3 worker pool: {} workers, queue size: {}", num_workers, queue_size);

        let mut workers = Vec::with_capacity(num_workers.get());
        let mut frame_senders = Vec::with_capacity(num_workers.get());
        let mut counters = Vec::with_capacity(num_workers.get());

        for worker_id in 0..num_workers.get() {
            let (tx, rx) = bounded::<Frame>(queue_size);
            let worker_counters = Arc::new(WorkerCounters::default());
            let result_sender = result_sender.clone();
            let filter = filter.clone();
            let thread_counters = Arc::clone(&worker_counters);

            let handle = thread::Builder::new()
                .name(format!("ja3-worker-{worker_id}"))
                .spawn(move || {
                    Self::worker_loop(worker_id, rx, filter, result_sender, thread_counters)
                })
                .map_err(|e| {
                    Ja3Error::Misconfiguration(format!("Failed to spawn worker thread: {e}"))
                })?;

            workers.push(handle);
            frame_senders.push(tx);
            counters.push(worker_counters);
        }

        Ok(Self {
            workers,
            frame_senders,
            num_workers,
            next_worker: AtomicUsize::new(0),
            queued_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            counters,
        })
    }

    /// Dispatch a frame to a worker (round-robin)
    pub fn dispatch(&self, frame: Vec<u8>, timestamp: f64) -> DispatchResult {
        let counter = self.next_worker.fetch_add(1, Ordering::Relaxed);
        let worker_id = counter.checked_rem(self.num_workers.get()).unwrap_or(0);
        match self.frame_senders[worker_id].try_send((frame, timestamp)) {
            Ok(()) => {
                self.queued_count.fetch_add(1, Ordering::Relaxed);
                DispatchResult::Queued
            }
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped_count.fetch_add(1, Ordering::Relaxed);
                self.counters[worker_id]
                    .dropped
                    .fetch_add(1, Ordering::Relaxed);
                DispatchResult::Dropped
            }
        }
    }

    /// Dispatch a frame, waiting for queue space instead of dropping it.
    ///
    /// Used for offline captures where back-pressure is preferable to loss.
    pub fn dispatch_blocking(&self, frame: Vec<u8>, timestamp: f64) -> DispatchResult {
        let counter = self.next_worker.fetch_add(1, Ordering::Relaxed);
        let worker_id = counter.checked_rem(self.num_workers.get()).unwrap_or(0);
        if self.frame_senders[worker_id].send((frame, timestamp)).is_ok() {
            self.queued_count.fetch_add(1, Ordering::Relaxed);
            DispatchResult::Queued
        } else {
            self.dropped_count.fetch_add(1, Ordering::Relaxed);
            self.counters[worker_id]
                .dropped
                .fetch_add(1, Ordering::Relaxed);
            DispatchResult::Dropped
        }
    }

    /// Get current statistics
    pub fn stats(&self) -> PoolStats {
        let workers = self
            .counters
            .iter()
            .enumerate()
            .map(|(id, c)| WorkerStats {
                id,
                queue_size: self.frame_senders.get(id).map(|s| s.len()).unwrap_or(0),
                dropped: c.dropped.load(Ordering::Relaxed),
                fingerprints: c.fingerprints.load(Ordering::Relaxed),
                rejected: c.rejected.load(Ordering::Relaxed),
            })
            .collect();

        PoolStats {
            total_dispatched: self.queued_count.load(Ordering::Relaxed),
            total_dropped: self.dropped_count.load(Ordering::Relaxed),
            workers,
            decode: DecodeStats::default(),
        }
    }

    /// Close the queues, let workers drain what is already queued, and wait for them.
    pub fn join(mut self) -> PoolStats {
        drop(std::mem::take(&mut self.frame_senders));

        let mut decode = DecodeStats::default();
        for handle in std::mem::take(&mut self.workers) {
            match handle.join() {
                Ok(worker_decode) => decode.merge(&worker_decode),
                Err(_) => debug!("JA3 worker panicked"),
            }
        }
        PoolStats { decode, ..self.stats() }
    }

    fn worker_loop(
        worker_id: usize,
        rx: Receiver<Frame>,
        filter: PortFilter,
        result_sender: mpsc::Sender<FingerprintRecord>,
        counters: Arc<WorkerCounters>,
    ) -> DecodeStats {
        debug!("JA3 worker {} started", worker_id);
        let mut decode = DecodeStats::default();

        for (frame, timestamp) in rx.iter() {
            let outcome = process_frame(&frame, timestamp, &filter);
            decode.record(&outcome);
            counters
                .rejected
                .fetch_add(outcome.dropped.len() as u64, Ordering::Relaxed);
            for record in outcome.records {
                counters.fingerprints.fetch_add(1, Ordering::Relaxed);
                if result_sender.send(record).is_err() {
                    debug!("JA3 worker {} lost its receiver", worker_id);
                    return decode;
                }
            }
        }

        debug!("JA3 worker {} stopped: {}", worker_id, decode);
        decode
    }
}

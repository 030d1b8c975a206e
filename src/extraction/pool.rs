//! Worker pool for the upstream extraction step.
//!
//! Chunks are independent, so extraction fans out over a small bounded pool
//! of threads. The only shared state is the [`ExtractionStore`], which acts
//! as a content-addressed cache: a chunk already present is never handed to
//! the extractor again.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use super::store::{ChunkKey, ExtractionStore};
use crate::error::ExtractionError;

/// Produces a raw extraction record for one text chunk.
pub trait Extractor: Send + Sync {
    /// Extracts names from `chunk`, returning the raw record text.
    fn extract(&self, chunk: &str) -> Result<String, ExtractionError>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Result<String, ExtractionError> + Send + Sync,
{
    fn extract(&self, chunk: &str) -> Result<String, ExtractionError> {
        self(chunk)
    }
}

/// Pool configuration.
#[derive(Debug, Clone)]
pub struct ExtractionPoolConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued chunks.
    pub queue_capacity: usize,
}

impl Default for ExtractionPoolConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            queue_capacity: 256,
        }
    }
}

/// What happened to one chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// A record was already stored; the extractor was not called.
    Cached(ChunkKey),
    /// The extractor ran and its record was stored.
    Extracted(ChunkKey),
    /// The extractor or the store failed; nothing was stored.
    Failed {
        /// Chunk address.
        key: ChunkKey,
        /// Failure description.
        reason: String,
    },
}

/// Totals for one [`ExtractionPool::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Chunks served from the store.
    pub cached: usize,
    /// Chunks newly extracted.
    pub extracted: usize,
    /// Chunks that failed.
    pub failed: Vec<ChunkKey>,
}

impl ExtractionSummary {
    fn record(&mut self, outcome: ChunkOutcome) {
        match outcome {
            ChunkOutcome::Cached(_) => self.cached += 1,
            ChunkOutcome::Extracted(_) => self.extracted += 1,
            ChunkOutcome::Failed { key, .. } => self.failed.push(key),
        }
    }
}

struct Job {
    chunk: String,
    reply: Sender<ChunkOutcome>,
}

fn process(chunk: &str, extractor: &dyn Extractor, store: &dyn ExtractionStore) -> ChunkOutcome {
    let key = ChunkKey::of(chunk);
    match store.contains(chunk) {
        Ok(true) => return ChunkOutcome::Cached(key),
        Ok(false) => {}
        Err(e) => {
            warn!(chunk = %key, error = %e, "extraction store lookup failed");
            return ChunkOutcome::Failed {
                key,
                reason: e.to_string(),
            };
        }
    }

    let record = match extractor.extract(chunk) {
        Ok(record) => record,
        Err(e) => {
            warn!(chunk = %key, error = %e, "extraction failed, chunk left uncached");
            return ChunkOutcome::Failed {
                key,
                reason: e.to_string(),
            };
        }
    };

    match store.put(chunk, record) {
        Ok(()) => {
            debug!(chunk = %key, "chunk extracted");
            ChunkOutcome::Extracted(key)
        }
        Err(e) => {
            warn!(chunk = %key, error = %e, "extraction store write failed");
            ChunkOutcome::Failed {
                key,
                reason: e.to_string(),
            }
        }
    }
}

/// Bounded thread pool that fills an [`ExtractionStore`].
pub struct ExtractionPool {
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl ExtractionPool {
    /// Starts the worker threads.
    ///
    /// # Errors
    /// Returns `Failed` if a worker thread cannot be spawned.
    pub fn start(
        extractor: Arc<dyn Extractor>,
        store: Arc<dyn ExtractionStore>,
        config: &ExtractionPoolConfig,
    ) -> Result<Self, ExtractionError> {
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let extractor = Arc::clone(&extractor);
            let store = Arc::clone(&store);
            let handle = thread::Builder::new()
                .name(format!("namebook-extract-{idx}"))
                .spawn(move || {
                    while let Ok(job) = rx.recv() {
                        let outcome = process(&job.chunk, extractor.as_ref(), store.as_ref());
                        let _ = job.reply.send(outcome);
                    }
                })
                .map_err(|e| ExtractionError::failed(format!("failed to spawn worker: {e}")))?;
            handles.push(handle);
        }

        Ok(Self {
            tx: Some(tx),
            workers: handles,
            queue_capacity,
        })
    }

    /// Queues one chunk without blocking.
    ///
    /// # Errors
    /// Returns `QueueFull` when the queue is at capacity and `Disconnected`
    /// after shutdown.
    pub fn try_submit(&self, chunk: impl Into<String>) -> Result<Receiver<ChunkOutcome>, ExtractionError> {
        let tx = self.tx.as_ref().ok_or(ExtractionError::Disconnected)?;
        let (reply, rx) = bounded(1);
        match tx.try_send(Job {
            chunk: chunk.into(),
            reply,
        }) {
            Ok(()) => Ok(rx),
            Err(TrySendError::Full(_)) => Err(ExtractionError::QueueFull {
                capacity: self.queue_capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(ExtractionError::Disconnected),
        }
    }

    /// Extracts every distinct chunk, blocking until all are done.
    ///
    /// Duplicate chunks are submitted once. Per-chunk failures are reported
    /// in the summary and never abort the batch.
    ///
    /// # Errors
    /// Returns `Disconnected` if the workers are gone.
    pub fn run<I, S>(&self, chunks: I) -> Result<ExtractionSummary, ExtractionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tx = self.tx.as_ref().ok_or(ExtractionError::Disconnected)?;
        let (reply_tx, reply_rx) = unbounded::<ChunkOutcome>();

        let mut seen = HashSet::new();
        let mut submitted = 0usize;
        for chunk in chunks {
            let chunk = chunk.into();
            if !seen.insert(ChunkKey::of(&chunk)) {
                continue;
            }
            tx.send(Job {
                chunk,
                reply: reply_tx.clone(),
            })
            .map_err(|_| ExtractionError::Disconnected)?;
            submitted += 1;
        }
        drop(reply_tx);

        let mut summary = ExtractionSummary::default();
        for _ in 0..submitted {
            let outcome = reply_rx.recv().map_err(|_| ExtractionError::Disconnected)?;
            summary.record(outcome);
        }

        info!(
            submitted,
            cached = summary.cached,
            extracted = summary.extracted,
            failed = summary.failed.len(),
            "extraction batch complete"
        );
        Ok(summary)
    }

    /// Stops accepting work, drains the queue, and joins the workers.
    pub fn shutdown(&mut self) {
        // Closing the channel lets workers drain queued jobs and exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for ExtractionPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

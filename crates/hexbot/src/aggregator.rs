//! Parallel fan-out of large generation requests.
//!
//! This module defines the [`ParallelAggregator`], which splits a request into
//! one chunk per worker (see [`chunk_sizes`]), runs each chunk as an
//! independent blocking task, and merges the results into an
//! [`AggregateResult`].
//!
//! ## Worker lifecycle
//!
//! Every worker:
//!
//! 1. Starts its own [`Deadline`] of `worker_timeout` and builds a private
//!    [`RandSource`] from the aggregator's factory.
//! 2. Runs a [`GenerationPipeline`] inside a panic boundary.
//! 3. Sends exactly one [`Chunk`] (colors so far plus an optional error) to
//!    the shared handoff channel and exits.
//!
//! The aggregator joins every worker before draining the channel, so it is
//! the only writer of the result and never races a producer. A worker that
//! timed out, was cancelled or panicked still contributes what it produced;
//! the result then carries [`PARTIAL_RESULT_WARNING`] exactly once.

use crate::{
    ColorResult, Deadline, Error, GenerationConfig, GenerationPipeline, RandSource,
};
use core::time::Duration;
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Warning attached when at least one worker returned an incomplete chunk.
pub const PARTIAL_RESULT_WARNING: &str =
    "Warning: some colors could not be generated in time; the response may contain fewer colors than requested";

/// The merged outcome of a generation request.
///
/// `colors` carries no ordering guarantee. `warning` is set at most once, no
/// matter how many workers fell short.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AggregateResult {
    pub colors: Vec<ColorResult>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub warning: Option<String>,
}

impl AggregateResult {
    /// Sets the warning unless one is already present.
    pub fn warn(&mut self, message: &str) {
        if self.warning.is_none() {
            self.warning = Some(message.to_string());
        }
    }

    /// Appends a chunk's colors, flagging the result if the chunk is
    /// incomplete.
    pub fn merge(&mut self, chunk: Chunk) {
        if chunk.error.is_some() {
            self.warn(PARTIAL_RESULT_WARNING);
        }
        self.colors.extend(chunk.colors);
    }
}

/// The single message a worker sends back to the aggregator.
#[derive(Debug)]
pub struct Chunk {
    /// Index of the worker that produced this chunk.
    pub worker: usize,
    /// Colors produced before the worker finished or stopped.
    pub colors: Vec<ColorResult>,
    /// Why the chunk is incomplete: timeout, cancellation or a trapped fault.
    pub error: Option<Error>,
}

/// Splits `count` into `num_workers` chunk sizes.
///
/// Every chunk gets `count / num_workers`; the remainder goes to the last
/// chunk, so the sizes always sum to `count`. A pool size of zero is treated
/// as one.
pub fn chunk_sizes(count: usize, num_workers: usize) -> Vec<usize> {
    let num_workers = num_workers.max(1);
    let base = count / num_workers;
    let mut sizes = vec![base; num_workers];
    if let Some(last) = sizes.last_mut() {
        *last += count % num_workers;
    }
    sizes
}

/// Fans a request out across a fixed number of deadline-bound workers.
///
/// Each worker draws randomness from its own source, built by calling the
/// factory with the worker's index. Nothing else is shared between workers.
#[derive(Debug)]
pub struct ParallelAggregator<F> {
    num_workers: usize,
    worker_timeout: Duration,
    make_rng: Arc<F>,
    cancel: CancellationToken,
}

impl<F, R> ParallelAggregator<F>
where
    F: Fn(usize) -> R + Send + Sync + 'static,
    R: RandSource + Send + 'static,
{
    pub fn new(num_workers: usize, worker_timeout: Duration, make_rng: F) -> Self {
        Self {
            num_workers: num_workers.max(1),
            worker_timeout,
            make_rng: Arc::new(make_rng),
            cancel: CancellationToken::new(),
        }
    }

    /// Workers stop at their next item once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub(crate) fn rng_for(&self, worker: usize) -> R {
        (self.make_rng)(worker)
    }

    /// Generates `config.count()` colors across the worker pool.
    ///
    /// Never fails: incomplete chunks degrade the result and set
    /// [`AggregateResult::warning`] instead.
    ///
    /// Must be called from within a Tokio runtime.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(count = config.count(), workers = self.num_workers))
    )]
    pub async fn run(&self, config: &GenerationConfig) -> AggregateResult {
        let sizes = chunk_sizes(config.count(), self.num_workers);
        let config = Arc::new(config.clone());

        // Each worker sends exactly one chunk, so a buffer of one slot per
        // worker means a send never waits.
        let (tx, mut rx) = mpsc::channel::<Chunk>(sizes.len());

        let handles: Vec<_> = sizes
            .into_iter()
            .enumerate()
            .map(|(worker, size)| {
                let tx = tx.clone();
                let config = Arc::clone(&config);
                let make_rng = Arc::clone(&self.make_rng);
                let cancel = self.cancel.clone();
                let timeout = self.worker_timeout;
                tokio::task::spawn_blocking(move || {
                    let chunk = run_worker(worker, size, &config, timeout, cancel, &*make_rng);
                    if tx.blocking_send(chunk).is_err() {
                        #[cfg(feature = "tracing")]
                        tracing::warn!("Worker {worker} could not report its chunk");
                    }
                })
            })
            .collect();
        drop(tx);

        let mut result = AggregateResult::default();
        for (_worker, joined) in futures::future::join_all(handles).await.into_iter().enumerate() {
            if let Err(_e) = joined {
                #[cfg(feature = "tracing")]
                tracing::error!("Worker {_worker} task failed outside its fault boundary: {_e}");
                result.warn(PARTIAL_RESULT_WARNING);
            }
        }

        while let Some(chunk) = rx.recv().await {
            if let Some(_e) = &chunk.error {
                #[cfg(feature = "tracing")]
                tracing::warn!("Worker {} returned a partial chunk: {_e}", chunk.worker);
            }
            result.merge(chunk);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "Aggregated {} of {} colors",
            result.colors.len(),
            config.count()
        );
        result
    }
}

/// Runs one chunk behind a panic boundary and packages whatever it produced.
fn run_worker<F, R>(
    worker: usize,
    size: usize,
    config: &GenerationConfig,
    timeout: Duration,
    cancel: CancellationToken,
    make_rng: &F,
) -> Chunk
where
    F: Fn(usize) -> R,
    R: RandSource,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker} started with {size} colors");

    let deadline = Deadline::after(timeout);
    let mut colors = Vec::with_capacity(size);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        GenerationPipeline::new(size, config, deadline, make_rng(worker))
            .with_cancellation(cancel)
            .fill(&mut colors)
    }));

    let error = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(e),
        Err(payload) => Some(Error::TaskFault {
            worker,
            reason: panic_reason(payload.as_ref()),
        }),
    };

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker} finished with {} colors", colors.len());

    Chunk {
        worker,
        colors,
        error,
    }
}

pub(crate) fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

use crate::{
    AggregateResult, Deadline, GenerationConfig, GenerationPipeline, GeneratorOptions,
    ParallelAggregator, RandSource, Result, ThreadRandom, aggregator::panic_reason,
};
use std::panic::{self, AssertUnwindSafe};
use tokio_util::sync::CancellationToken;

/// Warning attached when a synchronous request missed its deadline.
pub const SYNC_TIMEOUT_WARNING: &str = "Error: the request timed out";

/// Default randomness factory: every worker uses its thread's RNG.
pub type ThreadRandomFactory = fn(usize) -> ThreadRandom;

fn thread_random(_worker: usize) -> ThreadRandom {
    ThreadRandom
}

/// Entry point for generation requests.
///
/// Routes each request by size:
///
/// - `count < sync_threshold`: one [`GenerationPipeline`] on the calling
///   thread under `request_timeout`. All-or-nothing: a timeout discards every
///   color and sets [`SYNC_TIMEOUT_WARNING`].
/// - otherwise: the [`ParallelAggregator`] with one `worker_timeout` per
///   worker. Partial success is success.
///
/// Calling [`ColorService::shutdown`] cancels in-flight pipelines at their
/// next item.
#[derive(Debug)]
pub struct ColorService<F = ThreadRandomFactory> {
    options: GeneratorOptions,
    aggregator: ParallelAggregator<F>,
    shutdown: CancellationToken,
}

impl ColorService {
    /// Creates a service backed by thread-local randomness.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidOptions`] if `options` fail validation.
    pub fn new(options: GeneratorOptions) -> Result<Self> {
        Self::with_rng(options, thread_random as ThreadRandomFactory)
    }
}

impl<F, R> ColorService<F>
where
    F: Fn(usize) -> R + Send + Sync + 'static,
    R: RandSource + Send + 'static,
{
    /// Creates a service whose workers draw from `make_rng(worker_index)`.
    /// The synchronous path uses index 0.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidOptions`] if `options` fail validation.
    pub fn with_rng(options: GeneratorOptions, make_rng: F) -> Result<Self> {
        options.validate()?;
        let shutdown = CancellationToken::new();
        let aggregator = ParallelAggregator::new(options.num_workers, options.worker_timeout, make_rng)
            .with_cancellation(shutdown.clone());
        Ok(Self {
            options,
            aggregator,
            shutdown,
        })
    }

    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generates colors for `config`, choosing the synchronous or parallel
    /// path by count.
    ///
    /// Never fails; the worst outcome is no colors and a warning.
    pub async fn generate(&self, config: &GenerationConfig) -> AggregateResult {
        if config.count() < self.options.sync_threshold {
            self.generate_sync(config)
        } else {
            self.aggregator.run(config).await
        }
    }

    /// Runs `config` on the calling thread under a single request deadline.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(count = config.count()))
    )]
    pub fn generate_sync(&self, config: &GenerationConfig) -> AggregateResult {
        let deadline = Deadline::after(self.options.request_timeout);
        let mut result = AggregateResult::default();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            GenerationPipeline::new(config.count(), config, deadline, self.aggregator.rng_for(0))
                .with_cancellation(self.shutdown.clone())
                .fill(&mut result.colors)
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(_e)) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Discarding partial result: {_e}");
                result.colors.clear();
                result.warn(SYNC_TIMEOUT_WARNING);
            }
            Err(_payload) => {
                #[cfg(feature = "tracing")]
                tracing::error!(
                    "Synchronous generation faulted: {}",
                    panic_reason(_payload.as_ref())
                );
                result.colors.clear();
                result.warn(SYNC_TIMEOUT_WARNING);
            }
        }
        result
    }

    /// Cancels every in-flight and future pipeline of this service.
    pub fn shutdown(&self) {
        #[cfg(feature = "tracing")]
        tracing::info!("Cancelling in-flight generation");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

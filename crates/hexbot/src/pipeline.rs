use crate::{ColorResult, Error, GenerationConfig, RandSource, Result, synthesize};
use core::time::Duration;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// An absolute point in time after which a pipeline must stop producing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    // `None` when the deadline lies beyond what `Instant` can represent.
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now().checked_add(timeout),
        }
    }

    pub const fn at(instant: Instant) -> Self {
        Self { at: Some(instant) }
    }

    /// A deadline that never elapses.
    pub const fn never() -> Self {
        Self { at: None }
    }

    pub fn is_elapsed(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Lazily produces up to `count` colors, one synthesis per step.
///
/// Before every item the pipeline checks its cancellation token and its
/// [`Deadline`]. Once either fires the pipeline stops for good: the iterator
/// returns `None` and [`GenerationPipeline::interruption`] reports why.
/// Synthesis is never interrupted mid-item and nothing is retried.
///
/// # Example
///
/// ```
/// use hexbot::{Deadline, GenerationConfig, GenerationPipeline, ThreadRandom};
///
/// let config = GenerationConfig::builder().count(4).build();
/// let mut pipeline =
///     GenerationPipeline::new(config.count(), &config, Deadline::never(), ThreadRandom);
///
/// let mut colors = Vec::new();
/// pipeline.fill(&mut colors).unwrap();
/// assert_eq!(colors.len(), 4);
/// ```
#[derive(Debug)]
pub struct GenerationPipeline<'a, R> {
    config: &'a GenerationConfig,
    rng: R,
    requested: usize,
    produced: usize,
    deadline: Deadline,
    cancel: CancellationToken,
    interruption: Option<Error>,
}

impl<'a, R: RandSource> GenerationPipeline<'a, R> {
    /// Creates a pipeline producing `count` colors for `config`.
    ///
    /// `count` is passed separately from `config.count()` so that a chunk of
    /// a larger request can reuse the request's config.
    pub fn new(count: usize, config: &'a GenerationConfig, deadline: Deadline, rng: R) -> Self {
        Self {
            config,
            rng,
            requested: count,
            produced: 0,
            deadline,
            cancel: CancellationToken::new(),
            interruption: None,
        }
    }

    /// Stops the pipeline at the next item once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub const fn requested(&self) -> usize {
        self.requested
    }

    pub const fn produced(&self) -> usize {
        self.produced
    }

    /// Why the pipeline stopped early, if it did.
    pub const fn interruption(&self) -> Option<&Error> {
        self.interruption.as_ref()
    }

    /// Drains the pipeline into `out`.
    ///
    /// Colors produced before an interruption stay in `out`; the caller
    /// decides whether a partial sequence is usable.
    ///
    /// # Errors
    ///
    /// - [`Error::Cancelled`] if the cancellation token fired first.
    /// - [`Error::GenerationTimeout`] if the deadline elapsed first.
    pub fn fill(&mut self, out: &mut Vec<ColorResult>) -> Result<()> {
        out.reserve(self.requested - self.produced);
        out.extend(&mut *self);
        match &self.interruption {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn check_interrupted(&mut self) -> bool {
        if self.interruption.is_some() {
            return true;
        }

        let interruption = if self.cancel.is_cancelled() {
            Error::Cancelled {
                produced: self.produced,
                requested: self.requested,
            }
        } else if self.deadline.is_elapsed() {
            Error::GenerationTimeout {
                produced: self.produced,
                requested: self.requested,
            }
        } else {
            return false;
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Pipeline stopped early: {interruption}");
        self.interruption = Some(interruption);
        true
    }
}

impl<R: RandSource> Iterator for GenerationPipeline<'_, R> {
    type Item = ColorResult;

    fn next(&mut self) -> Option<Self::Item> {
        if self.produced >= self.requested || self.check_interrupted() {
            return None;
        }
        self.produced += 1;
        Some(synthesize(self.config, &mut self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.requested - self.produced))
    }
}

use crate::{Error, Result, Rgb};
use core::time::Duration;

/// Default cutoff below which a request runs synchronously.
pub const DEFAULT_SYNC_THRESHOLD: usize = 500;

/// Default deadline for each parallel worker.
pub const DEFAULT_WORKER_TIMEOUT: Duration = Duration::from_secs(4);

/// Default deadline for a whole synchronous request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// The grid that coordinates are drawn from.
///
/// Both sides are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    width: u32,
    height: u32,
}

impl Dimensions {
    /// Builds sanitized dimensions: negative sides are replaced by their
    /// absolute value and zero becomes 1.
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width: sanitize_side(width),
            height: sanitize_side(height),
        }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }
}

fn sanitize_side(value: i64) -> u32 {
    match value.unsigned_abs() {
        0 => 1,
        side => u32::try_from(side).unwrap_or(u32::MAX),
    }
}

/// What to generate: how many colors, whether to attach coordinates, and
/// which seeds to bias toward.
///
/// Immutable once built. Construct with [`GenerationConfig::builder`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    count: usize,
    dimensions: Option<Dimensions>,
    seeds: Vec<Rgb>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            count: 1,
            dimensions: None,
            seeds: Vec::new(),
        }
    }
}

impl GenerationConfig {
    pub fn builder() -> GenerationConfigBuilder {
        GenerationConfigBuilder::default()
    }

    pub const fn count(&self) -> usize {
        self.count
    }

    pub const fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    /// Seed colors in the order they were supplied.
    pub fn seeds(&self) -> &[Rgb] {
        &self.seeds
    }
}

/// Builder for [`GenerationConfig`].
#[derive(Debug, Clone, Default)]
pub struct GenerationConfigBuilder {
    config: GenerationConfig,
}

impl GenerationConfigBuilder {
    pub fn count(mut self, count: usize) -> Self {
        self.config.count = count;
        self
    }

    /// Attaches a sanitized `width × height` grid; see [`Dimensions::new`].
    pub fn dimensions(mut self, width: i64, height: i64) -> Self {
        self.config.dimensions = Some(Dimensions::new(width, height));
        self
    }

    /// Appends seed colors, skipping entries that are not valid hex.
    ///
    /// Seeds are expected to be filtered before they reach this point, so a
    /// skipped entry is only logged.
    pub fn seeds<I, S>(mut self, seeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for seed in seeds {
            match seed.as_ref().parse::<Rgb>() {
                Ok(rgb) => self.config.seeds.push(rgb),
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Skipping seed: {_e}");
                }
            }
        }
        self
    }

    /// Appends seed colors, failing on the first entry that is not valid hex.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSeed`] naming the offending entry.
    pub fn try_seeds<I, S>(mut self, seeds: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for seed in seeds {
            self.config.seeds.push(seed.as_ref().parse()?);
        }
        Ok(self)
    }

    pub fn build(self) -> GenerationConfig {
        self.config
    }
}

/// How requests are executed: the sync/parallel cutoff, pool size and
/// deadlines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Requests with a count strictly below this run on the calling thread.
    pub sync_threshold: usize,
    /// Number of chunks (and worker tasks) a parallel request is split into.
    pub num_workers: usize,
    /// Deadline applied independently to each parallel worker.
    pub worker_timeout: Duration,
    /// Deadline applied to a whole synchronous request.
    pub request_timeout: Duration,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            sync_threshold: DEFAULT_SYNC_THRESHOLD,
            num_workers: num_cpus::get().max(1),
            worker_timeout: DEFAULT_WORKER_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl GeneratorOptions {
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] if the pool is empty or either
    /// deadline is zero.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::InvalidOptions {
                reason: "num_workers must be greater than 0".to_string(),
            });
        }
        if self.worker_timeout.is_zero() {
            return Err(Error::InvalidOptions {
                reason: "worker_timeout must be greater than 0".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(Error::InvalidOptions {
                reason: "request_timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_sanitized() {
        let dims = Dimensions::new(-5, 0);
        assert_eq!(dims.width(), 5);
        assert_eq!(dims.height(), 1);

        let dims = Dimensions::new(1920, 1080);
        assert_eq!((dims.width(), dims.height()), (1920, 1080));

        let dims = Dimensions::new(i64::MIN, i64::MAX);
        assert_eq!((dims.width(), dims.height()), (u32::MAX, u32::MAX));
    }

    #[test]
    fn config_defaults_to_one_plain_color() {
        let config = GenerationConfig::builder().build();
        assert_eq!(config.count(), 1);
        assert_eq!(config.dimensions(), None);
        assert!(config.seeds().is_empty());
        assert_eq!(config, GenerationConfig::default());
    }

    #[test]
    fn seeds_keep_order_and_skip_garbage() {
        let config = GenerationConfig::builder()
            .seeds(["abc123", "zzz", "AABBCC"])
            .build();
        assert_eq!(
            config.seeds(),
            &[Rgb::new(0xab, 0xc1, 0x23), Rgb::new(0xaa, 0xbb, 0xcc)]
        );
    }

    #[test]
    fn try_seeds_reports_the_bad_entry() {
        let err = GenerationConfig::builder()
            .try_seeds(["abc123", "nope"])
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidSeed {
                seed: "nope".to_string()
            }
        );
    }

    #[test]
    fn options_validation() {
        let options = GeneratorOptions::default();
        assert_eq!(options.sync_threshold, 500);
        assert!(options.num_workers >= 1);
        assert!(options.validate().is_ok());

        let no_workers = GeneratorOptions {
            num_workers: 0,
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            no_workers.validate(),
            Err(Error::InvalidOptions { .. })
        ));

        let no_deadline = GeneratorOptions {
            worker_timeout: Duration::ZERO,
            ..GeneratorOptions::default()
        };
        assert!(no_deadline.validate().is_err());
    }
}

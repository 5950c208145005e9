//! # `hexbot`: bounded-time hex color generation
//!
//! `hexbot` produces batches of `#rrggbb` color codes. Colors can be biased
//! toward a set of seed colors (by perturbing the seed's hue in HSL space) and
//! optionally tagged with a random coordinate inside a `width × height` grid.
//!
//! Every request runs under a time budget:
//!
//! - Small requests (below [`GeneratorOptions::sync_threshold`]) run a single
//!   [`GenerationPipeline`] on the calling thread. If the request deadline
//!   elapses, the whole result is discarded and a warning is returned.
//! - Large requests are split into one chunk per worker by the
//!   [`ParallelAggregator`]. Every worker owns its own deadline and randomness
//!   source; a worker that times out or panics contributes whatever it
//!   produced and flags the response with a single warning.
//!
//! The worst outcome of any request is zero colors plus a warning string. No
//! failure inside a worker propagates to the caller.
//!
//! ## Example
//!
//! ```
//! use hexbot::{ColorService, GenerationConfig, GeneratorOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = ColorService::new(GeneratorOptions::default()).unwrap();
//! let config = GenerationConfig::builder()
//!     .count(3)
//!     .dimensions(16, 9)
//!     .seeds(["ff8800"])
//!     .build();
//!
//! let result = service.generate(&config).await;
//! assert_eq!(result.colors.len(), 3);
//! assert!(result.warning.is_none());
//! # }
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit `tracing` events and spans from the pipeline and
//!   aggregator.
//! - `serde`: derive `Serialize` for the result types.

mod aggregator;
mod color;
mod config;
mod error;
mod pipeline;
mod random;
mod service;
mod synth;

pub use crate::aggregator::*;
pub use crate::color::*;
pub use crate::config::*;
pub use crate::error::*;
pub use crate::pipeline::*;
pub use crate::random::*;
pub use crate::service::*;
pub use crate::synth::*;

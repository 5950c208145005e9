use anyhow::bail;
use clap::Parser;
use core::time::Duration;
use hexbot::GeneratorOptions;

/// Runtime configuration for the `hexbot-server` binary.
///
/// These settings control where the service listens, how requests are split
/// between the synchronous and parallel generation paths, and how long each
/// path may run. All values are parsed from CLI arguments or environment
/// variables, with defaults suitable for production.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hexbot-server",
    version,
    about = "An HTTP service returning batches of hex colors"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Number of workers a large request is split across.
    ///
    /// Defaults to the number of logical cores.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = num_cpus::get())]
    pub num_workers: usize,

    /// Requests asking for fewer colors than this run on the request's own
    /// task instead of the worker pool.
    ///
    /// Environment variable: `SYNC_THRESHOLD`
    #[arg(long, env = "SYNC_THRESHOLD", default_value_t = hexbot::DEFAULT_SYNC_THRESHOLD)]
    pub sync_threshold: usize,

    /// Deadline, in milliseconds, for each worker of a parallel request.
    ///
    /// Environment variable: `WORKER_TIMEOUT_MS`
    #[arg(long, env = "WORKER_TIMEOUT_MS", default_value_t = 4_000)]
    pub worker_timeout_ms: u64,

    /// Deadline, in milliseconds, for a whole synchronous request.
    ///
    /// Environment variable: `REQUEST_TIMEOUT_MS`
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 10_000)]
    pub request_timeout_ms: u64,

    /// Maximum number of colors allowed per request.
    ///
    /// Environment variable: `MAX_COUNT`
    #[arg(long, env = "MAX_COUNT", default_value_t = 1_000_000)]
    pub max_count: usize,

    /// Seconds to let in-flight requests drain on shutdown before their
    /// generation is cancelled.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub max_count: usize,
    pub shutdown_timeout: Duration,
    pub generator: GeneratorOptions,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.worker_timeout_ms == 0 || args.request_timeout_ms == 0 {
            bail!("WORKER_TIMEOUT_MS and REQUEST_TIMEOUT_MS must be greater than 0");
        }

        Ok(Self {
            server_addr: args.server_addr,
            max_count: args.max_count,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            generator: GeneratorOptions {
                sync_threshold: args.sync_threshold,
                num_workers: args.num_workers,
                worker_timeout: Duration::from_millis(args.worker_timeout_ms),
                request_timeout: Duration::from_millis(args.request_timeout_ms),
            },
        })
    }
}

use std::time::Duration;

use clap::Parser;

/// Upper bound on the advisory run time, in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_PORT: u16 = 8080;

/// Burn CPU cores and report system-wide CPU usage over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "cpuburn", version, about)]
pub struct Cli {
    /// Number of cores to burn (0 = all)
    #[arg(short = 'n', long = "burn", default_value_t = 0, allow_negative_numbers = true)]
    pub burn: i64,

    /// Seconds between updates (0 = don't update)
    #[arg(short = 'u', long = "update", default_value_t = 10)]
    pub update: u64,

    /// Port the status server listens on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT, value_parser = port_or_default)]
    pub port: u16,

    /// Advisory maximum run time in seconds, capped at 600
    #[arg(
        long,
        env = "CPUBURN_TIMEOUT",
        default_value_t = MAX_TIMEOUT_SECS as i64,
        value_parser = lenient_timeout,
        allow_negative_numbers = true
    )]
    pub timeout: i64,
}

/// An empty `PORT` means the default port.
fn port_or_default(raw: &str) -> Result<u16, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_PORT);
    }
    raw.parse().map_err(|err| format!("invalid port {raw:?}: {err}"))
}

/// Unparsable timeouts fall back to the default instead of failing startup.
fn lenient_timeout(raw: &str) -> Result<i64, String> {
    Ok(raw.trim().parse().unwrap_or(MAX_TIMEOUT_SECS as i64))
}

/// Configuration resolved once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnConfig {
    /// Number of burn workers, also the size of the runtime's thread pool.
    pub burn_count: usize,
    /// Ticker cadence; `None` parks the main path forever.
    pub update_interval: Option<Duration>,
    pub port: u16,
    /// Advisory only: recorded and logged, never enforced.
    pub timeout: Duration,
}

impl BurnConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self::resolve(cli, num_cpus::get())
    }

    /// Resolve against an explicit logical core count.
    pub fn resolve(cli: &Cli, logical_cores: usize) -> Self {
        Self {
            burn_count: resolve_burn_count(cli.burn, logical_cores),
            update_interval: (cli.update > 0).then(|| Duration::from_secs(cli.update)),
            port: cli.port,
            timeout: cap_timeout(cli.timeout),
        }
    }
}

/// Zero or negative requests burn every logical core.
pub fn resolve_burn_count(requested: i64, logical_cores: usize) -> usize {
    match usize::try_from(requested) {
        Ok(count) if count > 0 => count,
        _ => logical_cores.max(1),
    }
}

pub fn cap_timeout(secs: i64) -> Duration {
    Duration::from_secs(secs.clamp(0, MAX_TIMEOUT_SECS as i64) as u64)
}

//! Point-in-time reads of the kernel's aggregate CPU tick counters.
//!
//! On Linux the source is `/proc/stat`, whose first line looks like
//! `cpu  user nice system idle iowait irq softirq steal guest guest_nice`.
//! The number of trailing categories varies between kernel versions, so every
//! numeric field on the line is summed into `total` and only the fourth one is
//! singled out as `idle`.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::SampleError;

/// Default location of the accounting source.
pub const PROC_STAT: &str = "/proc/stat";

/// Label of the all-cores-combined line (per-core lines are `cpu0`, `cpu1`, ...).
const AGGREGATE_LABEL: &str = "cpu";

/// Position of the idle counter among the numeric fields.
const IDLE_FIELD: usize = 3;

/// Idle and total tick counters read at one instant.
///
/// Only the difference between two snapshots means anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSnapshot {
    pub idle: u64,
    pub total: u64,
}

/// A parsed accounting source plus the fields that had to be skipped.
#[derive(Debug, Default)]
pub struct ParsedStat {
    pub snapshot: TickSnapshot,
    pub malformed: Vec<SampleError>,
}

/// Anything that can produce a [`TickSnapshot`] on demand.
pub trait TickSource: Send + Sync {
    fn sample(&self) -> Result<TickSnapshot, SampleError>;
}

/// Reads snapshots from a `/proc/stat`-formatted file.
#[derive(Debug, Clone)]
pub struct ProcStat {
    path: PathBuf,
}

impl ProcStat {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for ProcStat {
    fn default() -> Self {
        Self::new(PROC_STAT)
    }
}

impl TickSource for ProcStat {
    fn sample(&self) -> Result<TickSnapshot, SampleError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| SampleError::Unreadable {
            path: self.path.clone(),
            source,
        })?;

        let parsed = parse_stat(&contents);
        for err in &parsed.malformed {
            warn!(path = %self.path.display(), "skipping tick field: {err}");
        }
        Ok(parsed.snapshot)
    }
}

/// Parse the aggregate cpu line out of `/proc/stat` contents.
///
/// A missing aggregate line yields a zero snapshot. Fields that fail to parse
/// are left out of the total (and leave `idle` at zero if it is the idle
/// field) and reported in [`ParsedStat::malformed`].
pub fn parse_stat(contents: &str) -> ParsedStat {
    let Some(fields) = contents
        .lines()
        .map(|line| line.split_whitespace())
        .find_map(|mut fields| (fields.next() == Some(AGGREGATE_LABEL)).then_some(fields))
    else {
        return ParsedStat::default();
    };

    let mut parsed = ParsedStat::default();
    for (index, token) in fields.enumerate() {
        match token.parse::<u64>() {
            Ok(ticks) => {
                parsed.snapshot.total = parsed.snapshot.total.wrapping_add(ticks);
                if index == IDLE_FIELD {
                    parsed.snapshot.idle = ticks;
                }
            }
            Err(source) => parsed.malformed.push(SampleError::MalformedField {
                index,
                token: token.to_string(),
                source,
            }),
        }
    }
    parsed
}

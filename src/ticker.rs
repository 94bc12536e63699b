use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::info;

/// Log an elapsed-seconds marker every `every`. With no interval the task
/// parks forever. Never returns either way.
pub async fn run_ticker(every: Option<Duration>) {
    let Some(every) = every else {
        std::future::pending::<()>().await;
        return;
    };

    let started = Instant::now();
    let mut ticks = interval_at(started + every, every);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;
        info!("{} seconds", elapsed_label(started.elapsed(), every));
    }
}

/// Seconds of the last whole interval reached, measured from the start
/// rather than summed per tick so late ticks don't accumulate.
fn elapsed_label(elapsed: Duration, every: Duration) -> u64 {
    let whole = elapsed.as_nanos() / every.as_nanos().max(1);
    (whole * every.as_nanos() / 1_000_000_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_follows_wall_clock() {
        let every = Duration::from_secs(10);
        assert_eq!(elapsed_label(Duration::from_secs(10), every), 10);
        assert_eq!(elapsed_label(Duration::from_millis(10_900), every), 10);
        // a tick that fired a full interval late reports the real time
        assert_eq!(elapsed_label(Duration::from_millis(21_400), every), 20);
        assert_eq!(elapsed_label(Duration::from_secs(80), Duration::from_secs(1)), 80);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_keeps_running() {
        let result = tokio::time::timeout(
            Duration::from_secs(35),
            run_ticker(Some(Duration::from_secs(10))),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_parks_forever() {
        let result = tokio::time::timeout(Duration::from_secs(3600), run_ticker(None)).await;
        assert!(result.is_err());
    }
}

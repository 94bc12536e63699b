use std::hint::black_box;
use std::io;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, info};

/// No-op iterations between scheduler yields (2^31 - 1).
pub const BURN_ITERATIONS: u64 = i32::MAX as u64;

/// Build the runtime the burn workers share, one OS thread per burned core.
pub fn build_runtime(burn_count: usize) -> io::Result<Runtime> {
    Builder::new_multi_thread()
        .worker_threads(burn_count.max(1))
        .thread_name("cpuburn-worker")
        .enable_all()
        .build()
}

/// Spin through `iterations` no-ops without letting the optimizer drop them.
pub fn burn_cycle(iterations: u64) {
    for i in 0..iterations {
        black_box(i);
    }
}

/// Keep one core busy forever, yielding once per cycle so other tasks on the
/// same pool still get scheduled.
pub async fn burn_loop(iterations: u64) {
    loop {
        burn_cycle(iterations);
        tokio::task::yield_now().await;
    }
}

/// Start `count` detached burn workers on `handle`. They run until the
/// process exits.
pub fn launch_burners(handle: &Handle, count: usize, iterations: u64) {
    info!("Burning {} CPUs/cores", count);
    for worker in 0..count {
        drop(handle.spawn(burn_loop(iterations)));
        debug!(worker, "burn worker started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn iteration_count_is_i32_max() {
        assert_eq!(BURN_ITERATIONS, 2_147_483_647);
    }

    #[test]
    fn runtime_has_at_least_one_worker() {
        let runtime = build_runtime(0).unwrap();
        assert_eq!(runtime.block_on(async { 7 }), 7);
    }

    #[test]
    fn burn_cycle_finishes() {
        burn_cycle(0);
        burn_cycle(10_000);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn yield_lets_other_tasks_run_on_one_thread() {
        // A single-threaded scheduler only makes progress elsewhere if the
        // burner yields.
        let burner = tokio::spawn(burn_loop(1_000));
        let other = tokio::spawn(async { 42 });

        let value = tokio::time::timeout(Duration::from_secs(5), other)
            .await
            .expect("burner starved the scheduler")
            .unwrap();
        assert_eq!(value, 42);
        burner.abort();
    }

    #[test]
    fn burners_never_finish() {
        let runtime = build_runtime(2).unwrap();
        let probe = runtime.spawn(burn_loop(1_000));
        launch_burners(runtime.handle(), 2, 1_000);

        runtime.block_on(async {
            tokio::time::sleep(Duration::from_millis(200)).await;
        });
        assert!(!probe.is_finished());
        probe.abort();
        runtime.shutdown_background();
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cpuburn::config::{BurnConfig, Cli};
use cpuburn::cpu_stress::{self, BURN_ITERATIONS};
use cpuburn::server::{self, Reporter};
use cpuburn::ticker;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cpuburn=info,actix_server=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = BurnConfig::from_cli(&cli);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        burn_count = config.burn_count,
        logical_cores = num_cpus::get(),
        physical_cores = num_cpus::get_physical(),
        update_interval = ?config.update_interval,
        port = config.port,
        timeout_secs = config.timeout.as_secs(),
        "Starting cpuburn"
    );

    // One runtime thread per burned core, like sizing the scheduler to the burn count.
    let burn_pool = cpu_stress::build_runtime(config.burn_count)
        .context("failed to build the burn runtime")?;
    cpu_stress::launch_burners(burn_pool.handle(), config.burn_count, BURN_ITERATIONS);

    // Server, ticker and signal handling run on the main thread, away from the burners.
    let status = server::build_status_runtime().context("failed to build the status runtime")?;
    let served = status.block_on(async {
        tokio::select! {
            served = server::serve(config.port, Reporter::default()) => served,
            () = ticker::run_ticker(config.update_interval) => Ok(()),
        }
    });

    // Burners only yield between cycles, don't wait for them.
    burn_pool.shutdown_background();

    if let Err(err) = served {
        error!("{err}");
        std::process::exit(1);
    }
    info!("Status server stopped, exiting");
    Ok(())
}

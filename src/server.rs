//! Status HTTP server: a utilization report endpoint and a liveness probe.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tokio::runtime::{Builder, Runtime};
use tracing::{info, warn};

use crate::error::ServeError;
use crate::report::UtilizationReport;
use crate::sampler::{ProcStat, TickSnapshot, TickSource};

/// Time between the two samples of a report.
pub const SAMPLE_WINDOW: Duration = Duration::from_secs(3);

pub const HEALTH_HEADER: &str = "cpuburn";
pub const HEALTH_VALUE: &str = "cpuburn health check";

/// Handlers only wait on timers, so one worker serves any number of
/// in-flight reports.
const HTTP_WORKERS: usize = 1;

/// Takes two snapshots `window` apart and reports the busy share between them.
#[derive(Clone)]
pub struct Reporter {
    source: Arc<dyn TickSource>,
    window: Duration,
}

impl Reporter {
    pub fn new(source: Arc<dyn TickSource>, window: Duration) -> Self {
        Self { source, window }
    }

    pub async fn measure(&self) -> UtilizationReport {
        let before = self.snapshot();
        tokio::time::sleep(self.window).await;
        let after = self.snapshot();

        if after.total < before.total || after.idle < before.idle {
            warn!(?before, ?after, "tick counters went backwards between samples");
        }
        UtilizationReport::between(before, after)
    }

    /// Unreadable sources count as a zero snapshot.
    fn snapshot(&self) -> TickSnapshot {
        self.source.sample().unwrap_or_else(|err| {
            warn!("{err}; using zero snapshot");
            TickSnapshot::default()
        })
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(Arc::new(ProcStat::default()), SAMPLE_WINDOW)
    }
}

fn log_report(report: &UtilizationReport) {
    if report.is_measurable() {
        info!(
            busy_percent = report.busy_percent,
            busy_ticks = report.busy_ticks,
            total_ticks = report.total_ticks,
            "{report}"
        );
    } else {
        warn!(
            busy_percent = report.busy_percent,
            total_ticks = report.total_ticks,
            "CPU usage unmeasurable, no ticks elapsed: {report}"
        );
    }
}

async fn report_usage(reporter: web::Data<Reporter>) -> impl Responder {
    let report = reporter.measure().await;
    log_report(&report);
    HttpResponse::Ok().finish()
}

async fn health_check() -> impl Responder {
    info!("Something hit the health check endpoint");
    HttpResponse::Ok()
        .insert_header((HEALTH_HEADER, HEALTH_VALUE))
        .finish()
}

/// Register the status routes. The caller supplies `web::Data<Reporter>`.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::to(report_usage))
        .route("/health", web::to(health_check));
}

/// A status server whose listener is already bound.
pub struct BoundServer {
    pub server: Server,
    pub local_addr: SocketAddr,
}

/// Bind the status listener on `addr` without starting to serve.
pub fn bind(addr: &str, reporter: Reporter) -> Result<BoundServer, ServeError> {
    let reporter = web::Data::new(reporter);
    let bind_err = |source: io::Error| ServeError::Bind {
        addr: addr.to_string(),
        source,
    };

    let http = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(reporter.clone())
            .configure(routes)
    })
    .workers(HTTP_WORKERS)
    .bind(addr)
    .map_err(bind_err)?;

    let local_addr = http.addrs().into_iter().next().ok_or_else(|| {
        bind_err(io::Error::new(io::ErrorKind::AddrNotAvailable, "no address bound"))
    })?;

    Ok(BoundServer {
        server: http.run(),
        local_addr,
    })
}

/// Bind `0.0.0.0:port` and serve until the listener fails or the process
/// receives SIGINT/SIGTERM.
pub async fn serve(port: u16, reporter: Reporter) -> Result<(), ServeError> {
    let bound = bind(&format!("0.0.0.0:{port}"), reporter)?;
    info!("Listening on port {}", bound.local_addr.port());
    bound.server.await?;
    Ok(())
}

/// Runtime for the status server and ticker. It must never host burn
/// workers, or its timers only fire when a burner yields.
pub fn build_status_runtime() -> io::Result<Runtime> {
    Builder::new_current_thread().enable_all().build()
}

pub mod builders;
pub mod fake_procs;
pub mod runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// How long a single async test step may take before it counts as hung.
pub const STEP_TIMEOUT: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Initialise tracing for tests, captured per test by the harness.
///
/// Reads the same `HOLDON_LOG` variable as the binary, e.g.
/// `HOLDON_LOG=holdon=debug cargo test`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(holdon::logging::LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("holdon=info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run one async step, failing the test if it exceeds [`STEP_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(STEP_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test step hung for more than {STEP_TIMEOUT:?}"))
}

//! Test utilities for artdeps
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration suite:
//! - [`init_test_logging`] for tracing output in tests
//! - descriptor and snapshot fixtures
//! - [`TestEnvironment`], a temporary project directory wired to a snapshot server
//!
//! # Example
//!
//! ```rust,no_run
//! use artdeps::test_utils::TestEnvironment;
//!
//! let env = TestEnvironment::with_basic_descriptor().unwrap();
//! assert!(env.descriptor_path().exists());
//! ```

pub mod environment;
pub mod fixtures;

pub use environment::TestEnvironment;
pub use fixtures::{DescriptorFixture, SnapshotFixture, memory_server};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. `level` wins over `RUST_LOG`; with
/// neither, nothing is logged.
///
/// ```bash
/// RUST_LOG=artdeps=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

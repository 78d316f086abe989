//! Suite lifecycle, failure signalling and the suite registry/runner.
//!
//! A suite registers itself once, during startup, and is later driven through
//! `before_all`, `run` (which wraps each test in `before`/`after`) and
//! `after_all` by the [`Runner`]. Assertions never unwind: a failed check is
//! logged and recorded on the active [`FailureSignal`] and the suite keeps
//! going, so one pass can report every failure.

pub mod builder;
pub mod error;
pub mod failure;
pub mod host;
pub mod lifecycle;
pub mod registry;
pub mod runner;
pub mod suite;

pub use builder::{DeclaredSuite, SuiteBuilder};
pub use error::HarnessError;
pub use failure::{ActiveRun, FailureRecord, FailureSignal, fail, fail_with};
pub use host::{HostAdapter, HostHooks};
pub use lifecycle::{Phase, SuiteState};
pub use registry::{RegisteredSuite, SuiteRegistry};
pub use runner::{RunReport, Runner, SuiteOutcome, SuiteStatus};
pub use suite::{Suite, SuiteInfo};
pub use suitekit_config::RunMode;

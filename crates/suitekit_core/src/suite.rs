use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::lifecycle::{Phase, guarded};

/// Identity of a suite, fixed when the suite is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SuiteInfo {
    name: String,
    automatic: bool,
}

impl SuiteInfo {
    pub fn new(automatic: bool, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            automatic,
        }
    }

    /// Suite that runs as part of an unattended run
    pub fn automatic(name: impl Into<String>) -> Self {
        Self::new(true, name)
    }

    /// Suite that only runs when selected by name
    pub fn manual(name: impl Into<String>) -> Self {
        Self::new(false, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_automatic(&self) -> bool {
        self.automatic
    }

    pub fn kind(&self) -> &'static str {
        if self.automatic { "automatic" } else { "manual" }
    }
}

impl fmt::Display for SuiteInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind())
    }
}

/// A test suite.
///
/// Only [`Suite::info`] and [`Suite::run`] are required. The hook order for a
/// suite is `before_all`, then `run`, then `after_all`; inside `run`, each
/// logical test goes through [`Suite::test`], which wraps it in `before` and
/// `after`.
pub trait Suite: Send {
    fn info(&self) -> &SuiteInfo;

    /// Suite-level setup. An error, a panic, or a failed check here skips the
    /// rest of the suite.
    fn before_all(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn before(&mut self) {}

    /// Test bodies for this suite
    fn run(&mut self);

    /// Runs after every test body, including ones that failed or panicked.
    fn after(&mut self) {}

    fn after_all(&mut self) {}

    /// Run one logical test: `before`, the body, then `after`.
    fn test<F>(&mut self, name: &str, body: F)
    where
        Self: Sized,
        F: FnOnce(&mut Self),
    {
        info!("Running test {name}");
        debug!("Starting {} {name}", Phase::Before);
        guarded(Phase::Before, || self.before());
        debug!("{} {name} complete", Phase::Before.title());
        guarded(Phase::Test, || body(self));
        debug!("Starting {} {name}", Phase::After);
        guarded(Phase::After, || self.after());
        debug!("{} {name} complete", Phase::After.title());
        info!("Test {name} complete");
    }
}

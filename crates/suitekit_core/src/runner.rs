//! Runner: select suites from a registry and drive each one in order.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use suitekit_config::RunMode;
use tracing::{debug, error, info};

use crate::error::HarnessError;
use crate::failure::{FailureRecord, FailureSignal};
use crate::lifecycle;
use crate::registry::{RegisteredSuite, SuiteRegistry};
use crate::suite::SuiteInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteStatus {
    Passed,
    Failed,
    /// `before_all` failed, so no test body ran
    SetupFailed,
}

impl SuiteStatus {
    pub fn label(self) -> &'static str {
        match self {
            SuiteStatus::Passed => "ok",
            SuiteStatus::Failed => "FAILED",
            SuiteStatus::SetupFailed => "SETUP FAILED",
        }
    }
}

/// Result of running a single suite
#[derive(Debug, Clone, Serialize)]
pub struct SuiteOutcome {
    pub info: SuiteInfo,
    pub status: SuiteStatus,
    pub failures: Vec<FailureRecord>,
    pub duration: Duration,
}

impl SuiteOutcome {
    pub fn is_pass(&self) -> bool {
        self.status == SuiteStatus::Passed
    }
}

/// A completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: RunMode,
    pub suites: Vec<SuiteOutcome>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.suites.iter().filter(|outcome| outcome.is_pass()).count()
    }

    pub fn failed(&self) -> usize {
        self.suites.len() - self.passed()
    }

    pub fn failure_count(&self) -> usize {
        self.suites.iter().map(|outcome| outcome.failures.len()).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failure_count() == 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Suite names in the order they were started
    pub fn begin_order(&self) -> Vec<&str> {
        self.suites
            .iter()
            .map(|outcome| outcome.info.name())
            .collect()
    }

    pub fn outcome(&self, name: &str) -> Option<&SuiteOutcome> {
        self.suites.iter().find(|outcome| outcome.info.name() == name)
    }

    pub fn total_duration(&self) -> Duration {
        self.suites.iter().map(|outcome| outcome.duration).sum()
    }
}

/// Drives suites from a registry, one at a time, on the calling thread.
pub struct Runner<'r> {
    registry: &'r SuiteRegistry,
}

impl Runner<'static> {
    pub fn global() -> Self {
        Self::new(SuiteRegistry::global())
    }
}

impl<'r> Runner<'r> {
    pub fn new(registry: &'r SuiteRegistry) -> Self {
        Self { registry }
    }

    /// Suites `mode` would execute, in registry order
    pub fn select(&self, mode: &RunMode) -> Result<Vec<Arc<RegisteredSuite>>, HarnessError> {
        let selected: Vec<_> = self
            .registry
            .snapshot()
            .into_iter()
            .filter(|entry| match mode {
                RunMode::Automatic => {
                    if !entry.info().is_automatic() {
                        debug!("Skipping manual suite {}", entry.info().name());
                    }
                    entry.info().is_automatic()
                }
                RunMode::Named(name) => entry.info().name() == name,
            })
            .collect();

        if let RunMode::Named(name) = mode {
            if selected.is_empty() {
                error!("No registered suite named {name}");
                return Err(HarnessError::UnknownSuite(name.clone()));
            }
        }

        Ok(selected)
    }

    pub fn run(&self, mode: &RunMode) -> Result<RunReport, HarnessError> {
        let selected = self.select(mode)?;
        let signal = Arc::new(FailureSignal::new());
        let _active = signal.activate()?;

        info!("Running {} ({} suites)", mode.describe(), selected.len());

        let mut suites = Vec::with_capacity(selected.len());
        for entry in selected {
            let name = entry.info().name();
            info!("Running suite {name}");
            let outcome = {
                let mut suite = entry.lock();
                lifecycle::execute(suite.as_mut(), &signal)
            };

            let status = if outcome.setup_failed {
                SuiteStatus::SetupFailed
            } else if outcome.failures.is_empty() {
                SuiteStatus::Passed
            } else {
                SuiteStatus::Failed
            };

            if status == SuiteStatus::Passed {
                info!("Suite {name} complete");
            } else {
                error!(
                    "Suite {name} complete with {} failure(s)",
                    outcome.failures.len()
                );
            }

            suites.push(SuiteOutcome {
                info: entry.info().clone(),
                status,
                failures: outcome.failures,
                duration: outcome.duration,
            });
        }

        let report = RunReport {
            mode: mode.clone(),
            suites,
        };
        info!(
            "Run finished: {} passed, {} failed, {} failure(s)",
            report.passed(),
            report.failed(),
            report.failure_count()
        );
        Ok(report)
    }
}

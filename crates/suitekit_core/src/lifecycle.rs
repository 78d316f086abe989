//! Standalone lifecycle driver.
//!
//! Per suite: `Idle -> BeforeAll -> Running -> AfterAll -> Done`, where
//! `Running` covers `run` and the `before`/test/`after` triples inside it.
//! Failures never truncate the chain except in `BeforeAll`, which jumps
//! straight to `Done`.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use suitekit_utils::Stopwatch;
use tracing::{debug, error, info, warn};

use crate::failure::{FailureRecord, FailureSignal, fail_at};
use crate::suite::Suite;

/// Hook being executed, used in log lines and failure sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BeforeAll,
    Before,
    Run,
    Test,
    After,
    AfterAll,
}

impl Phase {
    pub fn name(self) -> &'static str {
        match self {
            Phase::BeforeAll => "before-all",
            Phase::Before => "pre-test",
            Phase::Run => "run",
            Phase::Test => "test",
            Phase::After => "post-test",
            Phase::AfterAll => "after-all",
        }
    }

    /// Capitalised name for the start of a log line
    pub fn title(self) -> &'static str {
        match self {
            Phase::BeforeAll => "Before-all",
            Phase::Before => "Pre-test",
            Phase::Run => "Run",
            Phase::Test => "Test",
            Phase::After => "Post-test",
            Phase::AfterAll => "After-all",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteState {
    Idle,
    BeforeAll,
    Running,
    AfterAll,
    Done,
}

/// What happened while driving one suite
#[derive(Debug, Clone)]
pub struct LifecycleOutcome {
    pub final_state: SuiteState,
    pub setup_failed: bool,
    pub failures: Vec<FailureRecord>,
    pub duration: Duration,
}

/// Run `f`, turning a panic into a recorded failure for `phase`.
pub fn guarded<R>(phase: Phase, f: impl FnOnce() -> R) -> Option<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("Panic during {phase}: {message}");
            fail_at(phase.name(), format!("panicked during {phase}: {message}"));
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn transition(name: &str, state: &mut SuiteState, next: SuiteState) {
    debug!("{name}: {state:?} -> {next:?}");
    *state = next;
}

/// Suite-level hook bracketed by info-level start and completion lines
fn suite_hook<R>(phase: Phase, name: &str, f: impl FnOnce() -> R) -> Option<R> {
    info!("Starting {phase} {name}");
    let result = guarded(phase, f);
    info!("{} {name} complete", phase.title());
    result
}

/// Drive `suite` through its full lifecycle, recording failures on `signal`.
pub fn execute(suite: &mut dyn Suite, signal: &FailureSignal) -> LifecycleOutcome {
    let name = suite.info().name().to_string();
    let watch = Stopwatch::start_new();
    let mark = signal.count();
    let mut state = SuiteState::Idle;
    signal.enter_suite(&name);

    transition(&name, &mut state, SuiteState::BeforeAll);
    let setup_ok = match suite_hook(Phase::BeforeAll, &name, || suite.before_all()) {
        Some(Ok(())) => signal.count() == mark,
        Some(Err(err)) => {
            error!("Before-all for {name} failed: {err:#}");
            signal.record(Phase::BeforeAll.name(), format!("before-all failed: {err:#}"));
            false
        }
        None => false,
    };

    if setup_ok {
        transition(&name, &mut state, SuiteState::Running);
        info!("Beginning {name}");
        guarded(Phase::Run, || suite.run());

        transition(&name, &mut state, SuiteState::AfterAll);
        suite_hook(Phase::AfterAll, &name, || suite.after_all());
    } else {
        warn!("Suite {name} setup failed; skipping its tests");
    }

    transition(&name, &mut state, SuiteState::Done);
    signal.leave_suite();

    LifecycleOutcome {
        final_state: state,
        setup_failed: !setup_ok,
        failures: signal.records_since(mark),
        duration: watch.elapsed(),
    }
}

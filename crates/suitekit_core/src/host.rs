//! Adapter for host test runners that discover and drive suites themselves.
//!
//! The host owns the schedule and calls suite-setup, per-test setup, the test,
//! per-test teardown and suite-teardown as separate entry points. Each entry
//! point initialises logging first, since the host may call it from a fresh
//! context, and brackets the hook with info-level log lines.
//!
//! Once suite setup fails, the remaining entry points skip their hooks, so a
//! host sees the same `BeforeAll`-only sequence as the standalone runner.

use std::sync::Arc;

use suitekit_config::DEFAULT_LOG_FILTER;
use suitekit_utils::init_logging;
use tracing::{debug, error, info, warn};

use crate::error::HarnessError;
use crate::failure::{FailureRecord, FailureSignal};
use crate::lifecycle::{Phase, guarded};
use crate::suite::Suite;

/// Entry points a host runner calls, one per lifecycle hook.
///
/// `suite_setup` and `test` return [`HarnessError::SetupFailed`] when the
/// suite's setup failed; the other entry points quietly skip their hook.
pub trait HostHooks {
    fn suite_setup(&mut self) -> Result<(), HarnessError>;
    fn test_setup(&mut self) -> Result<(), HarnessError>;
    fn test(&mut self) -> Result<(), HarnessError>;
    fn test_teardown(&mut self) -> Result<(), HarnessError>;
    fn suite_teardown(&mut self) -> Result<(), HarnessError>;
}

/// Exposes a [`Suite`] through [`HostHooks`]: `suite_setup` is `before_all`,
/// `test_setup` is `before`, `test` is `run`, `test_teardown` is `after`,
/// and `suite_teardown` is `after_all`.
pub struct HostAdapter<S> {
    suite: S,
    signal: Arc<FailureSignal>,
    log_filter: String,
    setup_failed: bool,
}

impl<S: Suite> HostAdapter<S> {
    pub fn new(suite: S) -> Self {
        Self {
            suite,
            signal: Arc::new(FailureSignal::new()),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            setup_failed: false,
        }
    }

    /// Filter handed to the log subscriber. Logging is installed once per
    /// process, so this only takes effect if no subscriber exists yet when
    /// the first hook runs; a host's own subscriber always wins.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn suite(&self) -> &S {
        &self.suite
    }

    pub fn into_inner(self) -> S {
        self.suite
    }

    pub fn has_failed(&self) -> bool {
        self.signal.has_failed()
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        self.signal.records()
    }

    /// True once `suite_setup` failed; cleared by the next `suite_setup`.
    pub fn setup_failed(&self) -> bool {
        self.setup_failed
    }

    fn name(&self) -> String {
        self.suite.info().name().to_string()
    }

    fn skipped(&self, phase: Phase) -> bool {
        if self.setup_failed {
            debug!("Skipping {phase} {}: setup failed", self.name());
        }
        self.setup_failed
    }

    fn invoke<R>(
        &mut self,
        phase: Phase,
        hook: impl FnOnce(&mut S) -> R,
    ) -> Result<Option<R>, HarnessError> {
        init_logging(&self.log_filter);
        let _active = self.signal.activate()?;
        let name = self.name();

        info!("Starting {phase} {name}");
        self.signal.enter_suite(&name);
        let suite = &mut self.suite;
        let result = guarded(phase, || hook(suite));
        self.signal.leave_suite();
        info!("{} {name} complete", phase.title());

        Ok(result)
    }
}

impl<S: Suite> HostHooks for HostAdapter<S> {
    fn suite_setup(&mut self) -> Result<(), HarnessError> {
        self.setup_failed = false;
        let mark = self.signal.count();
        let name = self.name();

        if let Some(Err(err)) = self.invoke(Phase::BeforeAll, |suite| suite.before_all())? {
            error!("Before-all for {name} failed: {err:#}");
            self.signal.enter_suite(&name);
            self.signal
                .record(Phase::BeforeAll.name(), format!("before-all failed: {err:#}"));
            self.signal.leave_suite();
        }

        // Err, panic and failed checks all leave a record behind
        if self.signal.count() != mark {
            warn!("Suite {name} setup failed; skipping its tests");
            self.setup_failed = true;
            return Err(HarnessError::SetupFailed(name));
        }
        Ok(())
    }

    fn test_setup(&mut self) -> Result<(), HarnessError> {
        if !self.skipped(Phase::Before) {
            self.invoke(Phase::Before, |suite| suite.before())?;
        }
        Ok(())
    }

    fn test(&mut self) -> Result<(), HarnessError> {
        if self.skipped(Phase::Test) {
            return Err(HarnessError::SetupFailed(self.name()));
        }
        self.invoke(Phase::Test, |suite| suite.run())?;
        Ok(())
    }

    fn test_teardown(&mut self) -> Result<(), HarnessError> {
        if !self.skipped(Phase::After) {
            self.invoke(Phase::After, |suite| suite.after())?;
        }
        Ok(())
    }

    fn suite_teardown(&mut self) -> Result<(), HarnessError> {
        if !self.skipped(Phase::AfterAll) {
            self.invoke(Phase::AfterAll, |suite| suite.after_all())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check;
    use crate::lifecycle::execute;
    use crate::suite::SuiteInfo;

    #[derive(Clone, Copy)]
    enum Setup {
        Succeeds,
        Errors,
        FailsCheck,
        Panics,
    }

    struct Tagged {
        info: SuiteInfo,
        tags: Vec<&'static str>,
        setup: Setup,
        fail_body: bool,
    }

    impl Tagged {
        fn new(fail_body: bool) -> Self {
            Self {
                info: SuiteInfo::manual("Hosted"),
                tags: Vec::new(),
                setup: Setup::Succeeds,
                fail_body,
            }
        }

        fn with_setup(setup: Setup) -> Self {
            Self {
                setup,
                ..Self::new(false)
            }
        }
    }

    impl Suite for Tagged {
        fn info(&self) -> &SuiteInfo {
            &self.info
        }

        fn before_all(&mut self) -> anyhow::Result<()> {
            self.tags.push("BeforeAll");
            match self.setup {
                Setup::Succeeds => Ok(()),
                Setup::Errors => anyhow::bail!("no fixture"),
                Setup::FailsCheck => {
                    check!(self.tags.is_empty());
                    Ok(())
                }
                Setup::Panics => panic!("fixture exploded"),
            }
        }

        fn before(&mut self) {
            self.tags.push("Before");
        }

        fn run(&mut self) {
            self.tags.push("Test");
            check!(!self.fail_body);
        }

        fn after(&mut self) {
            self.tags.push("After");
        }

        fn after_all(&mut self) {
            self.tags.push("AfterAll");
        }
    }

    // Standalone shape of a hosted suite: run() is the single test body.
    struct Standalone(Tagged);

    impl Suite for Standalone {
        fn info(&self) -> &SuiteInfo {
            self.0.info()
        }

        fn before_all(&mut self) -> anyhow::Result<()> {
            self.0.before_all()
        }

        fn run(&mut self) {
            self.test("body", |suite| {
                suite.0.before();
                suite.0.run();
                suite.0.after();
            });
        }

        fn after_all(&mut self) {
            self.0.after_all();
        }
    }

    fn run_standalone(suite: Tagged) -> Vec<&'static str> {
        let signal = Arc::new(FailureSignal::new());
        let mut standalone = Standalone(suite);
        {
            let _active = signal.activate().unwrap();
            execute(&mut standalone, &signal);
        }
        standalone.0.tags
    }

    fn drive_as_host(adapter: &mut HostAdapter<Tagged>) {
        adapter.suite_setup().unwrap();
        adapter.test_setup().unwrap();
        adapter.test().unwrap();
        adapter.test_teardown().unwrap();
        adapter.suite_teardown().unwrap();
    }

    #[test]
    fn test_host_order_matches_standalone_order() {
        let mut hosted = HostAdapter::new(Tagged::new(false));
        drive_as_host(&mut hosted);

        assert_eq!(hosted.suite().tags, run_standalone(Tagged::new(false)));
        assert_eq!(
            hosted.into_inner().tags,
            ["BeforeAll", "Before", "Test", "After", "AfterAll"]
        );
    }

    #[test]
    fn test_host_failure_is_observable_and_teardown_runs() {
        let mut hosted = HostAdapter::new(Tagged::new(true));
        drive_as_host(&mut hosted);

        assert!(hosted.has_failed());
        assert!(!hosted.setup_failed());
        let failures = hosted.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].suite.as_deref(), Some("Hosted"));
        assert_eq!(hosted.suite().tags.last(), Some(&"AfterAll"));
    }

    #[test]
    fn test_failed_setup_skips_remaining_host_hooks() {
        let setup_failed = Err(HarnessError::SetupFailed("Hosted".to_string()));

        for setup in [Setup::Errors, Setup::FailsCheck, Setup::Panics] {
            let mut hosted = HostAdapter::new(Tagged::with_setup(setup));

            assert_eq!(hosted.suite_setup(), setup_failed);
            assert!(hosted.setup_failed());
            assert_eq!(hosted.test_setup(), Ok(()));
            assert_eq!(hosted.test(), setup_failed);
            assert_eq!(hosted.test_teardown(), Ok(()));
            assert_eq!(hosted.suite_teardown(), Ok(()));

            assert_eq!(hosted.suite().tags, ["BeforeAll"]);
            assert_eq!(hosted.suite().tags, run_standalone(Tagged::with_setup(setup)));
            assert_eq!(hosted.failures().len(), 1);
        }
    }

    #[test]
    fn test_log_filter_does_not_replace_installed_subscriber() {
        suitekit_utils::init_logging("suitekit=warn");

        let mut hosted = HostAdapter::new(Tagged::new(false)).with_log_filter("suitekit=trace");
        drive_as_host(&mut hosted);

        assert_eq!(suitekit_utils::try_init_logging("suitekit=trace"), Ok(()));
        assert!(!hosted.has_failed());
    }

    #[test]
    fn test_host_hooks_reject_nested_activation() {
        let outer = Arc::new(FailureSignal::new());
        let _active = outer.activate().unwrap();

        let mut hosted = HostAdapter::new(Tagged::new(false));
        assert_eq!(hosted.test(), Err(HarnessError::ReentrantRun));
        assert!(hosted.suite().tags.is_empty());
    }
}

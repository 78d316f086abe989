//! Assertion failures and the signal the runner reads after each suite.
//!
//! Failing a check does not unwind. The failure is logged, appended to the
//! signal that is active on the current thread, and control returns to the
//! test body. The runner diffs the signal around every suite and hook to learn
//! what failed where.

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::panic::Location;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{error, warn};

use crate::error::HarnessError;

thread_local! {
    static ACTIVE: RefCell<Option<Arc<FailureSignal>>> = const { RefCell::new(None) };
}

/// A single recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Suite that was executing, if any
    pub suite: Option<String>,
    /// Where the failure was raised, usually `file:line`
    pub site: String,
    pub message: String,
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.suite {
            Some(suite) => write!(f, "[{suite}] {}: {}", self.site, self.message),
            None => write!(f, "{}: {}", self.site, self.message),
        }
    }
}

/// Accumulates failures for one run.
#[derive(Debug, Default)]
pub struct FailureSignal {
    records: Mutex<Vec<FailureRecord>>,
    current_suite: RwLock<Option<String>>,
}

impl FailureSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of failures recorded so far. Also usable as a mark for
    /// [`FailureSignal::records_since`].
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    pub fn has_failed(&self) -> bool {
        self.count() > 0
    }

    pub fn records(&self) -> Vec<FailureRecord> {
        self.records.lock().clone()
    }

    pub fn records_since(&self, mark: usize) -> Vec<FailureRecord> {
        self.records.lock().iter().skip(mark).cloned().collect()
    }

    pub fn current_suite(&self) -> Option<String> {
        self.current_suite.read().clone()
    }

    pub fn enter_suite(&self, name: &str) {
        *self.current_suite.write() = Some(name.to_string());
    }

    pub fn leave_suite(&self) {
        self.current_suite.write().take();
    }

    pub fn record(&self, site: impl Into<String>, message: impl Into<String>) {
        let record = FailureRecord {
            suite: self.current_suite(),
            site: site.into(),
            message: message.into(),
        };
        self.records.lock().push(record);
    }

    /// Make this signal the target of `fail()` and the check macros on the
    /// current thread until the returned guard is dropped.
    pub fn activate(self: &Arc<Self>) -> Result<ActiveRun, HarnessError> {
        ACTIVE.with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_some() {
                return Err(HarnessError::ReentrantRun);
            }
            *slot = Some(Arc::clone(self));
            Ok(ActiveRun {
                _thread_bound: PhantomData,
            })
        })
    }
}

/// Guard returned by [`FailureSignal::activate`].
#[must_use = "the signal is deactivated as soon as the guard is dropped"]
pub struct ActiveRun {
    _thread_bound: PhantomData<*const ()>,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        ACTIVE.with(|slot| slot.borrow_mut().take());
    }
}

/// Signal active on this thread, if a run is in progress.
pub fn active_signal() -> Option<Arc<FailureSignal>> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Record a failure at the caller's location and keep going.
#[track_caller]
pub fn fail() {
    let location = Location::caller();
    fail_at(
        &format!("{}:{}", location.file(), location.line()),
        "failure signalled",
    );
}

/// Like [`fail`], with a message that is also logged.
#[track_caller]
pub fn fail_with(message: impl Into<String>) {
    let location = Location::caller();
    let site = format!("{}:{}", location.file(), location.line());
    let message = message.into();
    error!(target: "suitekit::assert", "Failure at {site}: {message}");
    fail_at(&site, message);
}

pub fn fail_at(site: &str, message: impl Into<String>) {
    match active_signal() {
        Some(signal) => signal.record(site, message),
        None => warn!("Failure at {site} signalled outside of a suite run; ignored"),
    }
}

#[doc(hidden)]
pub fn assertion_failed(site: &str, expression: &str) {
    error!(target: "suitekit::assert", "Assertion {site} failed: {expression}");
    fail_at(site, format!("assertion failed: {expression}"));
}

#[doc(hidden)]
pub fn assertion_failed_with(site: &str, expression: &str, detail: &str) {
    error!(target: "suitekit::assert", "Assertion {site} failed: {expression} ({detail})");
    fail_at(site, format!("assertion failed: {expression}: {detail}"));
}

/// Check a condition. On failure, log the site and expression at error level
/// and record the failure; execution continues either way.
#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        if !($cond) {
            $crate::failure::assertion_failed(concat!(file!(), ":", line!()), stringify!($cond));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if !($cond) {
            $crate::failure::assertion_failed_with(
                concat!(file!(), ":", line!()),
                stringify!($cond),
                &format!($($arg)+),
            );
        }
    };
}

/// Equality flavour of [`check!`] that records both operands.
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if !(*left == *right) {
                    $crate::failure::assertion_failed_with(
                        concat!(file!(), ":", line!()),
                        concat!(stringify!($left), " == ", stringify!($right)),
                        &format!("left: {:?}, right: {:?}", left, right),
                    );
                }
            }
        }
    };
}

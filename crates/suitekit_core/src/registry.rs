use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::debug;

use crate::suite::{Suite, SuiteInfo};

/// A suite as held by the registry. The identity is copied out at
/// registration so it can be read without locking the suite itself.
pub struct RegisteredSuite {
    info: SuiteInfo,
    suite: Mutex<Box<dyn Suite>>,
}

impl RegisteredSuite {
    pub fn info(&self) -> &SuiteInfo {
        &self.info
    }

    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Suite>> {
        self.suite.lock()
    }
}

/// Append-only, ordered collection of suites.
pub struct SuiteRegistry {
    suites: RwLock<Vec<Arc<RegisteredSuite>>>,
}

pub static GLOBAL_SUITE_REGISTRY: Lazy<SuiteRegistry> = Lazy::new(SuiteRegistry::default);

impl Default for SuiteRegistry {
    fn default() -> Self {
        Self {
            suites: RwLock::new(Vec::new()),
        }
    }
}

impl SuiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> &'static SuiteRegistry {
        &GLOBAL_SUITE_REGISTRY
    }

    /// Append a suite; returns its position in run order.
    pub fn register<S>(&self, suite: S) -> usize
    where
        S: Suite + 'static,
    {
        self.register_boxed(Box::new(suite))
    }

    pub fn register_boxed(&self, suite: Box<dyn Suite>) -> usize {
        let info = suite.info().clone();
        debug!("Registered suite {info}");
        let mut guard = self.suites.write();
        guard.push(Arc::new(RegisteredSuite {
            info,
            suite: Mutex::new(suite),
        }));
        guard.len() - 1
    }

    pub fn register_many<I>(&self, suites: I)
    where
        I: IntoIterator<Item = Box<dyn Suite>>,
    {
        for suite in suites {
            self.register_boxed(suite);
        }
    }

    pub fn len(&self) -> usize {
        self.suites.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.read().is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.suites
            .read()
            .iter()
            .any(|entry| entry.info.name() == name)
    }

    /// Identities in registration order
    pub fn infos(&self) -> Vec<SuiteInfo> {
        self.suites
            .read()
            .iter()
            .map(|entry| entry.info.clone())
            .collect()
    }

    /// Current entries, detached from the registry lock so suites may be
    /// registered while a snapshot is being run.
    pub fn snapshot(&self) -> Vec<Arc<RegisteredSuite>> {
        self.suites.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty(SuiteInfo);

    impl Suite for Empty {
        fn info(&self) -> &SuiteInfo {
            &self.0
        }

        fn run(&mut self) {}
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let registry = SuiteRegistry::new();
        assert!(registry.is_empty());

        assert_eq!(registry.register(Empty(SuiteInfo::automatic("X"))), 0);
        assert_eq!(registry.register(Empty(SuiteInfo::manual("Y"))), 1);
        registry.register_many([Box::new(Empty(SuiteInfo::automatic("Z"))) as Box<dyn Suite>]);

        let names: Vec<_> = registry
            .infos()
            .iter()
            .map(|info| info.name().to_string())
            .collect();
        assert_eq!(names, ["X", "Y", "Z"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("Y"));
        assert!(!registry.contains("W"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = SuiteRegistry::new();
        registry.register(Empty(SuiteInfo::automatic("A")));

        let snapshot = registry.snapshot();
        registry.register(Empty(SuiteInfo::automatic("B")));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].info().name(), "A");
        assert_eq!(snapshot[0].lock().info().name(), "A");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let registry = SuiteRegistry::new();
        registry.register(Empty(SuiteInfo::automatic("Same")));
        registry.register(Empty(SuiteInfo::manual("Same")));
        assert_eq!(registry.len(), 2);
    }
}

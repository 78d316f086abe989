//! Declarative suites: a name, an automatic/manual flag, optional named hooks
//! and an ordered list of named test procedures.

use tracing::trace;

use crate::lifecycle::Phase;
use crate::registry::SuiteRegistry;
use crate::suite::{Suite, SuiteInfo};

type Procedure = Box<dyn FnMut() + Send>;
type SetupProcedure = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

struct Named<F> {
    name: String,
    procedure: F,
}

impl<F> Named<F> {
    fn new(name: impl Into<String>, procedure: F) -> Self {
        Self {
            name: name.into(),
            procedure,
        }
    }
}

impl Named<Procedure> {
    fn call(&mut self, phase: Phase) {
        trace!("Calling {phase} procedure {}", self.name);
        (self.procedure)();
    }
}

/// Suite assembled by [`SuiteBuilder`].
pub struct DeclaredSuite {
    info: SuiteInfo,
    before_all: Option<Named<SetupProcedure>>,
    before: Option<Named<Procedure>>,
    after: Option<Named<Procedure>>,
    after_all: Option<Named<Procedure>>,
    tests: Vec<Named<Procedure>>,
}

impl DeclaredSuite {
    /// Test procedure names in declaration order
    pub fn test_names(&self) -> Vec<&str> {
        self.tests.iter().map(|test| test.name.as_str()).collect()
    }
}

impl Suite for DeclaredSuite {
    fn info(&self) -> &SuiteInfo {
        &self.info
    }

    fn before_all(&mut self) -> anyhow::Result<()> {
        let Some(setup) = self.before_all.as_mut() else {
            return Ok(());
        };
        trace!("Calling {} procedure {}", Phase::BeforeAll, setup.name);
        (setup.procedure)()
    }

    fn before(&mut self) {
        if let Some(hook) = self.before.as_mut() {
            hook.call(Phase::Before);
        }
    }

    fn run(&mut self) {
        for index in 0..self.tests.len() {
            let name = self.tests[index].name.clone();
            self.test(&name, |suite| (suite.tests[index].procedure)());
        }
    }

    fn after(&mut self) {
        if let Some(hook) = self.after.as_mut() {
            hook.call(Phase::After);
        }
    }

    fn after_all(&mut self) {
        if let Some(hook) = self.after_all.as_mut() {
            hook.call(Phase::AfterAll);
        }
    }
}

/// Builds a [`DeclaredSuite`].
///
/// ```
/// use suitekit_core::{SuiteBuilder, SuiteRegistry, check};
///
/// let registry = SuiteRegistry::new();
/// SuiteBuilder::automatic("Arithmetic")
///     .before("reset", || {})
///     .test("addition", || check!(1 + 1 == 2))
///     .register(&registry);
/// assert_eq!(registry.len(), 1);
/// ```
pub struct SuiteBuilder {
    suite: DeclaredSuite,
}

impl SuiteBuilder {
    pub fn new(automatic: bool, name: impl Into<String>) -> Self {
        Self {
            suite: DeclaredSuite {
                info: SuiteInfo::new(automatic, name),
                before_all: None,
                before: None,
                after: None,
                after_all: None,
                tests: Vec::new(),
            },
        }
    }

    pub fn automatic(name: impl Into<String>) -> Self {
        Self::new(true, name)
    }

    pub fn manual(name: impl Into<String>) -> Self {
        Self::new(false, name)
    }

    pub fn before_all<F>(self, name: impl Into<String>, mut procedure: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.try_before_all(name, move || {
            procedure();
            Ok(())
        })
    }

    /// Suite setup that can fail with an error, skipping the whole suite.
    pub fn try_before_all<F>(mut self, name: impl Into<String>, procedure: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        self.suite.before_all = Some(Named::new(name, Box::new(procedure)));
        self
    }

    pub fn before<F>(mut self, name: impl Into<String>, procedure: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.suite.before = Some(Named::new(name, Box::new(procedure)));
        self
    }

    pub fn after<F>(mut self, name: impl Into<String>, procedure: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.suite.after = Some(Named::new(name, Box::new(procedure)));
        self
    }

    pub fn after_all<F>(mut self, name: impl Into<String>, procedure: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.suite.after_all = Some(Named::new(name, Box::new(procedure)));
        self
    }

    pub fn test<F>(mut self, name: impl Into<String>, procedure: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.suite.tests.push(Named::new(name, Box::new(procedure)));
        self
    }

    pub fn build(self) -> DeclaredSuite {
        self.suite
    }

    pub fn register(self, registry: &SuiteRegistry) -> usize {
        registry.register(self.build())
    }
}

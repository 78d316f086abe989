//! Suites the `suitekit` binary runs against the harness itself.

use suitekit::{Suite, SuiteBuilder, SuiteInfo, SuiteRegistry, check, check_eq};
use tracing::info;

pub fn register(registry: &SuiteRegistry) {
    registry.register(LifecycleCounts::new());
    SuiteBuilder::automatic("Registry")
        .test("preserves_order", preserves_order)
        .test("fixes_identity", fixes_identity)
        .register(registry);
    SuiteBuilder::manual("Environment")
        .test("describe", describe_environment)
        .register(registry);
}

/// Counts hook calls and checks them against the number of tests in
/// `after_all`.
struct LifecycleCounts {
    info: SuiteInfo,
    setups: usize,
    teardowns: usize,
    bodies: usize,
}

impl LifecycleCounts {
    fn new() -> Self {
        Self {
            info: SuiteInfo::automatic("Lifecycle"),
            setups: 0,
            teardowns: 0,
            bodies: 0,
        }
    }
}

impl Suite for LifecycleCounts {
    fn info(&self) -> &SuiteInfo {
        &self.info
    }

    fn before(&mut self) {
        check_eq!(self.setups, self.teardowns);
        self.setups += 1;
    }

    fn run(&mut self) {
        for name in ["first", "second", "third"] {
            self.test(name, |suite| {
                check_eq!(suite.setups, suite.teardowns + 1);
                suite.bodies += 1;
            });
        }
    }

    fn after(&mut self) {
        self.teardowns += 1;
    }

    fn after_all(&mut self) {
        check_eq!(self.bodies, 3);
        check_eq!(self.setups, 3);
        check_eq!(self.teardowns, 3);
    }
}

fn preserves_order() {
    let scratch = SuiteRegistry::new();
    for name in ["X", "Y", "Z"] {
        SuiteBuilder::automatic(name).register(&scratch);
    }
    let names: Vec<String> = scratch
        .infos()
        .iter()
        .map(|info| info.name().to_string())
        .collect();
    check_eq!(names, ["X", "Y", "Z"]);
}

fn fixes_identity() {
    let suite = SuiteBuilder::manual("Pinned").build();
    let scratch = SuiteRegistry::new();
    scratch.register(suite);
    let entry = &scratch.snapshot()[0];
    check!(!entry.info().is_automatic());
    check_eq!(entry.lock().info(), entry.info());
}

fn describe_environment() {
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|err| format!("<unavailable: {err}>"));
    info!("suitekit {}", suitekit_config::VERSION);
    info!("working directory: {cwd}");
    info!(
        "threads available: {}",
        std::thread::available_parallelism().map_or(1, usize::from)
    );
}

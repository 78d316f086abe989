//! suitekit: ordered suite lifecycles, automatic and manual suites, and
//! assertions that record failures instead of aborting.
//!
//! A test binary registers its suites during startup and hands control to
//! [`run_main`]:
//!
//! ```no_run
//! use suitekit::{SuiteBuilder, check};
//!
//! fn main() -> std::process::ExitCode {
//!     suitekit::run_main(|registry| {
//!         SuiteBuilder::automatic("Arithmetic")
//!             .test("addition", || check!(1 + 1 == 2))
//!             .register(registry);
//!     })
//! }
//! ```

pub mod cli;
pub mod test;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::error;

pub use cli::Cli;
pub use suitekit_config::{HarnessConfig, RunMode};
pub use suitekit_core::*;
pub use test::TestReporter;

/// Process entry point: parse arguments, register suites, run, report.
pub fn run_main<F>(register: F) -> ExitCode
where
    F: FnOnce(&SuiteRegistry),
{
    let cli = Cli::parse();
    let stdout = io::stdout();
    run_with(&cli, SuiteRegistry::global(), register, &mut stdout.lock())
}

/// [`run_main`] against an explicit registry and output sink.
pub fn run_with<F>(
    cli: &Cli,
    registry: &SuiteRegistry,
    register: F,
    out: &mut dyn Write,
) -> ExitCode
where
    F: FnOnce(&SuiteRegistry),
{
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("suitekit: {}", HarnessError::Config(format!("{err:#}")));
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = suitekit_utils::try_init_logging(&config.log_filter) {
        eprintln!("suitekit: {}", HarnessError::Logging(err));
        return ExitCode::FAILURE;
    }

    register(registry);

    let reporter = TestReporter::new(!cli.no_color);
    let rendered = if config.list_only {
        Ok((reporter.render_listing(&registry.infos()), ExitCode::SUCCESS))
    } else {
        Runner::new(registry).run(&config.mode).and_then(|report| {
            let text = if cli.json {
                to_json(&report)?
            } else {
                reporter.render(&report)
            };
            Ok((text, report.exit_code()))
        })
    };

    match rendered {
        Ok((text, code)) => {
            if let Err(err) = writeln!(out, "{}", text.trim_end()) {
                eprintln!("suitekit: failed to write report: {err}");
                return ExitCode::FAILURE;
            }
            code
        }
        Err(err) => {
            error!("{err}");
            eprintln!("suitekit: {err}");
            ExitCode::FAILURE
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, HarnessError> {
    serde_json::to_string_pretty(value).map_err(|err| HarnessError::Report(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn register_pair(registry: &SuiteRegistry) {
        SuiteBuilder::automatic("Passing")
            .test("holds", || check!(true))
            .register(registry);
        SuiteBuilder::manual("Failing")
            .test("breaks", || check_eq!(2 + 2, 5))
            .register(registry);
    }

    fn run(args: &[&str]) -> (ExitCode, String) {
        let cli = Cli::try_parse_from(args.iter().copied()).unwrap();
        let registry = SuiteRegistry::new();
        let mut out = Vec::new();
        let code = run_with(&cli, &registry, register_pair, &mut out);
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_automatic_run_succeeds() {
        let (code, out) = run(&["suitekit", "--no-color"]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.contains("suite Passing ... ok"));
        assert!(!out.contains("Failing"));
    }

    #[test]
    fn test_named_manual_failure_sets_exit_status() {
        let (code, out) = run(&["suitekit", "--no-color", "Failing"]);
        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.contains("suite Failing ... FAILED"));
        assert!(out.contains("2 + 2 == 5"));
    }

    #[test]
    fn test_unknown_suite_fails_without_output() {
        let (code, out) = run(&["suitekit", "Nope"]);
        assert_eq!(code, ExitCode::FAILURE);
        assert!(out.is_empty());
    }

    #[test]
    fn test_listing_shows_registry_order() {
        let (code, out) = run(&["suitekit", "--no-color", "--list"]);
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(out.starts_with("Passing: automatic\nFailing: manual\n"));
    }

    #[test]
    fn test_json_report() {
        let (code, out) = run(&["suitekit", "--json", "Failing"]);
        assert_eq!(code, ExitCode::FAILURE);

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["suites"][0]["info"]["name"], "Failing");
        assert_eq!(value["suites"][0]["status"], "failed");
        assert_eq!(value["mode"]["kind"], "named");
    }

    #[test]
    fn test_unserializable_report_is_an_error() {
        let mut keyed_by_pair = HashMap::new();
        keyed_by_pair.insert((1_u8, 2_u8), "pair");

        let err = to_json(&keyed_by_pair).unwrap_err();
        assert!(matches!(err, HarnessError::Report(_)));
        assert!(err.to_string().starts_with("failed to render run report"));
    }
}

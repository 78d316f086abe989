use thiserror::Error;

/// Infrastructure failures: problems with the harness itself rather than
/// with the code under test.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HarnessError {
    #[error("no registered suite named `{0}`")]
    UnknownSuite(String),

    #[error("failed to initialise logging: {0}")]
    Logging(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("a suite run is already active on this thread")]
    ReentrantRun,

    #[error("setup failed for suite `{0}`")]
    SetupFailed(String),

    #[error("failed to render run report: {0}")]
    Report(String),
}

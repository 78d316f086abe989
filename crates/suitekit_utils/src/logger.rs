use std::sync::{Once, OnceLock};

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a full `EnvFilter` directive string.
pub const LOG_ENV: &str = "SUITEKIT_LOG";

static INIT: OnceLock<Result<(), String>> = OnceLock::new();
static REPORTED: Once = Once::new();

/// Initialise tracing subscriber once per process, reporting whether the
/// subscriber could be installed.
///
/// Later calls return the outcome of the first one, so callers may invoke it
/// before every hook without cost. A global subscriber installed by someone
/// else (a host test runner, say) counts as success and is left in place.
pub fn try_init_logging(default_filter: &str) -> Result<(), String> {
    INIT.get_or_init(|| {
        if tracing::dispatcher::has_been_set() {
            return Ok(());
        }

        let env_filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

        fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .try_init()
            .map_err(|err| err.to_string())
    })
    .clone()
}

/// Initialise tracing subscriber once per process. A failure is printed to
/// stderr the first time only.
pub fn init_logging(default_filter: &str) {
    if let Err(err) = try_init_logging(default_filter) {
        REPORTED.call_once(|| eprintln!("suitekit: failed to install log subscriber: {err}"));
    }
}

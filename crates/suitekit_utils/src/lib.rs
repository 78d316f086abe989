pub mod logger;
pub mod timer;

pub use logger::{LOG_ENV, init_logging, try_init_logging};
pub use timer::Stopwatch;

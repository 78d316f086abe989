mod selfcheck;

use std::process::ExitCode;

fn main() -> ExitCode {
    suitekit::run_main(selfcheck::register)
}

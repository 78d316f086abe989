
pub use reporter::TestReporter;

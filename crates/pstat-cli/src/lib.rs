/// pstat CLI: the command-line frontend around `pstat-core`.
///
/// Owns everything the engine deliberately leaves to its caller: argument
/// parsing, target/output path resolution, the overwrite prompt, the
/// completion-polling loop, and the final report.
pub mod args;
pub mod driver;
pub mod paths;
pub mod prompt;
pub mod report;

pub use args::Args;
pub use driver::{run, run_with_io, Outcome};
pub use report::RunReport;

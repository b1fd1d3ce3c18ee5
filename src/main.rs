//! pstat: parallel stat collector.
//!
//! Thin binary entry point. All logic lives in the `pstat-core`
//! and `pstat-cli` crates.

fn main() -> anyhow::Result<()> {
    let args = pstat_cli::Args::from_env();

    // Logs go to stderr; stdout carries the progress report.
    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    pstat_cli::run(&args)?;
    Ok(())
}

/// The collection driver: validates paths, confirms overwrites, runs the
/// walker, and decides when to halt it.
///
/// # Completion detection
///
/// The walker does not stop by itself. Every `check_interval` the driver
/// samples the progress counter and halts once two consecutive samples are
/// equal, or as soon as the walker reports that it has run out of
/// directories. The stable-counter rule alone can stop a walk that is merely
/// slow (e.g. a stalled network filesystem); a longer interval makes that less
/// likely.
use crate::args::Args;
use crate::paths;
use crate::prompt;
use crate::report::RunReport;
use anyhow::{Context, Result};
use pstat_core::stopwatch::Stopwatch;
use pstat_core::walker::{OutputFormat, Walker, WalkerConfig};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Output buffer in front of the CSV file.
const OUTPUT_BUFFER_BYTES: usize = 1 << 20;

#[derive(Debug)]
pub enum Outcome {
    Completed(RunReport),
    /// The user declined to overwrite the output file.
    Cancelled,
}

/// Run against the process's stdin/stdout.
pub fn run(args: &Args) -> Result<Outcome> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_with_io(args, &mut stdin.lock(), &mut stdout.lock())
}

/// Run with explicit prompt input and report output.
pub fn run_with_io<R, W>(args: &Args, input: &mut R, out: &mut W) -> Result<Outcome>
where
    R: BufRead,
    W: Write,
{
    let target = paths::resolve_target(&args.target)?;
    let output = paths::resolve_output(args.output_csv.as_deref(), &target)?;
    let skip = paths::absolute_skip_list(args.ignore_paths())?;

    if !args.no_prompt && output.exists() && !prompt::confirm_overwrite(input, out, &output)? {
        writeln!(out, "The operation was canceled by the user.")?;
        return Ok(Outcome::Cancelled);
    }

    let text = !args.json;
    if text {
        writeln!(out, "pstat v{} - Parallel stat collector", env!("CARGO_PKG_VERSION"))?;
        writeln!(out)?;
        writeln!(out, "Collecting stat from: {}", target.display())?;
        writeln!(out, "Number of threads: {}", args.num_threads)?;
        writeln!(out, "CSV output file: {}", output.display())?;
        writeln!(out, "Check interval: {} ms", args.check_interval)?;
        writeln!(out, "Human output: {}", if args.human { "Yes" } else { "No" })?;
        writeln!(out)?;
        writeln!(out, "* Collection started")?;
    }

    let file = File::create(&output)
        .with_context(|| format!("failed to create output file {}", output.display()))?;
    let sink = BufWriter::with_capacity(OUTPUT_BUFFER_BYTES, file);

    let config = WalkerConfig::new(&target)
        .with_skip_list(&skip)
        .with_format(OutputFormat::from_human(args.human))
        .with_walker_threads(args.num_threads as usize)
        .with_output_threads(args.output_threads as usize);

    let mut watch = Stopwatch::start_new();
    let mut walker = Walker::new(config, sink).context("failed to start the walker")?;

    let interval = Duration::from_millis(args.check_interval);
    poll_until_stable(&walker, interval, |n| {
        if text {
            writeln!(out, "-- Collected {n} stat records so far...")?;
        }
        Ok(())
    })?;

    let summary = walker.halt().context("walk did not finish cleanly")?;
    let elapsed = watch.stop();
    info!(records = summary.records_stated, ?elapsed, "collection finished");

    let report = RunReport {
        target,
        output,
        elapsed_secs: elapsed.as_secs_f64(),
        records_per_second: watch.rate(summary.records_stated),
        summary,
    };
    if text {
        report.write_text(out)?;
    } else {
        report.write_json(out)?;
    }

    Ok(Outcome::Completed(report))
}

/// Sleep `interval` between samples of the progress counter; return the final
/// count once two samples match or the walker has no directories left.
pub fn poll_until_stable<F>(walker: &Walker, interval: Duration, mut on_progress: F) -> io::Result<u64>
where
    F: FnMut(u64) -> io::Result<()>,
{
    let mut previous = 0;
    loop {
        thread::sleep(interval);
        let current = walker.total_records();
        if current == previous || walker.is_walk_complete() {
            return Ok(current);
        }
        on_progress(current)?;
        previous = current;
    }
}

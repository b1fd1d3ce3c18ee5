/// Final run report: printed as text or JSON once the walk has halted.
use pstat_core::walker::WalkSummary;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: PathBuf,
    pub output: PathBuf,
    pub elapsed_secs: f64,
    pub records_per_second: f64,
    #[serde(flatten)]
    pub summary: WalkSummary,
}

impl RunReport {
    pub fn write_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "* Collection finished")?;
        writeln!(out)?;
        writeln!(out, "Elapsed time: {:.3}s", self.elapsed_secs)?;
        writeln!(out, "Total files: {}", self.summary.records_stated)?;
        writeln!(out, "Files/second: {:.0}", self.records_per_second)?;

        if self.summary.failed_stats > 0 {
            writeln!(out, "Failed stats: {}", self.summary.failed_stats)?;
        }
        if self.summary.failed_dirs > 0 {
            writeln!(out, "Unreadable directories: {}", self.summary.failed_dirs)?;
        }
        if self.summary.abandoned_dirs > 0 {
            writeln!(
                out,
                "Directories not walked (halted early): {}",
                self.summary.abandoned_dirs
            )?;
        }
        writeln!(out)
    }

    pub fn write_json<W: Write>(&self, out: &mut W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out).map_err(serde_json::Error::io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        RunReport {
            target: PathBuf::from("/data"),
            output: PathBuf::from("/tmp/data.csv"),
            elapsed_secs: 2.0,
            records_per_second: 2_000.0,
            summary: WalkSummary {
                records_stated: 4_000,
                records_written: 4_000,
                failed_stats: 0,
                failed_dirs: 2,
                abandoned_dirs: 0,
            },
        }
    }

    #[test]
    fn text_report_lists_totals_and_only_nonzero_failures() {
        let mut out = Vec::new();
        report().write_text(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Total files: 4000"));
        assert!(text.contains("Files/second: 2000"));
        assert!(text.contains("Unreadable directories: 2"));
        assert!(!text.contains("Failed stats"));
        assert!(!text.contains("halted early"));
    }

    #[test]
    fn json_report_flattens_the_summary() {
        let mut out = Vec::new();
        report().write_json(&mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["target"], "/data");
        assert_eq!(value["records_stated"], 4_000);
        assert_eq!(value["failed_dirs"], 2);
    }
}

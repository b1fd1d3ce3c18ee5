/// Command-line arguments.
///
/// `-h` is `--human` and `-v` is `--version`, so clap's automatic help and
/// version flags are replaced with long-only / re-bound equivalents.
use clap::{ArgAction, Parser};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Parallel stat collector: walks a directory tree with a pool of threads
/// and writes one CSV row of `lstat` metadata per entry.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pstat",
    version,
    about = "Parallel stat collector",
    disable_help_flag = true,
    disable_version_flag = true,
    after_help = "EXAMPLES:\n    \
        pstat /home -o home.csv\n    \
        pstat /data -t 32 -g /data/.snapshot:/data/tmp -h\n    \
        pstat /srv -i 2000 -y   # slow network filesystem"
)]
pub struct Args {
    /// Directory to collect stat records from
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Output CSV file. Derived from the target path if not given
    #[arg(short = 'o', long = "output-csv", value_name = "FILE")]
    pub output_csv: Option<PathBuf>,

    /// Number of walker threads. Defaults to the number of cores
    #[arg(
        short = 't',
        long = "num-threads",
        value_name = "NUM",
        default_value_t = default_threads(),
        value_parser = clap::value_parser!(u64).range(1..=1024)
    )]
    pub num_threads: u64,

    /// Number of output threads writing to the CSV file
    #[arg(
        long = "output-threads",
        value_name = "NUM",
        default_value_t = 1,
        value_parser = clap::value_parser!(u64).range(1..=64)
    )]
    pub output_threads: u64,

    /// Interval in milliseconds between completion checks. Raise it above
    /// 1000 if a slow filesystem makes the walk stop early
    #[arg(
        short = 'i',
        long = "check-interval",
        value_name = "MS",
        default_value_t = 200,
        value_parser = clap::value_parser!(u64).range(200..=300_000)
    )]
    pub check_interval: u64,

    /// Full paths to skip, separated by colons (e.g. /proc:/dev/null)
    #[arg(short = 'g', long = "ignore-list", value_name = "PATHS")]
    pub ignore_list: Option<String>,

    /// Human-readable output: names instead of ids, dates, permission digits
    #[arg(short = 'h', long)]
    pub human: bool,

    /// Overwrite an existing output file without asking
    #[arg(short = 'y', long = "no-prompt")]
    pub no_prompt: bool,

    /// Print the final summary as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging on stderr
    #[arg(long)]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    pub help: Option<bool>,

    /// Print version
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

impl Args {
    /// Parse `std::env::args`, exiting with usage on error.
    pub fn from_env() -> Self {
        Self::parse()
    }

    /// Distinct, non-empty entries of the colon-separated ignore list.
    pub fn ignore_paths(&self) -> BTreeSet<PathBuf> {
        self.ignore_list
            .as_deref()
            .map(split_ignore_list)
            .unwrap_or_default()
    }
}

pub fn split_ignore_list(list: &str) -> BTreeSet<PathBuf> {
    list.split(':')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn default_threads() -> u64 {
    num_cpus::get().clamp(1, 1024) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["pstat", "/data"]).unwrap();
        assert_eq!(args.target, PathBuf::from("/data"));
        assert_eq!(args.output_csv, None);
        assert_eq!(args.num_threads, default_threads());
        assert_eq!(args.output_threads, 1);
        assert_eq!(args.check_interval, 200);
        assert!(!args.human);
        assert!(!args.no_prompt);
        assert!(args.ignore_paths().is_empty());
    }

    #[test]
    fn short_flags_match_the_classic_interface() {
        let args = Args::try_parse_from([
            "pstat", "-o", "out.csv", "-t", "16", "-i", "500", "-g", "/a:/b", "-h", "-y", "/data",
        ])
        .unwrap();
        assert_eq!(args.output_csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.num_threads, 16);
        assert_eq!(args.check_interval, 500);
        assert!(args.human);
        assert!(args.no_prompt);
        assert_eq!(args.ignore_paths().len(), 2);
    }

    #[test]
    fn long_only_and_version_flags() {
        let args =
            Args::try_parse_from(["pstat", "--output-threads", "4", "--verbose", "/data"]).unwrap();
        assert_eq!(args.output_threads, 4);
        assert!(args.verbose);

        let err = Args::try_parse_from(["pstat", "-v"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Args::try_parse_from(["pstat", "-t", "0", "/data"]).is_err());
        assert!(Args::try_parse_from(["pstat", "-t", "1025", "/data"]).is_err());
        assert!(Args::try_parse_from(["pstat", "-i", "100", "/data"]).is_err());
    }

    #[test]
    fn target_is_required() {
        assert!(Args::try_parse_from(["pstat"]).is_err());
    }

    #[test]
    fn ignore_list_drops_empty_and_duplicate_entries() {
        let set = split_ignore_list("/etc::/dev/null:/etc:");
        let expected: BTreeSet<PathBuf> = ["/dev/null", "/etc"].into_iter().map(PathBuf::from).collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

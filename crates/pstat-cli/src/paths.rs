/// Target and output path handling.
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve `target` to an absolute, symlink-free path. Fails if it does not exist.
pub fn resolve_target(target: &Path) -> Result<PathBuf> {
    if fs_exists(target) {
        target
            .canonicalize()
            .with_context(|| format!("failed to resolve {}", target.display()))
    } else {
        bail!(
            "the specified target path ({}) does not exist",
            target.display()
        )
    }
}

/// Output file name derived from the target: `/var/log` becomes `var-log.csv`.
pub fn default_output_name(target: &Path) -> String {
    let mut name = format!("{}.csv", target.display());
    if let Some(stripped) = name.strip_prefix('/') {
        name = stripped.to_owned();
    }
    name.replace('/', "-")
}

/// Absolute output path: the explicit one if given, otherwise the derived
/// name in the current directory.
pub fn resolve_output(explicit: Option<&Path>, target: &Path) -> Result<PathBuf> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => PathBuf::from(default_output_name(target)),
    };
    std::path::absolute(&path)
        .with_context(|| format!("failed to resolve output path {}", path.display()))
}

/// Make every skip-list entry absolute so it can match discovered paths.
pub fn absolute_skip_list<I>(paths: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = PathBuf>,
{
    paths
        .into_iter()
        .map(|p| {
            std::path::absolute(&p)
                .with_context(|| format!("failed to resolve ignore-list entry {}", p.display()))
        })
        .collect()
}

fn fs_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

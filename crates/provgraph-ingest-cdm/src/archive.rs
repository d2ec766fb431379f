//! Gzipped tar archives of CDM segments.
//!
//! Engagement datasets ship as `.tar.gz` archives whose members are JSON
//! segment files named `<base>.json`, `<base>.json.1`, `<base>.json.2`, …
//! Members must be consumed in segment order, which is not the archive
//! order: sort by numeric suffix first, name second. The tar reader is
//! stream-only, so the archive is opened once to list members and reopened
//! per member to read it.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

/// Sort key matching segment order: `(numeric suffix, name)`, with
/// suffix 0 for unnumbered members.
pub fn segment_sort_key(name: &str) -> (u64, String) {
    let suffix = name
        .rsplit('.')
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    (suffix, name.to_string())
}

/// Member names of an archive, in segment order.
pub fn segment_names(archive_path: &Path) -> Result<Vec<String>> {
    let file = File::open(archive_path)
        .with_context(|| format!("cannot open {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let mut names = Vec::new();
    for entry in archive.entries()? {
        let entry = entry?;
        names.push(entry.path()?.to_string_lossy().into_owned());
    }
    names.sort_by_key(|name| segment_sort_key(name));
    Ok(names)
}

/// Run `handle` over every line of one member.
pub fn for_each_member_line<F>(archive_path: &Path, member: &str, mut handle: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    let file = File::open(archive_path)
        .with_context(|| format!("cannot open {}", archive_path.display()))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    for entry in archive.entries()? {
        let entry = entry?;
        if entry.path()?.to_string_lossy() != member {
            continue;
        }
        let reader = BufReader::new(entry);
        for line in reader.lines() {
            handle(&line?)?;
        }
        return Ok(());
    }
    anyhow::bail!("member {member} not found in {}", archive_path.display())
}

/// Run `handle` over every line of every member, in segment order.
pub fn for_each_archive_line<F>(archive_path: &Path, mut handle: F) -> Result<()>
where
    F: FnMut(&str) -> Result<()>,
{
    for member in segment_names(archive_path)? {
        for_each_member_line(archive_path, &member, &mut handle)?;
    }
    Ok(())
}

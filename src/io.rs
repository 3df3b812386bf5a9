use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use itertools::Itertools;

use crate::batch::ComparisonResult;
use crate::errors::TreeDistError;

/// Extensions recognised as tree files when none are given.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["nwk", "nw", "newick", "tre", "tree", "treefile"];

/// Column names of the results table.
pub const HEADER: [&str; 5] = ["id", "rf", "norm_rf", "weighted_rf", "branch_score"];

fn is_gz(path: &Path) -> bool {
    path.to_string_lossy().ends_with(".gz")
}

/// Id of a tree file: its file name up to the first `.`.
///
/// ```
/// use std::path::Path;
/// use tree_pair_distances::io::tree_id;
///
/// assert_eq!(tree_id(Path::new("dir/sample_1.raxml.nwk.gz")).as_deref(), Some("sample_1"));
/// ```
pub fn tree_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let id = name.split('.').next().unwrap_or(name);
    if id.is_empty() { None } else { Some(id.to_string()) }
}

/// Whether the file name (ignoring a trailing `.gz`) ends in one of `extensions`.
fn has_tree_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
        return false;
    };
    let name = name.strip_suffix(".gz").unwrap_or(name);
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// List the tree files of `dir` as `(id, path)`, sorted by path.
///
/// Only regular files with one of `extensions` are kept, optionally followed
/// by `.gz`. Files without a usable id (such as `.nwk`) are skipped.
pub fn discover_trees<P: AsRef<Path>>(
    dir: P,
    extensions: &[String],
) -> Result<Vec<(String, PathBuf)>, TreeDistError> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| TreeDistError::io(dir, e))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| TreeDistError::io(dir, e))?.path();
        if !path.is_file() || !has_tree_extension(&path, extensions) {
            continue;
        }
        if let Some(id) = tree_id(&path) {
            found.push((id, path));
        }
    }

    Ok(found.into_iter().sorted_by(|a, b| a.1.cmp(&b.1)).collect())
}

/// Read the Newick text of one tree file, gunzipping `.gz` files.
pub fn read_tree_file<P: AsRef<Path>>(path: P) -> Result<String, TreeDistError> {
    let path = path.as_ref();
    let read = || -> io::Result<String> {
        let file = File::open(path)?;
        let mut text = String::new();
        if is_gz(path) {
            GzDecoder::new(file).read_to_string(&mut text)?;
        } else {
            io::BufReader::new(file).read_to_string(&mut text)?;
        }
        Ok(text)
    };
    read().map_err(|e| TreeDistError::io(path, e))
}

/// Quote a field that holds the delimiter, a double quote or a line break,
/// doubling any inner quotes.
fn quote_field(field: &str, delimiter: char) -> Cow<'_, str> {
    if field.contains(|c: char| c == delimiter || c == '"' || c == '\n' || c == '\r') {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Write the results table to any writer.
///
/// Numbers use Rust's shortest round-trip formatting. Fields that would
/// break the table are double-quoted.
pub fn write_results_to<W: Write>(
    mut out: W,
    rows: &[ComparisonResult],
    delimiter: char,
) -> io::Result<()> {
    let sep = delimiter.to_string();
    let header = HEADER.iter().map(|name| quote_field(name, delimiter)).join(&sep);
    writeln!(out, "{header}")?;
    for row in rows {
        let fields = [
            row.id.clone(),
            row.rf.to_string(),
            row.norm_rf.to_string(),
            row.weighted_rf.to_string(),
            row.branch_score.to_string(),
        ];
        let line = fields.iter().map(|f| quote_field(f, delimiter)).join(&sep);
        writeln!(out, "{line}")?;
    }
    out.flush()
}

/// Write the results table to a file or stdout.
/// If `path` ends with `.gz`, the output is gzip-compressed.
/// If `path` equals `-`, the table is written to stdout (uncompressed).
pub fn write_results<P: AsRef<Path>>(
    path: P,
    rows: &[ComparisonResult],
    delimiter: char,
) -> io::Result<()> {
    let p = path.as_ref();
    if p.as_os_str() == "-" {
        let stdout = io::stdout();
        return write_results_to(BufWriter::new(stdout.lock()), rows, delimiter);
    }

    if is_gz(p) {
        let enc = GzEncoder::new(File::create(p)?, Compression::default());
        let mut out = BufWriter::new(enc);
        write_results_to(&mut out, rows, delimiter)?;
        out.into_inner().map_err(|e| e.into_error())?.finish()?;
        Ok(())
    } else {
        write_results_to(BufWriter::new(File::create(p)?), rows, delimiter)
    }
}

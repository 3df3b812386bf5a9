use clap::Parser;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;
use tree_pair_distances::batch::{BatchOptions, run_batch};
use tree_pair_distances::io::{DEFAULT_EXTENSIONS, discover_trees, write_results};

/// Compare trees from two directories pairwise by file id and write RF,
/// normalized RF, weighted RF and branch score distances to a delimited table.
#[derive(Parser, Debug)]
#[command(
    name = "tree-pair-distances",
    version,
    about = "RF / wRF / nRF distances between matching tree pairs"
)]
struct Args {
    /// Directory with the reference (real) trees
    real: PathBuf,

    /// Directory with the predicted trees
    pred: PathBuf,

    /// Output path for the results table (`-` for stdout, `.gz` to compress)
    #[arg(short = 'o', long = "output", default_value = "output.csv")]
    output: PathBuf,

    /// Number of worker threads (defaults to all cores)
    #[arg(short = 'w', long = "threads")]
    threads: Option<usize>,

    /// Column delimiter: a single character, or `tab`
    #[arg(short = 'd', long = "delimiter", default_value = ",", value_parser = parse_delimiter)]
    delimiter: char,

    /// Tree file extension to pick up (repeatable), a trailing `.gz` is always allowed
    #[arg(short = 'e', long = "extension")]
    extensions: Vec<String>,

    /// Quiet mode: only warnings and errors, no progress bar
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("delimiter must be a single character, got '{value}'")),
            }
        }
    }
}

fn main() {
    let args = Args::parse();
    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let extensions: Vec<String> = if args.extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    } else {
        args.extensions
            .iter()
            .map(|e| e.trim_start_matches('.').to_string())
            .collect()
    };

    // Discover both sides
    let t0 = Instant::now();
    let discover = |dir: &PathBuf| match discover_trees(dir, &extensions) {
        Ok(found) => found,
        Err(e) => {
            error!("{e}");
            std::process::exit(3);
        }
    };
    let real = discover(&args.real);
    let pred = discover(&args.pred);
    if real.is_empty() || pred.is_empty() {
        error!(
            "Need tree files on both sides, found {} in {:?} and {} in {:?}.",
            real.len(),
            args.real,
            pred.len(),
            args.pred
        );
        std::process::exit(2);
    }
    info!(
        "Found {} real and {} predicted trees in {:.3}s",
        real.len(),
        pred.len(),
        t0.elapsed().as_secs_f64()
    );

    // Compare all pairs in parallel
    let t1 = Instant::now();
    let options = BatchOptions {
        threads: args.threads,
        progress: !args.quiet,
    };
    let report = match run_batch(real, pred, options) {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            std::process::exit(3);
        }
    };
    info!(
        "Compared {} pairs ({} failed) in {:.3}s",
        report.rows.len(),
        report.errors.len(),
        t1.elapsed().as_secs_f64()
    );

    let t2 = Instant::now();
    if let Err(e) = write_results(&args.output, &report.rows, args.delimiter) {
        error!("Failed to write output {:?}: {e}", args.output);
        std::process::exit(4);
    }
    let target = if args.output.as_os_str() == "-" { "stdout" } else { "output" };
    info!("Writing to {target} {:.3}s", t2.elapsed().as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_values() {
        assert_eq!(parse_delimiter(","), Ok(','));
        assert_eq!(parse_delimiter("tab"), Ok('\t'));
        assert_eq!(parse_delimiter("\\t"), Ok('\t'));
        assert_eq!(parse_delimiter(";"), Ok(';'));
        assert!(parse_delimiter(",,").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn cli_defaults() {
        let args = Args::parse_from(["tree-pair-distances", "real", "pred"]);
        assert_eq!(args.output, PathBuf::from("output.csv"));
        assert_eq!(args.delimiter, ',');
        assert!(args.extensions.is_empty());
        assert_eq!(args.threads, None);
        assert!(!args.quiet);
    }

    #[test]
    fn cli_repeated_extensions() {
        let args = Args::parse_from([
            "tree-pair-distances", "-e", "nwk", "-e", "tre", "-d", "tab", "-w", "4", "r", "p",
        ]);
        assert_eq!(args.extensions, vec!["nwk", "tre"]);
        assert_eq!(args.delimiter, '\t');
        assert_eq!(args.threads, Some(4));
    }
}

//! NFIQ2 scorer - Main Entry Point
//!
//! Scores raw 8-bit grayscale fingerprint images (row-major, no header) and
//! prints one JSON object per file.
//!
//! Usage:
//!     nfiq2-score --width 500 --height 600 print1.raw print2.raw
//!     NFIQ2_LIBRARY_PATH=/opt/nfiq2/libnfiq2_ffi.so nfiq2-score -W 416 -H 416 scan.raw

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use nfiq2::{compute_quality, ImageDescriptor, QualityOptions, QualityResult};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "nfiq2-score")]
#[command(about = "Score raw grayscale fingerprint images with NFIQ2")]
#[command(version)]
struct Args {
    /// Image width in pixels
    #[arg(short = 'W', long)]
    width: u32,

    /// Image height in pixels
    #[arg(short = 'H', long)]
    height: u32,

    /// Capture resolution (NFIQ2 requires 500)
    #[arg(long, default_value = "500")]
    ppi: u16,

    /// Omit actionable feedback and feature values
    #[arg(long)]
    no_measures: bool,

    /// Log level (debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Raw image files
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    file: &'a Path,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Outcome {
    Scored(QualityResult),
    Failed { error: String, kind: i32 },
}

fn outcome_for(path: &Path, args: &Args) -> Outcome {
    let pixels = match fs::read(path) {
        Ok(p) => p,
        Err(e) => {
            return Outcome::Failed {
                error: format!("failed to read: {}", e),
                kind: -1,
            }
        }
    };
    debug!(file = %path.display(), bytes = pixels.len(), "read image");

    let image = ImageDescriptor::gray8(args.width, args.height, &pixels);
    let options = QualityOptions {
        ppi: args.ppi,
        collect_measures: !args.no_measures,
    };

    match compute_quality(&image, &options) {
        Ok(result) => Outcome::Scored(result),
        Err(e) => Outcome::Failed {
            error: e.to_string(),
            kind: e.kind() as i32,
        },
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    nfiq2::tracing::init_with_filter(&args.log_level);
    info!("nfiq2-score v{}", env!("CARGO_PKG_VERSION"));

    let mut failures = 0usize;
    for file in &args.files {
        let outcome = outcome_for(file, &args);
        if matches!(outcome, Outcome::Failed { .. }) {
            failures += 1;
        }

        let report = Report { file, outcome };
        match serde_json::to_string(&report) {
            Ok(line) => println!("{}", line),
            Err(e) => {
                eprintln!("failed to encode report for {}: {}", file.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "nfiq2-score",
            "-W",
            "300",
            "-H",
            "400",
            "--no-measures",
            "a.raw",
            "b.raw",
        ])
        .unwrap();

        assert_eq!((args.width, args.height, args.ppi), (300, 400, 500));
        assert!(args.no_measures);
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn test_args_require_files() {
        assert!(Args::try_parse_from(["nfiq2-score", "-W", "1", "-H", "1"]).is_err());
    }

    #[test]
    fn test_unreadable_file_reports_failure() {
        let args = Args::try_parse_from(["nfiq2-score", "-W", "1", "-H", "1", "x"]).unwrap();
        let outcome = outcome_for(Path::new("/nonexistent/print.raw"), &args);
        assert!(matches!(outcome, Outcome::Failed { kind: -1, .. }));
    }

    #[test]
    fn test_report_json_shape() {
        let report = Report {
            file: Path::new("print.raw"),
            outcome: Outcome::Scored(QualityResult {
                score: 57,
                measures: None,
            }),
        };
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            r#"{"file":"print.raw","score":57}"#
        );
    }
}

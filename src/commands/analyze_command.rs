//! Dimension and resolution report
//!
//! Prints one line per file, or one JSON object per file with `--json`.
//! A file that fails to decode is reported and the run continues.

use clap::ArgMatches;
use log::{debug, error, info};
use serde::Serialize;

use crate::api::ImageSniffer;
use crate::commands::command_traits::Command;
use crate::commands::{input_files, options_from_args};
use crate::details::ImageDetails;
use crate::errors::{DecodeError, DecodeResult};
use crate::utils::progress::ProgressTracker;

/// JSON line for one file
#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    #[serde(flatten)]
    details: ImageDetails,
}

/// Command for reporting image details
pub struct AnalyzeCommand {
    /// Paths of the input files
    input_files: Vec<String>,
    /// Whether to print JSON instead of text
    json: bool,
    sniffer: ImageSniffer,
}

impl AnalyzeCommand {
    /// Create a new analyze command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A new AnalyzeCommand instance or an error
    pub fn new(args: &ArgMatches) -> DecodeResult<Self> {
        Ok(AnalyzeCommand {
            input_files: input_files(args)?,
            json: args.get_flag("json"),
            sniffer: ImageSniffer::new(options_from_args(args)?),
        })
    }

    fn render(&self, file: &str, details: ImageDetails) -> DecodeResult<String> {
        if self.json {
            serde_json::to_string(&FileReport { file, details })
                .map_err(|e| DecodeError::Command(format!("Cannot serialize report: {}", e)))
        } else {
            Ok(format!("{}: {}", file, details))
        }
    }
}

impl Command for AnalyzeCommand {
    fn execute(&self) -> DecodeResult<()> {
        let total = self.input_files.len();
        let progress = if total > 1 && !self.json {
            ProgressTracker::new(total as u64, "Reading image details")
        } else {
            ProgressTracker::hidden()
        };

        let mut failures = 0;
        for file in &self.input_files {
            info!("Analyzing file: {}", file);
            progress.set_message(file);

            match self.sniffer.file(file) {
                Ok(metadata) => progress.println(&self.render(file, metadata.details)?),
                Err(e) => {
                    error!("{}: {}", file, e);
                    eprintln!("{}: {}", file, e);
                    failures += 1;
                }
            }
            progress.increment(1);
        }
        progress.finish();

        debug!("Analyzed {} files, {} failed", total, failures);
        if failures > 0 {
            return Err(DecodeError::Command(format!("{} of {} files could not be decoded", failures, total)));
        }
        Ok(())
    }
}

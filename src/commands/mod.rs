//! CLI command implementations
//!
//! This module contains implementations of the commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod analyze_command;
pub mod tags_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use tags_command::TagsCommand;

use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use log::debug;

use crate::errors::{DecodeError, DecodeResult};
use crate::options::DecodeOptions;
use crate::tiff::registry::TagRegistry;

/// Factory for creating command instances based on CLI arguments
///
/// `--tags` selects the full dump; the details report is the default.
#[derive(Debug, Default)]
pub struct SniffCommandFactory;

impl SniffCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        SniffCommandFactory
    }
}

impl CommandFactory for SniffCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> DecodeResult<Box<dyn Command>> {
        if args.get_flag("tags") {
            Ok(Box::new(TagsCommand::new(args)?))
        } else {
            Ok(Box::new(AnalyzeCommand::new(args)?))
        }
    }
}

/// Command line definition of the `imagesniff` binary
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("imagesniff")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Read image dimensions, DPI and EXIF metadata from JPEG and PNG files")
        .arg(
            Arg::new("input")
                .help("Input image files")
                .value_name("FILE")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tags")
                .short('t')
                .long("tags")
                .help("Dump all EXIF, GPS, IPTC and XMP metadata")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print results as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tag-definitions")
                .long("tag-definitions")
                .help("TOML file with tag definitions replacing the built-in table")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file as well as stderr")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("max-ifd-hops")
                .long("max-ifd-hops")
                .help("Maximum number of directories followed in each IFD chain")
                .value_name("N")
                .required(false),
        )
}

/// Input paths given on the command line
pub(crate) fn input_files(args: &ArgMatches) -> DecodeResult<Vec<String>> {
    let files: Vec<String> = args.get_many::<String>("input")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if files.is_empty() {
        return Err(DecodeError::Command("Missing input file".to_string()));
    }
    Ok(files)
}

/// Decode options shared by all commands
pub(crate) fn options_from_args(args: &ArgMatches) -> DecodeResult<DecodeOptions> {
    let mut options = DecodeOptions::default();

    if let Some(hops) = args.get_one::<String>("max-ifd-hops") {
        let hops = hops.parse::<usize>()
            .map_err(|_| DecodeError::Command(format!("Invalid --max-ifd-hops value '{}'", hops)))?;
        options = options.with_max_ifd_hops(hops);
    }

    if let Some(path) = args.get_one::<String>("tag-definitions") {
        debug!("Using tag definitions from {}", path);
        options = options.with_registry(TagRegistry::from_file(path)?);
    }

    Ok(options)
}

//! Full metadata dump
//!
//! Reads every metadata segment and prints the EXIF, GPS and
//! Interoperability tags with their registry names, followed by any IPTC
//! datasets and XMP properties.

use clap::ArgMatches;
use log::{error, info};
use serde::Serialize;

use crate::api::ImageSniffer;
use crate::commands::command_traits::Command;
use crate::commands::{input_files, options_from_args};
use crate::details::{ImageDetails, Metadata};
use crate::errors::{DecodeError, DecodeResult};
use crate::format::ImageFormat;
use crate::metadata::{IptcRecords, XmpPacket};
use crate::options::ScanMode;
use crate::utils::tag_utils::{tag_rows, truncate_for_display, TagRow};

#[derive(Serialize)]
struct TagReport<'a> {
    file: &'a str,
    format: ImageFormat,
    details: ImageDetails,
    tags: Vec<TagRow>,
    iptc: Option<&'a IptcRecords>,
    xmp: Option<&'a XmpPacket>,
}

/// Command for dumping all tags of each file
pub struct TagsCommand {
    input_files: Vec<String>,
    json: bool,
    sniffer: ImageSniffer,
}

impl TagsCommand {
    /// Create a new tags command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A new TagsCommand instance or an error
    pub fn new(args: &ArgMatches) -> DecodeResult<Self> {
        let options = options_from_args(args)?.with_mode(ScanMode::AllMetadata);
        Ok(TagsCommand {
            input_files: input_files(args)?,
            json: args.get_flag("json"),
            sniffer: ImageSniffer::new(options),
        })
    }

    fn print_json(&self, file: &str, metadata: &Metadata, rows: Vec<TagRow>) -> DecodeResult<()> {
        let report = TagReport {
            file,
            format: metadata.format,
            details: metadata.details,
            tags: rows,
            iptc: metadata.iptc.as_ref(),
            xmp: metadata.xmp.as_ref(),
        };
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| DecodeError::Command(format!("Cannot serialize report: {}", e)))?;
        println!("{}", json);
        Ok(())
    }

    fn print_text(&self, file: &str, metadata: &Metadata, rows: Vec<TagRow>) {
        println!("{} ({})", file, metadata.format);
        println!("  {}", metadata.details);

        for row in rows {
            println!("  [{}] {:#06x} {}: {}", row.profile, row.tag, row.name, truncate_for_display(&row.value));
        }

        if let Some(iptc) = &metadata.iptc {
            for dataset in iptc.iter() {
                let name = dataset.name().map(str::to_string)
                    .unwrap_or_else(|| format!("{}:{}", dataset.record, dataset.dataset));
                println!("  [IPTC] {}: {}", name, truncate_for_display(&dataset.value()));
            }
        }

        if let Some(xmp) = &metadata.xmp {
            for (name, value) in xmp.properties() {
                println!("  [XMP] {}: {}", name, truncate_for_display(&value));
            }
        }
    }
}

impl Command for TagsCommand {
    fn execute(&self) -> DecodeResult<()> {
        let registry = self.sniffer.options().registry();
        let mut failures = 0;

        for file in &self.input_files {
            info!("Reading tags of {}", file);
            let metadata = match self.sniffer.file(file) {
                Ok(metadata) => metadata,
                Err(e) => {
                    error!("{}: {}", file, e);
                    eprintln!("{}: {}", file, e);
                    failures += 1;
                    continue;
                }
            };

            let rows = tag_rows(registry, &metadata.tags);
            if self.json {
                self.print_json(file, &metadata, rows)?;
            } else {
                self.print_text(file, &metadata, rows);
            }
        }

        if failures > 0 {
            return Err(DecodeError::Command(format!(
                "{} of {} files could not be decoded", failures, self.input_files.len()
            )));
        }
        Ok(())
    }
}

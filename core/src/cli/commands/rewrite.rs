use super::{print_json, print_report};
use crate::cli::OutputFormat;
use crate::convert::{self, Options};
use std::path::PathBuf;

pub fn run(paths: &[PathBuf], options: Options, format: OutputFormat) -> Result<(), String> {
    let report = convert::rewrite_paths(paths, options);

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    print_report(&report, options.dry_run);
    Ok(())
}

use super::{print_json, print_report};
use crate::cli::{OutputFormat, Scope};
use crate::config::Config;
use crate::convert::{self, Options};
use crate::error::AppError;
use std::path::Path;

pub fn run(
    config_path: &Path,
    scope: Scope,
    options: Options,
    format: OutputFormat,
) -> Result<(), String> {
    let config = Config::load(config_path).map_err(AppError::from)?;

    let report = match scope {
        Scope::Pages => convert::run_pages(&config, options),
        Scope::Steps => convert::run_steps(&config, options),
        Scope::Features => convert::run_features(&config, options),
        Scope::All => convert::run_all(&config, options),
    };

    let mut written = !options.dry_run;
    if let Err(e) = convert::write_report(&config, &report, options) {
        let err = AppError::from(e);
        if err.is_fatal() {
            return Err(err.into());
        }
        log::warn!("[convert] report not written: {err}");
        written = false;
    }

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    print_report(&report, options.dry_run);
    if written {
        println!();
        println!("Report: {}", config.report.display());
    }
    Ok(())
}

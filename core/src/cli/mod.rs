pub mod commands;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::convert::Options;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pwmigrate")]
#[command(author, version, about = "Convert Selenium/QAF test sources into Playwright skeletons", long_about = None)]
pub struct Cli {
    /// Config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Convert and report without writing files
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TranslateKind {
    Locator,
    Action,
    Step,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert page classes
    Pages,

    /// Convert step definitions
    Steps,

    /// Convert feature files
    Features,

    /// Convert pages, steps and features
    All,

    /// Replace pending placeholders in existing TypeScript files
    Rewrite {
        /// Files or directories to rewrite
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Translate a single expression and show which rule matched
    Translate {
        /// Rule set to use
        kind: TranslateKind,

        /// Locator, Java statement or step sentence
        expr: String,

        /// Known element names (action) or step parameter names (step)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<(), String> {
    let options = Options {
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Pages => commands::convert::run(&cli.config, Scope::Pages, options, cli.format),
        Commands::Steps => commands::convert::run(&cli.config, Scope::Steps, options, cli.format),
        Commands::Features => {
            commands::convert::run(&cli.config, Scope::Features, options, cli.format)
        }
        Commands::All => commands::convert::run(&cli.config, Scope::All, options, cli.format),
        Commands::Rewrite { paths } => commands::rewrite::run(&paths, options, cli.format),
        Commands::Translate { kind, expr, params } => {
            commands::translate::run(kind, &expr, &params, cli.format)
        }
    }
}

/// Which asset kinds a conversion command covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Pages,
    Steps,
    Features,
    All,
}

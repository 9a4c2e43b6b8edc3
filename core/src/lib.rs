//! Pattern-driven conversion of Selenium/QAF test sources into
//! Playwright/TypeScript skeletons.

pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod generate;
pub mod locators;
pub mod paths;
pub mod report;
pub mod rewrite;
pub mod rules;

#[cfg(feature = "cli")]
pub mod cli;

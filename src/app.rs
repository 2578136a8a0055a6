// Declare modules
pub mod cli;
pub mod config;
pub mod formatter;
pub mod generator;
pub mod models;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::fs;

use self::cli::Cli;
use self::config::resolve_config;
use self::formatter::OutputGenerator;
use self::generator::Generator;
use self::models::RuntimeConfig;
use self::scanner::Scanner;

/// Parses arguments and regenerates every config.
pub fn run() -> Result<()> {
    let args = Cli::parse();
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let config = resolve_config(args, current_dir)?;
    regenerate(&config)
}

/// Precheck, then common.config, fuzz.config and tis.config, in that order.
/// Nothing is written if the precheck fails.
pub fn regenerate(config: &RuntimeConfig) -> Result<()> {
    let layout = &config.layout;
    let scanner = Scanner::new(config.root.clone());

    // 1. Check the project tree
    println!("1. Check if all necessary directories and files exist...");
    scanner.precheck(&layout.required_dirs(), &layout.required_files())?;

    let generator = Generator::new(&scanner, layout);

    // 2. Shared compilation settings
    let common_path = layout.common_config_path();
    let common = generator.common_config()?;
    println!("2. Generate the '{}' file.", common_path);
    write_output(&scanner, &common_path, &OutputGenerator::to_json(&common)?)?;

    // 3. Fuzzing settings
    let fuzz_path = layout.fuzz_config_path();
    let fuzz = generator.fuzz_config()?;
    println!("3. Generate the '{}' file.", fuzz_path);
    write_output(&scanner, &fuzz_path, &OutputGenerator::to_json(&fuzz)?)?;

    // 4. Test matrix, including the two configs above
    let tis_path = layout.tis_config_path();
    let tests = generator.tis_config(&common_path, &fuzz_path)?;
    println!("4. Generate the '{}' file.", tis_path);
    write_output(&scanner, &tis_path, &OutputGenerator::to_json(&tests)?)?;

    Ok(())
}

fn write_output(scanner: &Scanner, relative: &str, contents: &str) -> Result<()> {
    let path = scanner.root().join(relative);
    fs::write(&path, contents).context(format!("Failed to write {:?}", path))?;
    log::debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

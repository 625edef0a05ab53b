// ffdowngrade: Conversion of hhblits3 ffindex databases to the hhblits2 layout.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use clap::Parser;

use ffdowngrade::ConversionDriver;
use ffdowngrade::ConvertConfig;

mod cli;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

fn main() {
    let cli = cli::Cli::parse();

    // Errors are always printed, even with --quiet.
    let verbosity = if cli.quiet { 0 } else if cli.verbose { 3 } else { 2 };
    init_log(verbosity);

    let driver = ConversionDriver::new(&cli.db, ConvertConfig::default());
    match driver.run() {
        Ok(report) => {
            if report.is_noop() {
                log::info!("{} is already converted", cli.db.display());
            }
        },
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        },
    }
}

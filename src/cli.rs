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
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version)]
#[command(about = "Convert a hhblits3 database to hhblits2 format.")]
#[command(long_about = "Convert a hhblits3 database to hhblits2 format.

hhblits3 databases can hold sequences of unlimited length, while hhblits2
supports at most 32763 residues. It is therefore safer to search the
converted database in two steps: first with hhblits2 and, if that fails,
with hhblits3.

The conversion has no options. --verbose and --quiet only change how much
is logged to stderr.")]
pub struct Cli {
    // Database prefix, eg. /data/UniRef30_2020_01
    #[arg(required = true, help = "Database prefix (eg. UniRef30_2020_01)")]
    pub db: PathBuf,

    // Log debug messages
    #[arg(long = "verbose", help = "Log debug messages (logging only)", default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    // Only print errors
    #[arg(short = 'q', long = "quiet", help = "Only log errors (logging only)", default_value_t = false)]
    pub quiet: bool,
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn logging_flags_only() {
        use super::Cli;
        use clap::CommandFactory;
        use clap::Parser;

        Cli::command().debug_assert();

        let cli = Cli::try_parse_from(["ffdowngrade", "/data/db", "--quiet"]).unwrap();
        assert!(cli.quiet && !cli.verbose);
        assert!(Cli::try_parse_from(["ffdowngrade", "/data/db", "--verbose", "--quiet"]).is_err());
        assert!(Cli::try_parse_from(["ffdowngrade", "/data/db", "--alphabet", "as62"]).is_err());

        let long_about = Cli::command().get_long_about().map(|x| x.to_string()).unwrap_or_default();
        assert!(long_about.contains("only change how much\nis logged"));
    }
}

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

use bstr::BString;

use crate::alphabet::AlphabetType;
use crate::convert::Stage;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while converting a database.
///
/// All variants are fatal for a conversion run.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O error from a reader or writer that is not tied to a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A file could not be opened, read, written or linked.
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line in an .ffindex file is not `name\toffset\tlength`.
    ///
    /// `line` is 1-based.
    #[error("{}:{line}: malformed index line ({reason})", .path.display())]
    MalformedIndex {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// An index entry points past the end of its data file.
    #[error("record {name} (offset {offset}, length {length}) exceeds data file of {size} bytes")]
    OutOfBounds {
        name: BString,
        offset: u64,
        length: u64,
        size: u64,
    },

    /// A payload byte has no symbol in the target alphabet.
    #[error("byte {byte:#04x} has no symbol in the {alphabet} alphabet")]
    OutOfRangeSymbol {
        byte: u8,
        alphabet: AlphabetType,
    },

    /// A mandatory hhblits3 input file does not exist.
    #[error("no such file {}", .0.display())]
    MissingSourceData(PathBuf),

    /// An alias path is taken by a file that is not the alias target.
    #[error("{} exists and is not a link to {}", .alias.display(), .target.display())]
    AliasCollision {
        alias: PathBuf,
        target: PathBuf,
    },

    /// Records can not be wrapped at zero characters per line.
    #[error("line width must be at least 1")]
    ZeroLineWidth,

    /// A stage was run before the stage that produces its input.
    #[error("stage {stage:?} needs {requires:?} to run first")]
    StageOutOfOrder {
        stage: Stage,
        requires: Stage,
    },
}

impl Error {
    /// Wraps `source` with the path it occurred on.
    pub(crate) fn file<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Error::File { path: path.into(), source }
    }
}

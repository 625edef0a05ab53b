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

//! File names of a database on disk.
//!
//! All files of a database share a prefix `{db}`, which is usually the
//! database directory joined with the database name, eg.
//! `/data/UniRef30_2020_01`.
//!
//! | File                  | Contents                                    |
//! |-----------------------|---------------------------------------------|
//! | `{db}_a3m.ffdata`     | hhblits3 alignments                         |
//! | `{db}_a3m.ffindex`    | index of the alignments                     |
//! | `{db}_hhm.ffdata`     | hhblits3 profiles                           |
//! | `{db}_hhm.ffindex`    | index of the profiles                       |
//! | `{db}_cs219.ffdata`   | hhblits3 context states                     |
//! | `{db}_cs219.ffindex`  | index of the context states                 |
//! | `{db}_a3m_db`         | hhblits2 name for the alignments (link)     |
//! | `{db}_a3m_db.index`   | hhblits2 index of the alignments            |
//! | `{db}_hhm_db`         | hhblits2 name for the profiles (link)       |
//! | `{db}_hhm_db.index`   | hhblits2 index of the profiles              |
//! | `{db}.cs219`          | hhblits2 context states                     |
//! | `{db}.cs219.sizes`    | record count and total length of `.cs219`   |
//!

use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;

/// The three tables of a hhblits3 database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subtable {
    /// Multiple sequence alignments (`a3m`).
    Alignment,
    /// Profile HMMs (`hhm`).
    Profile,
    /// Context-state sequences (`cs219`).
    CompactProfile,
}

impl Subtable {
    pub fn tag(&self) -> &'static str {
        match self {
            Subtable::Alignment => "a3m",
            Subtable::Profile => "hhm",
            Subtable::CompactProfile => "cs219",
        }
    }
}

impl std::fmt::Display for Subtable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// Paths of every input and output file of the database at `prefix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbLayout {
    prefix: PathBuf,
}

impl DbLayout {
    pub fn new<P: Into<PathBuf>>(prefix: P) -> Self {
        DbLayout { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    // Appends to the raw prefix so that non-UTF-8 prefixes survive.
    fn with_suffix(&self, suffix: &str) -> PathBuf {
        let mut path: OsString = self.prefix.as_os_str().to_owned();
        path.push(suffix);
        PathBuf::from(path)
    }

    /// `{db}_{tag}.ffdata`
    pub fn ffdata(&self, table: Subtable) -> PathBuf {
        self.with_suffix(&format!("_{}.ffdata", table.tag()))
    }

    /// `{db}_{tag}.ffindex`
    pub fn ffindex(&self, table: Subtable) -> PathBuf {
        self.with_suffix(&format!("_{}.ffindex", table.tag()))
    }

    /// `{db}_{tag}_db`
    pub fn alias(&self, table: Subtable) -> PathBuf {
        self.with_suffix(&format!("_{}_db", table.tag()))
    }

    /// `{db}_{tag}_db.index`
    pub fn alias_index(&self, table: Subtable) -> PathBuf {
        self.with_suffix(&format!("_{}_db.index", table.tag()))
    }

    /// `{db}.cs219`
    pub fn legacy_data(&self) -> PathBuf {
        self.with_suffix(".cs219")
    }

    /// `{db}.cs219.sizes`
    pub fn legacy_sizes(&self) -> PathBuf {
        self.with_suffix(".cs219.sizes")
    }
}

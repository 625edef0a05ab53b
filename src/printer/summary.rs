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
use std::io::Write;
use std::path::Path;

use crate::error::Error;
use crate::error::Result;

/// Contents of a `.cs219.sizes` file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CorpusSummary {
    /// Number of records written.
    pub record_count: u64,
    /// Sum of the payload lengths before transcoding.
    pub total_payload_length: u64,
}

impl CorpusSummary {
    /// Counts one record with `payload_length` states.
    pub fn add(&mut self, payload_length: usize) {
        self.record_count += 1;
        self.total_payload_length += payload_length as u64;
    }

    /// Writes `"{record_count} {total_payload_length}"` without a newline.
    pub fn write_to<W: Write>(&self, conn: &mut W) -> Result<()> {
        write!(conn, "{} {}", self.record_count, self.total_payload_length)?;
        conn.flush()?;
        Ok(())
    }

    /// Parses the contents of a sizes file.
    ///
    /// Accepts any whitespace between and around the two numbers.
    pub fn parse(contents: &str) -> Option<CorpusSummary> {
        let mut fields = contents.split_whitespace();
        let record_count = fields.next()?.parse::<u64>().ok()?;
        let total_payload_length = fields.next()?.parse::<u64>().ok()?;
        if fields.next().is_some() {
            return None;
        }
        Some(CorpusSummary { record_count, total_payload_length })
    }

    /// Reads a sizes file from `path`.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<CorpusSummary> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::file(path, e))?;
        CorpusSummary::parse(&contents).ok_or_else(|| {
            Error::file(path, std::io::Error::new(std::io::ErrorKind::InvalidData, "expected two whitespace-separated integers"))
        })
    }
}

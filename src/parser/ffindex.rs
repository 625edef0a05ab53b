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
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::path::Path;

use bstr::BString;
use bstr::ByteSlice;

use crate::error::Error;
use crate::error::Result;

/// A single line of an .ffindex file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexEntry {
    /// Record name, kept as raw bytes.
    pub name: BString,
    /// Start of the record in the data file.
    pub offset: u64,
    /// Length of the record including its terminator byte.
    pub length: u64,
}

impl IndexEntry {
    pub fn new<N: Into<BString>>(name: N, offset: u64, length: u64) -> Self {
        IndexEntry { name: name.into(), offset, length }
    }

    /// Formats the entry as an index line, including the newline.
    pub fn write_to<W: Write>(&self, conn: &mut W) -> Result<()> {
        conn.write_all(&self.name)?;
        writeln!(conn, "\t{}\t{}", self.offset, self.length)?;
        Ok(())
    }
}

/// Entries of an .ffindex file in file order.
///
/// The order is the order the records are written in when converting, so it
/// is never changed after loading.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IndexStore {
    entries: Vec<IndexEntry>,
}

fn parse_number(
    field: &[u8],
    what: &str,
    path: &Path,
    line: usize,
) -> Result<u64> {
    field.to_str().ok()
         .and_then(|x| x.parse::<u64>().ok())
         .ok_or_else(|| Error::MalformedIndex {
             path: path.to_path_buf(),
             line,
             reason: format!("{} `{}` is not a non-negative integer", what, field.as_bstr()),
         })
}

/// Parses one index line without its newline.
///
/// `line` is the 1-based line number used in error messages.
pub fn parse_line(
    bytes: &[u8],
    path: &Path,
    line: usize,
) -> Result<IndexEntry> {
    let fields: Vec<&[u8]> = bytes.split_str("\t").collect();
    if fields.len() != 3 {
        return Err(Error::MalformedIndex {
            path: path.to_path_buf(),
            line,
            reason: format!("expected 3 tab-separated fields, found {}", fields.len()),
        });
    }
    if fields[0].is_empty() {
        return Err(Error::MalformedIndex { path: path.to_path_buf(), line, reason: "empty record name".to_string() });
    }

    let offset = parse_number(fields[1], "offset", path, line)?;
    let length = parse_number(fields[2], "length", path, line)?;

    Ok(IndexEntry::new(fields[0], offset, length))
}

impl IndexStore {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        IndexStore { entries }
    }

    /// Reads an .ffindex file from `path`.
    ///
    /// Fails with [File](Error::File) if the file can't be read and
    /// [MalformedIndex](Error::MalformedIndex) on the first line that does
    /// not parse.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| Error::file(path, e))?;
        IndexStore::read(path, &mut BufReader::new(f))
    }

    /// Parses index lines from `conn`.
    ///
    /// `path` only labels error messages. The last line may lack its newline.
    pub fn read<R: BufRead>(path: &Path, conn: &mut R) -> Result<Self> {
        let mut entries: Vec<IndexEntry> = Vec::new();
        let mut buf: Vec<u8> = Vec::new();
        let mut line = 0;
        loop {
            buf.clear();
            let n = conn.read_until(b'\n', &mut buf).map_err(|e| Error::file(path, e))?;
            if n == 0 {
                break;
            }
            line += 1;
            if buf.last() == Some(&b'\n') {
                buf.pop();
            }
            entries.push(parse_line(&buf, path, line)?);
        }
        Ok(IndexStore { entries })
    }

    /// Builds a new index with every name passed through `transform`.
    ///
    /// Offsets and lengths are copied unchanged and the data file is not
    /// consulted.
    ///
    /// ## Usage
    ///
    /// ```rust
    /// use ffdowngrade::parser::ffindex::{IndexEntry, IndexStore};
    /// use bstr::BString;
    ///
    /// let store = IndexStore::new(vec![IndexEntry::new("seqA", 0, 12)]);
    /// let derived = store.derive(|name| {
    ///     let mut name = BString::from(name);
    ///     name.extend_from_slice(b".a3m");
    ///     name
    /// });
    ///
    /// assert_eq!(derived.to_bytes(), b"seqA.a3m\t0\t12\n".to_vec());
    /// ```
    pub fn derive<F>(&self, mut transform: F) -> IndexStore
    where
        F: FnMut(&[u8]) -> BString,
    {
        let entries = self.entries.iter().map(|entry| {
            IndexEntry { name: transform(&entry.name), offset: entry.offset, length: entry.length }
        }).collect();
        IndexStore { entries }
    }

    /// Writes one `name\toffset\tlength\n` line per entry.
    pub fn write_to<W: Write>(&self, conn: &mut W) -> Result<()> {
        for entry in &self.entries {
            entry.write_to(conn)?;
        }
        conn.flush()?;
        Ok(())
    }

    /// Serialized index in memory.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = Vec::new();
        for entry in &self.entries {
            bytes.extend_from_slice(&entry.name);
            bytes.extend_from_slice(format!("\t{}\t{}\n", entry.offset, entry.length).as_bytes());
        }
        bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&IndexEntry> {
        self.entries.get(idx)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, IndexEntry> {
        self.entries.iter()
    }

    /// Sum of the record lengths, terminators included.
    pub fn total_length(&self) -> u64 {
        self.entries.iter().map(|entry| entry.length).sum()
    }
}

impl<'a> IntoIterator for &'a IndexStore {
    type Item = &'a IndexEntry;
    type IntoIter = std::slice::Iter<'a, IndexEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Appends `.a3m` to a record name, as hhblits2 expects in its indices.
pub fn a3m_name(name: &[u8]) -> BString {
    let mut renamed = BString::from(name);
    renamed.extend_from_slice(b".a3m");
    renamed
}

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
use std::path::Path;
use std::path::PathBuf;

use bstr::ByteSlice;
use memmap2::Mmap;

use crate::error::Error;
use crate::error::Result;
use crate::parser::ffindex::IndexEntry;

/// Read-only view of an .ffdata file.
///
/// The file is memory mapped, so databases larger than the available memory
/// can be read and slices borrow from the mapping without copying.
pub struct DataAccessor {
    path: PathBuf,
    // None for empty files, which can't be mapped on every platform.
    mmap: Option<Mmap>,
}

impl DataAccessor {
    /// Maps the data file at `path`.
    ///
    /// Fails with [File](Error::File) if the file is missing, unreadable or
    /// not a regular file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file(path, e))?;
        let metadata = file.metadata().map_err(|e| Error::file(path, e))?;
        if !metadata.is_file() {
            return Err(Error::file(path, std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file")));
        }

        let mmap = if metadata.len() == 0 {
            None
        } else {
            // Safety: the database is opened read-only and not modified during a conversion
            Some(unsafe { Mmap::map(&file) }.map_err(|e| Error::file(path, e))?)
        };

        Ok(DataAccessor { path: path.to_path_buf(), mmap })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the data file in bytes.
    pub fn len(&self) -> u64 {
        self.bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Returns `length` bytes starting at `offset`.
    ///
    /// Fails with [OutOfBounds](Error::OutOfBounds) if the range does not fit
    /// in the file.
    pub fn slice(&self, offset: u64, length: u64) -> Result<&[u8]> {
        self.range(b"", offset, length)
    }

    /// Returns the bytes addressed by `entry`, terminator included.
    pub fn slice_entry(&self, entry: &IndexEntry) -> Result<&[u8]> {
        self.range(&entry.name, entry.offset, entry.length)
    }

    fn range(&self, name: &[u8], offset: u64, length: u64) -> Result<&[u8]> {
        let size = self.len();
        match offset.checked_add(length) {
            Some(end) if end <= size => Ok(&self.bytes()[offset as usize..end as usize]),
            _ => Err(Error::OutOfBounds { name: name.into(), offset, length, size }),
        }
    }
}

/// Drops everything up to and including the first newline.
///
/// Returns `record` unchanged if it has no newline.
pub fn strip_header(record: &[u8]) -> &[u8] {
    match record.find_byte(b'\n') {
        Some(pos) => &record[(pos + 1)..],
        None => record,
    }
}

/// Returns the payload of the record addressed by `entry`.
///
/// The last byte of the record is its terminator and is excluded, as is the
/// header line at the start of the record. The payload borrows from
/// `accessor`.
///
/// Fails with [OutOfBounds](Error::OutOfBounds) if the entry does not fit in
/// the data file.
pub fn extract<'a>(
    entry: &IndexEntry,
    accessor: &'a DataAccessor,
) -> Result<&'a [u8]> {
    let record = accessor.slice_entry(entry)?;
    let record = match record.split_last() {
        Some((_terminator, rest)) => rest,
        None => record,
    };
    Ok(strip_header(record))
}

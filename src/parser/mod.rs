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

//! Readers for the hhblits3 ffindex database files.
//!
//! An ffindex database is a pair of files:
//!
//!   - `.ffindex`: one line per record, `name\toffset\tlength\n`, in the
//!     order the records appear in the database.
//!   - `.ffdata`: the concatenated records. Each record starts with a header
//!     line and is followed by a single terminator byte that is counted in
//!     the record length.
//!
//! [IndexStore](ffindex::IndexStore) parses the `.ffindex` file,
//! [DataAccessor](ffdata::DataAccessor) maps the `.ffdata` file and
//! [extract](ffdata::extract) returns the payload of a single record.
//!

pub mod ffdata;
pub mod ffindex;

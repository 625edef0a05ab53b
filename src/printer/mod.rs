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

//! Writers for the hhblits2 database files.
//!
//! hhblits2 reads its context-state database as a single FASTA-like file:
//!
//! ```text
//! >name
//! <transcoded states, wrapped at 100 characters>
//! ```
//!
//! accompanied by a `.sizes` file holding the number of records and the total
//! number of states. [legacy] formats the records and [summary] the sizes
//! file.
//!

pub mod legacy;
pub mod summary;

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

//! ffdowngrade is a library and a command-line client for converting
//! [hhblits](https://github.com/soedinglab/hh-suite) version 3 databases to
//! the layout expected by hhblits version 2.
//!
//! Both versions store their databases as ffindex pairs: a flat `.ffdata`
//! file holding the records and an `.ffindex` file listing the name, offset
//! and length of every record. The two versions differ in how the
//! context-state (cs219) sequences are stored:
//!
//!   - hhblits3 keeps them in `{db}_cs219.ffdata` as raw state indexes, one
//!     byte per residue, with no limit on the sequence length.
//!   - hhblits2 reads `{db}.cs219`, a FASTA-like file where each state is a
//!     printable character of the [CS219](alphabet::CS219) alphabet, wrapped
//!     at 100 characters per line, and `{db}.cs219.sizes`.
//!
//! The alignment and profile tables are shared between the versions. The
//! conversion links them under their hhblits2 names and writes hhblits2
//! indices for them, without copying any data.
//!
//! Note that hhblits2 accepts sequences of at most
//! [32763](printer::legacy::LEGACY_MAX_RESIDUES) residues, whereas hhblits3
//! has no limit. Longer sequences are converted in full but hhblits2 may
//! refuse to search them, so it is safer to search a converted database with
//! hhblits2 first and to fall back to hhblits3 if that fails.
//!
//! ## Usage
//!
//! ### Command line
//!
//! ```text
//! ffdowngrade /data/UniRef30_2020_01
//! ```
//!
//! converts the database with the file prefix `/data/UniRef30_2020_01`. The
//! conversion can be rerun safely: files that already exist are not
//! rewritten.
//!
//! ### Rust API
//!
//!   - [convert_database] converts a whole database with the default options.
//!   - [ConversionDriver](convert::ConversionDriver) runs the conversion
//!     stage by stage with a custom [ConvertConfig](convert::ConvertConfig).
//!   - [IndexStore](parser::ffindex::IndexStore) reads, renames and writes
//!     `.ffindex` files.
//!   - [DataAccessor](parser::ffdata::DataAccessor) and
//!     [extract](parser::ffdata::extract) read single records from a memory
//!     mapped `.ffdata` file.
//!   - [encode_record] and [write_record](printer::legacy::write_record)
//!     format records in the hhblits2 context-state format.
//!
//! See [layout] for the names of the files that are read and written.
//!

pub mod alphabet;
pub mod convert;
pub mod error;
pub mod layout;
pub mod parser;
pub mod printer;

pub use alphabet::AlphabetType;
pub use convert::ConversionDriver;
pub use convert::ConversionReport;
pub use convert::ConvertConfig;
pub use error::Error;
pub use error::Result;
pub use printer::summary::CorpusSummary;

use std::path::Path;

/// Convert the database at prefix `db` with the default options.
///
/// Creates the hhblits2 aliases, indices and context-state files that do not
/// exist yet. Returns what was written.
///
/// ## Errors
///
/// Fails with [MissingSourceData](Error::MissingSourceData) if
/// `{db}_a3m.ffdata` or another input that is needed does not exist. See
/// [Error] for the other failures; all of them abort the conversion.
///
/// ## Usage
///
/// ```rust
/// use ffdowngrade::convert_database;
/// use std::fs;
///
/// let dir = tempfile::tempdir().unwrap();
/// let db = dir.path().join("db");
/// let path = |suffix: &str| dir.path().join(format!("db{}", suffix));
///
/// fs::write(path("_a3m.ffdata"), b">seqA\nMKV\n\0").unwrap();
/// fs::write(path("_a3m.ffindex"), b"seqA\t0\t11\n").unwrap();
/// fs::write(path("_hhm.ffdata"), b"HHsearch 1.5\n\0").unwrap();
/// fs::write(path("_cs219.ffdata"), b">seqA\nABC\0").unwrap();
/// fs::write(path("_cs219.ffindex"), b"seqA\t0\t10\n").unwrap();
///
/// let report = convert_database(&db).unwrap();
///
/// assert_eq!(fs::read(path(".cs219")).unwrap(), b">seqA\nfgh\n".to_vec());
/// assert_eq!(fs::read(path(".cs219.sizes")).unwrap(), b"1 3".to_vec());
/// assert_eq!(fs::read(path("_a3m_db.index")).unwrap(), b"seqA.a3m\t0\t11\n".to_vec());
///
/// // Nothing left to do on a second run
/// assert!(convert_database(&db).unwrap().is_noop());
/// ```
///
pub fn convert_database<P: AsRef<Path>>(db: P) -> Result<ConversionReport> {
    ConversionDriver::new(db.as_ref(), ConvertConfig::default()).run()
}

/// Format a hhblits3 cs219 payload as a hhblits2 record.
///
/// Uses the [CS219](alphabet::CS219) alphabet and the hhblits2 line width.
///
/// ## Usage
///
/// ```rust
/// use ffdowngrade::encode_record;
///
/// let payload = vec![b'A'; 150];
/// let got = encode_record(b"seqB", &payload).unwrap();
///
/// let mut expected: Vec<u8> = b">seqB\n".to_vec();
/// expected.append(&mut vec![b'f'; 100]);
/// expected.push(b'\n');
/// expected.append(&mut vec![b'f'; 50]);
/// expected.push(b'\n');
///
/// assert_eq!(got, expected);
/// ```
///
pub fn encode_record(name: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    printer::legacy::encode(name, payload, AlphabetType::Cs219)
}

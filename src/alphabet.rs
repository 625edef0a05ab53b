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

//! Lookup tables for the context-state alphabets of the legacy format.
//!
//! A hhblits3 cs219 record stores one raw byte per residue, holding the index
//! of the context state. hhblits2 expects the same information as printable
//! characters, where position `i` of the table is the character for state
//! `i`.
//!
//! Three tables exist:
//!
//!   - [AS62](AlphabetType::As62): `0-9A-Za-z`.
//!   - [AS90](AlphabetType::As90): printable ASCII from `!` to `~`, except
//!     `*`, `-`, `.` and `>`, which are reserved by the alignment formats.
//!   - [CS219](AlphabetType::Cs219): AS90 followed by the bytes `0x7F..=0xFF`.
//!
//! Every table ends with three reserved positions (`*`, `-`, `-`) used by
//! hhblits2 as end-of-profile and null placeholders. They are part of the
//! domain but plain transcoding never produces them from real data.
//!

use crate::error::Error;
use crate::error::Result;

/// Reserved trailing positions shared by all tables.
const RESERVED: &[u8; 3] = b"*--";

const fn build_as62() -> [u8; 65] {
    let mut arr = [0u8; 65];
    let mut i = 0;
    let mut c = b'0';
    while c <= b'9' { arr[i] = c; i += 1; c += 1; }
    c = b'A';
    while c <= b'Z' { arr[i] = c; i += 1; c += 1; }
    c = b'a';
    while c <= b'z' { arr[i] = c; i += 1; c += 1; }
    arr[i] = RESERVED[0];
    arr[i + 1] = RESERVED[1];
    arr[i + 2] = RESERVED[2];
    arr
}

// Array starting with the 90 printable symbols, and their count.
const fn with_printable<const N: usize>() -> ([u8; N], usize) {
    let mut arr = [0u8; N];
    let mut i = 0;
    let mut c = b'!';
    while c <= b'~' {
        if c != b'*' && c != b'-' && c != b'.' && c != b'>' {
            arr[i] = c;
            i += 1;
        }
        c += 1;
    }
    (arr, i)
}

const fn build_as90() -> [u8; 93] {
    let (mut arr, i) = with_printable::<93>();
    arr[i] = RESERVED[0];
    arr[i + 1] = RESERVED[1];
    arr[i + 2] = RESERVED[2];
    arr
}

const fn build_cs219() -> [u8; 222] {
    let (mut arr, mut i) = with_printable::<222>();
    let mut b: u16 = 0x7f;
    while b <= 0xff {
        arr[i] = b as u8;
        i += 1;
        b += 1;
    }
    arr[i] = RESERVED[0];
    arr[i + 1] = RESERVED[1];
    arr[i + 2] = RESERVED[2];
    arr
}

/// 62-symbol table.
pub static AS62: [u8; 65] = build_as62();
/// 90-symbol table.
pub static AS90: [u8; 93] = build_as90();
/// 219-symbol table, used for hhblits3 to hhblits2 conversion.
pub static CS219: [u8; 222] = build_cs219();

/// Supported context-state alphabets.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AlphabetType {
    As62,
    As90,
    #[default]
    Cs219,
}

impl AlphabetType {
    /// Number of context-state symbols, excluding the reserved positions.
    pub fn symbols(&self) -> usize {
        match self {
            AlphabetType::As62 => 62,
            AlphabetType::As90 => 90,
            AlphabetType::Cs219 => 219,
        }
    }

    /// The full lookup table, including the reserved positions.
    pub fn table(&self) -> &'static [u8] {
        match self {
            AlphabetType::As62 => &AS62,
            AlphabetType::As90 => &AS90,
            AlphabetType::Cs219 => &CS219,
        }
    }

    /// Returns the character for state `byte`.
    ///
    /// Fails with [OutOfRangeSymbol](Error::OutOfRangeSymbol) if `byte` is
    /// outside `0..self.table().len()`.
    ///
    /// ## Usage
    ///
    /// ```rust
    /// use ffdowngrade::alphabet::AlphabetType;
    ///
    /// assert_eq!(AlphabetType::Cs219.encode_byte(0).unwrap(), b'!');
    /// assert_eq!(AlphabetType::Cs219.encode_byte(90).unwrap(), 0x7f);
    /// assert!(AlphabetType::As62.encode_byte(200).is_err());
    /// ```
    #[inline]
    pub fn encode_byte(&self, byte: u8) -> Result<u8> {
        self.table()
            .get(byte as usize)
            .copied()
            .ok_or(Error::OutOfRangeSymbol { byte, alphabet: *self })
    }

    /// Transcodes every byte of `payload`, appending the result to `out`.
    ///
    /// Stops at the first byte without a symbol; `out` may then hold a
    /// partial result.
    pub fn transcode(&self, payload: &[u8], out: &mut Vec<u8>) -> Result<()> {
        out.reserve(payload.len());
        let table = self.table();
        for &byte in payload {
            let symbol = table
                .get(byte as usize)
                .ok_or(Error::OutOfRangeSymbol { byte, alphabet: *self })?;
            out.push(*symbol);
        }
        Ok(())
    }
}

impl std::fmt::Display for AlphabetType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            AlphabetType::As62 => write!(f, "as62"),
            AlphabetType::As90 => write!(f, "as90"),
            AlphabetType::Cs219 => write!(f, "cs219"),
        }
    }
}

impl std::str::FromStr for AlphabetType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "as62" => Ok(AlphabetType::As62),
            "as90" => Ok(AlphabetType::As90),
            "cs219" => Ok(AlphabetType::Cs219),
            _ => Err(format!("'{}' is not a valid AlphabetType", s)),
        }
    }
}

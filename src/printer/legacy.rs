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

use crate::alphabet::AlphabetType;
use crate::error::Error;
use crate::error::Result;

/// Characters per line in hhblits2 context-state files.
pub const LEGACY_LINE_WIDTH: usize = 100;

/// Longest sequence hhblits2 accepts.
///
/// Longer records are still written; hhblits2 may refuse to search them.
pub const LEGACY_MAX_RESIDUES: usize = 32763;

/// Format a single record in the hhblits2 context-state format
///
/// Writes `>name\n` followed by `payload` transcoded through `alphabet`,
/// with a newline after every `line_width` characters and after the last
/// line. An empty payload produces a single empty line.
///
/// Fails with [ZeroLineWidth](Error::ZeroLineWidth) if `line_width` is 0
/// and with [OutOfRangeSymbol](Error::OutOfRangeSymbol) if a payload byte
/// has no symbol. Bytes before the offending one may already have been
/// written to `conn`.
///
pub fn write_record<W: Write>(
    conn: &mut W,
    name: &[u8],
    payload: &[u8],
    alphabet: AlphabetType,
    line_width: usize,
) -> Result<()> {
    if line_width == 0 {
        return Err(Error::ZeroLineWidth);
    }

    conn.write_all(b">")?;
    conn.write_all(name)?;
    conn.write_all(b"\n")?;

    if payload.is_empty() {
        conn.write_all(b"\n")?;
        return Ok(());
    }

    let mut line: Vec<u8> = Vec::with_capacity(line_width + 1);
    for chunk in payload.chunks(line_width) {
        line.clear();
        alphabet.transcode(chunk, &mut line)?;
        line.push(b'\n');
        conn.write_all(&line)?;
    }

    Ok(())
}

/// Format a single record in memory.
///
/// Same as [write_record] with [LEGACY_LINE_WIDTH].
///
/// ## Usage
///
/// ```rust
/// use ffdowngrade::alphabet::AlphabetType;
/// use ffdowngrade::printer::legacy::encode;
///
/// let got = encode(b"seqA", b"ABCD", AlphabetType::Cs219).unwrap();
/// assert_eq!(got, b">seqA\nfghi\n".to_vec());
/// ```
///
pub fn encode(
    name: &[u8],
    payload: &[u8],
    alphabet: AlphabetType,
) -> Result<Vec<u8>> {
    let n_lines = payload.len().div_ceil(LEGACY_LINE_WIDTH).max(1);
    let mut bytes: Vec<u8> = Vec::with_capacity(name.len() + 2 + payload.len() + n_lines);
    write_record(&mut bytes, name, payload, alphabet, LEGACY_LINE_WIDTH)?;
    Ok(bytes)
}

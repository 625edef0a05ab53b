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

//! End-to-end conversions of small databases written to temporary directories.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ffdowngrade::convert::{ConversionDriver, ConvertConfig, DerivedIndexSource, LinkKind};
use ffdowngrade::layout::{DbLayout, Subtable};
use ffdowngrade::{convert_database, CorpusSummary, Error};

/// Writes an ffindex pair with one `>name\n` header per record.
fn write_ffindex(layout: &DbLayout, table: Subtable, records: &[(&str, &[u8])]) {
    let mut data: Vec<u8> = Vec::new();
    let mut index: Vec<u8> = Vec::new();
    for (name, payload) in records {
        let offset = data.len();
        data.extend_from_slice(format!(">{}\n", name).as_bytes());
        data.extend_from_slice(payload);
        data.push(0);
        index.extend_from_slice(format!("{}\t{}\t{}\n", name, offset, data.len() - offset).as_bytes());
    }
    fs::write(layout.ffdata(table), data).unwrap();
    fs::write(layout.ffindex(table), index).unwrap();
}

/// Creates a complete hhblits3 database at `dir/db`.
fn create_test_db(dir: &Path, cs219: &[(&str, &[u8])]) -> DbLayout {
    let layout = DbLayout::new(dir.join("db"));
    write_ffindex(&layout, Subtable::Alignment, &[("seqA", b"MKVL\n"), ("seqB", b"MKKV\nMKRV\n")]);
    write_ffindex(&layout, Subtable::Profile, &[("seqA", b"HHsearch 1.5\n//\n"), ("seqB", b"HHsearch 1.5\nNAME seqB\n//\n")]);
    write_ffindex(&layout, Subtable::CompactProfile, cs219);
    layout
}

fn two_records() -> Vec<(&'static str, Vec<u8>)> {
    vec![("seqA", b"ABCD".to_vec()), ("seqB", vec![b'A'; 250])]
}

fn as_refs<'a>(records: &'a [(&'static str, Vec<u8>)]) -> Vec<(&'static str, &'a [u8])> {
    records.iter().map(|(name, payload)| (*name, payload.as_slice())).collect()
}

fn dir_listing(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir).unwrap().map(|x| x.unwrap().path()).collect();
    files.sort();
    files
}

#[test]
fn convert_two_records() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    let report = convert_database(layout.prefix()).unwrap();

    let mut expected: Vec<u8> = b">seqA\nfghi\n>seqB\n".to_vec();
    expected.append(&mut vec![b'f'; 100]);
    expected.push(b'\n');
    expected.append(&mut vec![b'f'; 100]);
    expected.push(b'\n');
    expected.append(&mut vec![b'f'; 50]);
    expected.push(b'\n');

    assert_eq!(fs::read(layout.legacy_data()).unwrap(), expected);
    assert_eq!(fs::read(layout.legacy_sizes()).unwrap(), b"2 254".to_vec());
    assert_eq!(report.summary, Some(CorpusSummary { record_count: 2, total_payload_length: 254 }));
    assert_eq!(report.aliases_created.len(), 2);
    assert_eq!(report.indices_written.len(), 2);
    assert_eq!(report.oversize_records, 0);
}

#[cfg(unix)]
#[test]
fn aliases_share_data() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    convert_database(layout.prefix()).unwrap();

    for table in [Subtable::Alignment, Subtable::Profile] {
        let alias = layout.alias(table);
        assert!(alias.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read(&alias).unwrap(), fs::read(layout.ffdata(table)).unwrap());
    }
}

#[cfg(unix)]
#[test]
fn symlink_target_is_sibling_name() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    convert_database(layout.prefix()).unwrap();

    // Relative to the directory of the link, not to the working directory.
    let link = fs::read_link(layout.alias(Subtable::Alignment)).unwrap();

    assert_eq!(link, PathBuf::from("db_a3m.ffdata"));
}

#[test]
fn hard_link_aliases() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    let config = ConvertConfig { link_kind: LinkKind::Hard, ..Default::default() };
    ConversionDriver::new(layout.prefix(), config).run().unwrap();

    let alias = layout.alias(Subtable::Profile);
    assert!(!alias.symlink_metadata().unwrap().file_type().is_symlink());
    assert_eq!(fs::read(&alias).unwrap(), fs::read(layout.ffdata(Subtable::Profile)).unwrap());

    // A second run accepts the hard links as aliases.
    let report = convert_database(layout.prefix()).unwrap();
    assert!(report.is_noop());
}

#[test]
fn derived_indices_reuse_alignment_offsets() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    convert_database(layout.prefix()).unwrap();

    let expected: Vec<u8> = b"seqA.a3m\t0\t12\nseqB.a3m\t12\t17\n".to_vec();
    assert_eq!(fs::read(layout.alias_index(Subtable::Alignment)).unwrap(), expected);
    assert_eq!(fs::read(layout.alias_index(Subtable::Profile)).unwrap(), expected);
}

#[test]
fn derived_profile_index_from_profile_store() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    let config = ConvertConfig { profile_index_source: DerivedIndexSource::Profile, ..Default::default() };
    ConversionDriver::new(layout.prefix(), config).run().unwrap();

    let expected: Vec<u8> = b"seqA.a3m\t0\t23\nseqB.a3m\t23\t33\n".to_vec();
    assert_eq!(fs::read(layout.alias_index(Subtable::Profile)).unwrap(), expected);
}

#[test]
fn second_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    convert_database(layout.prefix()).unwrap();

    let outputs = [
        layout.alias_index(Subtable::Alignment),
        layout.alias_index(Subtable::Profile),
        layout.legacy_data(),
        layout.legacy_sizes(),
    ];
    let before: Vec<(Vec<u8>, std::time::SystemTime)> = outputs.iter().map(|path| {
        (fs::read(path).unwrap(), fs::metadata(path).unwrap().modified().unwrap())
    }).collect();
    let listing = dir_listing(dir.path());

    let driver = ConversionDriver::new(layout.prefix(), ConvertConfig::default());
    assert!(driver.plan().is_complete());
    let report = driver.run().unwrap();

    assert!(report.is_noop());
    assert_eq!(report.summary, None);
    let after: Vec<(Vec<u8>, std::time::SystemTime)> = outputs.iter().map(|path| {
        (fs::read(path).unwrap(), fs::metadata(path).unwrap().modified().unwrap())
    }).collect();
    assert_eq!(before, after);
    assert_eq!(dir_listing(dir.path()), listing);
}

#[test]
fn missing_alignment_data() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    fs::remove_file(layout.ffdata(Subtable::Alignment)).unwrap();
    let listing = dir_listing(dir.path());

    let got = convert_database(layout.prefix());

    match got {
        Err(Error::MissingSourceData(path)) => assert_eq!(path, layout.ffdata(Subtable::Alignment)),
        _ => panic!("expected MissingSourceData"),
    }
    assert_eq!(dir_listing(dir.path()), listing);
}

#[test]
fn missing_compact_profile_index() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    fs::remove_file(layout.ffindex(Subtable::CompactProfile)).unwrap();
    let listing = dir_listing(dir.path());

    let got = convert_database(layout.prefix());

    assert!(matches!(got, Err(Error::MissingSourceData(_))));
    assert_eq!(dir_listing(dir.path()), listing);
}

#[test]
fn alias_collision_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    let alias = layout.alias(Subtable::Alignment);
    fs::write(&alias, b"not an alias").unwrap();

    let got = convert_database(layout.prefix());

    match got {
        Err(Error::AliasCollision { alias: path, target }) => {
            assert_eq!(path, alias);
            assert_eq!(target, layout.ffdata(Subtable::Alignment));
        },
        _ => panic!("expected AliasCollision"),
    }
    assert_eq!(fs::read(&alias).unwrap(), b"not an alias".to_vec());
    assert!(layout.alias(Subtable::Profile).symlink_metadata().is_err());
    assert!(!layout.legacy_data().exists());
}

#[cfg(unix)]
#[test]
fn dangling_alias_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    std::os::unix::fs::symlink("nowhere.ffdata", layout.alias(Subtable::Profile)).unwrap();

    let got = convert_database(layout.prefix());

    assert!(matches!(got, Err(Error::AliasCollision { .. })));
}

#[test]
fn partial_output_is_reencoded() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));

    // Interrupted earlier run: data file present, sizes file missing.
    fs::write(layout.legacy_data(), b">seqA\nfg").unwrap();

    let report = convert_database(layout.prefix()).unwrap();

    assert!(report.summary.is_some());
    let got = fs::read(layout.legacy_data()).unwrap();
    assert!(got.starts_with(b">seqA\nfghi\n>seqB\n"));
    assert_eq!(got.len(), 11 + 6 + 253);
    assert_eq!(fs::read(layout.legacy_sizes()).unwrap(), b"2 254".to_vec());
}

#[test]
fn sizes_without_data_is_reencoded() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    fs::write(layout.legacy_sizes(), b"7 7").unwrap();

    convert_database(layout.prefix()).unwrap();

    assert_eq!(CorpusSummary::read(layout.legacy_sizes()).unwrap(), CorpusSummary { record_count: 2, total_payload_length: 254 });
}

#[test]
fn summary_matches_records() {
    let dir = tempfile::tempdir().unwrap();
    let records: Vec<(String, Vec<u8>)> = (0..57).map(|i| {
        let payload: Vec<u8> = (0..(i * 37 + 1)).map(|x| (x % 219) as u8).collect();
        (format!("UniRef100_{}", i), payload)
    }).collect();
    let refs: Vec<(&str, &[u8])> = records.iter().map(|(name, payload)| (name.as_str(), payload.as_slice())).collect();
    let layout = create_test_db(dir.path(), &refs);

    convert_database(layout.prefix()).unwrap();

    let summary = CorpusSummary::read(layout.legacy_sizes()).unwrap();
    assert_eq!(summary.record_count, 57);
    assert_eq!(summary.total_payload_length, records.iter().map(|(_, x)| x.len() as u64).sum::<u64>());

    // Read the output back as FASTA.
    let mut reader = needletail::parse_fastx_file(layout.legacy_data()).unwrap();
    let mut n_records = 0;
    let mut n_states = 0;
    while let Some(record) = reader.next() {
        let record = record.unwrap();
        assert_eq!(record.id(), records[n_records].0.as_bytes());
        n_states += record.seq().len() as u64;
        n_records += 1;
    }
    assert_eq!(n_records as u64, summary.record_count);
    assert_eq!(n_states, summary.total_payload_length);
}

#[test]
fn out_of_range_symbol_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let layout = create_test_db(dir.path(), &[("seqA", &b"ABCD"[..]), ("bad", &[0, 1, 250][..])]);

    let got = convert_database(layout.prefix());

    assert!(matches!(got, Err(Error::OutOfRangeSymbol { byte: 250, .. })));
    assert!(!layout.legacy_data().exists());
    assert!(!layout.legacy_sizes().exists());
}

#[test]
fn out_of_bounds_entry() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    let mut index = fs::read(layout.ffindex(Subtable::CompactProfile)).unwrap();
    index.extend_from_slice(b"seqC\t200\t1000\n");
    fs::write(layout.ffindex(Subtable::CompactProfile), index).unwrap();

    let got = convert_database(layout.prefix());

    assert!(matches!(got, Err(Error::OutOfBounds { offset: 200, length: 1000, .. })));
    assert!(!layout.legacy_data().exists());
}

#[test]
fn malformed_source_index() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    fs::write(layout.ffindex(Subtable::Alignment), b"seqA\t0\n").unwrap();

    let got = convert_database(layout.prefix());

    assert!(matches!(got, Err(Error::MalformedIndex { line: 1, .. })));
    assert!(!layout.alias_index(Subtable::Alignment).exists());
}

#[test]
fn empty_database() {
    let dir = tempfile::tempdir().unwrap();
    let layout = create_test_db(dir.path(), &[]);

    let report = convert_database(layout.prefix()).unwrap();

    assert_eq!(report.summary, Some(CorpusSummary::default()));
    assert_eq!(fs::read(layout.legacy_data()).unwrap(), Vec::<u8>::new());
    assert_eq!(fs::read(layout.legacy_sizes()).unwrap(), b"0 0".to_vec());
}

#[test]
fn oversize_records_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let long = vec![5_u8; 32764];
    let layout = create_test_db(dir.path(), &[("long", &long[..]), ("short", &b"AB"[..])]);

    let report = convert_database(layout.prefix()).unwrap();

    assert_eq!(report.oversize_records, 1);
    assert_eq!(report.summary.unwrap().total_payload_length, 32766);
}

#[test]
fn step_through_stages() {
    use ffdowngrade::convert::Stage;

    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    convert_database(layout.prefix()).unwrap();
    fs::remove_file(layout.legacy_sizes()).unwrap();

    let mut driver = ConversionDriver::new(layout.prefix(), ConvertConfig::default());
    let mut stages = vec![Stage::CheckPrereqs];
    let mut stage = Stage::CheckPrereqs;
    while stage != Stage::Done {
        stage = driver.step(stage).unwrap();
        stages.push(stage);
    }

    assert_eq!(stages, vec![
        Stage::CheckPrereqs,
        Stage::EnsureAliases,
        Stage::EnsureDerivedIndices,
        Stage::EncodeCorpus,
        Stage::WriteSummary,
        Stage::Done,
    ]);
    assert_eq!(fs::read(layout.legacy_sizes()).unwrap(), b"2 254".to_vec());
}

#[test]
fn zero_line_width_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let records = two_records();
    let layout = create_test_db(dir.path(), &as_refs(&records));
    let listing = dir_listing(dir.path());

    let config = ConvertConfig { line_width: 0, ..Default::default() };
    let got = ConversionDriver::new(layout.prefix(), config).run();

    assert!(matches!(got, Err(Error::ZeroLineWidth)));
    assert_eq!(dir_listing(dir.path()), listing);
}

#[test]
fn summary_before_encoding_is_refused() {
    use ffdowngrade::convert::Stage;

    let dir = tempfile::tempdir().unwrap();
    let layout = create_test_db(dir.path(), &[("seqA", &b"ABCD"[..])]);
    convert_database(layout.prefix()).unwrap();
    fs::remove_file(layout.legacy_sizes()).unwrap();

    let mut driver = ConversionDriver::new(layout.prefix(), ConvertConfig::default());
    let got = driver.step(Stage::WriteSummary);

    assert!(matches!(got, Err(Error::StageOutOfOrder { stage: Stage::WriteSummary, requires: Stage::EncodeCorpus })));
    assert!(!layout.legacy_sizes().exists());

    let report = convert_database(layout.prefix()).unwrap();
    assert!(!report.is_noop());
    assert_eq!(fs::read(layout.legacy_sizes()).unwrap(), b"1 4".to_vec());
}

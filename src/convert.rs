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

//! Conversion of a whole database.
//!
//! [ConversionDriver] walks through the [Stage]s of a conversion:
//!
//! ```text
//! CheckPrereqs -> EnsureAliases -> EnsureDerivedIndices -> EncodeCorpus -> WriteSummary -> Done
//!                                                      \-> SkipEncode ------------------> Done
//! ```
//!
//! Each stage only acts on artifacts that are missing, so running the
//! conversion again on a converted database does not write anything.
//!
//! ## Known approximation
//!
//! By default the hhblits2 profile index `{db}_hhm_db.index` is derived from
//! the *alignment* index `{db}_a3m.ffindex`, not from the profile index. The
//! offsets therefore address the alignment records. This matches the
//! databases produced by earlier conversion tools and is kept for
//! compatibility; use [DerivedIndexSource::Profile] to derive it from
//! `{db}_hhm.ffindex` instead.
//!

use std::fs;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use crate::alphabet::AlphabetType;
use crate::error::Error;
use crate::error::Result;
use crate::layout::DbLayout;
use crate::layout::Subtable;
use crate::parser::ffdata::extract;
use crate::parser::ffdata::DataAccessor;
use crate::parser::ffindex::a3m_name;
use crate::parser::ffindex::IndexStore;
use crate::printer::legacy::write_record;
use crate::printer::legacy::LEGACY_LINE_WIDTH;
use crate::printer::legacy::LEGACY_MAX_RESIDUES;
use crate::printer::summary::CorpusSummary;

/// Records between two progress messages.
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Subtables that get a hhblits2 alias and index.
const ALIASED: [Subtable; 2] = [Subtable::Alignment, Subtable::Profile];

/// How the hhblits2 alias files point at the hhblits3 data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkKind {
    #[default]
    Symbolic,
    Hard,
}

/// Index used to derive `{db}_hhm_db.index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DerivedIndexSource {
    /// Reuse `{db}_a3m.ffindex`, as earlier conversion tools do.
    #[default]
    Alignment,
    /// Use `{db}_hhm.ffindex`.
    Profile,
}

/// Options for a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub alphabet: AlphabetType,
    pub line_width: usize,
    /// 0 disables progress messages.
    pub progress_interval: usize,
    pub link_kind: LinkKind,
    pub profile_index_source: DerivedIndexSource,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        ConvertConfig {
            alphabet: AlphabetType::Cs219,
            line_width: LEGACY_LINE_WIDTH,
            progress_interval: PROGRESS_INTERVAL,
            link_kind: LinkKind::default(),
            profile_index_source: DerivedIndexSource::default(),
        }
    }
}

/// Whether an output artifact already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactState {
    Present,
    Missing,
}

impl ArtifactState {
    fn of(path: &Path) -> ArtifactState {
        // symlink_metadata so that dangling links count as present
        if path.symlink_metadata().is_ok() {
            ArtifactState::Present
        } else {
            ArtifactState::Missing
        }
    }

    pub fn is_missing(&self) -> bool {
        *self == ArtifactState::Missing
    }
}

/// State of every output artifact before a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub aliases: Vec<(Subtable, ArtifactState)>,
    pub indices: Vec<(Subtable, ArtifactState)>,
    pub legacy_data: ArtifactState,
    pub legacy_sizes: ArtifactState,
}

impl Plan {
    /// The context states are (re)encoded unless both outputs exist.
    pub fn encode_needed(&self) -> bool {
        self.legacy_data.is_missing() || self.legacy_sizes.is_missing()
    }

    /// True if a run would not write anything.
    pub fn is_complete(&self) -> bool {
        !self.encode_needed()
            && self.aliases.iter().all(|(_, state)| !state.is_missing())
            && self.indices.iter().all(|(_, state)| !state.is_missing())
    }
}

/// Steps of a conversion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CheckPrereqs,
    EnsureAliases,
    EnsureDerivedIndices,
    EncodeCorpus,
    SkipEncode,
    WriteSummary,
    Done,
}

/// What a conversion run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Alias files created in this run.
    pub aliases_created: Vec<PathBuf>,
    /// hhblits2 indices written in this run.
    pub indices_written: Vec<PathBuf>,
    /// Set if the context states were encoded in this run.
    pub summary: Option<CorpusSummary>,
    /// Encoded records longer than [LEGACY_MAX_RESIDUES].
    pub oversize_records: u64,
}

impl ConversionReport {
    /// True if the run did not write anything.
    pub fn is_noop(&self) -> bool {
        self.aliases_created.is_empty() && self.indices_written.is_empty() && self.summary.is_none()
    }
}

/// Converts one hhblits3 database to the hhblits2 layout.
///
/// ## Usage
///
/// ```rust,no_run
/// use ffdowngrade::convert::{ConversionDriver, ConvertConfig};
///
/// let driver = ConversionDriver::new("/data/UniRef30_2020_01", ConvertConfig::default());
/// let report = driver.run().unwrap();
///
/// if let Some(summary) = report.summary {
///     println!("{} records, {} states", summary.record_count, summary.total_payload_length);
/// }
/// ```
pub struct ConversionDriver {
    layout: DbLayout,
    config: ConvertConfig,
    plan: Plan,
    report: ConversionReport,
}

impl ConversionDriver {
    pub fn new<P: Into<PathBuf>>(db: P, config: ConvertConfig) -> Self {
        let layout = DbLayout::new(db);
        let plan = plan_for(&layout);
        ConversionDriver { layout, config, plan, report: ConversionReport::default() }
    }

    pub fn layout(&self) -> &DbLayout {
        &self.layout
    }

    /// Artifact states observed when the driver was created.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Runs every stage until [Stage::Done].
    ///
    /// Stops at the first error; files written by earlier stages are kept.
    pub fn run(mut self) -> Result<ConversionReport> {
        self.plan = plan_for(&self.layout);
        let mut stage = Stage::CheckPrereqs;
        while stage != Stage::Done {
            log::debug!("{}: {:?}", self.layout.prefix().display(), stage);
            stage = self.step(stage)?;
        }
        Ok(self.report)
    }

    /// Runs `stage` and returns the next one.
    ///
    /// [Stage::WriteSummary] fails with
    /// [StageOutOfOrder](Error::StageOutOfOrder) unless [Stage::EncodeCorpus]
    /// has run on this driver.
    pub fn step(&mut self, stage: Stage) -> Result<Stage> {
        let next = match stage {
            Stage::CheckPrereqs => {
                self.check_prereqs()?;
                Stage::EnsureAliases
            },
            Stage::EnsureAliases => {
                self.ensure_aliases()?;
                Stage::EnsureDerivedIndices
            },
            Stage::EnsureDerivedIndices => {
                self.ensure_derived_indices()?;
                if self.plan.encode_needed() { Stage::EncodeCorpus } else { Stage::SkipEncode }
            },
            Stage::EncodeCorpus => {
                self.encode_corpus()?;
                Stage::WriteSummary
            },
            Stage::SkipEncode => {
                log::info!("{} and {} exist, skipping encoding",
                           self.layout.legacy_data().display(), self.layout.legacy_sizes().display());
                Stage::Done
            },
            Stage::WriteSummary => {
                self.write_summary()?;
                Stage::Done
            },
            Stage::Done => Stage::Done,
        };
        Ok(next)
    }

    fn profile_index_source(&self) -> Subtable {
        match self.config.profile_index_source {
            DerivedIndexSource::Alignment => Subtable::Alignment,
            DerivedIndexSource::Profile => Subtable::Profile,
        }
    }

    /// Index that `{db}_{table}_db.index` is derived from.
    fn derived_index_source(&self, table: Subtable) -> PathBuf {
        match table {
            Subtable::Profile => self.layout.ffindex(self.profile_index_source()),
            _ => self.layout.ffindex(table),
        }
    }

    fn check_prereqs(&self) -> Result<()> {
        let mut required: Vec<PathBuf> = vec![self.layout.ffdata(Subtable::Alignment)];

        for (table, state) in &self.plan.aliases {
            if state.is_missing() {
                required.push(self.layout.ffdata(*table));
            }
        }
        for (table, state) in &self.plan.indices {
            if state.is_missing() {
                required.push(self.derived_index_source(*table));
            }
        }
        if self.plan.encode_needed() {
            if self.config.line_width == 0 {
                return Err(Error::ZeroLineWidth);
            }
            required.push(self.layout.ffdata(Subtable::CompactProfile));
            required.push(self.layout.ffindex(Subtable::CompactProfile));
        }

        match required.into_iter().find(|path| !path.is_file()) {
            Some(path) => Err(Error::MissingSourceData(path)),
            None => Ok(()),
        }
    }

    fn ensure_aliases(&mut self) -> Result<()> {
        // Validate every existing alias before creating any.
        let mut to_create: Vec<(PathBuf, PathBuf)> = Vec::new();
        for (table, state) in &self.plan.aliases {
            let target = self.layout.ffdata(*table);
            let alias = self.layout.alias(*table);
            match state {
                ArtifactState::Present => {
                    if !is_same_file(&alias, &target).map_err(|e| Error::file(&alias, e))? {
                        return Err(Error::AliasCollision { alias, target });
                    }
                    log::debug!("{} exists", alias.display());
                },
                ArtifactState::Missing => to_create.push((target, alias)),
            }
        }

        for (target, alias) in to_create {
            create_alias(&target, &alias, self.config.link_kind)?;
            log::info!("Linked {} to {}", alias.display(), target.display());
            self.report.aliases_created.push(alias);
        }
        Ok(())
    }

    fn ensure_derived_indices(&mut self) -> Result<()> {
        let missing: Vec<Subtable> = self.plan.indices.iter()
            .filter(|(_, state)| state.is_missing())
            .map(|(table, _)| *table)
            .collect();

        for table in missing {
            let source = self.derived_index_source(table);
            let dest = self.layout.alias_index(table);

            let derived = IndexStore::load(&source)?.derive(a3m_name);
            write_atomic(&dest, |conn| derived.write_to(conn))?;

            log::info!("Wrote {} ({} records from {})", dest.display(), derived.len(), source.display());
            self.report.indices_written.push(dest);
        }
        Ok(())
    }

    fn encode_corpus(&mut self) -> Result<()> {
        let index = IndexStore::load(self.layout.ffindex(Subtable::CompactProfile))?;
        let accessor = DataAccessor::open(self.layout.ffdata(Subtable::CompactProfile))?;
        let dest = self.layout.legacy_data();

        log::info!("Converting {} sequences in total", index.len());

        let alphabet = self.config.alphabet;
        let line_width = self.config.line_width;
        let interval = self.config.progress_interval;

        let mut summary = CorpusSummary::default();
        let mut oversize: u64 = 0;
        write_atomic(&dest, |conn| {
            for entry in &index {
                let payload = extract(entry, &accessor)?;
                if payload.len() > LEGACY_MAX_RESIDUES {
                    oversize += 1;
                    log::debug!("{} has {} states, more than hhblits2 supports", entry.name, payload.len());
                }
                write_record(conn, &entry.name, payload, alphabet, line_width)?;
                summary.add(payload.len());

                if progress_due(summary.record_count, interval) {
                    log::info!("Converting sequence {}", summary.record_count);
                }
            }
            Ok(())
        })?;

        if oversize > 0 {
            log::warn!("{} sequences are longer than {} states and may be rejected by hhblits2", oversize, LEGACY_MAX_RESIDUES);
        }

        self.report.oversize_records = oversize;
        self.report.summary = Some(summary);
        Ok(())
    }

    fn write_summary(&mut self) -> Result<()> {
        let Some(summary) = self.report.summary else {
            return Err(Error::StageOutOfOrder { stage: Stage::WriteSummary, requires: Stage::EncodeCorpus });
        };
        let dest = self.layout.legacy_sizes();
        write_atomic(&dest, |conn| summary.write_to(conn))?;
        log::info!("Wrote {}: {} sequences, {} states", dest.display(), summary.record_count, summary.total_payload_length);
        Ok(())
    }
}

/// Observes the state of every output artifact of `layout`.
pub fn plan_for(layout: &DbLayout) -> Plan {
    Plan {
        aliases: ALIASED.iter().map(|table| (*table, ArtifactState::of(&layout.alias(*table)))).collect(),
        indices: ALIASED.iter().map(|table| (*table, ArtifactState::of(&layout.alias_index(*table)))).collect(),
        legacy_data: ArtifactState::of(&layout.legacy_data()),
        legacy_sizes: ArtifactState::of(&layout.legacy_sizes()),
    }
}

/// True if a progress message is due after `count` records.
fn progress_due(count: u64, interval: usize) -> bool {
    interval > 0 && count % interval as u64 == 0
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Writes `path` through a temporary file in the same directory.
///
/// `path` only appears once `write` has succeeded, so an interrupted run
/// never leaves a truncated file behind.
fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut fs::File>) -> Result<()>,
{
    let dir = parent_dir(path);

    let mut builder = tempfile::Builder::new();
    builder.prefix(".ffdowngrade-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    let mut tmp = builder.tempfile_in(dir).map_err(|e| Error::file(dir, e))?;

    {
        let mut conn = BufWriter::new(tmp.as_file_mut());
        write(&mut conn).map_err(|e| match e {
            Error::Io(source) => Error::file(path, source),
            e => e,
        })?;
        conn.flush().map_err(|e| Error::file(path, e))?;
    }

    tmp.persist(path).map_err(|e| Error::file(path, e.error))?;
    Ok(())
}

/// Target written into a symlink at `alias`.
///
/// Siblings are linked by file name so the link works from any directory.
fn link_target(target: &Path, alias: &Path) -> PathBuf {
    match (target.parent(), alias.parent(), target.file_name()) {
        (Some(a), Some(b), Some(name)) if a == b => PathBuf::from(name),
        _ => target.to_path_buf(),
    }
}

fn create_alias(target: &Path, alias: &Path, kind: LinkKind) -> Result<()> {
    let res = match kind {
        #[cfg(unix)]
        LinkKind::Symbolic => std::os::unix::fs::symlink(link_target(target, alias), alias),
        #[cfg(not(unix))]
        LinkKind::Symbolic => fs::hard_link(target, alias),
        LinkKind::Hard => fs::hard_link(target, alias),
    };
    res.map_err(|e| Error::file(alias, e))
}

/// True if `a` and `b` resolve to the same file.
///
/// A path that does not resolve (eg. a dangling link) is never the same.
fn is_same_file(a: &Path, b: &Path) -> std::io::Result<bool> {
    let resolve = |path: &Path| match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    };
    let (Some(ma), Some(mb)) = (resolve(a)?, resolve(b)?) else {
        return Ok(false);
    };

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        Ok(ma.dev() == mb.dev() && ma.ino() == mb.ino())
    }
    #[cfg(not(unix))]
    {
        let _ = (ma, mb);
        Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
    }
}

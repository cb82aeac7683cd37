//! Drone Pack - Source packaging for local deployments
//!
//! Apps whose repository type is `local` are pushed to the daemon as a gzip
//! compressed tarball of the app directory. This crate builds that tarball:
//!
//! - Entries are stored relative to the source directory, so the archive
//!   root is the app root.
//! - Entries are visited in file-name order, so the same tree always yields
//!   the same entry sequence.
//! - Symlinks are stored as links, never followed.
//! - Version-control directories are skipped by default.

mod error;

pub use error::PackError;

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

/// Path components skipped unless the caller overrides the exclude list
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".hg", ".svn"];

/// Default gzip level
pub const DEFAULT_COMPRESSION: u32 = 6;

/// Packaging options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackOptions {
    /// Path components to leave out of the archive (exact match)
    pub excludes: Vec<String>,

    /// Gzip level, 0 (store) to 9 (best)
    pub compression: u32,

    /// Canonical paths never added, such as the archive being written
    pub skip: Vec<PathBuf>,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            excludes: DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect(),
            compression: DEFAULT_COMPRESSION,
            skip: Vec::new(),
        }
    }
}

impl PackOptions {
    /// Default options plus extra excludes
    pub fn with_excludes<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut options = Self::default();
        for exclude in extra {
            let exclude = exclude.into();
            if !options.excludes.contains(&exclude) {
                options.excludes.push(exclude);
            }
        }
        options
    }

    /// Also leave out `path`, which does not have to exist yet
    pub fn skip_path(mut self, path: &Path) -> Self {
        let path = canonical(path);
        if !self.skip.contains(&path) {
            self.skip.push(path);
        }
        self
    }

    fn is_excluded(&self, entry: &DirEntry, src: &Path, root: &Path) -> bool {
        // The source directory itself is never excluded, whatever its name.
        if entry.depth() == 0 {
            return false;
        }

        let by_name = entry
            .file_name()
            .to_str()
            .map(|name| self.excludes.iter().any(|e| e == name))
            .unwrap_or(false);
        if by_name || self.skip.is_empty() {
            return by_name;
        }

        entry
            .path()
            .strip_prefix(src)
            .map(|relative| self.skip.contains(&root.join(relative)))
            .unwrap_or(false)
    }
}

/// Canonical form of `path`, resolving only the parent when `path` itself
/// does not exist
fn canonical(path: &Path) -> PathBuf {
    if let Ok(path) = path.canonicalize() {
        return path;
    }
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    match (parent.canonicalize(), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

/// Summary of a written archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Number of entries (files, directories, links)
    pub entries: usize,

    /// Number of regular files
    pub files: usize,
}

/// A tarball written to a temporary file
#[derive(Debug)]
pub struct PackedArchive {
    file: NamedTempFile,
    size: u64,
    stats: ArchiveStats,
}

impl PackedArchive {
    /// Location of the temporary archive
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Compressed size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Entry counts
    pub fn stats(&self) -> ArchiveStats {
        self.stats
    }

    /// Reopen the archive for reading from the start
    pub fn reopen(&self) -> Result<File, PackError> {
        Ok(self.file.reopen()?)
    }

    /// Move the archive to a permanent location
    pub fn persist(self, to: impl AsRef<Path>) -> Result<PathBuf, PackError> {
        let to = to.as_ref().to_path_buf();
        self.file
            .persist(&to)
            .map_err(|e| PackError::Io(e.error))?;
        Ok(to)
    }
}

/// Package `src` into a gzip tarball stored in a temporary file
pub fn pack_directory(src: &Path, options: &PackOptions) -> Result<PackedArchive, PackError> {
    pack_into(src, options, NamedTempFile::new()?)
}

/// Package `src` into a temporary file created in `dir`
///
/// Use this when the archive will be persisted next to its final location,
/// so the rename stays on one filesystem. `dir` may lie inside `src`; the
/// temporary file is never added to the archive.
pub fn pack_directory_in(
    src: &Path,
    options: &PackOptions,
    dir: &Path,
) -> Result<PackedArchive, PackError> {
    pack_into(src, options, NamedTempFile::new_in(dir)?)
}

fn pack_into(
    src: &Path,
    options: &PackOptions,
    mut file: NamedTempFile,
) -> Result<PackedArchive, PackError> {
    let options = options.clone().skip_path(file.path());
    let stats = write_archive(src, &options, file.as_file_mut())?;

    let size = file.as_file_mut().seek(SeekFrom::End(0))?;
    file.as_file_mut().seek(SeekFrom::Start(0))?;

    debug!(
        src = %src.display(),
        entries = stats.entries,
        files = stats.files,
        size,
        "Packed source directory"
    );

    Ok(PackedArchive { file, size, stats })
}

/// Write a gzip tarball of `src` into `writer`
pub fn write_archive<W: Write>(
    src: &Path,
    options: &PackOptions,
    writer: W,
) -> Result<ArchiveStats, PackError> {
    if options.compression > 9 {
        return Err(PackError::InvalidCompression(options.compression));
    }
    if !src.is_dir() {
        return Err(PackError::NotADirectory(src.to_path_buf()));
    }

    let root = src.canonicalize()?;
    let encoder = GzEncoder::new(writer, Compression::new(options.compression));
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);

    let mut stats = ArchiveStats {
        entries: 0,
        files: 0,
    };

    let walker = WalkDir::new(src)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !options.is_excluded(e, src, &root));

    for entry in walker {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| PackError::NotADirectory(src.to_path_buf()))?;

        trace!(path = %relative.display(), "Adding entry");
        builder.append_path_with_name(entry.path(), relative)?;

        stats.entries += 1;
        if entry.file_type().is_file() {
            stats.files += 1;
        }
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;

    Ok(stats)
}

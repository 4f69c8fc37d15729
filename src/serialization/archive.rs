//! Archive container: a gzip-compressed tar holding exactly two entries,
//! `_metadata` (class name) and `_obj` (the object record).
//!
//! Writing stages both blobs in a directory at the requested path, packs
//! them into a temporary file next to the target and publishes it with a
//! no-clobber rename. The staging directory is removed on every path out.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tempfile::NamedTempFile;
use tracing::{Level, event};

use crate::core::{BaseError, Result};

pub const METADATA_ENTRY: &str = "_metadata";
pub const OBJECT_ENTRY: &str = "_obj";
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// Handle to a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    path: PathBuf,
}

impl ArchiveHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<BufReader<File>> {
        Ok(BufReader::new(File::open(&self.path)?))
    }

    /// Names of the entries in the archive, in stored order.
    pub fn entry_names(&self) -> Result<Vec<String>> {
        let mut archive = tar::Archive::new(GzDecoder::new(self.open()?));
        let mut names = Vec::new();
        for entry in archive.entries()? {
            names.push(entry?.path()?.to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

impl AsRef<Path> for ArchiveHandle {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// `run1` -> `run1.tar.gz`, next to `run1`.
pub fn archive_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BaseError::InvalidPathType(path.display().to_string()))?;
    let mut archive_name = file_name.to_os_string();
    archive_name.push(ARCHIVE_SUFFIX);
    Ok(path.with_file_name(archive_name))
}

pub(crate) fn write_archive(
    path: &Path,
    metadata: &[u8],
    object: &[u8],
    compression_level: u32,
) -> Result<ArchiveHandle> {
    let target = archive_path(path)?;
    for taken in [path, target.as_path()] {
        if taken.exists() {
            return Err(BaseError::PathAlreadyExists(taken.display().to_string()));
        }
    }
    fs::create_dir(path).map_err(|err| match err.kind() {
        io::ErrorKind::AlreadyExists => BaseError::PathAlreadyExists(path.display().to_string()),
        _ => err.into(),
    })?;
    event!(Level::DEBUG, staging = %path.display(), "staging directory created");

    let packed = pack(path, &target, metadata, object, compression_level);
    let cleaned = fs::remove_dir_all(path);
    settle(packed, cleaned, path)
}

/// Outcome of a write once the staging directory is gone (or not). A
/// published archive is reported even when cleanup failed.
fn settle(
    packed: Result<ArchiveHandle>,
    cleaned: io::Result<()>,
    staging: &Path,
) -> Result<ArchiveHandle> {
    match (packed, cleaned) {
        (Ok(handle), cleaned) => {
            if let Err(err) = cleaned {
                event!(
                    Level::WARN,
                    staging = %staging.display(),
                    error = %err,
                    "staging directory left behind"
                );
            }
            event!(Level::DEBUG, archive = %handle.path().display(), "archive published");
            Ok(handle)
        }
        (Err(err), _) => Err(err),
    }
}

fn pack(
    staging: &Path,
    target: &Path,
    metadata: &[u8],
    object: &[u8],
    compression_level: u32,
) -> Result<ArchiveHandle> {
    fs::write(staging.join(METADATA_ENTRY), metadata)?;
    fs::write(staging.join(OBJECT_ENTRY), object)?;

    let parent = target
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let temp = NamedTempFile::new_in(parent)?;
    let encoder = GzEncoder::new(temp, Compression::new(compression_level));
    let mut builder = tar::Builder::new(encoder);
    for entry in [METADATA_ENTRY, OBJECT_ENTRY] {
        builder.append_path_with_name(staging.join(entry), entry)?;
    }
    let temp = builder.into_inner()?.finish()?;
    temp.as_file().sync_all()?;

    temp.persist_noclobber(target).map_err(|err| match err.error.kind() {
        io::ErrorKind::AlreadyExists => BaseError::PathAlreadyExists(target.display().to_string()),
        _ => BaseError::Archive(err.error.to_string()),
    })?;
    Ok(ArchiveHandle::new(target))
}

/// Raw `_metadata` and `_obj` blobs of an archive.
pub(crate) struct ArchiveContents {
    pub metadata: Vec<u8>,
    pub object: Vec<u8>,
}

pub(crate) fn read_archive<R: Read>(reader: R) -> Result<ArchiveContents> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    let mut metadata = None;
    let mut object = None;
    for entry in archive.entries()? {
        let mut entry = entry?;
        let name = entry.path()?.to_string_lossy().into_owned();
        let slot = match name.as_str() {
            METADATA_ENTRY => &mut metadata,
            OBJECT_ENTRY => &mut object,
            _ => continue,
        };
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf)?;
        *slot = Some(buf);
    }
    let missing = |entry: &str| BaseError::Archive(format!("archive has no '{entry}' entry"));
    Ok(ArchiveContents {
        metadata: metadata.ok_or_else(|| missing(METADATA_ENTRY))?,
        object: object.ok_or_else(|| missing(OBJECT_ENTRY))?,
    })
}

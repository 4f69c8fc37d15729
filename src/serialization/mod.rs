//! Save/load of base objects.
//!
//! `save(None, ..)` returns the class name and an in-memory blob;
//! `save(Some(path), ..)` writes a `<path>.tar.gz` archive. Blobs are
//! self-describing, so loaders never need the format passed back in.

pub mod archive;
pub mod format;
pub mod record;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::Compression;
use tracing::{Level, event, info_span};

use crate::core::{BaseError, Result};
use crate::object::BaseObject;

pub use archive::{ARCHIVE_SUFFIX, ArchiveHandle, METADATA_ENTRY, OBJECT_ENTRY, archive_path};
pub use format::SerializationFormat;
pub use record::{ArchiveMetadata, ObjectRecord};

// ============================================================================
// Options and results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    pub format: SerializationFormat,
    /// gzip level for archives, 0-9
    pub compression_level: u32,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self {
            format: SerializationFormat::default(),
            compression_level: Compression::default().level(),
        }
    }

    /// Set the codec
    pub fn format(mut self, format: SerializationFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the gzip compression level, clamped to 9
    pub fn compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory result of `save(None, ..)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedObject {
    pub class: String,
    pub format: SerializationFormat,
    pub bytes: Vec<u8>,
}

impl SerializedObject {
    pub fn load(&self) -> Result<Box<dyn BaseObject>> {
        load_from_serial(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Serial(SerializedObject),
    Archive(ArchiveHandle),
}

impl Saved {
    pub fn as_serial(&self) -> Option<&SerializedObject> {
        match self {
            Self::Serial(serial) => Some(serial),
            Self::Archive(_) => None,
        }
    }

    pub fn into_serial(self) -> Option<SerializedObject> {
        match self {
            Self::Serial(serial) => Some(serial),
            Self::Archive(_) => None,
        }
    }

    pub fn as_archive(&self) -> Option<&ArchiveHandle> {
        match self {
            Self::Archive(handle) => Some(handle),
            Self::Serial(_) => None,
        }
    }
}

// ============================================================================
// Save / load
// ============================================================================

pub fn save_object(
    object: &dyn BaseObject,
    path: Option<&Path>,
    options: &SaveOptions,
) -> Result<Saved> {
    let class = object.class().name();
    let span = info_span!("estibase.save", class = %class, format = %options.format);
    let _enter = span.enter();

    options.format.ensure_available()?;
    if let Some(path) = path {
        archive_path(path)?;
    }

    let record = ObjectRecord::capture(object)?;
    let bytes = format::encode(options.format, &record)?;

    let Some(path) = path else {
        event!(Level::DEBUG, bytes = bytes.len(), "object serialized in memory");
        return Ok(Saved::Serial(SerializedObject {
            class: class.to_string(),
            format: options.format,
            bytes,
        }));
    };

    let metadata = format::encode(options.format, &ArchiveMetadata::for_class(class))?;
    let handle = archive::write_archive(path, &metadata, &bytes, options.compression_level)
        .inspect_err(|err| event!(Level::ERROR, error = %err, "archive write failed"))?;
    Ok(Saved::Archive(handle))
}

/// Inverse of `save(None, ..)`.
pub fn load_from_serial(bytes: &[u8]) -> Result<Box<dyn BaseObject>> {
    let span = info_span!("estibase.load_from_serial", bytes = bytes.len());
    let _enter = span.enter();

    let (format, record): (_, ObjectRecord) = format::decode(bytes)?;
    event!(Level::DEBUG, class = %record.class, format = %format, "record decoded");
    record.restore()
}

/// Loads an archive written by `save(Some(path), ..)`.
pub fn load_from_path(path: &Path) -> Result<Box<dyn BaseObject>> {
    let span = info_span!("estibase.load_from_path", path = %path.display());
    let _enter = span.enter();

    let file = File::open(path)?;
    load_from_reader(BufReader::new(file))
}

/// Loads from any reader positioned at the start of an archive.
pub fn load_from_reader<R: Read>(reader: R) -> Result<Box<dyn BaseObject>> {
    let contents = archive::read_archive(reader)?;
    let (_, metadata): (_, ArchiveMetadata) = format::decode(&contents.metadata)?;
    let (_, record): (_, ObjectRecord) = format::decode(&contents.object)?;
    if metadata.class != record.class {
        return Err(BaseError::TypeMismatch(format!(
            "archive metadata names {} but the stored object is {}",
            metadata.class, record.class
        )));
    }
    event!(Level::DEBUG, class = %record.class, "archive decoded");
    record.restore()
}

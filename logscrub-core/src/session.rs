//! session.rs - Scoped, read-write memory mapping of a single file.
//!
//! A [`MappedFile`] owns both the descriptor and the mapping. Dropping it
//! unmaps and closes, so every exit path of a pass releases its resources.
//!
//! License: MIT OR APACHE 2.0

use std::fs::{File, OpenOptions};
use std::ops::Range;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use memmap2::{MmapMut, MmapOptions};

use crate::engine::RedactionEngine;
use crate::errors::{ScrubError, Stage};
use crate::region::{check_range, overwrite_range, ByteRegion};
use crate::result::RedactionResult;

/// A read-write view over a file's bytes, sized to the file's length at open.
///
/// An empty file has no mapping; it behaves as a zero-length region.
#[derive(Debug)]
pub struct MappedFile {
    path: PathBuf,
    map: Option<MmapMut>,
    _file: File,
}

/// Opens files for mapped, in-place redaction.
pub struct FileSession;

impl FileSession {
    /// Maps `path` read-write with a shared mapping, so overwrites reach the file.
    pub fn open(path: impl AsRef<Path>) -> Result<MappedFile, ScrubError> {
        let path = path.as_ref().to_path_buf();

        if usize::BITS < 64 {
            return Err(ScrubError::UnsupportedPlatform {
                path,
                reason: format!("a 64-bit address space is required, this process has {} bits", usize::BITS),
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| ScrubError::io(Stage::Open, &path, e))?;
        let metadata = file.metadata().map_err(|e| ScrubError::io(Stage::Open, &path, e))?;
        if !metadata.is_file() {
            return Err(ScrubError::NotSeekable { path });
        }
        let len = usize::try_from(metadata.len()).map_err(|_| ScrubError::UnsupportedPlatform {
            path: path.clone(),
            reason: format!("file length {} exceeds the addressable range", metadata.len()),
        })?;

        let map = if len == 0 {
            None
        } else {
            // SAFETY: the mapping lives no longer than `_file`, and the pass that
            // owns this value is the only writer. Other processes truncating the
            // file underneath us is outside what this tool can guard against.
            let map = unsafe { MmapOptions::new().len(len).map_mut(&file) }
                .map_err(|e| ScrubError::io(Stage::Map, &path, e))?;
            Some(map)
        };

        debug!("Mapped {} ({} bytes) for redaction.", path.display(), len);
        Ok(MappedFile { path, map, _file: file })
    }

    /// Opens `path`, hands the mapping to `work`, then releases it.
    ///
    /// On success the mapping gets a final flush before it is closed. On
    /// failure it is dropped as is and the error from `work` is returned.
    pub fn with_mapped<T, F>(path: impl AsRef<Path>, work: F) -> Result<T, ScrubError>
    where
        F: FnOnce(&mut MappedFile) -> Result<T, ScrubError>,
    {
        let mut mapped = Self::open(path)?;
        match work(&mut mapped) {
            Ok(value) => {
                mapped.close()?;
                Ok(value)
            }
            Err(e) => {
                warn!("Redaction of {} aborted: {}", mapped.path().display(), e);
                Err(e)
            }
        }
    }

    /// Runs one complete pass over `path`: open, redact, close.
    ///
    /// The mapping is released whether the engine succeeds or fails.
    pub fn redact(path: impl AsRef<Path>, engine: &RedactionEngine<'_>) -> Result<RedactionResult, ScrubError> {
        Self::with_mapped(path, |mapped| {
            let source_id = mapped.path().display().to_string();
            engine.redact(mapped, &source_id)
        })
    }
}

impl MappedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Flushes any remaining dirty pages, then unmaps and closes the file.
    pub fn close(mut self) -> Result<(), ScrubError> {
        if let Some(map) = self.map.take() {
            map.flush().map_err(|e| ScrubError::io(Stage::Flush, &self.path, e))?;
        }
        debug!("Released mapping of {}.", self.path.display());
        Ok(())
    }
}

impl ByteRegion for MappedFile {
    fn len(&self) -> usize {
        self.bytes().len()
    }

    fn read(&self, range: Range<usize>) -> Result<&[u8], ScrubError> {
        let bytes = self.bytes();
        check_range(&range, bytes.len())?;
        Ok(&bytes[range])
    }

    fn overwrite(&mut self, offset: usize, bytes: &[u8]) -> Result<(), ScrubError> {
        let len = self.len();
        let range = overwrite_range(offset, bytes.len(), len)?;
        match self.map.as_mut() {
            Some(map) => {
                map[range].copy_from_slice(bytes);
                Ok(())
            }
            // Only an empty overwrite can pass the range check on an empty file.
            None => Ok(()),
        }
    }

    fn flush_range(&mut self, range: Range<usize>) -> Result<(), ScrubError> {
        check_range(&range, self.len())?;
        match self.map.as_ref() {
            Some(map) if !range.is_empty() => map
                .flush_range(range.start, range.end - range.start)
                .map_err(|e| ScrubError::io(Stage::Flush, &self.path, e)),
            _ => Ok(()),
        }
    }
}

//! archive.rs - gzip decompression and recompression around a redaction pass.
//!
//! Redaction needs a plain file on disk to map, so each archive is inflated
//! next to itself, redacted, and deflated again under a distinct suffix. The
//! original archive is never written to.
//!
//! License: MIT OR APACHE 2.0

use std::ffi::OsString;
use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, warn};

use crate::errors::{ScrubError, Stage};

/// Inflates `archive` (which must end in `.gz`) to the same path without the extension.
///
/// Fails if that path already exists, so a file not created by this pass is
/// never truncated. Permissions, timestamps and, where permitted, ownership of
/// the archive are copied to the decompressed file.
pub fn decompress(archive: &Path) -> Result<PathBuf, ScrubError> {
    let failure = |source: io::Error| ScrubError::DecompressionFailure {
        path: archive.to_path_buf(),
        source,
    };

    let Some(target) = decompressed_path(archive) else {
        return Err(failure(io::Error::new(
            io::ErrorKind::InvalidInput,
            "expected a file with a .gz extension",
        )));
    };

    debug!("Decompressing {} to {}", archive.display(), target.display());
    let input = File::open(archive).map_err(failure)?;
    let mut decoder = MultiGzDecoder::new(BufReader::new(input));
    let output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(failure)?;
    let mut writer = BufWriter::new(output);
    io::copy(&mut decoder, &mut writer).map_err(failure)?;
    let output = writer.into_inner().map_err(|e| failure(e.into_error()))?;
    output.sync_all().map_err(failure)?;
    drop(output);

    copy_metadata(archive, &target).map_err(failure)?;
    Ok(target)
}

/// Deflates `file` into `<file><suffix>` and returns the archive path.
///
/// Fails if the output already exists. Metadata of `file` is copied onto the
/// archive. Unless `keep_source` is set, `file` is removed afterwards.
pub fn compress(file: &Path, suffix: &str, level: u32, keep_source: bool) -> Result<PathBuf, ScrubError> {
    let target = with_suffix(file, suffix);
    let failure = |source: io::Error| ScrubError::io(Stage::Compress, &target, source);

    debug!("Compressing {} to {}", file.display(), target.display());
    let mut input = BufReader::new(File::open(file).map_err(|e| ScrubError::io(Stage::Compress, file, e))?);
    let output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
        .map_err(failure)?;
    let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::new(level));
    io::copy(&mut input, &mut encoder).map_err(failure)?;
    let mut writer = encoder.finish().map_err(failure)?;
    writer.flush().map_err(failure)?;
    let output = writer.into_inner().map_err(|e| failure(e.into_error()))?;
    output.sync_all().map_err(failure)?;
    drop(output);

    copy_metadata(file, &target).map_err(failure)?;
    if !keep_source {
        fs::remove_file(file).map_err(|e| ScrubError::io(Stage::Compress, file, e))?;
    }
    Ok(target)
}

/// Where [`decompress`] writes `archive`: `app.log.gz` -> `app.log`.
///
/// `None` unless the extension is `gz` (in any case).
pub fn decompressed_path(archive: &Path) -> Option<PathBuf> {
    let is_gz = archive
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    is_gz.then(|| archive.with_extension(""))
}

/// `app.log` + `.audit` -> `app.log.audit`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Copies permissions and access/modification times, plus ownership on Unix.
fn copy_metadata(from: &Path, to: &Path) -> io::Result<()> {
    let meta = fs::metadata(from)?;
    fs::set_permissions(to, meta.permissions())?;

    let mut times = FileTimes::new().set_modified(meta.modified()?);
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    // Some platforms refuse to set times on a read-only handle.
    let file = OpenOptions::new().write(true).open(to).or_else(|_| File::open(to))?;
    file.set_times(times)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;
        if let Err(e) = std::os::unix::fs::chown(to, Some(meta.uid()), Some(meta.gid())) {
            warn!("Could not copy ownership of {} to {}: {}", from.display(), to.display(), e);
        }
    }
    Ok(())
}

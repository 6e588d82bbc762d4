//! Packaging of a clone directory into a gzip-compressed tarball.
//!
//! Entries are stored relative to the packaged directory (`bin/nodenv`,
//! `plugins/node-build/...`), so extracting with `tar -xzf <archive> -C <dest>`
//! places the tool's own files directly under `<dest>`.

use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::path::Path;
use tar::Builder;
use tracing::debug;

use crate::{Error, Result};

/// Write `archive_path` as a `.tar.gz` of everything under `src_dir`.
///
/// An existing file at `archive_path` is removed first. Symlinks are stored
/// as links rather than followed.
///
/// # Errors
///
/// Returns an error if `src_dir` is not a directory or any file cannot be
/// read or written.
pub fn create_tar_gz(src_dir: &Path, archive_path: &Path) -> Result<()> {
    if !src_dir.is_dir() {
        return Err(Error::archive(src_dir, "source is not a directory"));
    }

    remove_existing(archive_path)?;

    let file = File::create(archive_path)
        .map_err(|e| Error::io(e, Some(archive_path.to_path_buf()), "create archive"))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);
    builder.follow_symlinks(false);

    builder
        .append_dir_all(".", src_dir)
        .map_err(|e| Error::archive(src_dir, e.to_string()))?;

    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| Error::archive(archive_path, e.to_string()))?;

    debug!(src = ?src_dir, archive = ?archive_path, "Archive written");
    Ok(())
}

/// Remove a stale archive if one is present.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub fn remove_existing(archive_path: &Path) -> Result<()> {
    match std::fs::remove_file(archive_path) {
        Ok(()) => {
            debug!(archive = ?archive_path, "Removed stale archive");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(
            e,
            Some(archive_path.to_path_buf()),
            "remove stale archive",
        )),
    }
}

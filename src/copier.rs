//! Tree copier: mirrors a local directory into a [`RemoteStore`].
//!
//! The walk is depth-first and pre-order. A directory is created remotely
//! before any of its children are looked at; files are uploaded into their
//! parent's remote path. The first error stops the walk and is returned as
//! is. Nothing already created remotely is undone.

use crate::error::{Error, Result};
use crate::store::{remote_join, RemoteStore};
use log::{debug, warn};
use std::fs::{self, FileType};
use std::path::{Component, Path, PathBuf};

/// What the copier does with a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Recursed into.
    Directory,
    /// Uploaded.
    RegularFile,
    /// Symlinks, sockets, devices, fifos: skipped without a remote call.
    Other,
}

impl EntryKind {
    /// Classify from the entry's own type. Symlinks are not followed, so a
    /// link to a directory is still `Other`.
    pub fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::RegularFile
        } else {
            EntryKind::Other
        }
    }
}

/// Counts gathered during a copy, for reporting only.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    pub directories: usize,
    pub files: usize,
    pub skipped: usize,
}

/// Copy the directory at `local` to `remote` (relative to the store root).
pub fn copy_tree<S>(local: &Path, store: &S, remote: &str) -> Result<CopySummary>
where
    S: RemoteStore + ?Sized,
{
    let mut summary = CopySummary::default();
    copy_dir(local, store, remote, &mut summary)?;
    Ok(summary)
}

fn copy_dir<S>(local: &Path, store: &S, remote: &str, summary: &mut CopySummary) -> Result<()>
where
    S: RemoteStore + ?Sized,
{
    debug!("mkdir {} (from {})", remote, local.display());
    store.create_directory(remote)?;
    summary.directories += 1;

    let entries = fs::read_dir(local).map_err(|e| Error::io(local, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(local, e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| Error::io(&path, e))?;

        match EntryKind::from_file_type(file_type) {
            EntryKind::Directory => {
                let name = entry_name(&path)?;
                copy_dir(&path, store, &remote_join(remote, name), summary)?;
            }
            EntryKind::RegularFile => {
                let name = entry_name(&path)?;
                debug!("upload {} into {}", path.display(), remote);
                store.upload_file(&path, remote, name)?;
                summary.files += 1;
            }
            EntryKind::Other => {
                warn!("Skipping {} (not a regular file or directory)", path.display());
                summary.skipped += 1;
            }
        }
    }
    Ok(())
}

fn entry_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| Error::NonUtf8Name(path.to_path_buf()))
}

/// Remote directory name for the copy: the base name of `local`.
///
/// `.` components and trailing separators are ignored. When the path has no
/// usable base name of its own (`.`, `..`, `/`), the canonical path is used
/// instead, so copying `.` uses the current directory's name.
pub fn remote_root_for(local: &Path) -> Result<String> {
    let normalized: PathBuf = local
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let base = match normalized.components().next_back() {
        Some(Component::Normal(name)) => Some(name.to_os_string()),
        _ => {
            let canonical = fs::canonicalize(local).map_err(|e| Error::io(local, e))?;
            canonical.file_name().map(|n| n.to_os_string())
        }
    };

    let base = base.ok_or_else(|| {
        Error::io(
            local,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no base name"),
        )
    })?;
    base.into_string()
        .map_err(|_| Error::NonUtf8Name(local.to_path_buf()))
}

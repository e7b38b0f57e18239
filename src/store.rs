//! Remote storage adapter.
//!
//! [`RemoteStore`] is the two-operation contract the tree copier needs:
//! create a directory, upload a byte stream. [`AgaveStore`] satisfies it
//! with an [`AgaveSession`], scoping every call under a fixed root path on a
//! fixed storage system. Tests substitute their own implementation.

use crate::api::AgaveSession;
use crate::config::{AgaveEnv, Credentials, StorageTarget};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub trait RemoteStore {
    /// Create `path` (relative to the store's root). No existence check is
    /// made first; conflicts are whatever the backend says they are.
    fn create_directory(&self, path: &str) -> Result<()>;

    /// Send everything `reader` yields as `filename` inside `dest_path`.
    fn upload_reader(&self, reader: Box<dyn Read + Send>, dest_path: &str, filename: &str)
        -> Result<()>;

    /// Open `file_path` for reading and hand it to [`upload_reader`].
    /// The handle is owned by the reader, so it is closed whether the
    /// upload succeeds or fails.
    ///
    /// [`upload_reader`]: RemoteStore::upload_reader
    fn upload_file(&self, file_path: &Path, dest_path: &str, filename: &str) -> Result<()> {
        let file = File::open(file_path).map_err(|e| Error::io(file_path, e))?;
        self.upload_reader(Box::new(file), dest_path, filename)
    }
}

/// Join two remote path pieces with exactly one `/`.
///
/// Trailing slashes on `base` and leading slashes on `name` are stripped
/// first; if either side is then empty the other is returned unchanged.
/// Both directory creation and uploads go through this, so the two always
/// agree on what a path looks like.
pub fn remote_join(base: &str, name: &str) -> String {
    let base = base.trim_end_matches('/');
    let name = name.trim_start_matches('/');
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => base.to_string(),
        _ => format!("{}/{}", base, name),
    }
}

/// Adapter writing into `target.root_path` on `target.system_id`.
pub struct AgaveStore {
    session: AgaveSession,
    target: StorageTarget,
}

impl AgaveStore {
    pub fn new(session: AgaveSession, target: StorageTarget) -> Self {
        AgaveStore { session, target }
    }

    /// Log in and build the adapter in one step.
    pub fn connect(env: &AgaveEnv, target: StorageTarget, credentials: &Credentials) -> Result<Self> {
        let session = AgaveSession::login(env, credentials)?;
        Ok(AgaveStore::new(session, target))
    }

    pub fn target(&self) -> &StorageTarget {
        &self.target
    }
}

impl RemoteStore for AgaveStore {
    fn create_directory(&self, path: &str) -> Result<()> {
        self.session
            .mkdir(&self.target.system_id, &self.target.root_path, path)
    }

    fn upload_reader(
        &self,
        reader: Box<dyn Read + Send>,
        dest_path: &str,
        filename: &str,
    ) -> Result<()> {
        let qualified = remote_join(&self.target.root_path, dest_path);
        self.session
            .import_data(&self.target.system_id, &qualified, filename, reader)
    }
}

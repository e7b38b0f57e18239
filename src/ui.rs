// UI layer: the password prompt and a spinner that follows the copy.
// Both are small and synchronous, like the rest of the tool.

use crate::error::Result;
use crate::store::RemoteStore;
use dialoguer::Password;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Ask for the account password. `Password` hides input in the terminal.
pub fn prompt_password(username: &str) -> anyhow::Result<String> {
    let password = Password::new()
        .with_prompt(format!("Password for {}", username))
        .interact()?;
    Ok(password)
}

/// A ticking spinner with `msg` next to it.
pub fn spinner(msg: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.set_message(msg.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

/// Wraps a store and shows, on a spinner, which remote path is being
/// worked on. Calls and errors pass through unchanged.
pub struct ProgressStore<S> {
    inner: S,
    bar: ProgressBar,
}

impl<S: RemoteStore> ProgressStore<S> {
    pub fn new(inner: S, bar: ProgressBar) -> Self {
        ProgressStore { inner, bar }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &S {
        &self.inner
    }

    pub fn bar(&self) -> &ProgressBar {
        &self.bar
    }
}

impl<S: RemoteStore> RemoteStore for ProgressStore<S> {
    fn create_directory(&self, path: &str) -> Result<()> {
        self.bar.set_message(format!("Creating {}", path));
        self.inner.create_directory(path)
    }

    fn upload_reader(
        &self,
        reader: Box<dyn Read + Send>,
        dest_path: &str,
        filename: &str,
    ) -> Result<()> {
        self.bar
            .set_message(format!("Uploading {}/{}", dest_path, filename));
        self.inner.upload_reader(reader, dest_path, filename)
    }

    // Forward so a wrapped store's own `upload_file` is not bypassed.
    fn upload_file(&self, file_path: &Path, dest_path: &str, filename: &str) -> Result<()> {
        self.bar
            .set_message(format!("Uploading {}/{}", dest_path, filename));
        self.inner.upload_file(file_path, dest_path, filename)
    }
}

// Library root
// -----------
// The binary (`main.rs`) wires these modules together; everything that can
// be tested without a terminal or a live server lives here.
//
// Module responsibilities:
// - `config`: environment variables, destination defaults, credentials.
// - `api`: blocking HTTP session against the Agave token and files APIs.
// - `store`: the `RemoteStore` contract and its Agave-backed adapter.
// - `copier`: the recursive, fail-fast directory walk.
// - `ui`: password prompt and progress spinner.
// - `cli`: command-line arguments.
pub mod api;
pub mod cli;
pub mod config;
pub mod copier;
pub mod error;
pub mod store;
pub mod ui;

#[cfg(test)]
mod test_utils;

pub use copier::{copy_tree, remote_root_for, CopySummary, EntryKind};
pub use error::{Error, Result};
pub use store::{remote_join, AgaveStore, RemoteStore};

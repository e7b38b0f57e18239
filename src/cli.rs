use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for agave-copy.
///
/// The directory is the only input. The destination is the community
/// sample area, fixed in `config`; the Agave endpoint comes from the
/// `AGAVE_SERVER`, `AGAVE_CLIENT`, `AGAVE_API_KEY` and `AGAVE_API_SECRET`
/// environment variables.
#[derive(Parser, Debug)]
#[clap(
    name = "agave-copy",
    about = "Copy a local directory tree to an Agave storage system"
)]
pub struct Args {
    /// The directory to be copied to the server
    pub directory: PathBuf,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,
}

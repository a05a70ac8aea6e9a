mod atomic;

pub use atomic::atomic_write;

use std::path::PathBuf;

/// The name of the per-user tagspace folder
pub const TAGSPACE_FOLDER: &str = ".tagspace";

/// Default file name of the JSON tag store
pub const STORE_FILE: &str = "tags.json";

/// Get the path to `~/.tagspace`, falling back to the working directory
#[must_use]
pub fn tagspace_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(TAGSPACE_FOLDER)
}

/// Get the default location of the JSON tag store
#[must_use]
pub fn default_store_path() -> PathBuf {
    tagspace_home().join(STORE_FILE)
}

pub mod config;
pub mod errors;
pub mod format;
pub mod paths;

pub use errors::{FsError, LineError, Result};
pub use paths::{create_folder, create_folders, file_exists, folder_exists, has_stdin};

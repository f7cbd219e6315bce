pub mod download;

pub use download::{download_file, download_file_with, DownloadOptions};

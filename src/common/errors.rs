use std::path::PathBuf;

use thiserror::Error;

/// Error types for fileutil operations.
/// The CLI wraps these in `anyhow` at the top level,
/// but library callers can match on the exact failure.
#[derive(Debug, Error)]
pub enum FsError {
    /// A line source could not be opened
    #[error("cannot open '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Read, write or delete failed on a single file
    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Download transport failure or non-success HTTP status
    #[error("download of '{url}' failed: {source}")]
    Network {
        url: String,
        source: reqwest::Error,
    },

    /// The sweep root could not be walked at all
    #[error("cannot walk '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A filename regex did not compile
    #[error("invalid filename pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    /// An external command ran and reported failure
    #[error("`{command}` exited with {status}: {output}")]
    Command {
        command: String,
        status: String,
        output: String,
    },

    /// An external command could not be started
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

impl FsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

/// Terminal error of a line stream.
///
/// Delivered as the last item of the sequence, so callers can tell a
/// clean end of input from a truncated one.
#[derive(Debug, Error)]
pub enum LineError {
    /// A line did not fit in the configured buffer capacity
    #[error("line {line} exceeds the {limit}-byte line buffer")]
    TooLong { limit: usize, line: u64 },

    /// The source failed mid-stream
    #[error("read failed at line {line}: {source}")]
    Read { line: u64, source: std::io::Error },
}

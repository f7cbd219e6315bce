use std::path::Path;

use super::errors::{FsError, Result};

/// Permission bits for folders created by `create_folder`
pub const FOLDER_MODE: u32 = 0o700;

/// Check if a regular file exists at `path`.
/// Any stat error counts as "does not exist".
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path)
        .map(|m| !m.is_dir())
        .unwrap_or(false)
}

/// Check if a directory exists at `path`
pub fn folder_exists(path: impl AsRef<Path>) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Create a folder and all missing parents, owner-only permissions
pub fn create_folder(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(FOLDER_MODE);
    }

    builder
        .create(path)
        .map_err(|source| FsError::io(path, source))
}

/// Create each folder in order, stopping at the first failure.
///
/// Folders created before the failure are left in place.
pub fn create_folders<I, P>(paths: I) -> Result<()>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for path in paths {
        create_folder(path)?;
    }
    Ok(())
}

/// Whether stdin is piped or redirected rather than an interactive terminal
#[cfg(unix)]
pub fn has_stdin() -> bool {
    use std::os::fd::AsFd;

    // fstat on a duplicate of fd 0, so the check never depends on /dev/stdin
    let Ok(fd) = std::io::stdin().as_fd().try_clone_to_owned() else {
        return false;
    };
    match std::fs::File::from(fd).metadata() {
        Ok(metadata) => is_redirected(metadata.file_type()),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn is_redirected(file_type: std::fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    !file_type.is_char_device() || file_type.is_fifo()
}

#[cfg(not(unix))]
pub fn has_stdin() -> bool {
    use std::io::IsTerminal;
    !std::io::stdin().is_terminal()
}

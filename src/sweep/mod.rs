pub mod filters;
pub mod walker;

pub use filters::{DeleteCallback, NamePredicate, SweepFilter};
pub use walker::{delete_files_older_than, FileEntry, SweepReport};

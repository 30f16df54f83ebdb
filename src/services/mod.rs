pub mod folders;

pub use folders::{FolderService, StorageBackend, Stored};

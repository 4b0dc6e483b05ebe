pub mod album;
pub mod file_path;
pub mod index;
pub mod key_value;

pub use album::InMemoryAlbumDao;
pub use file_path::InMemoryFilePathDao;
pub use index::LibraryIndex;
pub use key_value::InMemoryKeyValueCache;
